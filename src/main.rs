//! デモアプリ: 3ステップの見積もり依頼フォーム
//! 入力は localStorage へ自動保存され、リロード後も復元される

use form_persister::utils::log_trace;
use form_persister::{use_form_persister, PersisterConfig, UseFormPersister};
use leptos::*;
use serde_json::Value;

const FORM_KEY: &str = "quote_request_form";

fn field_label(key: &str) -> &'static str {
    match key {
        "company" => "会社名",
        "contact" => "担当者名",
        "email" => "メールアドレス",
        "project_name" => "工事名称",
        "period" => "工期",
        "details" => "内容・要望",
        _ => "その他",
    }
}

#[component]
fn FieldInput(
    form: UseFormPersister,
    name: &'static str,
    label: &'static str,
) -> impl IntoView {
    let form_data = form.form_data();
    let value = move || {
        form_data.with(|data| {
            data.get(name)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        })
    };
    view! {
        <label class="field">
            <span class="field-label">{label}</span>
            <input
                type="text"
                prop:value=value
                on:input=move |ev| form.update_field(name, event_target_value(&ev))
            />
        </label>
    }
}

#[component]
fn ConfirmView(form: UseFormPersister) -> impl IntoView {
    let form_data = form.form_data();
    view! {
        <div class="confirm-view">
            <h3>"入力内容の確認"</h3>
            {move || form_data.with(|data| {
                if data.is_empty() {
                    view! { <p class="status">"まだ何も入力されていません"</p> }.into_view()
                } else {
                    data.iter().map(|(key, value)| {
                        let text = match value {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        view! {
                            <div class="confirm-row">
                                <span class="confirm-key">{field_label(key)}</span>
                                <span class="confirm-value">{text}</span>
                            </div>
                        }
                    }).collect_view()
                }
            })}
        </div>
    }
}

#[component]
fn QuoteForm() -> impl IntoView {
    let form = use_form_persister(PersisterConfig {
        form_key: FORM_KEY.to_string(),
        steps: 3,
        auto_save_delay_ms: 1000,
    });

    let step = form.current_step();
    let steps_total = form.steps();
    let (reset_notice, set_reset_notice) = create_signal(false);
    let (show_logs, set_show_logs) = create_signal(false);

    let on_prev = {
        let form = form.clone();
        move |_| form.prev_step()
    };
    let on_next = {
        let form = form.clone();
        move |_| form.next_step()
    };
    let on_reset = {
        let form = form.clone();
        move |_| {
            form.reset_form();
            set_reset_notice.set(true);
            // 2秒後に通知を消す
            spawn_local(async move {
                gloo::timers::future::TimeoutFuture::new(2000).await;
                set_reset_notice.set(false);
            });
        }
    };

    let step1 = {
        let form = form.clone();
        move || {
            view! {
                <fieldset>
                    <legend>"会社情報"</legend>
                    <FieldInput form=form.clone() name="company" label="会社名" />
                    <FieldInput form=form.clone() name="contact" label="担当者名" />
                    <FieldInput form=form.clone() name="email" label="メールアドレス" />
                </fieldset>
            }
        }
    };
    let step2 = {
        let form = form.clone();
        move || {
            view! {
                <fieldset>
                    <legend>"工事内容"</legend>
                    <FieldInput form=form.clone() name="project_name" label="工事名称" />
                    <FieldInput form=form.clone() name="period" label="工期" />
                    <FieldInput form=form.clone() name="details" label="内容・要望" />
                </fieldset>
            }
        }
    };
    let step3 = {
        let form = form.clone();
        move || view! { <ConfirmView form=form.clone() /> }
    };

    view! {
        <div class="quote-form">
            <div class="step-indicator">
                {move || format!("ステップ {} / {}", step.get(), steps_total)}
            </div>

            {move || match step.get() {
                1 => step1().into_view(),
                2 => step2().into_view(),
                _ => step3().into_view(),
            }}

            <div class="step-nav">
                <button on:click=on_prev disabled=move || step.get() <= 1>
                    "戻る"
                </button>
                <button on:click=on_next disabled=move || step.get() >= steps_total>
                    "次へ"
                </button>
                <button class="reset-btn" on:click=on_reset>
                    "最初からやり直す"
                </button>
            </div>

            <p class="autosave-hint">"入力は1秒の静止後に自動保存されます"</p>
            {move || reset_notice.get().then(|| view! {
                <p class="status success">"入力と保存データをリセットしました"</p>
            })}

            <div class="log-section">
                <button on:click=move |_| set_show_logs.update(|v| *v = !*v)>
                    {move || if show_logs.get() { "ログを隠す" } else { "トレースログ" }}
                </button>
                {move || show_logs.get().then(|| view! {
                    <pre class="log-panel">{log_trace::get_logs_json()}</pre>
                    <button on:click=move |_| log_trace::clear_logs()>"ログを消去"</button>
                })}
            </div>
        </div>
    }
}

#[component]
fn App() -> impl IntoView {
    view! {
        <div class="app">
            <header class="app-header">
                <h1>"見積もり依頼フォーム"</h1>
            </header>
            <main class="container">
                <QuoteForm />
            </main>
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
