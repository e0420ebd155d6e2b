//! フォーム状態の永続化コア

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::error::PersistError;
use crate::models::{FormState, PersisterConfig};
use crate::scheduler::{SaveScheduler, TaskHandle};
use crate::storage::KeyValueStore;
use crate::utils::log_trace::{log_debug, log_error, log_info, log_warn};

const LOG_CATEGORY: &str = "form-persist";

/// マルチステップフォームの状態を保持し、外部ストアへデバウンス付きで
/// 自動保存する単一ユニット。
///
/// 同一スレッド上で完結するイベントループ前提の設計。エラーは
/// 呼び出し元へ返さず、すべてログチャネルへ報告する。
/// clone しても同じユニットを共有する。
#[derive(Clone)]
pub struct FormPersister {
    inner: Rc<Inner>,
}

struct Inner {
    form_key: RefCell<String>,
    steps: u32,
    auto_save_delay_ms: u32,
    store: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn SaveScheduler>,
    form_data: RefCell<FormState>,
    current_step: Cell<u32>,
    pending_save: RefCell<Option<TaskHandle>>,
}

impl FormPersister {
    pub fn new(
        config: PersisterConfig,
        store: Rc<dyn KeyValueStore>,
        scheduler: Rc<dyn SaveScheduler>,
    ) -> Self {
        let steps = if config.steps == 0 {
            log_warn(LOG_CATEGORY, "steps は 1 以上が必要なため 1 に補正しました");
            1
        } else {
            config.steps
        };
        Self {
            inner: Rc::new(Inner {
                form_key: RefCell::new(config.form_key),
                steps,
                auto_save_delay_ms: config.auto_save_delay_ms,
                store,
                scheduler,
                form_data: RefCell::new(FormState::new()),
                current_step: Cell::new(1),
                pending_save: RefCell::new(None),
            }),
        }
    }

    /// マウント時の復元。保存済みブロブがあれば FormState を丸ごと置き換える。
    pub fn initialize(&self) {
        self.restore();
    }

    /// 保存先キーを切り替え、新しいキーで復元をやり直す。
    ///
    /// 切り替え前に予約済みの保存を取り消す。旧キー宛ての入力を
    /// 新キーへ書いてしまわないため。
    pub fn set_form_key(&self, form_key: impl Into<String>) {
        self.cancel_pending_save();
        *self.inner.form_key.borrow_mut() = form_key.into();
        self.restore();
    }

    /// フィールドを1つ更新し、デバウンス保存を予約する。
    pub fn update_field(&self, field: &str, value: impl Into<Value>) {
        if field.is_empty() {
            log_error(LOG_CATEGORY, &PersistError::Validation.to_string());
            return;
        }
        // 置き換え方式の更新（新しいマッピングを作って丸ごと差し替える）
        let mut next = self.inner.form_data.borrow().clone();
        next.insert(field.to_string(), value.into());
        *self.inner.form_data.borrow_mut() = next;
        self.schedule_save();
    }

    /// 次のステップへ。steps <= 1 なら何もしない。上限でクランプ
    pub fn next_step(&self) {
        let step = self.inner.current_step.get();
        if self.inner.steps > 1 && step < self.inner.steps {
            self.inner.current_step.set(step + 1);
        }
    }

    /// 前のステップへ。steps <= 1 なら何もしない。下限でクランプ
    pub fn prev_step(&self) {
        let step = self.inner.current_step.get();
        if self.inner.steps > 1 && step > 1 {
            self.inner.current_step.set(step - 1);
        }
    }

    /// フォームを初期状態に戻し、保存済みデータを即時削除する。
    ///
    /// 削除失敗は報告のみで、メモリ上のリセットは取り消さない。
    pub fn reset_form(&self) {
        *self.inner.form_data.borrow_mut() = FormState::new();
        self.inner.current_step.set(1);
        if let Some(key) = self.valid_key() {
            match self.inner.store.remove(&key) {
                Ok(()) => log_info(LOG_CATEGORY, &format!("保存データを削除しました: {}", key)),
                Err(e) => log_error(LOG_CATEGORY, &format!("削除失敗 ({}): {}", key, e)),
            }
        }
        // 空になった FormState も変更なのでデバウンス保存の対象になる
        self.schedule_save();
    }

    /// 破棄時の後始末。予約済みの保存を取り消し、ユニット寿命を超えた
    /// 書き込みを防ぐ。
    pub fn teardown(&self) {
        self.cancel_pending_save();
    }

    /// 現在の FormState のスナップショット
    pub fn form_data(&self) -> FormState {
        self.inner.form_data.borrow().clone()
    }

    pub fn current_step(&self) -> u32 {
        self.inner.current_step.get()
    }

    pub fn steps(&self) -> u32 {
        self.inner.steps
    }

    fn valid_key(&self) -> Option<String> {
        let key = self.inner.form_key.borrow();
        if key.is_empty() {
            None
        } else {
            Some(key.clone())
        }
    }

    fn cancel_pending_save(&self) {
        if let Some(handle) = self.inner.pending_save.borrow_mut().take() {
            handle.cancel();
        }
    }

    fn restore(&self) {
        let key = match self.valid_key() {
            Some(key) => key,
            None => {
                log_error(LOG_CATEGORY, &PersistError::Configuration.to_string());
                return;
            }
        };
        let raw = match self.inner.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return, // 保存データなし
            Err(e) => {
                log_error(LOG_CATEGORY, &format!("復元失敗 ({}): {}", key, e));
                return;
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => {
                // マージではなく丸ごと置き換え
                *self.inner.form_data.borrow_mut() = map;
                log_info(LOG_CATEGORY, &format!("保存データを復元しました: {}", key));
                self.schedule_save();
            }
            Ok(other) => {
                let e = PersistError::MalformedData(format!(
                    "オブジェクトではありません ({})",
                    value_kind(&other)
                ));
                log_error(LOG_CATEGORY, &format!("復元失敗 ({}): {}", key, e));
            }
            Err(e) => {
                let e = PersistError::MalformedData(e.to_string());
                log_error(LOG_CATEGORY, &format!("復元失敗 ({}): {}", key, e));
            }
        }
    }

    fn schedule_save(&self) {
        if self.valid_key().is_none() {
            log_error(LOG_CATEGORY, &PersistError::Configuration.to_string());
            return;
        }
        let weak = Rc::downgrade(&self.inner);
        let handle = self.inner.scheduler.schedule(
            self.inner.auto_save_delay_ms,
            Box::new(move || {
                // ユニットが破棄済みならタイマーが発火しても何もしない
                if let Some(inner) = weak.upgrade() {
                    inner.flush();
                }
            }),
        );
        // 新しい予約で古い予約を置き換える（古いハンドルの drop が取り消し）
        *self.inner.pending_save.borrow_mut() = Some(handle);
    }
}

impl Inner {
    /// 現在の FormState を直列化してストアへ書き込む（タイマー発火時）
    fn flush(&self) {
        let key = self.form_key.borrow().clone();
        if key.is_empty() {
            return;
        }
        let json = match serde_json::to_string(&*self.form_data.borrow()) {
            Ok(json) => json,
            Err(e) => {
                log_error(
                    LOG_CATEGORY,
                    &format!("保存失敗 ({}): {}", key, PersistError::from(e)),
                );
                return;
            }
        };
        match self.store.set(&key, &json) {
            Ok(()) => log_debug(LOG_CATEGORY, &format!("保存しました: {}", key)),
            Err(e) => log_error(LOG_CATEGORY, &format!("保存失敗 ({}): {}", key, e)),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
