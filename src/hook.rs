//! Leptos 向けフックサーフェス
//!
//! コアの [`FormPersister`] をシグナルに接続し、ビューから使える形で返す。
//! すべての操作はエラーを投げず、ログチャネルへの報告のみで完結する。

use std::rc::Rc;

use leptos::*;
use serde_json::Value;

use crate::models::{FormState, PersisterConfig};
use crate::persister::FormPersister;
use crate::scheduler::TimeoutScheduler;
use crate::storage::LocalStorage;

/// `use_form_persister` が返す操作サーフェス
#[derive(Clone)]
pub struct UseFormPersister {
    form_data: ReadSignal<FormState>,
    set_form_data: WriteSignal<FormState>,
    current_step: ReadSignal<u32>,
    set_current_step: WriteSignal<u32>,
    persister: FormPersister,
}

impl UseFormPersister {
    /// 現在のフォーム状態（読み取り専用シグナル）
    pub fn form_data(&self) -> ReadSignal<FormState> {
        self.form_data
    }

    /// 現在のステップ（読み取り専用シグナル）
    pub fn current_step(&self) -> ReadSignal<u32> {
        self.current_step
    }

    /// 構成された総ステップ数
    pub fn steps(&self) -> u32 {
        self.persister.steps()
    }

    pub fn update_field(&self, field: &str, value: impl Into<Value>) {
        self.persister.update_field(field, value);
        self.sync();
    }

    pub fn next_step(&self) {
        self.persister.next_step();
        self.sync();
    }

    pub fn prev_step(&self) {
        self.persister.prev_step();
        self.sync();
    }

    pub fn reset_form(&self) {
        self.persister.reset_form();
        self.sync();
    }

    /// 保存先キーの切り替え（新しいキーで復元をやり直す）
    pub fn set_form_key(&self, form_key: impl Into<String>) {
        self.persister.set_form_key(form_key);
        self.sync();
    }

    fn sync(&self) {
        self.set_form_data.set(self.persister.form_data());
        self.set_current_step.set(self.persister.current_step());
    }
}

/// マルチステップフォームの自動保存フック
///
/// マウント時に localStorage から復元し、入力の変更は
/// `auto_save_delay_ms` の静止期間を待ってから書き込む。
/// アンマウント時には予約済みの保存を取り消す。
pub fn use_form_persister(config: PersisterConfig) -> UseFormPersister {
    let persister = FormPersister::new(config, Rc::new(LocalStorage), Rc::new(TimeoutScheduler));
    persister.initialize();

    let (form_data, set_form_data) = create_signal(persister.form_data());
    let (current_step, set_current_step) = create_signal(persister.current_step());

    on_cleanup({
        let persister = persister.clone();
        move || persister.teardown()
    });

    UseFormPersister {
        form_data,
        set_form_data,
        current_step,
        set_current_step,
        persister,
    }
}
