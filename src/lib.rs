//! マルチステップフォーム入力の自動保存ライブラリ
//!
//! フォーム入力を localStorage へデバウンス付きで自動保存し、
//! 再訪時に復元する。ステップナビゲーション付き。
//! コアの [`FormPersister`] はブラウザ非依存で、ストアとタイマーを
//! 差し替えられる（ネイティブ環境ではインメモリ実装を使う）。

pub mod error;
pub mod hook;
pub mod models;
pub mod persister;
pub mod scheduler;
pub mod storage;
pub mod utils;

pub use error::PersistError;
pub use hook::{use_form_persister, UseFormPersister};
pub use models::{FormState, PersisterConfig};
pub use persister::FormPersister;
pub use scheduler::{ManualScheduler, SaveScheduler, TaskHandle, TimeoutScheduler};
pub use storage::{KeyValueStore, LocalStorage, MemoryStore};
