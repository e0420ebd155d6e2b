//! 外部キー/バリューストア
//!
//! 契約は同期の get / set / remove のみ。ブラウザでは localStorage、
//! ネイティブ実行とテストではインメモリ実装を使う。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsValue;

use crate::error::PersistError;

/// 永続ストアの契約
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// ブラウザの localStorage
pub struct LocalStorage;

fn js_err(context: &str, e: JsValue) -> PersistError {
    PersistError::Storage(format!("{}: {:?}", context, e))
}

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, PersistError> {
        web_sys::window()
            .ok_or_else(|| PersistError::Storage("window がありません".to_string()))?
            .local_storage()
            .map_err(|e| js_err("localStorage 取得失敗", e))?
            .ok_or_else(|| PersistError::Storage("localStorage が利用できません".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| js_err("読み込み失敗", e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| js_err("書き込み失敗", e))
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|e| js_err("削除失敗", e))
    }
}

/// インメモリストア（ネイティブ実行・テスト用）
///
/// clone してもバックエンドは共有される。
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    write_count: Rc<Cell<u32>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// set / remove を失敗させる（容量超過などの模擬）
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// 成功した set の累計回数
    pub fn write_count(&self) -> u32 {
        self.write_count.get()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.fail_writes.get() {
            return Err(PersistError::Storage("書き込み失敗（失敗モード）".to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.write_count.set(self.write_count.get() + 1);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        if self.fail_writes.get() {
            return Err(PersistError::Storage("削除失敗（失敗モード）".to_string()));
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_memory_store_shared_backend() {
        let store = MemoryStore::new();
        let alias = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(alias.get("k").unwrap(), Some("v".to_string()));
        assert_eq!(alias.write_count(), 1);
    }

    #[test]
    fn test_memory_store_fail_mode() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.set_fail_writes(true);
        assert!(store.set("k", "w").is_err());
        assert!(store.remove("k").is_err());
        // 失敗した書き込みは既存の値を変えない
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }
}
