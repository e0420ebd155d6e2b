//! データモデル定義

use serde_json::{Map, Value};

/// フォーム状態（フィールド名 → 任意のJSON値）
///
/// 変更は `update_field` / `reset_form` / 復元経由のみ。
/// 外部へはスナップショットとしてのみ公開する。
pub type FormState = Map<String, Value>;

/// FormPersister の構成オプション
#[derive(Debug, Clone)]
pub struct PersisterConfig {
    /// ストレージ上の名前空間キー（必須。空文字は構成エラー扱い）
    pub form_key: String,
    /// 総ステップ数。1 ならナビゲーション無効
    pub steps: u32,
    /// 最後の変更から自動保存までの待機時間（ミリ秒）
    pub auto_save_delay_ms: u32,
}

impl PersisterConfig {
    pub fn new(form_key: impl Into<String>) -> Self {
        Self {
            form_key: form_key.into(),
            ..Default::default()
        }
    }
}

impl Default for PersisterConfig {
    fn default() -> Self {
        Self {
            form_key: String::new(),
            steps: 1,
            auto_save_delay_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PersisterConfig::new("my_form");
        assert_eq!(config.form_key, "my_form");
        assert_eq!(config.steps, 1);
        assert_eq!(config.auto_save_delay_ms, 1000);
    }
}
