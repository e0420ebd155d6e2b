//! エラー型定義

use thiserror::Error;

/// フォーム永続化で発生するエラー
///
/// いずれも呼び出し元へは伝播させず、各操作の境界で捕捉して
/// ログチャネル経由で報告する。
#[derive(Debug, Error)]
pub enum PersistError {
    /// formKey 未設定。永続化のみ無効になり、メモリ上の操作は継続する
    #[error("formKey が設定されていないため保存・復元は行いません")]
    Configuration,

    /// フィールド名が不正
    #[error("フィールド名が不正です（空文字は使用できません）")]
    Validation,

    /// 保存済みデータが JSON として解釈できない、またはオブジェクトでない
    #[error("保存データが不正です: {0}")]
    MalformedData(String),

    /// FormState の直列化失敗
    #[error("JSON変換エラー: {0}")]
    Serialization(#[from] serde_json::Error),

    /// ストレージの読み書き・削除失敗
    #[error("ストレージ操作エラー: {0}")]
    Storage(String),
}
