//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 料理マスタに必須列が無い（起動中止）
    #[error("必要な列が見つかりませんでした: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// 料理マスタの行が不正
    #[error("料理マスタ {line}行目が不正: {reason}")]
    InvalidRow { line: usize, reason: String },

    /// キャッシュJSONの要素に必須キーが無い
    #[error("キャッシュ要素[{index}]に必須キーがありません: {}", .missing.join(", "))]
    InvalidCacheEntry { index: usize, missing: Vec<String> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("不明な検索キー: {0}")]
    UnknownField(String),

    #[error("不正な検出結果: {0}")]
    InvalidDetection(String),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
