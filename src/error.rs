use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrayAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("料理マスタが設定されていません。`tray-ai config --set-catalog PATH` で設定してください")]
    MissingCatalog,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("料理マスタの読み込みに失敗: {0}")]
    CatalogLoad(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("Base64デコードエラー: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] tray_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, TrayAiError>;
