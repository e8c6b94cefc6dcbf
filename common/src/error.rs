//! エラー型定義

use thiserror::Error;

/// 照合ライブラリのエラー
#[derive(Error, Debug)]
pub enum Error {
    /// 手動マッピングファイルなどの読み書き
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 重み・絞り込み設定の値が不正
    #[error("Matcher config error: {0}")]
    Config(String),

    /// マッピング表の行を復元できない
    #[error("Invalid mapping row: {0}")]
    InvalidRow(String),
}

pub type Result<T> = std::result::Result<T, Error>;
