use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("ラベル列が見つかりません: {file}（候補: {candidates}）")]
    MissingColumn { file: String, candidates: String },

    #[error("対応していない入力形式です: {0}")]
    UnsupportedFormat(String),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel読み込みエラー: {0}")]
    XlsxRead(#[from] calamine::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Common(#[from] poi_taxonomy_common::Error),

    #[error("手動マッピングが不正: {0}")]
    InvalidOverrides(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),
}

pub type Result<T> = std::result::Result<T, MapperError>;
