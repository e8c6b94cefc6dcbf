use crate::error::{MapperError, Result};
use poi_taxonomy_common::review::DEFAULT_REVIEW_THRESHOLD;
use poi_taxonomy_common::types::DEFAULT_HIERARCHY_SEPARATOR;
use poi_taxonomy_common::{MatcherConfig, SelectOptions};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "POI_TAXONOMY_CONFIG";

pub const DEFAULT_LABEL_COLUMNS: &[&str] = &[
    "Category Label",
    "CATEGORY_LABEL",
    "category_label",
    "Category Name",
    "CATEGORY_PRIMARY",
    "label",
    "name",
];

pub const DEFAULT_ID_COLUMNS: &[&str] = &["Category ID", "CATEGORY_ID", "category_id", "id"];

/// 大分類列の候補（simplify の出力列）
pub const DEFAULT_BUCKET_COLUMNS: &[&str] = &["SIMPLIFIED_CATEGORY", "Simplified Category", "simplified_category"];

/// 入力ファイルの列設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// ラベル列の候補（先に見つかったものを使用）
    pub label_columns: Vec<String>,
    /// ID列の候補
    pub id_columns: Vec<String>,
    /// 大分類列の候補（なければ絞り込みなし）
    pub bucket_columns: Vec<String>,
    /// 階層ラベルの区切り
    pub hierarchy_separator: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            label_columns: DEFAULT_LABEL_COLUMNS.iter().map(|s| s.to_string()).collect(),
            id_columns: DEFAULT_ID_COLUMNS.iter().map(|s| s.to_string()).collect(),
            bucket_columns: DEFAULT_BUCKET_COLUMNS.iter().map(|s| s.to_string()).collect(),
            hierarchy_separator: DEFAULT_HIERARCHY_SEPARATOR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub matcher: MatcherConfig,
    pub review_threshold: f64,
    pub min_score: f64,
    pub top_n: usize,
    pub input: InputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config = Self::from_json(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        // 環境変数を優先
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let home = dirs::home_dir()
            .ok_or_else(|| MapperError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("poi-taxonomy").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        self.matcher.validate()?;
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(MapperError::Config(format!(
                "min_score は 0〜100 で指定してください: {}",
                self.min_score
            )));
        }
        if !(0.0..=100.0).contains(&self.review_threshold) {
            return Err(MapperError::Config(format!(
                "review_threshold は 0〜100 で指定してください: {}",
                self.review_threshold
            )));
        }
        if self.input.label_columns.is_empty() {
            return Err(MapperError::Config("label_columns が空です".into()));
        }
        Ok(())
    }

    /// 照合オプションを作成
    pub fn select_options(&self) -> SelectOptions {
        SelectOptions {
            top_n: self.top_n,
            min_score: self.min_score,
            ..SelectOptions::default()
        }
    }

    fn default_config() -> Self {
        let options = SelectOptions::default();
        Self {
            matcher: MatcherConfig::default(),
            review_threshold: DEFAULT_REVIEW_THRESHOLD,
            min_score: options.min_score,
            top_n: options.top_n,
            input: InputConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.top_n, 3);
        assert!((config.min_score - 30.0).abs() < f64::EPSILON);
        assert!((config.review_threshold - 80.0).abs() < f64::EPSILON);
        assert_eq!(config.input.label_columns[0], "Category Label");
        assert_eq!(config.input.bucket_columns[0], "SIMPLIFIED_CATEGORY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config = Config::from_json(r#"{"top_n": 5, "matcher": {"min_keyword_len": 3}}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.matcher.min_keyword_len, 3);
        assert_eq!(config.input.hierarchy_separator, " > ");
    }

    #[test]
    fn test_invalid_min_score() {
        let result = Config::from_json(r#"{"min_score": 150}"#);
        assert!(matches!(result, Err(MapperError::Config(_))));
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let result = Config::from_json(r#"{"matcher": {"weights": {"sequence": -0.1}}}"#);
        assert!(matches!(result, Err(MapperError::Common(_))));
    }

    #[test]
    fn test_select_options() {
        let mut config = Config::default();
        config.top_n = 4;
        config.min_score = 50.0;
        let options = config.select_options();
        assert_eq!(options.top_n, 4);
        assert!((options.min_score - 50.0).abs() < f64::EPSILON);
        assert!(options.dedupe_targets);
        assert!(options.use_bucket_scope);
    }
}
