//! カテゴリ照合の型定義
//!
//! - CategoryLabel: 入力ファイルの1行（照合元/照合先）
//! - MatchCandidate: 照合元と照合先のペアとスコア
//! - MatchResult: 照合元1件ごとの最終結果

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// スコアの下限
pub const MIN_SCORE: f64 = 0.0;
/// スコアの上限（正規化後の完全一致）
pub const MAX_SCORE: f64 = 100.0;

/// 階層ラベルの既定区切り
pub const DEFAULT_HIERARCHY_SEPARATOR: &str = " > ";

/// ラベルの出所
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxonomySource {
    /// 照合元（オープンデータ側）
    Source,
    /// 照合先（ベンダー側）
    Target,
}

impl fmt::Display for TaxonomySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaxonomySource::Source => write!(f, "source"),
            TaxonomySource::Target => write!(f, "target"),
        }
    }
}

/// カテゴリラベル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabel {
    pub source: TaxonomySource,
    pub id: String,
    pub label: String,
    /// 階層の最下層（階層でなければlabelと同じ）
    pub leaf: String,
    /// 階層の各セグメント（最上位から）
    #[serde(default)]
    pub path: Vec<String>,
    /// 平坦化した大分類（SIMPLIFIED_CATEGORY）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

impl CategoryLabel {
    pub fn new(source: TaxonomySource, id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_separator(source, id, label, DEFAULT_HIERARCHY_SEPARATOR)
    }

    /// 区切り文字を指定して作成
    pub fn with_separator(
        source: TaxonomySource,
        id: impl Into<String>,
        label: impl Into<String>,
        separator: &str,
    ) -> Self {
        let label = label.into();
        let leaf = leaf_segment(&label, separator).to_string();
        let path = split_segments(&label, separator)
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            source,
            id: id.into(),
            label,
            leaf,
            path,
            bucket: None,
        }
    }

    /// 大分類を設定（空なら設定しない）
    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let bucket = bucket.trim();
        self.bucket = if bucket.is_empty() { None } else { Some(bucket.to_string()) };
        self
    }

    /// 階層の2番目のセグメント
    pub fn secondary(&self) -> Option<&str> {
        self.path.get(1).map(String::as_str)
    }

    /// 階層の各セグメント
    pub fn segments(&self, separator: &str) -> Vec<&str> {
        split_segments(&self.label, separator)
    }

    /// 最上位セグメント
    pub fn top_level(&self, separator: &str) -> &str {
        split_segments(&self.label, separator)
            .into_iter()
            .next()
            .unwrap_or("")
    }

    pub fn is_hierarchical(&self) -> bool {
        self.leaf != self.label.trim()
    }
}

fn split_segments<'a>(label: &'a str, separator: &str) -> Vec<&'a str> {
    let sep = separator.trim();
    if sep.is_empty() {
        return vec![label.trim()];
    }
    label
        .split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// 階層ラベルの最下層を取り出す
pub fn leaf_segment<'a>(label: &'a str, separator: &str) -> &'a str {
    split_segments(label, separator)
        .pop()
        .unwrap_or_else(|| label.trim())
}

/// 照合方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// 手動対応表
    Manual,
    /// 意味グループ内の照合
    SemanticGroup,
    /// 全体照合（自動）
    Automatic,
    /// 対応なし
    #[serde(rename = "no_match")]
    Unmatched,
}

impl MatchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethod::Manual => "manual",
            MatchMethod::SemanticGroup => "semantic_group",
            MatchMethod::Automatic => "automatic",
            MatchMethod::Unmatched => "no_match",
        }
    }
}

impl fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" => Ok(MatchMethod::Manual),
            "semantic_group" => Ok(MatchMethod::SemanticGroup),
            "automatic" | "direct_match" => Ok(MatchMethod::Automatic),
            "no_match" | "" => Ok(MatchMethod::Unmatched),
            _ => Err(format!("Unknown match method: {}", s)),
        }
    }
}

/// 照合候補
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub target: CategoryLabel,
    /// 照合先リスト内の位置
    pub target_index: usize,
    pub score: f64,
    pub method: MatchMethod,
}

/// 照合結果の品質区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MatchQuality {
    None,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl MatchQuality {
    /// 0-30-60-80-100 の区間で判定（右端を含む）
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            None => MatchQuality::None,
            Some(s) if s <= 30.0 => MatchQuality::Poor,
            Some(s) if s <= 60.0 => MatchQuality::Fair,
            Some(s) if s <= 80.0 => MatchQuality::Good,
            Some(_) => MatchQuality::Excellent,
        }
    }
}

impl fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchQuality::None => "",
            MatchQuality::Poor => "Poor",
            MatchQuality::Fair => "Fair",
            MatchQuality::Good => "Good",
            MatchQuality::Excellent => "Excellent",
        };
        f.write_str(s)
    }
}

impl FromStr for MatchQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(MatchQuality::None),
            "poor" => Ok(MatchQuality::Poor),
            "fair" => Ok(MatchQuality::Fair),
            "good" => Ok(MatchQuality::Good),
            "excellent" => Ok(MatchQuality::Excellent),
            _ => Err(format!("Unknown match quality: {}", s)),
        }
    }
}

/// 照合元1件の結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub source: CategoryLabel,
    pub primary: Option<MatchCandidate>,
    /// 次点候補（スコア降順）
    pub alternates: Vec<MatchCandidate>,
    pub method: MatchMethod,
    pub semantic_group: Option<String>,
    pub needs_review: bool,
}

impl MatchResult {
    /// 対応なしの結果
    pub fn unmatched(source: CategoryLabel) -> Self {
        Self {
            source,
            primary: None,
            alternates: Vec::new(),
            method: MatchMethod::Unmatched,
            semantic_group: None,
            needs_review: false,
        }
    }

    pub fn score(&self) -> f64 {
        self.primary.as_ref().map(|c| c.score).unwrap_or(MIN_SCORE)
    }

    pub fn is_matched(&self) -> bool {
        self.primary.is_some()
    }

    pub fn quality(&self) -> MatchQuality {
        MatchQuality::from_score(self.primary.as_ref().map(|c| c.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_of_hierarchical_label() {
        let label = CategoryLabel::new(
            TaxonomySource::Target,
            "13035",
            "Dining and Drinking > Cafe, Coffee, and Tea House > Coffee Shop",
        );
        assert_eq!(label.leaf, "Coffee Shop");
        assert_eq!(label.top_level(DEFAULT_HIERARCHY_SEPARATOR), "Dining and Drinking");
        assert_eq!(label.segments(DEFAULT_HIERARCHY_SEPARATOR).len(), 3);
        assert!(label.is_hierarchical());
    }

    #[test]
    fn test_path_and_bucket() {
        let label = CategoryLabel::new(
            TaxonomySource::Target,
            "4bf58dd8d48988d1fa931735",
            "Travel and Transportation > Lodging > Hotel",
        );
        assert_eq!(label.path, vec!["Travel and Transportation", "Lodging", "Hotel"]);
        assert_eq!(label.secondary(), Some("Lodging"));
        assert!(label.bucket.is_none());

        let source = CategoryLabel::new(TaxonomySource::Source, "1", "hotel").with_bucket(" Accommodation & Lodging ");
        assert_eq!(source.bucket.as_deref(), Some("Accommodation & Lodging"));
        assert_eq!(source.secondary(), None);
        assert!(CategoryLabel::new(TaxonomySource::Source, "2", "x").with_bucket("  ").bucket.is_none());
    }

    #[test]
    fn test_flat_label_leaf_is_label() {
        let label = CategoryLabel::new(TaxonomySource::Source, "1", "coffee_shop");
        assert_eq!(label.leaf, "coffee_shop");
        assert!(!label.is_hierarchical());
    }

    #[test]
    fn test_custom_separator() {
        let label = CategoryLabel::with_separator(TaxonomySource::Source, "1", "eat/bar/pub", "/");
        assert_eq!(label.leaf, "pub");
    }

    #[test]
    fn test_match_method_round_trip_names() {
        for method in [
            MatchMethod::Manual,
            MatchMethod::SemanticGroup,
            MatchMethod::Automatic,
            MatchMethod::Unmatched,
        ] {
            assert_eq!(method.as_str().parse::<MatchMethod>(), Ok(method));
        }
        assert!("fuzzy".parse::<MatchMethod>().is_err());
    }

    #[test]
    fn test_match_quality_bins() {
        assert_eq!(MatchQuality::from_score(None), MatchQuality::None);
        assert_eq!(MatchQuality::from_score(Some(0.0)), MatchQuality::Poor);
        assert_eq!(MatchQuality::from_score(Some(30.0)), MatchQuality::Poor);
        assert_eq!(MatchQuality::from_score(Some(45.0)), MatchQuality::Fair);
        assert_eq!(MatchQuality::from_score(Some(80.0)), MatchQuality::Good);
        assert_eq!(MatchQuality::from_score(Some(80.1)), MatchQuality::Excellent);
    }

    #[test]
    fn test_unmatched_result_scores_zero() {
        let source = CategoryLabel::new(TaxonomySource::Source, "1", "x");
        let result = MatchResult::unmatched(source);
        assert_eq!(result.score(), MIN_SCORE);
        assert!(!result.is_matched());
        assert_eq!(result.quality(), MatchQuality::None);
    }
}
