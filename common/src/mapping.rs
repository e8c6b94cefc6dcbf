//! マッピング表の行
//!
//! 照合結果を CSV / Excel に書き出す平たい行に変換する。
//! 列は基本9列のあとに次点候補 `ALT{i}_LABEL, ALT{i}_ID, ALT{i}_SCORE` が続く。

use crate::error::{Error, Result};
use crate::types::{MatchMethod, MatchQuality, MatchResult, MIN_SCORE};
use std::collections::HashMap;

pub const SOURCE_LABEL: &str = "SOURCE_LABEL";
pub const SOURCE_ID: &str = "SOURCE_ID";
pub const TARGET_LABEL: &str = "TARGET_LABEL";
pub const TARGET_ID: &str = "TARGET_ID";
pub const MATCH_SCORE: &str = "MATCH_SCORE";
pub const MATCH_METHOD: &str = "MATCH_METHOD";
pub const SEMANTIC_GROUP: &str = "SEMANTIC_GROUP";
pub const MATCH_QUALITY: &str = "MATCH_QUALITY";
pub const NEEDS_REVIEW: &str = "NEEDS_REVIEW";

pub const BASE_COLUMNS: [&str; 9] = [
    SOURCE_LABEL,
    SOURCE_ID,
    TARGET_LABEL,
    TARGET_ID,
    MATCH_SCORE,
    MATCH_METHOD,
    SEMANTIC_GROUP,
    MATCH_QUALITY,
    NEEDS_REVIEW,
];

/// ヘッダー行（次点候補 alt_count 組を含む）
pub fn headers(alt_count: usize) -> Vec<String> {
    let mut headers: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for i in 1..=alt_count {
        headers.push(format!("ALT{}_LABEL", i));
        headers.push(format!("ALT{}_ID", i));
        headers.push(format!("ALT{}_SCORE", i));
    }
    headers
}

/// ヘッダーに含まれる次点候補の組数
pub fn alternate_count<S: AsRef<str>>(headers: &[S]) -> usize {
    let mut count = 0;
    while headers
        .iter()
        .any(|h| h.as_ref() == format!("ALT{}_LABEL", count + 1))
    {
        count += 1;
    }
    count
}

pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

pub fn format_flag(flag: bool) -> &'static str {
    if flag {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// "TRUE"（大文字小文字は問わない）なら true
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// 次点候補の列
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlternateColumn {
    pub label: String,
    pub id: String,
    pub score: Option<f64>,
}

/// マッピング表の1行
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRow {
    pub source_label: String,
    pub source_id: String,
    pub target_label: String,
    pub target_id: String,
    pub score: f64,
    pub method: MatchMethod,
    pub semantic_group: String,
    pub quality: MatchQuality,
    pub needs_review: bool,
    pub alternates: Vec<AlternateColumn>,
}

impl MappingRow {
    /// 照合結果から作成（次点候補は alt_count 件まで）
    pub fn from_result(result: &MatchResult, alt_count: usize) -> Self {
        let (target_label, target_id, score) = match &result.primary {
            Some(c) => (c.target.label.clone(), c.target.id.clone(), c.score),
            None => (String::new(), String::new(), MIN_SCORE),
        };
        let alternates = result
            .alternates
            .iter()
            .take(alt_count)
            .map(|c| AlternateColumn {
                label: c.target.label.clone(),
                id: c.target.id.clone(),
                score: Some(c.score),
            })
            .collect();

        Self {
            source_label: result.source.label.clone(),
            source_id: result.source.id.clone(),
            target_label,
            target_id,
            score,
            method: result.method,
            semantic_group: result.semantic_group.clone().unwrap_or_default(),
            quality: result.quality(),
            needs_review: result.needs_review,
            alternates,
        }
    }

    pub fn is_matched(&self) -> bool {
        !self.target_id.is_empty() || !self.target_label.is_empty()
    }

    /// CSVのフィールド列（次点候補は alt_count 組に揃える）
    pub fn to_fields(&self, alt_count: usize) -> Vec<String> {
        let mut fields = vec![
            self.source_label.clone(),
            self.source_id.clone(),
            self.target_label.clone(),
            self.target_id.clone(),
            format_score(self.score),
            self.method.to_string(),
            self.semantic_group.clone(),
            self.quality.to_string(),
            format_flag(self.needs_review).to_string(),
        ];
        for i in 0..alt_count {
            match self.alternates.get(i) {
                Some(alt) => {
                    fields.push(alt.label.clone());
                    fields.push(alt.id.clone());
                    fields.push(alt.score.map(format_score).unwrap_or_default());
                }
                None => fields.extend([String::new(), String::new(), String::new()]),
            }
        }
        fields
    }

    /// ヘッダーとフィールド列から復元
    pub fn from_fields<H: AsRef<str>, F: AsRef<str>>(headers: &[H], fields: &[F]) -> Result<Self> {
        let index: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_ref().trim(), i))
            .collect();
        let get = |name: &str| field(&index, fields, name);

        if !index.contains_key(SOURCE_LABEL) {
            return Err(Error::InvalidRow(format!("missing column {}", SOURCE_LABEL)));
        }

        let score = parse_score(get(MATCH_SCORE))?.unwrap_or(MIN_SCORE);
        let method: MatchMethod = get(MATCH_METHOD).parse().map_err(Error::InvalidRow)?;
        let quality: MatchQuality = get(MATCH_QUALITY).parse().map_err(Error::InvalidRow)?;

        let mut alternates = Vec::new();
        for i in 1..=alternate_count(headers) {
            let label = get(&format!("ALT{}_LABEL", i)).to_string();
            let id = get(&format!("ALT{}_ID", i)).to_string();
            let alt_score = parse_score(get(&format!("ALT{}_SCORE", i)))?;
            if label.is_empty() && id.is_empty() {
                continue;
            }
            alternates.push(AlternateColumn {
                label,
                id,
                score: alt_score,
            });
        }

        Ok(Self {
            source_label: get(SOURCE_LABEL).to_string(),
            source_id: get(SOURCE_ID).to_string(),
            target_label: get(TARGET_LABEL).to_string(),
            target_id: get(TARGET_ID).to_string(),
            score,
            method,
            semantic_group: get(SEMANTIC_GROUP).to_string(),
            quality,
            needs_review: parse_flag(get(NEEDS_REVIEW)),
            alternates,
        })
    }

    /// 主候補を確定
    pub fn accept(&mut self) {
        self.method = MatchMethod::Manual;
        self.needs_review = false;
    }

    /// n番目（1始まり）の次点候補を主候補にする
    pub fn choose_alternate(&mut self, n: usize) -> bool {
        let Some(alt) = n.checked_sub(1).and_then(|i| self.alternates.get(i)).cloned() else {
            return false;
        };
        self.target_label = alt.label;
        self.target_id = alt.id;
        self.score = alt.score.unwrap_or(MIN_SCORE);
        self.quality = MatchQuality::from_score(Some(self.score));
        self.accept();
        true
    }

    /// 対応なしとして確定
    pub fn reject(&mut self) {
        self.target_label.clear();
        self.target_id.clear();
        self.score = MIN_SCORE;
        self.method = MatchMethod::Unmatched;
        self.quality = MatchQuality::None;
        self.needs_review = false;
    }
}

fn field<'f, F: AsRef<str>>(index: &HashMap<&str, usize>, fields: &'f [F], name: &str) -> &'f str {
    index
        .get(name)
        .and_then(|&i| fields.get(i))
        .map(|f| f.as_ref().trim())
        .unwrap_or("")
}

fn parse_score(value: &str) -> Result<Option<f64>> {
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| Error::InvalidRow(format!("invalid score: {}", value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CategoryLabel, MatchCandidate, TaxonomySource};

    fn candidate(id: &str, label: &str, score: f64) -> MatchCandidate {
        MatchCandidate {
            target: CategoryLabel::new(TaxonomySource::Target, id, label),
            target_index: 0,
            score,
            method: MatchMethod::Automatic,
        }
    }

    fn sample_result() -> MatchResult {
        MatchResult {
            source: CategoryLabel::new(TaxonomySource::Source, "s1", "Pizza Restaurant"),
            primary: Some(candidate("t2", "pizza_place", 43.456)),
            alternates: vec![candidate("t3", "pizza_delivery", 35.0)],
            method: MatchMethod::SemanticGroup,
            semantic_group: Some("food_dining".into()),
            needs_review: true,
        }
    }

    #[test]
    fn test_headers() {
        let h = headers(2);
        assert_eq!(h.len(), 15);
        assert_eq!(h[0], "SOURCE_LABEL");
        assert_eq!(h[8], "NEEDS_REVIEW");
        assert_eq!(h[9], "ALT1_LABEL");
        assert_eq!(h[14], "ALT2_SCORE");
        assert_eq!(alternate_count(&h), 2);
        assert_eq!(alternate_count(&headers(0)), 0);
    }

    #[test]
    fn test_fields_from_result() {
        let row = MappingRow::from_result(&sample_result(), 2);
        let fields = row.to_fields(2);
        assert_eq!(fields.len(), 15);
        assert_eq!(fields[2], "pizza_place");
        assert_eq!(fields[4], "43.5");
        assert_eq!(fields[5], "semantic_group");
        assert_eq!(fields[6], "food_dining");
        assert_eq!(fields[7], "Fair");
        assert_eq!(fields[8], "TRUE");
        assert_eq!(fields[9], "pizza_delivery");
        assert_eq!(fields[11], "35.0");
        // 2組目は空欄
        assert_eq!(fields[12], "");
    }

    #[test]
    fn test_unmatched_fields() {
        let source = CategoryLabel::new(TaxonomySource::Source, "s9", "mystery");
        let mut result = MatchResult::unmatched(source);
        result.needs_review = true;
        let fields = MappingRow::from_result(&result, 0).to_fields(0);
        assert_eq!(fields[2], "");
        assert_eq!(fields[4], "0.0");
        assert_eq!(fields[5], "no_match");
        assert_eq!(fields[7], "");
    }

    #[test]
    fn test_parse_back() {
        let h = headers(2);
        let fields = MappingRow::from_result(&sample_result(), 2).to_fields(2);
        let row = MappingRow::from_fields(&h, &fields).unwrap();
        assert_eq!(row.source_id, "s1");
        assert_eq!(row.method, MatchMethod::SemanticGroup);
        assert!((row.score - 43.5).abs() < 1e-9);
        assert!(row.needs_review);
        assert_eq!(row.alternates.len(), 1);
    }

    #[test]
    fn test_from_fields_missing_source_column() {
        let result = MappingRow::from_fields(&["TARGET_LABEL"], &["x"]);
        assert!(matches!(result, Err(Error::InvalidRow(_))));
    }

    #[test]
    fn test_from_fields_bad_score() {
        let result = MappingRow::from_fields(&["SOURCE_LABEL", "MATCH_SCORE"], &["a", "high"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_flag_case_insensitive() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("true"));
        assert!(parse_flag(" True "));
        assert!(!parse_flag("FALSE"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_review_decisions() {
        let mut row = MappingRow::from_result(&sample_result(), 2);
        assert!(row.choose_alternate(1));
        assert_eq!(row.target_id, "t3");
        assert_eq!(row.method, MatchMethod::Manual);
        assert!(!row.needs_review);
        assert!(!row.choose_alternate(5));
        assert!(!row.choose_alternate(0));

        row.reject();
        assert!(!row.is_matched());
        assert_eq!(row.method, MatchMethod::Unmatched);
        assert!(!row.needs_review);
    }
}
