//! 照合結果の集計

use crate::error::Result;
use chrono::Local;
use poi_taxonomy_common::{MappingRow, MatchMethod, MatchQuality};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const LISTED_MATCHES: usize = 20;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ListedMatch {
    pub source_label: String,
    pub target_label: String,
    pub score: f64,
}

/// 自動照合スコアの分布
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ConfidenceBands {
    /// 80超
    pub high: usize,
    /// 60以上80以下
    pub medium: usize,
    /// 60未満
    pub low: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingSummary {
    pub generated_at: String,
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub needs_review: usize,
    pub skipped_rows: usize,
    pub by_method: BTreeMap<String, usize>,
    pub by_quality: BTreeMap<String, usize>,
    pub by_semantic_group: BTreeMap<String, usize>,
    pub by_target_top_level: BTreeMap<String, usize>,
    pub average_automatic_score: Option<f64>,
    pub median_automatic_score: Option<f64>,
    pub automatic_confidence: ConfidenceBands,
    pub top_matches: Vec<ListedMatch>,
    pub low_confidence: Vec<ListedMatch>,
}

impl MappingSummary {
    pub fn from_rows(rows: &[MappingRow], separator: &str, skipped_rows: usize) -> Self {
        let mut by_method = BTreeMap::new();
        let mut by_quality = BTreeMap::new();
        let mut by_semantic_group = BTreeMap::new();
        let mut by_target_top_level = BTreeMap::new();
        let mut automatic_scores = Vec::new();
        let mut confidence = ConfidenceBands::default();

        for row in rows {
            *by_method.entry(row.method.to_string()).or_insert(0) += 1;
            if row.quality != MatchQuality::None {
                *by_quality.entry(row.quality.to_string()).or_insert(0) += 1;
            }
            if !row.semantic_group.is_empty() {
                *by_semantic_group.entry(row.semantic_group.clone()).or_insert(0) += 1;
            }
            if row.is_matched() {
                let top = top_level(&row.target_label, separator);
                *by_target_top_level.entry(top.to_string()).or_insert(0) += 1;
            }
            if matches!(row.method, MatchMethod::Automatic | MatchMethod::SemanticGroup) {
                automatic_scores.push(row.score);
                match row.score {
                    s if s > 80.0 => confidence.high += 1,
                    s if s >= 60.0 => confidence.medium += 1,
                    _ => confidence.low += 1,
                }
            }
        }

        let matched = rows.iter().filter(|r| r.is_matched()).count();

        let mut listed: Vec<&MappingRow> = rows
            .iter()
            .filter(|r| r.is_matched() && r.method != MatchMethod::Manual)
            .collect();
        listed.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let top_matches = listed.iter().take(LISTED_MATCHES).map(|r| listed_match(r)).collect();
        let low_confidence = listed
            .iter()
            .rev()
            .filter(|r| r.score < 50.0)
            .take(LISTED_MATCHES)
            .map(|r| listed_match(r))
            .collect();

        Self {
            generated_at: Local::now().to_rfc3339(),
            total: rows.len(),
            matched,
            unmatched: rows.len() - matched,
            needs_review: rows.iter().filter(|r| r.needs_review).count(),
            skipped_rows,
            by_method,
            by_quality,
            by_semantic_group,
            by_target_top_level,
            average_automatic_score: mean(&automatic_scores),
            median_automatic_score: median(&automatic_scores),
            automatic_confidence: confidence,
            top_matches,
            low_confidence,
        }
    }

    pub fn print(&self) {
        println!("\n=== 照合結果 ===");
        println!("照合元: {}件", self.total);
        println!("  対応あり: {} ({})", self.matched, percent(self.matched, self.total));
        println!("  対応なし: {} ({})", self.unmatched, percent(self.unmatched, self.total));
        println!("  要確認: {} ({})", self.needs_review, percent(self.needs_review, self.total));
        if self.skipped_rows > 0 {
            println!("  スキップした行: {}", self.skipped_rows);
        }

        println!("\n照合方法:");
        for (method, count) in &self.by_method {
            println!("  {}: {} ({})", method, count, percent(*count, self.total));
        }

        if !self.by_quality.is_empty() {
            println!("\n品質:");
            for (quality, count) in &self.by_quality {
                println!("  {}: {} ({})", quality, count, percent(*count, self.total));
            }
        }

        if !self.by_semantic_group.is_empty() {
            println!("\n意味グループ:");
            for (group, count) in &self.by_semantic_group {
                println!("  {}: {}", group, count);
            }
        }

        if let (Some(avg), Some(median)) = (self.average_automatic_score, self.median_automatic_score) {
            let c = &self.automatic_confidence;
            let auto_total = c.high + c.medium + c.low;
            println!("\n自動照合スコア: 平均 {:.2} / 中央値 {:.2}", avg, median);
            println!("  高 (>80): {} ({})", c.high, percent(c.high, auto_total));
            println!("  中 (60-80): {} ({})", c.medium, percent(c.medium, auto_total));
            println!("  低 (<60): {} ({})", c.low, percent(c.low, auto_total));
        }

        if !self.top_matches.is_empty() {
            println!("\n上位の対応:");
            for m in self.top_matches.iter().take(10) {
                println!("  {} → {} ({:.1})", m.source_label, m.target_label, m.score);
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn listed_match(row: &MappingRow) -> ListedMatch {
    ListedMatch {
        source_label: row.source_label.clone(),
        target_label: row.target_label.clone(),
        score: row.score,
    }
}

fn top_level<'a>(label: &'a str, separator: &str) -> &'a str {
    let sep = separator.trim();
    if sep.is_empty() {
        return label.trim();
    }
    label
        .split(sep)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| label.trim())
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

fn percent(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".into();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}
