//! カテゴリ平坦化コマンド

use crate::config::InputConfig;
use crate::error::{MapperError, Result};
use crate::loader::read_table;
use poi_taxonomy_common::flatten::simplify;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

pub const SIMPLIFIED_COLUMN: &str = "SIMPLIFIED_CATEGORY";

/// 平坦化の結果
#[derive(Debug, Clone, Default)]
pub struct SimplifyOutcome {
    pub label_column: String,
    pub written: usize,
    pub skipped: usize,
    pub distribution: BTreeMap<String, usize>,
}

/// 入力のラベル列を大分類に振り分けて書き出し
pub fn simplify_file(input: &Path, output: &Path, config: &InputConfig) -> Result<SimplifyOutcome> {
    let table = read_table(input)?;
    let label_idx = table
        .column(&config.label_columns)
        .ok_or_else(|| MapperError::MissingColumn {
            file: input.display().to_string(),
            candidates: config.label_columns.join(", "),
        })?;
    let label_column = table.headers[label_idx].clone();

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record([label_column.as_str(), SIMPLIFIED_COLUMN])?;

    let mut outcome = SimplifyOutcome {
        label_column,
        skipped: table.skipped,
        ..SimplifyOutcome::default()
    };
    for (i, row) in table.rows.iter().enumerate() {
        let label = row.get(label_idx).map(|s| s.trim()).unwrap_or("");
        if label.is_empty() {
            warn!("{}: {}行目はラベルが空のためスキップ", input.display(), i + 2);
            outcome.skipped += 1;
            continue;
        }
        let bucket = simplify(label);
        writer.write_record([label, bucket])?;
        *outcome.distribution.entry(bucket.to_string()).or_insert(0) += 1;
        outcome.written += 1;
    }
    writer.flush()?;

    Ok(outcome)
}

/// 件数の多い順に分布を表示
pub fn print_distribution(outcome: &SimplifyOutcome) {
    let mut entries: Vec<(&String, &usize)> = outcome.distribution.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("\n大分類の分布:");
    for (bucket, count) in entries {
        let share = if outcome.written == 0 {
            0.0
        } else {
            *count as f64 / outcome.written as f64 * 100.0
        };
        println!("  {}: {} ({:.1}%)", bucket, count, share);
    }
}
