//! 入力ファイル読み込み
//!
//! CSV（csv）と Excel（calamine、先頭シート）を同じ表形式に読み込み、
//! ラベル列・ID列を候補名から探して `CategoryLabel` に変換する。

use crate::config::InputConfig;
use crate::error::{MapperError, Result};
use calamine::{open_workbook_auto, Reader};
use poi_taxonomy_common::normalizer::normalize;
use poi_taxonomy_common::{CategoryLabel, TaxonomySource};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

const EXCEL_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// ヘッダー付きの表
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// 読めなかった行の数
    pub skipped: usize,
}

impl Table {
    pub fn column(&self, candidates: &[String]) -> Option<usize> {
        find_column(&self.headers, candidates)
    }
}

/// 読み込んだラベル
#[derive(Debug, Clone)]
pub struct LoadedLabels {
    pub labels: Vec<CategoryLabel>,
    /// ラベル空・読み込み失敗でスキップした行数
    pub skipped: usize,
    pub label_column: String,
    pub id_column: Option<String>,
    pub bucket_column: Option<String>,
}

/// ラベルファイルを読み込み
pub fn load_labels(path: &Path, source: TaxonomySource, input: &InputConfig) -> Result<LoadedLabels> {
    let table = read_table(path)?;
    labels_from_table(&table, source, input, &path.display().to_string())
}

/// 拡張子で判定して表を読み込み
pub fn read_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(MapperError::FileNotFound(path.display().to_string()));
    }

    if is_excel(path) {
        read_excel_table(path)
    } else {
        read_csv_table(path)
    }
}

fn is_excel(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXCEL_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn read_csv_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut table = Table {
        headers,
        ..Table::default()
    };
    for (i, record) in reader.records().enumerate() {
        match record {
            Ok(record) => table.rows.push(record.iter().map(|f| f.to_string()).collect()),
            Err(e) => {
                warn!("{}: {}行目を読み込めないためスキップ: {}", path.display(), i + 2, e);
                table.skipped += 1;
            }
        }
    }
    debug!("{}: {}行読み込み", path.display(), table.rows.len());
    Ok(table)
}

fn read_excel_table(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| MapperError::UnsupportedFormat(format!("シートがありません: {}", path.display())))?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| c.to_string().trim().to_string()).collect())
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(|c| c.to_string()).collect())
        .collect();
    debug!("{} [{}]: {}行読み込み", path.display(), sheet, rows.len());

    Ok(Table {
        headers,
        rows,
        skipped: 0,
    })
}

/// 候補名の優先順で列を探す
pub fn find_column<S: AsRef<str>>(headers: &[String], candidates: &[S]) -> Option<usize> {
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|h| h.trim() == candidate.as_ref().trim())
    })
}

/// 表からラベルを取り出す
///
/// ID列がなければ1始まりのデータ行番号をIDにする。
pub fn labels_from_table(
    table: &Table,
    source: TaxonomySource,
    input: &InputConfig,
    file_name: &str,
) -> Result<LoadedLabels> {
    let label_idx = table
        .column(&input.label_columns)
        .ok_or_else(|| MapperError::MissingColumn {
            file: file_name.to_string(),
            candidates: input.label_columns.join(", "),
        })?;
    let id_idx = table.column(&input.id_columns);
    let bucket_idx = table.column(&input.bucket_columns);

    let mut labels = Vec::with_capacity(table.rows.len());
    let mut skipped = table.skipped;

    for (i, row) in table.rows.iter().enumerate() {
        let label = row.get(label_idx).map(|s| s.trim()).unwrap_or("");
        if label.is_empty() {
            warn!("{}: {}行目はラベルが空のためスキップ", file_name, i + 2);
            skipped += 1;
            continue;
        }
        let id = id_idx
            .and_then(|idx| row.get(idx))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .unwrap_or_else(|| (i + 1).to_string());

        let mut category = CategoryLabel::with_separator(source, id, label, &input.hierarchy_separator);
        if let Some(bucket) = bucket_idx.and_then(|idx| row.get(idx)) {
            category = category.with_bucket(bucket.as_str());
        }
        labels.push(category);
    }

    Ok(LoadedLabels {
        labels,
        skipped,
        label_column: table.headers[label_idx].clone(),
        id_column: id_idx.map(|idx| table.headers[idx].clone()),
        bucket_column: bucket_idx.map(|idx| table.headers[idx].clone()),
    })
}

/// 正規化後に同じラベルを1件にまとめる（最初の出現を残す）
pub fn unique_by_label(labels: Vec<CategoryLabel>) -> Vec<CategoryLabel> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|l| seen.insert(normalize(&l.label)))
        .collect()
}
