//! マッピングCSVの読み書き

use crate::error::{MapperError, Result};
use poi_taxonomy_common::mapping::{self, MappingRow, NEEDS_REVIEW};
use std::path::Path;
use tracing::warn;

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// マッピング表を書き出し
pub fn write_mapping(rows: &[MappingRow], path: &Path, alt_count: usize) -> Result<()> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(mapping::headers(alt_count))?;
    for row in rows {
        writer.write_record(row.to_fields(alt_count))?;
    }
    writer.flush()?;
    Ok(())
}

/// 要確認行だけを書き出し（件数を返す）
pub fn write_review_subset(rows: &[MappingRow], path: &Path, alt_count: usize) -> Result<usize> {
    let flagged: Vec<MappingRow> = rows.iter().filter(|r| r.needs_review).cloned().collect();
    write_mapping(&flagged, path, alt_count)?;
    Ok(flagged.len())
}

/// マッピング表を読み込み（ヘッダーから次点候補の組数も返す）
pub fn read_mapping_rows(path: &Path) -> Result<(Vec<MappingRow>, usize)> {
    if !path.exists() {
        return Err(MapperError::FileNotFound(path.display().to_string()));
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    if !headers.iter().any(|h| h == mapping::SOURCE_LABEL) {
        return Err(MapperError::MissingColumn {
            file: path.display().to_string(),
            candidates: mapping::SOURCE_LABEL.to_string(),
        });
    }
    let alt_count = mapping::alternate_count(&headers);

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: {}行目を読み込めないためスキップ: {}", path.display(), i + 2, e);
                continue;
            }
        };
        let fields: Vec<&str> = record.iter().collect();
        match MappingRow::from_fields(&headers, &fields) {
            Ok(row) => rows.push(row),
            Err(e) => warn!("{}: {}行目をスキップ: {}", path.display(), i + 2, e),
        }
    }
    Ok((rows, alt_count))
}

/// NEEDS_REVIEW 列が TRUE の行を抽出してそのまま書き出す（件数を返す）
///
/// 列の並びや他の列は入力のまま保持する。
pub fn filter_needs_review(input: &Path, output: &Path) -> Result<(usize, usize)> {
    if !input.exists() {
        return Err(MapperError::FileNotFound(input.display().to_string()));
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(input)?;
    let headers = reader.headers()?.clone();
    let flag_idx = headers
        .iter()
        .position(|h| h.trim_start_matches('\u{feff}').trim() == NEEDS_REVIEW)
        .ok_or_else(|| MapperError::MissingColumn {
            file: input.display().to_string(),
            candidates: NEEDS_REVIEW.to_string(),
        })?;

    create_parent(output)?;
    let mut writer = csv::Writer::from_path(output)?;
    writer.write_record(&headers)?;

    let mut total = 0;
    let mut kept = 0;
    for (i, record) in reader.records().enumerate() {
        total += 1;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: {}行目を読み込めないためスキップ: {}", input.display(), i + 2, e);
                continue;
            }
        };
        if record.get(flag_idx).map(mapping::parse_flag).unwrap_or(false) {
            writer.write_record(&record)?;
            kept += 1;
        }
    }
    writer.flush()?;
    Ok((kept, total))
}

/// `<stem>_needs_review.csv` のパス
pub fn review_path_for(path: &Path) -> std::path::PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("category_mapping");
    parent.join(format!("{}_needs_review.csv", stem))
}
