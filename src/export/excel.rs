//! Excel生成（CLI版）
//!
//! 共通ライブラリの excel_core でバッファを作り、ファイルに書き出す

use crate::error::{MapperError, Result};
use poi_taxonomy_common::export::excel_core::generate_mapping_workbook;
use poi_taxonomy_common::MappingRow;
use std::path::Path;

pub fn generate_excel(rows: &[MappingRow], output_path: &Path, alt_count: usize) -> Result<()> {
    let buffer = generate_mapping_workbook(rows, alt_count).map_err(MapperError::ExcelGeneration)?;
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}
