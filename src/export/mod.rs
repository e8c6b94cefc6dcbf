pub mod csv;
pub mod excel;

use crate::cli::OutputFormat;
use crate::error::Result;
use poi_taxonomy_common::MappingRow;
use std::path::{Path, PathBuf};

/// Excel出力のパス（CSVと同じ場所・同じ名前で拡張子だけ変える）
pub fn excel_path_for(output: &Path) -> PathBuf {
    output.with_extension("xlsx")
}

/// 形式に応じてマッピング表を出力
pub fn export_mapping(
    rows: &[MappingRow],
    format: &OutputFormat,
    output: &Path,
    review_output: &Path,
    alt_count: usize,
) -> Result<()> {
    if format.writes_csv() {
        println!("- CSVを生成中...");
        csv::write_mapping(rows, output, alt_count)?;
        println!("✔ CSV出力: {}", output.display());

        let flagged = csv::write_review_subset(rows, review_output, alt_count)?;
        println!("✔ 要確認CSV出力: {} ({}件)", review_output.display(), flagged);
    }

    if format.writes_excel() {
        let excel_path = excel_path_for(output);
        println!("- Excelを生成中...");
        excel::generate_excel(rows, &excel_path, alt_count)?;
        println!("✔ Excel出力: {}", excel_path.display());
    }

    Ok(())
}
