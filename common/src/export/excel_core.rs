//! Excel生成（共通ライブラリ）
//!
//! マッピング表を `mapping` と `needs_review` の2シートで出力する。

use crate::mapping::{headers, MappingRow};
use rust_xlsxwriter::*;

const LABEL_COL_WIDTH: f64 = 40.0;
const ID_COL_WIDTH: f64 = 28.0;
const NARROW_COL_WIDTH: f64 = 14.0;

/// Excelをバッファに生成
///
/// # Arguments
/// * `rows` - マッピング表の行
/// * `alt_count` - 次点候補の列の組数
pub fn generate_mapping_workbook(rows: &[MappingRow], alt_count: usize) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    // フォーマット定義
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xE8EEF4))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let score_format = Format::new().set_num_format("0.0");

    let review_format = Format::new()
        .set_background_color(Color::RGB(0xFFF2CC))
        .set_num_format("0.0");

    let flagged: Vec<&MappingRow> = rows.iter().filter(|r| r.needs_review).collect();
    let all: Vec<&MappingRow> = rows.iter().collect();

    for (sheet_name, sheet_rows) in [("mapping", &all), ("needs_review", &flagged)] {
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(sheet_name)
            .map_err(|e| format!("シート名設定エラー: {}", e))?;

        write_sheet(
            worksheet,
            sheet_rows,
            alt_count,
            &header_format,
            &score_format,
            &review_format,
        )?;
    }

    // バッファに書き出し
    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}

fn write_sheet(
    worksheet: &mut Worksheet,
    rows: &[&MappingRow],
    alt_count: usize,
    header_format: &Format,
    score_format: &Format,
    review_format: &Format,
) -> Result<(), String> {
    let columns = headers(alt_count);

    for (col, name) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, name, header_format)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        worksheet
            .set_column_width(col, column_width(name))
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }
    worksheet
        .set_freeze_panes(1, 0)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    for (i, row) in rows.iter().enumerate() {
        let excel_row = (i + 1) as u32;
        let fields = row.to_fields(alt_count);
        for (col, (name, value)) in columns.iter().zip(&fields).enumerate() {
            let col = col as u16;
            if name.ends_with("_SCORE") {
                if let Ok(number) = value.parse::<f64>() {
                    let format = if row.needs_review { review_format } else { score_format };
                    worksheet
                        .write_number_with_format(excel_row, col, number, format)
                        .map_err(|e| format!("スコア書き込みエラー: {}", e))?;
                    continue;
                }
            }
            worksheet
                .write_string(excel_row, col, value)
                .map_err(|e| format!("値書き込みエラー: {}", e))?;
        }
    }

    if !rows.is_empty() {
        worksheet
            .autofilter(0, 0, rows.len() as u32, columns.len().saturating_sub(1) as u16)
            .map_err(|e| format!("フィルター設定エラー: {}", e))?;
    }

    Ok(())
}

fn column_width(name: &str) -> f64 {
    if name.ends_with("_LABEL") {
        LABEL_COL_WIDTH
    } else if name.ends_with("_ID") || name == "SEMANTIC_GROUP" {
        ID_COL_WIDTH
    } else {
        NARROW_COL_WIDTH
    }
}
