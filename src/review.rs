//! 対話式レビューモジュール
//!
//! マッピングCSVの要確認行を1件ずつ表示し、主候補の確定・次点候補への変更・
//! 対応なしの確定を入力する。確定した行は手動マッピングとして保存できる。

use crate::error::{MapperError, Result};
use crate::export::csv::{read_mapping_rows, write_mapping};
use dialoguer::Input;
use poi_taxonomy_common::{ManualOverrides, MappingRow, MatchMethod};
use std::path::Path;
use tracing::debug;

/// 要確認行の位置
pub fn flagged_indices(rows: &[MappingRow]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, r)| r.needs_review)
        .map(|(i, _)| i)
        .collect()
}

/// 対話アクション
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewAction {
    /// 主候補を確定
    Accept,
    /// n番目の次点候補を採用
    Alternate(usize),
    /// 対応なしで確定
    NoMatch,
    /// この行をスキップ
    Skip,
    /// 残り全部スキップ
    SkipAll,
    /// 保存して終了
    Quit,
    /// 解釈できない入力
    Invalid(String),
}

/// 入力文字列をアクションに変換
pub fn parse_action(input: &str, alt_count: usize) -> ReviewAction {
    let trimmed = input.trim();
    match trimmed {
        "" | "a" => ReviewAction::Accept,
        "x" => ReviewAction::NoMatch,
        "s" => ReviewAction::Skip,
        "S" => ReviewAction::SkipAll,
        "q" | "Q" => ReviewAction::Quit,
        _ => match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 && n <= alt_count => ReviewAction::Alternate(n),
            _ => ReviewAction::Invalid(trimmed.to_string()),
        },
    }
}

/// アクションを行に適用（確定したら true）
pub fn apply_decision(row: &mut MappingRow, action: &ReviewAction) -> bool {
    match action {
        ReviewAction::Accept if row.is_matched() => {
            row.accept();
            true
        }
        ReviewAction::Accept => {
            // 主候補がない行の確定は対応なしの確定と同じ
            row.reject();
            true
        }
        ReviewAction::Alternate(n) => row.choose_alternate(*n),
        ReviewAction::NoMatch => {
            row.reject();
            true
        }
        _ => false,
    }
}

/// 確定済みの手動行から手動マッピングを作成
pub fn overrides_from_rows(rows: &[MappingRow]) -> ManualOverrides {
    let mut overrides = ManualOverrides::default();
    for row in rows {
        if row.method == MatchMethod::Manual && !row.target_id.is_empty() {
            overrides.insert(&row.source_label, row.target_id.clone());
        }
    }
    overrides
}

/// レビュー結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewOutcome {
    pub flagged: usize,
    pub decided: usize,
    pub skipped: usize,
}

/// 対話式でレビュー
pub fn run_interactive_review(
    input_path: &Path,
    output_path: Option<&Path>,
    overrides_path: Option<&Path>,
) -> Result<ReviewOutcome> {
    let (mut rows, alt_count) = read_mapping_rows(input_path)?;
    let flagged = flagged_indices(&rows);

    let mut outcome = ReviewOutcome {
        flagged: flagged.len(),
        ..ReviewOutcome::default()
    };

    if flagged.is_empty() {
        println!("✓ 要確認の行はありません");
        return Ok(outcome);
    }

    println!("🔎 要確認の行: {}件", flagged.len());
    println!("---");
    println!("操作: [Enter/a]確定 [1-{}]次点を採用 [x]対応なし [s]スキップ [S]残り全スキップ [q]終了", alt_count.max(1));
    println!("---\n");

    let mut skip_all = false;

    for (count, &idx) in flagged.iter().enumerate() {
        if skip_all {
            outcome.skipped += 1;
            continue;
        }

        let row = &rows[idx];
        println!("[{}/{}] {} ({})", count + 1, flagged.len(), row.source_label, row.source_id);
        if row.is_matched() {
            println!("  主候補: {} [{}] {:.1}", row.target_label, row.target_id, row.score);
        } else {
            println!("  主候補: なし");
        }
        for (i, alt) in row.alternates.iter().enumerate() {
            let score = alt.score.map(|s| format!("{:.1}", s)).unwrap_or_default();
            println!("  {}: {} [{}] {}", i + 1, alt.label, alt.id, score);
        }

        let action = loop {
            let action = prompt_review_action(alt_count)?;
            match action {
                ReviewAction::Invalid(ref input) => println!("  → 不明な入力です: {}", input),
                ReviewAction::Alternate(n) if n > rows[idx].alternates.len() => {
                    println!("  → 次点候補 {} はありません", n)
                }
                _ => break action,
            }
        };

        match action {
            ReviewAction::Skip => {
                outcome.skipped += 1;
                println!("  → スキップ\n");
            }
            ReviewAction::SkipAll => {
                outcome.skipped += 1;
                println!("  → 残り全部スキップ\n");
                skip_all = true;
            }
            ReviewAction::Quit => {
                outcome.skipped += flagged.len() - count;
                println!("保存して終了します...");
                break;
            }
            action => {
                if apply_decision(&mut rows[idx], &action) {
                    outcome.decided += 1;
                    let row = &rows[idx];
                    if row.is_matched() {
                        println!("  → {} [{}]\n", row.target_label, row.target_id);
                    } else {
                        println!("  → 対応なし\n");
                    }
                }
            }
        }
    }

    // 保存
    let output = output_path.unwrap_or(input_path);
    write_mapping(&rows, output, alt_count)?;
    println!("\n✓ 保存しました: {}", output.display());

    if let Some(path) = overrides_path {
        let mut overrides = if path.exists() {
            ManualOverrides::from_file(path)?
        } else {
            ManualOverrides::default()
        };
        overrides.merge(&overrides_from_rows(&rows));
        let json = overrides.to_json()?;
        std::fs::write(path, json)?;
        println!("✓ 手動マッピングを保存しました: {} ({}件)", path.display(), overrides.len());
    }

    debug!("review outcome: {:?}", outcome);
    Ok(outcome)
}

/// レビュー入力プロンプト
fn prompt_review_action(alt_count: usize) -> Result<ReviewAction> {
    let prompt = if alt_count > 0 {
        format!("操作 (a:確定 1-{}:次点 x:対応なし s:スキップ S:全スキップ q:終了)", alt_count)
    } else {
        "操作 (a:確定 x:対応なし s:スキップ S:全スキップ q:終了)".to_string()
    };

    let input: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(|e| MapperError::CliExecution(e.to_string()))?;

    Ok(parse_action(&input, alt_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use poi_taxonomy_common::mapping::AlternateColumn;
    use poi_taxonomy_common::MatchQuality;

    fn row(needs_review: bool) -> MappingRow {
        MappingRow {
            source_label: "Pizza Restaurant".into(),
            source_id: "s1".into(),
            target_label: "pizza_place".into(),
            target_id: "t2".into(),
            score: 43.0,
            method: MatchMethod::SemanticGroup,
            semantic_group: "food_dining".into(),
            quality: MatchQuality::Fair,
            needs_review,
            alternates: vec![AlternateColumn {
                label: "pizza_delivery".into(),
                id: "t3".into(),
                score: Some(35.0),
            }],
        }
    }

    #[test]
    fn test_flagged_indices() {
        let rows = vec![row(true), row(false), row(true)];
        assert_eq!(flagged_indices(&rows), vec![0, 2]);
    }

    #[test]
    fn test_parse_action() {
        assert_eq!(parse_action("", 2), ReviewAction::Accept);
        assert_eq!(parse_action("a", 2), ReviewAction::Accept);
        assert_eq!(parse_action(" 2 ", 2), ReviewAction::Alternate(2));
        assert_eq!(parse_action("3", 2), ReviewAction::Invalid("3".into()));
        assert_eq!(parse_action("0", 2), ReviewAction::Invalid("0".into()));
        assert_eq!(parse_action("x", 2), ReviewAction::NoMatch);
        assert_eq!(parse_action("s", 2), ReviewAction::Skip);
        assert_eq!(parse_action("S", 2), ReviewAction::SkipAll);
        assert_eq!(parse_action("q", 2), ReviewAction::Quit);
    }

    #[test]
    fn test_apply_accept() {
        let mut r = row(true);
        assert!(apply_decision(&mut r, &ReviewAction::Accept));
        assert_eq!(r.method, MatchMethod::Manual);
        assert!(!r.needs_review);
        assert_eq!(r.target_id, "t2");
    }

    #[test]
    fn test_apply_alternate() {
        let mut r = row(true);
        assert!(apply_decision(&mut r, &ReviewAction::Alternate(1)));
        assert_eq!(r.target_id, "t3");
        assert_eq!(r.method, MatchMethod::Manual);

        let mut r = row(true);
        assert!(!apply_decision(&mut r, &ReviewAction::Alternate(2)));
        assert!(r.needs_review);
    }

    #[test]
    fn test_apply_no_match_and_skip() {
        let mut r = row(true);
        assert!(!apply_decision(&mut r, &ReviewAction::Skip));
        assert!(r.needs_review);
        assert!(apply_decision(&mut r, &ReviewAction::NoMatch));
        assert!(!r.is_matched());
        assert!(!r.needs_review);
    }

    #[test]
    fn test_overrides_from_rows() {
        let mut accepted = row(true);
        apply_decision(&mut accepted, &ReviewAction::Accept);
        let rows = vec![accepted, row(true)];
        let overrides = overrides_from_rows(&rows);
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides.mappings.get("pizza restaurant").map(String::as_str), Some("t2"));
    }
}
