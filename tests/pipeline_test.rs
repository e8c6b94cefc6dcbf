//! 照合処理の統合テスト
//!
//! CSVを読み込み、照合してマッピング表と要確認表を出力するまで

use poi_taxonomy_mapper::cli::OutputFormat;
use poi_taxonomy_mapper::config::Config;
use poi_taxonomy_mapper::error::MapperError;
use poi_taxonomy_mapper::export::csv::read_mapping_rows;
use poi_taxonomy_mapper::pipeline::{load_overrides, run_match, MatchRequest};
use poi_taxonomy_mapper::simplify::simplify_file;
use poi_taxonomy_common::MatchMethod;
use std::path::Path;
use tempfile::tempdir;

fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
    let source = dir.join("overture.csv");
    let target = dir.join("foursquare.csv");
    std::fs::write(&source, "CATEGORY_PRIMARY\nCoffee Shop\nPizza Restaurant\n").unwrap();
    std::fs::write(
        &target,
        "Category ID,Category Label\nt1,coffee_shop\nt2,pizza_place\nt3,bank\n",
    )
    .unwrap();
    (source, target)
}

/// 基本シナリオ: Coffee Shop は完全一致、Pizza Restaurant は要確認
#[test]
fn test_match_scenario() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, target) = write_inputs(dir.path());
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    let request = MatchRequest::new(&source, &target, &output, &config);
    let outcome = run_match(&request, &config, None);
    assert!(outcome.is_ok(), "照合に失敗: {:?}", outcome.err());
    let outcome = outcome.unwrap();

    assert_eq!(outcome.rows.len(), 2);
    assert_eq!(outcome.alt_count, 2);
    assert_eq!(outcome.rows[0].target_id, "t1");
    assert_eq!(outcome.rows[0].score, 100.0);
    assert!(!outcome.rows[0].needs_review);
    assert_eq!(outcome.rows[1].target_id, "t2");
    assert!(outcome.rows[1].needs_review);

    assert!(output.exists(), "マッピングCSVが作成されていない");
    let (rows, alt_count) = read_mapping_rows(&output).unwrap();
    assert_eq!(alt_count, 2);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].source_id, "1");
    assert_eq!(rows[1].source_id, "2");

    let (review_rows, _) = read_mapping_rows(&request.review_output).unwrap();
    assert_eq!(review_rows.len(), 1);
    assert_eq!(review_rows[0].source_label, "Pizza Restaurant");

    assert_eq!(outcome.summary.total, 2);
    assert_eq!(outcome.summary.needs_review, 1);
}

/// ヘッダーの列順と書式
#[test]
fn test_output_header_and_format() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, target) = write_inputs(dir.path());
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    let mut request = MatchRequest::new(&source, &target, &output, &config);
    request.options.top_n = 2;
    run_match(&request, &config, None).unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(
        header,
        "SOURCE_LABEL,SOURCE_ID,TARGET_LABEL,TARGET_ID,MATCH_SCORE,MATCH_METHOD,\
         SEMANTIC_GROUP,MATCH_QUALITY,NEEDS_REVIEW,ALT1_LABEL,ALT1_ID,ALT1_SCORE"
    );
    let first = content.lines().nth(1).unwrap();
    assert!(first.starts_with("Coffee Shop,1,coffee_shop,t1,100.0,semantic_group,food_dining,Excellent,FALSE"));
}

/// 手動マッピングが自動照合より優先される
#[test]
fn test_match_with_overrides() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, target) = write_inputs(dir.path());
    let overrides_path = dir.path().join("overrides.json");
    std::fs::write(&overrides_path, r#"{"pizza restaurant": "t2"}"#).unwrap();
    let output = dir.path().join("mapping.csv");

    let overrides = load_overrides(None, Some(&overrides_path)).unwrap();
    assert!(overrides.is_some());

    let config = Config::default();
    let request = MatchRequest::new(&source, &target, &output, &config);
    let outcome = run_match(&request, &config, overrides.as_ref()).unwrap();

    assert_eq!(outcome.rows[1].method, MatchMethod::Manual);
    assert_eq!(outcome.rows[1].score, 100.0);
    assert!(!outcome.rows[1].needs_review);
}

/// プリセットとファイルの組み合わせ
#[test]
fn test_load_overrides_preset() {
    assert!(load_overrides(None, None).unwrap().is_none());

    let overrides = load_overrides(Some("overture-foursquare"), None).unwrap().unwrap();
    assert!(!overrides.is_empty());

    assert!(load_overrides(Some("unknown-preset"), None).is_err());
    assert!(load_overrides(None, Some(Path::new("/nonexistent/overrides.json"))).is_err());
}

/// 重複排除なしでは同じ照合先を共有できる
#[test]
fn test_match_without_dedupe() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("source.csv");
    let target = dir.path().join("target.csv");
    std::fs::write(&source, "name\ncoffee shop\nCoffee Shop\n").unwrap();
    std::fs::write(&target, "id,name\nt1,coffee_shop\n").unwrap();
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    let mut request = MatchRequest::new(&source, &target, &output, &config);

    let deduped = run_match(&request, &config, None).unwrap();
    assert_eq!(deduped.rows[0].target_id, "t1");
    assert!(!deduped.rows[1].is_matched());

    request.options.dedupe_targets = false;
    let shared = run_match(&request, &config, None).unwrap();
    assert_eq!(shared.rows[1].target_id, "t1");
}

/// 照合元の重複をまとめる
#[test]
fn test_unique_sources() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("source.csv");
    let target = dir.path().join("target.csv");
    std::fs::write(&source, "name\ncoffee shop\ncoffee_shop\nbank\n").unwrap();
    std::fs::write(&target, "id,name\nt1,coffee_shop\nt2,bank\n").unwrap();
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    let mut request = MatchRequest::new(&source, &target, &output, &config);
    request.unique_sources = true;
    let outcome = run_match(&request, &config, None).unwrap();
    assert_eq!(outcome.rows.len(), 2);
}

/// CSVとExcelを両方出力
#[test]
fn test_match_both_formats() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, target) = write_inputs(dir.path());
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    let mut request = MatchRequest::new(&source, &target, &output, &config);
    request.format = OutputFormat::Both;
    run_match(&request, &config, None).unwrap();

    assert!(output.exists());
    let excel = dir.path().join("mapping.xlsx");
    assert!(excel.exists(), "Excelファイルが作成されていない");
    assert!(std::fs::metadata(&excel).unwrap().len() > 0);
}

/// CLIで範囲外の値を指定した場合は照合前に中止
#[test]
fn test_out_of_range_overrides_rejected() {
    let dir = tempdir().expect("Failed to create temp dir");
    let (source, target) = write_inputs(dir.path());
    let output = dir.path().join("mapping.csv");
    let config = Config::default();

    let mut request = MatchRequest::new(&source, &target, &output, &config);
    request.options.min_score = -5.0;
    let result = run_match(&request, &config, None);
    assert!(matches!(result, Err(MapperError::Config(_))));
    assert!(!output.exists(), "検証前に出力されている");

    let mut request = MatchRequest::new(&source, &target, &output, &config);
    request.review_threshold = 150.0;
    assert!(matches!(request.validate(), Err(MapperError::Config(_))));

    let request = MatchRequest::new(&source, &target, &output, &config);
    assert!(request.validate().is_ok());
}

/// simplify で付けた大分類が照合先の範囲になる
#[test]
fn test_simplified_bucket_limits_targets() {
    let dir = tempdir().expect("Failed to create temp dir");
    let raw = dir.path().join("raw.csv");
    let simplified = dir.path().join("simplified.csv");
    let target = dir.path().join("foursquare.csv");
    std::fs::write(&raw, "CATEGORY_PRIMARY\ncoffee_shop\n").unwrap();
    std::fs::write(
        &target,
        "Category ID,Category Label\nt1,Retail > Coffee Shop\nt2,Dining and Drinking > Cafe\n",
    )
    .unwrap();
    let output = dir.path().join("mapping.csv");

    let config = Config::default();
    simplify_file(&raw, &simplified, &config.input).unwrap();

    let mut request = MatchRequest::new(&simplified, &target, &output, &config);
    request.options.min_score = 0.0;
    let scoped = run_match(&request, &config, None).unwrap();
    assert_eq!(scoped.rows[0].target_id, "t2");

    request.options.use_bucket_scope = false;
    let global = run_match(&request, &config, None).unwrap();
    assert_eq!(global.rows[0].target_id, "t1");
}
