//! 照合処理（読み込み → 照合 → 出力）

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::error::{MapperError, Result};
use crate::export;
use crate::loader::{load_labels, unique_by_label};
use crate::report::MappingSummary;
use poi_taxonomy_common::{
    ManualOverrides, MappingRow, Matcher, ReviewPolicy, SelectOptions, TaxonomySource,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// 照合の実行内容
#[derive(Debug, Clone)]
pub struct MatchRequest {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: PathBuf,
    pub review_output: PathBuf,
    pub options: SelectOptions,
    pub review_threshold: f64,
    pub format: OutputFormat,
    pub unique_sources: bool,
}

impl MatchRequest {
    /// 設定の既定値で作成
    pub fn new(source: &Path, target: &Path, output: &Path, config: &Config) -> Self {
        Self {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            output: output.to_path_buf(),
            review_output: export::csv::review_path_for(output),
            options: config.select_options(),
            review_threshold: config.review_threshold,
            format: OutputFormat::Csv,
            unique_sources: false,
        }
    }

    /// CLIで上書きした後の値を検証
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_score", self.options.min_score),
            ("review_threshold", self.review_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(MapperError::Config(format!(
                    "{} は 0〜100 で指定してください: {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub rows: Vec<MappingRow>,
    pub alt_count: usize,
    pub summary: MappingSummary,
}

/// プリセットとファイルから手動マッピングを組み立てる（ファイルが優先）
pub fn load_overrides(preset: Option<&str>, file: Option<&Path>) -> Result<Option<ManualOverrides>> {
    if preset.is_none() && file.is_none() {
        return Ok(None);
    }

    let mut overrides = ManualOverrides::default();
    if let Some(name) = preset {
        let preset = ManualOverrides::from_preset(name)
            .ok_or_else(|| MapperError::InvalidOverrides(format!("不明なプリセット: {}", name)))?;
        overrides.merge(&preset);
    }
    if let Some(path) = file {
        if !path.exists() {
            return Err(MapperError::FileNotFound(path.display().to_string()));
        }
        let custom = ManualOverrides::from_file(path)
            .map_err(|e| MapperError::InvalidOverrides(format!("{}: {}", path.display(), e)))?;
        overrides.merge(&custom);
    }
    Ok(Some(overrides))
}

/// 照合を実行して出力
pub fn run_match(
    request: &MatchRequest,
    config: &Config,
    overrides: Option<&ManualOverrides>,
) -> Result<MatchOutcome> {
    request.validate()?;
    let options = &request.options;

    // 1. 読み込み
    println!("[1/3] カテゴリを読み込み中...");
    let sources = load_labels(&request.source, TaxonomySource::Source, &config.input)?;
    let targets = load_labels(&request.target, TaxonomySource::Target, &config.input)?;
    let skipped = sources.skipped + targets.skipped;
    let source_labels = if request.unique_sources {
        unique_by_label(sources.labels)
    } else {
        sources.labels
    };
    println!(
        "✔ 照合元 {}件（列: {}） / 照合先 {}件（列: {}）\n",
        source_labels.len(),
        sources.label_column,
        targets.labels.len(),
        targets.label_column
    );
    if let (Some(column), true) = (&sources.bucket_column, options.use_bucket_scope) {
        println!("- 大分類列: {}（照合先の範囲を限定）\n", column);
    }

    // 2. 照合
    println!("[2/3] 照合中...");
    info!(
        top_n = options.top_n,
        min_score = options.min_score,
        dedupe = options.dedupe_targets,
        groups = options.use_semantic_groups,
        shortlist = options.use_shortlist,
        "matching started"
    );
    let mut matcher =
        Matcher::new(&config.matcher).with_policy(ReviewPolicy::new(request.review_threshold));
    if let Some(overrides) = overrides {
        println!("- 手動マッピング: {}件", overrides.len());
        matcher = matcher.with_overrides(overrides);
    }
    let results = matcher.run(&source_labels, &targets.labels, options);
    println!("✔ 照合完了\n");

    // 3. 出力
    println!("[3/3] 結果を保存中...");
    let alt_count = options.top_n.saturating_sub(1);
    let rows: Vec<MappingRow> = results
        .iter()
        .map(|r| MappingRow::from_result(r, alt_count))
        .collect();
    export::export_mapping(
        &rows,
        &request.format,
        &request.output,
        &request.review_output,
        alt_count,
    )?;

    let summary = MappingSummary::from_rows(&rows, &config.input.hierarchy_separator, skipped);
    Ok(MatchOutcome {
        rows,
        alt_count,
        summary,
    })
}
