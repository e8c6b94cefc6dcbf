use clap::Parser;
use poi_taxonomy_mapper::{cli, config, error, export, pipeline, review, simplify};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use pipeline::MatchRequest;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    // 二重初期化は無視
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Match {
            source,
            target,
            output,
            review_output,
            top_n,
            min_score,
            review_threshold,
            no_dedupe,
            no_groups,
            no_shortlist,
            no_scope,
            overrides,
            preset,
            format,
            summary,
            unique_sources,
        } => {
            println!("🗂  taxonomy-map - カテゴリ照合\n");

            let mut request = MatchRequest::new(&source, &target, &output, &config);
            if let Some(path) = review_output {
                request.review_output = path;
            }
            if let Some(n) = top_n {
                request.options.top_n = n.max(1);
            }
            if let Some(score) = min_score {
                request.options.min_score = score;
            }
            if let Some(threshold) = review_threshold {
                request.review_threshold = threshold;
            }
            request.options.dedupe_targets = !no_dedupe;
            request.options.use_semantic_groups = !no_groups;
            request.options.use_shortlist = !no_shortlist;
            request.options.use_bucket_scope = !no_scope;
            request.format = format;
            request.unique_sources = unique_sources;

            let overrides = pipeline::load_overrides(preset.as_deref(), overrides.as_deref())?;
            let outcome = pipeline::run_match(&request, &config, overrides.as_ref())?;

            outcome.summary.print();
            if let Some(path) = summary {
                outcome.summary.save(&path)?;
                println!("\n✔ 集計結果を保存: {}", path.display());
            }

            println!("\n✅ 照合完了");
        }

        Commands::Simplify { input, output } => {
            println!("🧹 taxonomy-map - カテゴリ平坦化\n");

            let outcome = simplify::simplify_file(&input, &output, &config.input)?;
            println!("✔ {}件を振り分け（列: {}）", outcome.written, outcome.label_column);
            if outcome.skipped > 0 {
                println!("  スキップした行: {}", outcome.skipped);
            }
            simplify::print_distribution(&outcome);
            println!("\n✔ 出力: {}", output.display());
        }

        Commands::FilterReview { input, output } => {
            let output = output.unwrap_or_else(|| export::csv::review_path_for(&input));
            let (kept, total) = export::csv::filter_needs_review(&input, &output)?;
            println!("✔ 要確認 {}件 / 全{}件", kept, total);
            println!("✔ 出力: {}", output.display());
        }

        Commands::Review { input, output, save_overrides } => {
            println!("🔎 taxonomy-map - 要確認レビュー\n");
            let outcome = review::run_interactive_review(
                &input,
                output.as_deref(),
                save_overrides.as_deref(),
            )?;
            println!(
                "確定: {}件 / スキップ: {}件（要確認 {}件中）",
                outcome.decided, outcome.skipped, outcome.flagged
            );
        }

        Commands::Config { show, init } => {
            if init {
                let path = Config::config_path()?;
                if path.exists() {
                    println!("設定ファイルは既に存在します: {}", path.display());
                } else {
                    Config::default().save()?;
                    println!("✔ 設定ファイルを作成しました: {}", path.display());
                }
            }

            if show || !init {
                println!("設定:");
                println!("  ファイル: {}", Config::config_path()?.display());
                println!("  候補数 (top_n): {}", config.top_n);
                println!("  最低スコア: {}", config.min_score);
                println!("  要確認の閾値: {}", config.review_threshold);
                println!("  ラベル列: {}", config.input.label_columns.join(", "));
                println!("  ID列: {}", config.input.id_columns.join(", "));
                println!("  階層区切り: \"{}\"", config.input.hierarchy_separator);
                let w = &config.matcher.weights;
                println!(
                    "  重み: 編集距離 {} / キーワード {} / 包含 {} / 部分一致 {}",
                    w.sequence, w.keyword_overlap, w.containment_bonus, w.token_bonus
                );
                println!(
                    "  絞り込み: {}（下限 {} / 倍率 {}）",
                    if config.matcher.shortlist.enabled { "有効" } else { "無効" },
                    config.matcher.shortlist.floor,
                    config.matcher.shortlist.multiplier
                );
            }
        }
    }

    Ok(())
}
