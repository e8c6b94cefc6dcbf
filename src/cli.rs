use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "taxonomy-map")]
#[command(about = "POIカテゴリ体系の照合・マッピング表生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 照合元カテゴリを照合先カテゴリに対応付ける
    Match {
        /// 照合元ファイル（CSV/XLSX）
        #[arg(required = true)]
        source: PathBuf,

        /// 照合先ファイル（CSV/XLSX）
        #[arg(required = true)]
        target: PathBuf,

        /// 出力マッピングCSV
        #[arg(short, long, default_value = "category_mapping.csv")]
        output: PathBuf,

        /// 要確認行だけの出力先（デフォルト: <出力>_needs_review.csv）
        #[arg(long)]
        review_output: Option<PathBuf>,

        /// 保持する候補数（主候補を含む）
        #[arg(short = 'n', long)]
        top_n: Option<usize>,

        /// 主候補として採用する最低スコア
        #[arg(long)]
        min_score: Option<f64>,

        /// このスコア未満を要確認とする
        #[arg(long)]
        review_threshold: Option<f64>,

        /// 同じ照合先を複数の照合元に割り当てる
        #[arg(long)]
        no_dedupe: bool,

        /// 意味グループ内の照合を無効化
        #[arg(long)]
        no_groups: bool,

        /// 候補の絞り込みを無効化（全件を採点）
        #[arg(long)]
        no_shortlist: bool,

        /// 大分類（SIMPLIFIED_CATEGORY）による照合先の限定を無効化
        #[arg(long)]
        no_scope: bool,

        /// 手動マッピングファイル（JSON）
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// 手動マッピングプリセット (overture-foursquare)
        #[arg(long)]
        preset: Option<String>,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: OutputFormat,

        /// 集計結果をJSONで保存
        #[arg(long)]
        summary: Option<PathBuf>,

        /// 照合元の重複ラベルをまとめる
        #[arg(long)]
        unique_sources: bool,
    },

    /// カテゴリを大分類に振り分ける
    Simplify {
        /// 入力ファイル（CSV/XLSX）
        #[arg(required = true)]
        input: PathBuf,

        /// 出力CSV
        #[arg(short, long, default_value = "simplified_categories.csv")]
        output: PathBuf,
    },

    /// NEEDS_REVIEW が TRUE の行だけを抽出
    FilterReview {
        /// 入力CSV
        #[arg(required = true)]
        input: PathBuf,

        /// 出力CSV（デフォルト: <入力>_needs_review.csv）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 要確認行を対話的に確認
    Review {
        /// マッピングCSV
        #[arg(required = true)]
        input: PathBuf,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 確定した対応を手動マッピングJSONとして保存
        #[arg(long)]
        save_overrides: Option<PathBuf>,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            "both" => Ok(OutputFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}

impl OutputFormat {
    pub fn writes_csv(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Both)
    }

    pub fn writes_excel(&self) -> bool {
        matches!(self, OutputFormat::Excel | OutputFormat::Both)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("XLSX".parse::<OutputFormat>(), Ok(OutputFormat::Excel));
        assert_eq!("both".parse::<OutputFormat>(), Ok(OutputFormat::Both));
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_output_format_targets() {
        assert!(OutputFormat::Both.writes_csv());
        assert!(OutputFormat::Both.writes_excel());
        assert!(!OutputFormat::Csv.writes_excel());
        assert!(!OutputFormat::Excel.writes_csv());
    }

    #[test]
    fn test_parse_match_command() {
        let cli = Cli::try_parse_from([
            "taxonomy-map",
            "match",
            "om.csv",
            "fsq.csv",
            "--top-n",
            "5",
            "--no-dedupe",
            "--no-scope",
            "-f",
            "both",
        ])
        .unwrap();
        match cli.command {
            Commands::Match { top_n, no_dedupe, no_scope, no_groups, format, .. } => {
                assert_eq!(top_n, Some(5));
                assert!(no_dedupe);
                assert!(no_scope);
                assert!(!no_groups);
                assert_eq!(format, OutputFormat::Both);
            }
            _ => panic!("expected match command"),
        }
    }
}
