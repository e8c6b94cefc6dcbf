//! 照合パラメータ
//!
//! スコアの重み・ストップワード・候補絞り込みの設定を1つにまとめる。
//! 設定ファイル（JSON）から読み込める。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 既定のストップワード（冠詞・接続詞・前置詞）
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "of", "in", "on", "at", "to", "for", "with", "by", "from",
];

/// 複合スコアの重み
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// 編集距離ベースの類似度（0-1）に掛ける重み
    pub sequence: f64,
    /// キーワード重複率（0-1）に掛ける重み
    pub keyword_overlap: f64,
    /// 一方がもう一方を含む場合の加点
    pub containment_bonus: f64,
    /// 長めのキーワードが相手に含まれる場合の加点
    pub token_bonus: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            sequence: 0.45,
            keyword_overlap: 0.40,
            containment_bonus: 20.0,
            token_bonus: 10.0,
        }
    }
}

/// 候補絞り込み（ショートリスト）の設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortlistConfig {
    pub enabled: bool,
    /// 残す候補数の下限
    pub floor: usize,
    /// top_n に掛ける倍率
    pub multiplier: usize,
}

impl Default for ShortlistConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            floor: 50,
            multiplier: 10,
        }
    }
}

impl ShortlistConfig {
    /// 残す候補数 K
    pub fn size_for(&self, top_n: usize) -> usize {
        self.floor.max(top_n.max(1).saturating_mul(self.multiplier))
    }
}

/// 照合設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub weights: ScoreWeights,
    pub stop_words: Vec<String>,
    /// キーワードとして扱う最小文字数
    pub min_keyword_len: usize,
    /// token_bonus 対象となる最小文字数
    pub bonus_token_min_len: usize,
    /// 綴りの揺れを統一する
    pub canonicalize_spelling: bool,
    pub shortlist: ShortlistConfig,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            stop_words: DEFAULT_STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            min_keyword_len: 2,
            bonus_token_min_len: 4,
            canonicalize_spelling: true,
            shortlist: ShortlistConfig::default(),
        }
    }
}

impl MatcherConfig {
    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 値の妥当性を検査
    pub fn validate(&self) -> Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("weights.sequence", w.sequence),
            ("weights.keyword_overlap", w.keyword_overlap),
            ("weights.containment_bonus", w.containment_bonus),
            ("weights.token_bonus", w.token_bonus),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be a non-negative number", name)));
            }
        }
        if self.shortlist.multiplier == 0 {
            return Err(Error::Config("shortlist.multiplier must be at least 1".into()));
        }
        Ok(())
    }
}
