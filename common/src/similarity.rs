//! 類似度スコア
//!
//! 正規化済みラベル同士を 0〜100 で採点する。
//!
//! - 編集距離ベースの類似度（strsim の normalized_levenshtein）
//! - キーワード重複率（ストップワード除去後の Jaccard 係数）
//! - 包含ボーナス（一方が他方を含む / 長めのキーワードが相手に含まれる）
//!
//! 正規化後に完全一致なら即座に MAX_SCORE を返す。
//! 包含ボーナスは両方向で判定するため、スコアは常に対称。

use crate::config::MatcherConfig;
use crate::normalizer;
use crate::types::{MAX_SCORE, MIN_SCORE};
use std::collections::{BTreeSet, HashSet};
use strsim::normalized_levenshtein;

/// スコアの内訳
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScoreBreakdown {
    pub sequence: f64,
    pub keyword_overlap: f64,
    pub bonus: f64,
    pub total: f64,
}

/// 設定を保持した採点器
#[derive(Debug, Clone)]
pub struct Scorer {
    config: MatcherConfig,
    stop_words: HashSet<String>,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

impl Scorer {
    pub fn new(config: &MatcherConfig) -> Self {
        let stop_words = config
            .stop_words
            .iter()
            .map(|w| normalizer::normalize_with(w, false))
            .filter(|w| !w.is_empty())
            .collect();
        Self {
            config: config.clone(),
            stop_words,
        }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// 設定に従って正規化
    pub fn normalize(&self, label: &str) -> String {
        normalizer::normalize_with(label, self.config.canonicalize_spelling)
    }

    /// 生のラベル同士を採点
    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.score_normalized(&self.normalize(a), &self.normalize(b))
    }

    /// 正規化済み文字列同士を採点
    pub fn score_normalized(&self, a: &str, b: &str) -> f64 {
        self.breakdown(a, b).total
    }

    /// 内訳付きで採点
    pub fn breakdown(&self, a: &str, b: &str) -> ScoreBreakdown {
        if a.is_empty() || b.is_empty() {
            return ScoreBreakdown::default();
        }
        if a == b {
            return ScoreBreakdown {
                sequence: 1.0,
                keyword_overlap: 1.0,
                bonus: 0.0,
                total: MAX_SCORE,
            };
        }

        let w = &self.config.weights;
        let sequence = sequence_ratio(a, b);
        let keywords_a = self.keywords(a);
        let keywords_b = self.keywords(b);
        let overlap = keyword_overlap(&keywords_a, &keywords_b);

        let bonus = if a.contains(b) || b.contains(a) {
            w.containment_bonus
        } else if self.long_keyword_shared(&keywords_a, b) || self.long_keyword_shared(&keywords_b, a) {
            w.token_bonus
        } else {
            0.0
        };

        let raw = sequence * 100.0 * w.sequence + overlap * 100.0 * w.keyword_overlap + bonus;

        ScoreBreakdown {
            sequence,
            keyword_overlap: overlap,
            bonus,
            total: raw.clamp(MIN_SCORE, MAX_SCORE),
        }
    }

    /// ストップワードと短すぎる語を除いたキーワード集合
    pub fn keywords<'a>(&self, normalized: &'a str) -> HashSet<&'a str> {
        normalizer::tokens(normalized)
            .filter(|t| t.len() >= self.config.min_keyword_len)
            .filter(|t| !self.stop_words.contains(*t))
            .collect()
    }

    fn long_keyword_shared(&self, keywords: &HashSet<&str>, other: &str) -> bool {
        keywords
            .iter()
            .any(|k| k.len() >= self.config.bonus_token_min_len && other.contains(k))
    }
}

/// 既定設定で採点
pub fn score(a: &str, b: &str) -> f64 {
    lazy_static::lazy_static! {
        static ref DEFAULT_SCORER: Scorer = Scorer::default();
    }
    DEFAULT_SCORER.score(a, b)
}

/// 編集距離ベースの類似度（0-1）
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    normalized_levenshtein(a, b)
}

/// キーワード集合の Jaccard 係数（0-1）
pub fn keyword_overlap(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// トークン集合比（0-100）
///
/// 共通トークンと差分トークンを並べ替えて連結し、最も近い組み合わせの類似度を返す。
/// 一方のトークンがもう一方に全て含まれる場合は 100。
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = normalizer::tokens(a).collect();
    let tokens_b: BTreeSet<&str> = normalizer::tokens(b).collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return MIN_SCORE;
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let diff_ab: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let diff_ba: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    if !intersection.is_empty() && (diff_ab.is_empty() || diff_ba.is_empty()) {
        return MAX_SCORE;
    }

    let sect = intersection.join(" ");
    let combined_ab = join_non_empty(&sect, &diff_ab.join(" "));
    let combined_ba = join_non_empty(&sect, &diff_ba.join(" "));

    let best = [
        sequence_ratio(&sect, &combined_ab),
        sequence_ratio(&sect, &combined_ba),
        sequence_ratio(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .fold(0.0_f64, f64::max);

    (best * 100.0).clamp(MIN_SCORE, MAX_SCORE)
}

fn join_non_empty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{} {}", head, tail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIRS: &[(&str, &str)] = &[
        ("Coffee Shop", "coffee_shop"),
        ("Pizza Restaurant", "pizza_place"),
        ("Pizza Restaurant", "bank"),
        ("Movie Theatre", "Arts and Entertainment > Movie Theater"),
        ("Dentist", "Dentist's Office"),
        ("car_wash", "Car Wash & Detailing"),
        ("", "x"),
        ("bar", "barber_shop"),
        ("the and of", "a an"),
    ];

    #[test]
    fn test_identical_normalized_is_max() {
        assert_eq!(score("Coffee Shop", "coffee_shop"), MAX_SCORE);
        assert_eq!(score("Café", "cafe"), MAX_SCORE);
        assert_eq!(score("Shopping Centre", "shopping-center"), MAX_SCORE);
    }

    #[test]
    fn test_empty_is_min() {
        assert_eq!(score("", "x"), MIN_SCORE);
        assert_eq!(score("x", ""), MIN_SCORE);
        assert_eq!(score("", ""), MIN_SCORE);
        assert_eq!(score("!!!", "bank"), MIN_SCORE);
    }

    #[test]
    fn test_bounded() {
        for (a, b) in PAIRS {
            let s = score(a, b);
            assert!((MIN_SCORE..=MAX_SCORE).contains(&s), "{} vs {} = {}", a, b, s);
        }
    }

    #[test]
    fn test_symmetric() {
        for (a, b) in PAIRS {
            assert_eq!(score(a, b), score(b, a), "asymmetric for {} / {}", a, b);
        }
    }

    #[test]
    fn test_related_beats_unrelated() {
        let pizza_place = score("Pizza Restaurant", "pizza_place");
        let bank = score("Pizza Restaurant", "bank");
        assert!(pizza_place > 30.0 && pizza_place < MAX_SCORE, "pizza_place = {}", pizza_place);
        assert!(bank < pizza_place);
    }

    #[test]
    fn test_containment_bonus() {
        let scorer = Scorer::default();
        let full = scorer.breakdown("movie theater", "arts and entertainment movie theater");
        assert_eq!(full.bonus, scorer.config().weights.containment_bonus);

        let partial = scorer.breakdown("pizza restaurant", "pizza place");
        assert_eq!(partial.bonus, scorer.config().weights.token_bonus);

        let none = scorer.breakdown("bank", "pizza place");
        assert_eq!(none.bonus, 0.0);
    }

    #[test]
    fn test_stop_words_not_keywords() {
        let scorer = Scorer::default();
        let keywords = scorer.keywords("bed and breakfast of the town");
        assert!(keywords.contains("bed"));
        assert!(keywords.contains("breakfast"));
        assert!(!keywords.contains("and"));
        assert!(!keywords.contains("the"));
        assert!(!keywords.contains("of"));
    }

    #[test]
    fn test_keyword_overlap_jaccard() {
        let a: HashSet<&str> = ["pizza", "restaurant"].into_iter().collect();
        let b: HashSet<&str> = ["pizza", "place"].into_iter().collect();
        assert!((keyword_overlap(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(keyword_overlap(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_token_set_ratio() {
        assert_eq!(token_set_ratio("coffee shop", "shop coffee"), MAX_SCORE);
        assert_eq!(token_set_ratio("coffee", "coffee shop"), MAX_SCORE);
        assert_eq!(token_set_ratio("", "coffee"), MIN_SCORE);
        let partial = token_set_ratio("pizza restaurant", "pizza place");
        assert!(partial > 0.0 && partial < MAX_SCORE);
        assert_eq!(
            token_set_ratio("pizza restaurant", "pizza place"),
            token_set_ratio("pizza place", "pizza restaurant")
        );
    }

    #[test]
    fn test_custom_weights() {
        let mut config = MatcherConfig::default();
        config.weights.containment_bonus = 0.0;
        config.weights.token_bonus = 0.0;
        config.weights.keyword_overlap = 0.0;
        config.weights.sequence = 1.0;
        let scorer = Scorer::new(&config);
        let s = scorer.score("kitten", "sitting");
        let expected = normalized_levenshtein("kitten", "sitting") * 100.0;
        assert!((s - expected).abs() < 1e-9);
    }
}
