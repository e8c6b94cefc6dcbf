//! 要確認フラグの判定

use crate::types::MatchResult;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REVIEW_THRESHOLD: f64 = 80.0;

/// スコアが閾値未満なら要確認（閾値ちょうどは確認不要）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReviewPolicy {
    pub threshold: f64,
}

impl Default for ReviewPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_REVIEW_THRESHOLD,
        }
    }
}

impl ReviewPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn needs_review(&self, score: f64) -> bool {
        score < self.threshold
    }

    /// 結果全件にフラグを付ける（対応なしはスコア0として扱う）
    pub fn apply(&self, results: &mut [MatchResult]) {
        for result in results.iter_mut() {
            result.needs_review = self.needs_review(result.score());
        }
    }
}
