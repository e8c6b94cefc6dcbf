//! 候補の絞り込み
//!
//! 照合先が多い場合、軽いスコア（token_set_ratio）で上位 K 件だけを残し、
//! その K 件だけを複合スコアで再採点する。
//! K は `ShortlistConfig::size_for(top_n)` で決まる。

use crate::similarity::token_set_ratio;

/// 正規化済みの全体ラベルと最下層ラベル
pub trait ShortlistText {
    fn full_text(&self) -> &str;
    fn leaf_text(&self) -> &str;
}

/// 軽量スコア（全体・最下層の高い方）
pub fn cheap_score(query_full: &str, query_leaf: &str, candidate: &impl ShortlistText) -> f64 {
    let mut best = token_set_ratio(query_full, candidate.full_text());
    for (q, c) in [
        (query_full, candidate.leaf_text()),
        (query_leaf, candidate.full_text()),
        (query_leaf, candidate.leaf_text()),
    ] {
        if q.is_empty() || c.is_empty() {
            continue;
        }
        best = best.max(token_set_ratio(q, c));
    }
    best
}

/// 上位 K 件の位置（`pool` 内のインデックス）を返す
///
/// 同点は入力順。`pool.len() <= k` の場合は全件をそのまま返す。
pub fn shortlist<T: ShortlistText>(
    query_full: &str,
    query_leaf: &str,
    pool: &[&T],
    k: usize,
) -> Vec<usize> {
    if pool.len() <= k {
        return (0..pool.len()).collect();
    }

    let mut scored: Vec<(usize, f64)> = pool
        .iter()
        .enumerate()
        .map(|(i, c)| (i, cheap_score(query_full, query_leaf, *c)))
        .collect();

    // sort_by は安定ソートなので同点は入力順のまま
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);

    let mut kept: Vec<usize> = scored.into_iter().map(|(i, _)| i).collect();
    kept.sort_unstable();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Text(&'static str, &'static str);

    impl ShortlistText for Text {
        fn full_text(&self) -> &str {
            self.0
        }
        fn leaf_text(&self) -> &str {
            self.1
        }
    }

    #[test]
    fn test_small_pool_kept_whole() {
        let items = [Text("bank", "bank"), Text("pizza place", "pizza place")];
        let pool: Vec<&Text> = items.iter().collect();
        assert_eq!(shortlist("pizza", "pizza", &pool, 5), vec![0, 1]);
    }

    #[test]
    fn test_keeps_best_cheap_scores() {
        let items = [
            Text("bank", "bank"),
            Text("dining pizza place", "pizza place"),
            Text("atm", "atm"),
            Text("coffee shop", "coffee shop"),
            Text("pizza delivery", "pizza delivery"),
        ];
        let pool: Vec<&Text> = items.iter().collect();
        let kept = shortlist("pizza restaurant", "pizza restaurant", &pool, 2);
        assert_eq!(kept.len(), 2);
        assert!(kept.contains(&1));
        assert!(kept.contains(&4));
    }

    #[test]
    fn test_leaf_counts_in_cheap_score() {
        let item = Text("retail clothing store shoe store", "shoe store");
        let score = cheap_score("shoe store", "shoe store", &item);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn test_ties_follow_input_order() {
        let items = [
            Text("zoo", "zoo"),
            Text("bank", "bank"),
            Text("atm", "atm"),
        ];
        let pool: Vec<&Text> = items.iter().collect();
        // 共通する文字がない → 全て0点で同点
        let kept = shortlist("qqq", "qqq", &pool, 2);
        assert_eq!(kept, vec![0, 1]);
    }
}
