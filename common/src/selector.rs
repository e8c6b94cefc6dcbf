//! 最適候補の選択
//!
//! 照合元ごとに照合先を1件選ぶ。以下の順で処理する。
//!
//! 1. 手動マッピング（スコア100）
//! 2. 意味グループ内の照合（グループは表の順、照合元は入力順）
//! 3. 全体照合（残りの照合元を入力順に）
//! 4. 残りは対応なし
//!
//! 照合元に大分類があれば、2と3の候補群を `scope::BucketScope` の範囲に限定する。
//! 範囲内に候補が残らない場合、2は飛ばし、3は全体から選ぶ。
//!
//! 重複排除が有効な場合、一度選ばれた照合先は以降の照合元の候補から外れる。
//! 選ばれた状態は `ClaimSet` で明示的に受け渡す。

use crate::config::MatcherConfig;
use crate::normalizer::normalize;
use crate::overrides::ManualOverrides;
use crate::review::ReviewPolicy;
use crate::scope::{scope_for, BucketScope};
use crate::semantic::{assign_group, SEMANTIC_GROUPS};
use crate::shortlist::{shortlist, ShortlistText};
use crate::similarity::Scorer;
use crate::types::{CategoryLabel, MatchCandidate, MatchMethod, MatchResult, MAX_SCORE};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// 選択オプション
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOptions {
    /// 主候補を含めて保持する候補数
    pub top_n: usize,
    /// 主候補として採用する最低スコア
    pub min_score: f64,
    pub dedupe_targets: bool,
    pub use_semantic_groups: bool,
    pub use_shortlist: bool,
    /// 照合元の大分類で照合先を絞り込む
    pub use_bucket_scope: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            top_n: 3,
            min_score: 30.0,
            dedupe_targets: true,
            use_semantic_groups: true,
            use_shortlist: true,
            use_bucket_scope: true,
        }
    }
}

/// 選択済みの照合先（照合先リスト内の位置）
#[derive(Debug, Clone, Default)]
pub struct ClaimSet {
    claimed: HashSet<usize>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self, target_index: usize) -> bool {
        self.claimed.contains(&target_index)
    }

    /// 登録する。既に登録済みなら false
    pub fn claim(&mut self, target_index: usize) -> bool {
        self.claimed.insert(target_index)
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// 照合用に前処理したラベル
#[derive(Debug, Clone)]
struct Prepared {
    full: String,
    leaf: String,
    group: Option<&'static str>,
    top_level: String,
    secondary: String,
    scope: Option<&'static BucketScope>,
}

impl ShortlistText for Prepared {
    fn full_text(&self) -> &str {
        &self.full
    }

    fn leaf_text(&self) -> &str {
        &self.leaf
    }
}

/// 照合器
#[derive(Debug, Clone)]
pub struct Matcher<'a> {
    scorer: Scorer,
    overrides: Option<&'a ManualOverrides>,
    policy: ReviewPolicy,
}

impl Default for Matcher<'_> {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

impl<'a> Matcher<'a> {
    pub fn new(config: &MatcherConfig) -> Self {
        Self {
            scorer: Scorer::new(config),
            overrides: None,
            policy: ReviewPolicy::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: &'a ManualOverrides) -> Self {
        self.overrides = Some(overrides);
        self
    }

    pub fn with_policy(mut self, policy: ReviewPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn policy(&self) -> &ReviewPolicy {
        &self.policy
    }

    fn prepare(&self, label: &CategoryLabel) -> Prepared {
        let full = self.scorer.normalize(&label.label);
        let leaf = self.scorer.normalize(&label.leaf);
        let group = assign_group(&full).map(|g| g.tag);
        let top_level = label.path.first().map(|s| normalize(s)).unwrap_or_default();
        let secondary = label.secondary().map(normalize).unwrap_or_default();
        let scope = label.bucket.as_deref().and_then(scope_for);
        Prepared {
            full,
            leaf,
            group,
            top_level,
            secondary,
            scope,
        }
    }

    /// 全体・最下層の組み合わせで最も高いスコア
    fn pair_score(&self, source: &Prepared, target: &Prepared) -> f64 {
        let mut best = self.scorer.score_normalized(&source.full, &target.full);
        for (s, t) in [
            (&source.full, &target.leaf),
            (&source.leaf, &target.full),
            (&source.leaf, &target.leaf),
        ] {
            if s.is_empty() || t.is_empty() || (s == &source.full && t == &target.full) {
                continue;
            }
            best = best.max(self.scorer.score_normalized(s, t));
        }
        best
    }

    /// ラベル同士のスコア（全体・最下層の組み合わせの最大）
    pub fn score_labels(&self, source: &CategoryLabel, target: &CategoryLabel) -> f64 {
        self.pair_score(&self.prepare(source), &self.prepare(target))
    }

    /// 照合を実行。結果は照合元の入力順
    pub fn run(
        &self,
        sources: &[CategoryLabel],
        targets: &[CategoryLabel],
        options: &SelectOptions,
    ) -> Vec<MatchResult> {
        let prepared_sources: Vec<Prepared> = sources.iter().map(|s| self.prepare(s)).collect();
        let prepared_targets: Vec<Prepared> = targets.iter().map(|t| self.prepare(t)).collect();
        let mut slots: Vec<Option<MatchResult>> = vec![None; sources.len()];
        let mut claims = ClaimSet::new();

        let ctx = PassContext {
            sources,
            targets,
            prepared_sources: &prepared_sources,
            prepared_targets: &prepared_targets,
            options,
        };

        if let Some(overrides) = self.overrides {
            self.manual_pass(&ctx, overrides, &mut slots, &mut claims);
        }

        if options.use_semantic_groups {
            self.semantic_pass(&ctx, &mut slots, &mut claims);
        }

        let all_targets: Vec<usize> = (0..targets.len()).collect();
        let mut direct = 0;
        for i in 0..sources.len() {
            if slots[i].is_some() || prepared_sources[i].full.is_empty() {
                continue;
            }
            let pool = match self.scoped_pool(&ctx, i, &all_targets) {
                Some(scoped) if scoped.iter().any(|&t| ctx.is_eligible(t, &claims)) => scoped,
                Some(_) => {
                    debug!("scope empty, matching globally: {}", sources[i].label);
                    all_targets.clone()
                }
                None => all_targets.clone(),
            };
            if let Some(result) = self.select_one(&ctx, i, &pool, &mut claims, MatchMethod::Automatic)
            {
                slots[i] = Some(result);
                direct += 1;
            }
        }
        debug!("direct pass: {} matched", direct);

        let mut results: Vec<MatchResult> = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    let mut result = MatchResult::unmatched(sources[i].clone());
                    result.semantic_group = prepared_sources[i].group.map(str::to_string);
                    result
                })
            })
            .collect();

        self.policy.apply(&mut results);
        results
    }

    fn manual_pass(
        &self,
        ctx: &PassContext<'_>,
        overrides: &ManualOverrides,
        slots: &mut [Option<MatchResult>],
        claims: &mut ClaimSet,
    ) {
        let mut by_id: HashMap<&str, usize> = HashMap::new();
        for (index, target) in ctx.targets.iter().enumerate() {
            by_id.entry(target.id.trim()).or_insert(index);
        }

        let mut matched = 0;
        for (i, source) in ctx.sources.iter().enumerate() {
            if ctx.prepared_sources[i].full.is_empty() {
                continue;
            }
            let Some(target_id) = overrides.lookup(source) else {
                continue;
            };
            let Some(&target_index) = by_id.get(target_id.trim()) else {
                debug!("override target not found: {} -> {}", source.label, target_id);
                continue;
            };
            if ctx.options.dedupe_targets && !claims.claim(target_index) {
                debug!("override target already claimed: {} -> {}", source.label, target_id);
                continue;
            }

            let primary = MatchCandidate {
                target: ctx.targets[target_index].clone(),
                target_index,
                score: MAX_SCORE,
                method: MatchMethod::Manual,
            };
            slots[i] = Some(MatchResult {
                source: source.clone(),
                primary: Some(primary),
                alternates: Vec::new(),
                method: MatchMethod::Manual,
                semantic_group: ctx.prepared_sources[i].group.map(str::to_string),
                needs_review: false,
            });
            matched += 1;
        }
        debug!("manual pass: {} matched", matched);
    }

    fn semantic_pass(
        &self,
        ctx: &PassContext<'_>,
        slots: &mut [Option<MatchResult>],
        claims: &mut ClaimSet,
    ) {
        for group in SEMANTIC_GROUPS {
            let pool: Vec<usize> = ctx
                .prepared_targets
                .iter()
                .enumerate()
                .filter(|(_, t)| t.group == Some(group.tag))
                .map(|(index, _)| index)
                .collect();
            if pool.is_empty() {
                continue;
            }

            let mut matched = 0;
            for i in 0..ctx.sources.len() {
                let source = &ctx.prepared_sources[i];
                if slots[i].is_some() || source.full.is_empty() || source.group != Some(group.tag) {
                    continue;
                }
                let scoped = self.scoped_pool(ctx, i, &pool);
                let candidates = scoped.as_deref().unwrap_or(&pool[..]);
                if !candidates.iter().any(|&t| ctx.is_eligible(t, claims)) {
                    continue;
                }
                if let Some(result) =
                    self.select_one(ctx, i, candidates, claims, MatchMethod::SemanticGroup)
                {
                    slots[i] = Some(result);
                    matched += 1;
                }
            }
            debug!(
                "semantic pass [{}]: {} targets, {} matched",
                group.tag,
                pool.len(),
                matched
            );
        }
    }

    /// 照合元の大分類で候補群を限定（大分類がないか無効なら None）
    fn scoped_pool(&self, ctx: &PassContext<'_>, source_index: usize, pool: &[usize]) -> Option<Vec<usize>> {
        if !ctx.options.use_bucket_scope {
            return None;
        }
        let scope = ctx.prepared_sources[source_index].scope?;
        let targets = ctx.prepared_targets;
        // 絞り込み（宿泊など）は照合先全体に対して判定する
        let all: Vec<usize> = (0..targets.len()).collect();
        let in_scope: HashSet<usize> = scope
            .restrict(&all, move |t| {
                (targets[t].top_level.as_str(), targets[t].secondary.as_str())
            })
            .into_iter()
            .collect();
        Some(pool.iter().copied().filter(|t| in_scope.contains(t)).collect())
    }

    /// 候補群から主候補と次点候補を選ぶ
    fn select_one(
        &self,
        ctx: &PassContext<'_>,
        source_index: usize,
        pool: &[usize],
        claims: &mut ClaimSet,
        method: MatchMethod,
    ) -> Option<MatchResult> {
        let options = ctx.options;
        let source = &ctx.prepared_sources[source_index];

        let eligible: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&t| ctx.is_eligible(t, claims))
            .collect();
        if eligible.is_empty() {
            return None;
        }

        let shortlist_config = &self.scorer.config().shortlist;
        let candidates: Vec<usize> = if options.use_shortlist && shortlist_config.enabled {
            let texts: Vec<&Prepared> = eligible.iter().map(|&t| &ctx.prepared_targets[t]).collect();
            let k = shortlist_config.size_for(options.top_n);
            shortlist(&source.full, &source.leaf, &texts, k)
                .into_iter()
                .map(|j| eligible[j])
                .collect()
        } else {
            eligible
        };

        let mut scored: Vec<(usize, f64)> = candidates
            .into_iter()
            .map(|t| (t, self.pair_score(source, &ctx.prepared_targets[t])))
            .collect();
        // 安定ソート: 同点は照合先の入力順
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let &(best_index, best_score) = scored.first()?;
        if best_score < options.min_score {
            return None;
        }
        if options.dedupe_targets {
            claims.claim(best_index);
        }

        let candidate = |(index, score): (usize, f64)| MatchCandidate {
            target: ctx.targets[index].clone(),
            target_index: index,
            score,
            method,
        };
        let alternates: Vec<MatchCandidate> = scored
            .iter()
            .skip(1)
            .filter(|(_, score)| *score > 0.0)
            .take(options.top_n.saturating_sub(1))
            .map(|&pair| candidate(pair))
            .collect();

        Some(MatchResult {
            source: ctx.sources[source_index].clone(),
            primary: Some(candidate((best_index, best_score))),
            alternates,
            method,
            semantic_group: source.group.map(str::to_string),
            needs_review: false,
        })
    }
}

struct PassContext<'r> {
    sources: &'r [CategoryLabel],
    targets: &'r [CategoryLabel],
    prepared_sources: &'r [Prepared],
    prepared_targets: &'r [Prepared],
    options: &'r SelectOptions,
}

impl PassContext<'_> {
    /// 未選択（重複排除時）かつ空でない照合先
    fn is_eligible(&self, target_index: usize, claims: &ClaimSet) -> bool {
        !(self.options.dedupe_targets && claims.is_claimed(target_index))
            && !self.prepared_targets[target_index].full.is_empty()
    }
}

/// 既定設定で照合
pub fn select_matches(
    sources: &[CategoryLabel],
    targets: &[CategoryLabel],
    options: &SelectOptions,
) -> Vec<MatchResult> {
    Matcher::default().run(sources, targets, options)
}
