//! 大分類による照合先の範囲
//!
//! 照合元に平坦化済みの大分類（`flatten::simplify` の結果）があれば、
//! 照合先をその大分類に対応する最上位カテゴリに限定する。
//! 表の値は正規化済みの文字列で持つ。

use crate::normalizer::normalize;

/// 大分類ごとの照合先の範囲
#[derive(Debug, Clone, Copy)]
pub struct BucketScope {
    pub bucket: &'static str,
    /// 許可する照合先の最上位セグメント
    pub top_levels: &'static [&'static str],
    /// さらに絞り込む (最上位, 2番目) の組。該当する照合先がなければ絞り込まない
    pub narrow_to: &'static [(&'static str, &'static str)],
}

impl BucketScope {
    pub fn allows(&self, top_level: &str) -> bool {
        self.top_levels.contains(&top_level)
    }

    pub fn narrows(&self, top_level: &str, secondary: &str) -> bool {
        self.narrow_to
            .iter()
            .any(|(top, second)| *top == top_level && *second == secondary)
    }

    /// 範囲内の位置だけを残す
    ///
    /// `locate` は照合先の位置から正規化済みの (最上位, 2番目) を返す。
    pub fn restrict<'t, F>(&self, pool: &[usize], locate: F) -> Vec<usize>
    where
        F: Fn(usize) -> (&'t str, &'t str),
    {
        let allowed: Vec<usize> = pool
            .iter()
            .copied()
            .filter(|&t| self.allows(locate(t).0))
            .collect();
        if self.narrow_to.is_empty() {
            return allowed;
        }
        let narrowed: Vec<usize> = allowed
            .iter()
            .copied()
            .filter(|&t| {
                let (top, second) = locate(t);
                self.narrows(top, second)
            })
            .collect();
        if narrowed.is_empty() {
            allowed
        } else {
            narrowed
        }
    }
}

const BUSINESS: &str = "business and professional services";
const COMMUNITY: &str = "community and government";
const DINING: &str = "dining and drinking";
const HEALTH: &str = "health and medicine";
const LANDMARKS: &str = "landmarks and outdoors";
const ARTS: &str = "arts and entertainment";
const SPORTS: &str = "sports and recreation";
const TRAVEL: &str = "travel and transportation";
const RETAIL: &str = "retail";
const EVENT: &str = "event";

/// 「Other Services」は範囲なし（全体から照合）
pub const BUCKET_SCOPES: &[BucketScope] = &[
    BucketScope { bucket: "Food & Dining", top_levels: &[DINING], narrow_to: &[] },
    BucketScope { bucket: "Healthcare & Medical", top_levels: &[HEALTH], narrow_to: &[] },
    BucketScope { bucket: "Retail & Shopping", top_levels: &[RETAIL], narrow_to: &[] },
    BucketScope { bucket: "Automotive", top_levels: &[BUSINESS, RETAIL, TRAVEL], narrow_to: &[] },
    BucketScope { bucket: "Beauty & Wellness", top_levels: &[BUSINESS, HEALTH], narrow_to: &[] },
    BucketScope { bucket: "Sports & Recreation", top_levels: &[SPORTS, ARTS], narrow_to: &[] },
    BucketScope { bucket: "Arts & Entertainment", top_levels: &[ARTS, SPORTS], narrow_to: &[] },
    BucketScope { bucket: "Education", top_levels: &[COMMUNITY], narrow_to: &[] },
    BucketScope {
        bucket: "Accommodation & Lodging",
        top_levels: &[TRAVEL, COMMUNITY, LANDMARKS],
        narrow_to: &[
            (TRAVEL, "lodging"),
            (TRAVEL, "rv park"),
            (COMMUNITY, "housing authority"),
            (COMMUNITY, "residential building"),
            (COMMUNITY, "housing development"),
            (COMMUNITY, "organization"),
            (LANDMARKS, "campground"),
        ],
    },
    BucketScope { bucket: "Professional Services", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Financial Services", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Real Estate", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Construction & Contractors", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Home & Garden Services", top_levels: &[BUSINESS, RETAIL], narrow_to: &[] },
    BucketScope { bucket: "Government & Public Services", top_levels: &[COMMUNITY], narrow_to: &[] },
    BucketScope { bucket: "Utilities & Infrastructure", top_levels: &[BUSINESS, COMMUNITY], narrow_to: &[] },
    BucketScope { bucket: "Religious & Spiritual", top_levels: &[COMMUNITY], narrow_to: &[] },
    BucketScope { bucket: "Transportation", top_levels: &[TRAVEL], narrow_to: &[] },
    BucketScope { bucket: "Tourism & Attractions", top_levels: &[ARTS, LANDMARKS, TRAVEL], narrow_to: &[] },
    BucketScope { bucket: "Parks & Natural Features", top_levels: &[LANDMARKS], narrow_to: &[] },
    BucketScope { bucket: "Agriculture & Farming", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Manufacturing & Industrial", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Media & Communications", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Technology & IT", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Event Services", top_levels: &[BUSINESS, EVENT], narrow_to: &[] },
    BucketScope { bucket: "Pet Services", top_levels: &[BUSINESS, RETAIL], narrow_to: &[] },
    BucketScope { bucket: "Personal Services", top_levels: &[BUSINESS], narrow_to: &[] },
    BucketScope { bucket: "Community & Social Services", top_levels: &[COMMUNITY], narrow_to: &[] },
    BucketScope { bucket: "Business-to-Business", top_levels: &[BUSINESS], narrow_to: &[] },
];

/// 大分類名から範囲を検索（大文字小文字・記号の違いは無視）
pub fn scope_for(bucket: &str) -> Option<&'static BucketScope> {
    let key = normalize(bucket);
    if key.is_empty() {
        return None;
    }
    match key.as_str() {
        "b2b" | "b2b services" => return scope_for("Business-to-Business"),
        _ => {}
    }
    BUCKET_SCOPES.iter().find(|s| normalize(s.bucket) == key)
}
