//! 意味グループ
//!
//! 照合前にラベルを大まかなグループに振り分け、同じグループ内で先に照合する。
//! 表の順に判定し、最初に当てはまったグループを採用する。

use crate::normalizer;

/// 意味グループの定義
#[derive(Debug, Clone, Copy)]
pub struct SemanticGroup {
    pub tag: &'static str,
    pub keywords: &'static [&'static str],
    pub exclusions: &'static [&'static str],
}

impl SemanticGroup {
    /// 正規化済みテキストがこのグループに当てはまるか
    pub fn matches(&self, normalized: &str) -> bool {
        let tokens: Vec<&str> = normalizer::tokens(normalized).collect();
        let hit = |word: &&str| tokens.iter().any(|t| token_matches(t, word));
        self.keywords.iter().any(hit) && !self.exclusions.iter().any(hit)
    }
}

/// 単数・複数（s / es）の違いは同一視する
fn token_matches(token: &str, keyword: &str) -> bool {
    match token.strip_prefix(keyword) {
        Some("") | Some("s") | Some("es") => true,
        _ => false,
    }
}

pub const SEMANTIC_GROUPS: &[SemanticGroup] = &[
    SemanticGroup {
        tag: "food_dining",
        keywords: &[
            "restaurant", "cafe", "bar", "food", "dining", "bakery", "diner", "eatery", "bistro",
            "grill", "kitchen", "cuisine", "pizza", "burger", "sandwich", "coffee", "tea",
            "brewery", "pub", "tavern", "steakhouse",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "retail_shopping",
        keywords: &[
            "store", "shop", "retail", "market", "boutique", "mall", "outlet", "vendor", "dealer",
            "supplier", "wholesaler", "shopping",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "healthcare_medical",
        keywords: &[
            "hospital", "clinic", "medical", "doctor", "dentist", "pharmacy", "health",
            "physician", "surgeon", "therapy", "treatment", "care",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "entertainment_recreation",
        keywords: &[
            "entertainment", "recreation", "sports", "fitness", "gym", "park", "theater",
            "cinema", "museum", "club", "center", "venue", "stadium",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "services_professional",
        keywords: &[
            "service", "agency", "office", "professional", "consulting", "repair", "maintenance",
            "cleaning", "legal", "financial",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "transportation",
        keywords: &[
            "transport", "station", "airport", "parking", "rental", "taxi", "bus", "train",
            "subway", "ferry", "automotive", "gas",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "accommodation_lodging",
        keywords: &[
            "hotel", "motel", "lodge", "inn", "resort", "accommodation", "hostel", "bed",
            "breakfast",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "education_institutions",
        keywords: &[
            "school", "university", "college", "education", "academy", "institute", "learning",
            "training", "library",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "government_public",
        keywords: &[
            "government", "public", "municipal", "federal", "state", "city", "hall", "office",
            "department", "agency", "court",
        ],
        exclusions: &[],
    },
    SemanticGroup {
        tag: "religious_spiritual",
        keywords: &[
            "church", "temple", "mosque", "synagogue", "religious", "spiritual", "cathedral",
            "chapel", "worship",
        ],
        exclusions: &[],
    },
];

/// 正規化済みテキストのグループを判定
pub fn assign_group(normalized: &str) -> Option<&'static SemanticGroup> {
    assign_group_in(SEMANTIC_GROUPS, normalized)
}

/// 指定した表でグループを判定
pub fn assign_group_in<'a>(groups: &'a [SemanticGroup], normalized: &str) -> Option<&'a SemanticGroup> {
    if normalized.is_empty() {
        return None;
    }
    groups.iter().find(|g| g.matches(normalized))
}

/// グループ名からグループを検索
pub fn group_by_tag(tag: &str) -> Option<&'static SemanticGroup> {
    SEMANTIC_GROUPS.iter().find(|g| g.tag == tag)
}
