//! POI Taxonomy Common Library
//!
//! カテゴリ照合の型・正規化・採点・選択ロジック

pub mod config;
pub mod error;
pub mod export;
pub mod flatten;
pub mod mapping;
pub mod normalizer;
pub mod overrides;
pub mod review;
pub mod scope;
pub mod selector;
pub mod semantic;
pub mod shortlist;
pub mod similarity;
pub mod types;

pub use config::{MatcherConfig, ScoreWeights, ShortlistConfig};
pub use error::{Error, Result};
pub use flatten::{bucket_counts, simplify};
pub use mapping::MappingRow;
pub use normalizer::normalize;
pub use overrides::ManualOverrides;
pub use review::ReviewPolicy;
pub use scope::{scope_for, BucketScope};
pub use selector::{select_matches, ClaimSet, Matcher, SelectOptions};
pub use semantic::assign_group;
pub use similarity::{score, Scorer};
pub use types::{
    CategoryLabel, MatchCandidate, MatchMethod, MatchQuality, MatchResult, TaxonomySource,
    MAX_SCORE, MIN_SCORE,
};
