// Core algorithm exports
pub mod breeds;
pub mod distance;
pub mod matcher;
pub mod normalize;
pub mod scoring;

pub use breeds::{canonical_breed_key, BreedRow, BreedTable, BreedTableError};
pub use distance::{distance, PreparedQuery};
pub use matcher::{rank, rank_candidates, Matcher, RankedMatches};
pub use normalize::{AttributeScale, RangeError, RangeModel};
pub use scoring::{distance_to_score, max_distance, MAX_RESULTS};
