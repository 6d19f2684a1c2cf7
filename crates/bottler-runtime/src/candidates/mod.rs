//! Candidate Scorer.
//!
//! Walks an environment for executables, reads their version metadata and
//! ranks them with the scoring policy from `bottler-core`.

mod metadata;
mod scorer;

pub use metadata::{
    MetadataProbe, PeMetadata, STRING_SCAN_LIMIT, mine_strings, parse_version_fields,
    pick_product_string,
};
pub use scorer::CandidateScorer;
