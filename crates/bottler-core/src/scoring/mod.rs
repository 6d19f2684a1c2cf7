//! Candidate scoring policy.
//!
//! Pure functions only; the runtime crate supplies file facts and metadata.

mod heuristics;
mod similarity;

pub use heuristics::{
    BIN_DIR_HINTS, BONUS_BIN_DIR, BONUS_HUGE, BONUS_LARGE, BONUS_RECENT, BONUS_SEMI_RECENT,
    CandidateFacts, EXCLUDED_DIR_MARKERS, EXCLUDED_NAME_KEYWORDS, HUGE_FILE_BYTES,
    LARGE_FILE_BYTES, RECENT_DAYS, SEMI_RECENT_DAYS, ScoreBreakdown, WEIGHT_NAME, WEIGHT_PRODUCT,
    folder_hint, is_excluded_dir, is_excluded_name, normalize_hint, rank_candidates,
    score_candidate,
};
pub use similarity::similarity;
