//! Heuristic ranking of executable candidates.
//!
//! The weights are policy constants. Changing any of them changes which
//! executable gets launched for existing users.

use std::cmp::Ordering;
use std::path::Path;

use crate::domain::ExeCandidate;

use super::similarity::similarity;

/// Weight of the folder-hint / file-name similarity.
pub const WEIGHT_NAME: f64 = 40.0;
/// Weight of the folder-hint / product-name similarity.
pub const WEIGHT_PRODUCT: f64 = 30.0;
/// Bonus when the executable sits in a binary output directory.
pub const BONUS_BIN_DIR: u32 = 10;
/// Bonus for files larger than [`LARGE_FILE_BYTES`].
pub const BONUS_LARGE: u32 = 6;
/// Additional bonus for files larger than [`HUGE_FILE_BYTES`].
pub const BONUS_HUGE: u32 = 4;
/// Bonus for files modified within [`RECENT_DAYS`].
pub const BONUS_RECENT: u32 = 3;
/// Bonus for files modified within [`SEMI_RECENT_DAYS`].
pub const BONUS_SEMI_RECENT: u32 = 1;

pub const LARGE_FILE_BYTES: u64 = 2 * 1024 * 1024;
pub const HUGE_FILE_BYTES: u64 = 20 * 1024 * 1024;
pub const RECENT_DAYS: f64 = 30.0;
pub const SEMI_RECENT_DAYS: f64 = 180.0;

/// Directory-name fragments that mark binary output folders.
pub const BIN_DIR_HINTS: &[&str] = &["bin", "binaries", "win64", "win32", "program files"];

/// Directory-path fragments that are never searched.
pub const EXCLUDED_DIR_MARKERS: &[&str] = &[
    "windows",
    "system32",
    "syswow64",
    "temp_installer",
    "installer",
];

/// File-stem fragments that disqualify an executable.
pub const EXCLUDED_NAME_KEYWORDS: &[&str] = &[
    "uninstall",
    "crash",
    "report",
    "update",
    "patch",
    "readme",
    "vcredist",
    "directx",
    "setup",
    "inst",
    "uninst",
];

const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// Observable facts about one executable.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFacts {
    /// Path relative to the environment root, e.g. `drive_c/Game/bin/game.exe`.
    pub relative_path: String,
    pub product_name: String,
    pub size: u64,
    /// Modification time in seconds since the Unix epoch.
    pub mtime: f64,
}

/// Score plus the similarity components used for tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub score: u32,
    /// Rounded to three decimals.
    pub sim_name: f64,
    /// Rounded to three decimals.
    pub sim_prod: f64,
}

/// Lower-case and strip spaces, hyphens and underscores.
pub fn normalize_hint(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folder hint used as the similarity reference.
///
/// The last component of the caller's sub-directory wins; otherwise the
/// environment name is used.
pub fn folder_hint(subpath: Option<&str>, environment: &str) -> String {
    let source = subpath
        .filter(|s| !s.trim().is_empty())
        .and_then(|s| Path::new(s.trim_end_matches('/')).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or(environment);
    normalize_hint(source)
}

fn squash(raw: &str) -> String {
    raw.to_lowercase().replace(' ', "")
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// File stem of a path without the extension.
fn stem_of(path: &str) -> &str {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
}

/// True when a directory path (relative to the search root) must be skipped.
pub fn is_excluded_dir(relative_dir: &str) -> bool {
    let lower = relative_dir.to_lowercase();
    EXCLUDED_DIR_MARKERS.iter().any(|m| lower.contains(m))
}

/// True when a file stem carries a disqualifying keyword.
pub fn is_excluded_name(stem: &str) -> bool {
    let lower = stem.to_lowercase();
    EXCLUDED_NAME_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Score one candidate. Pure: same inputs, same score.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn score_candidate(facts: &CandidateFacts, folder_hint: &str, now: f64) -> ScoreBreakdown {
    let sim_name = similarity(folder_hint, &squash(stem_of(&facts.relative_path)));
    let product = facts.product_name.trim();
    let sim_prod = if product.is_empty() {
        0.0
    } else {
        similarity(folder_hint, &squash(product))
    };

    let mut score = (sim_name * WEIGHT_NAME) as u32 + (sim_prod * WEIGHT_PRODUCT) as u32;

    let dir = Path::new(&facts.relative_path)
        .parent()
        .map(|p| p.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if BIN_DIR_HINTS.iter().any(|h| dir.contains(h)) {
        score += BONUS_BIN_DIR;
    }

    if facts.size > LARGE_FILE_BYTES {
        score += BONUS_LARGE;
    }
    if facts.size > HUGE_FILE_BYTES {
        score += BONUS_HUGE;
    }

    let age_days = (now - facts.mtime) / SECONDS_PER_DAY;
    if age_days < RECENT_DAYS {
        score += BONUS_RECENT;
    } else if age_days < SEMI_RECENT_DAYS {
        score += BONUS_SEMI_RECENT;
    }

    ScoreBreakdown {
        score,
        sim_name: round3(sim_name),
        sim_prod: round3(sim_prod),
    }
}

/// Sort descending by (score, `sim_prod`, `sim_name`, mtime) and keep `top_n`.
pub fn rank_candidates(mut candidates: Vec<ExeCandidate>, top_n: usize) -> Vec<ExeCandidate> {
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.sim_prod.total_cmp(&a.sim_prod))
            .then_with(|| b.sim_name.total_cmp(&a.sim_name))
            .then_with(|| b.mtime.partial_cmp(&a.mtime).unwrap_or(Ordering::Equal))
    });
    candidates.truncate(top_n);
    candidates
}
