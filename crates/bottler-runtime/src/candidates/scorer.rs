//! Executable enumeration and ranking.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bottler_core::scoring::{is_excluded_dir, is_excluded_name, rank_candidates};
use bottler_core::{
    CandidateFacts, ExeCandidate, ProvisionError, ProvisionResult, StatusTracker, folder_hint,
    score_candidate,
};
use tracing::debug;
use walkdir::WalkDir;

use super::metadata::MetadataProbe;
use crate::registry::EnvironmentRegistry;

/// An `.exe` that survived the directory and name filters.
#[derive(Debug, Clone)]
struct FoundExe {
    path: PathBuf,
    size: u64,
    mtime: f64,
}

#[derive(Debug, Default)]
struct WalkResult {
    found: Vec<FoundExe>,
    total_exes: usize,
    skipped_dirs: usize,
    skipped_names: usize,
}

fn epoch_secs(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn relative_lossy(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn is_exe(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exe"))
}

/// Walk `root`, pruning excluded directories and names.
fn walk_executables(root: &Path) -> WalkResult {
    let mut result = WalkResult::default();
    let mut skipped_dirs = 0;
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            let keep = !is_excluded_dir(&relative_lossy(entry.path(), root));
            if !keep {
                skipped_dirs += 1;
            }
            keep
        });

    for entry in walker {
        let Ok(entry) = entry else { continue };
        if !entry.file_type().is_file() || !is_exe(entry.path()) {
            continue;
        }
        result.total_exes += 1;

        let stem = entry
            .path()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if is_excluded_name(&stem) {
            debug!(path = %entry.path().display(), "Skipping excluded executable name");
            result.skipped_names += 1;
            continue;
        }

        let Ok(meta) = entry.metadata() else { continue };
        result.found.push(FoundExe {
            path: entry.path().to_path_buf(),
            size: meta.len(),
            mtime: meta.modified().map(epoch_secs).unwrap_or_default(),
        });
    }
    result.skipped_dirs = skipped_dirs;
    result
}

/// Enumerates executables in an environment and ranks them.
pub struct CandidateScorer {
    registry: Arc<EnvironmentRegistry>,
    metadata: MetadataProbe,
    tracker: Arc<StatusTracker>,
}

impl CandidateScorer {
    pub const fn new(
        registry: Arc<EnvironmentRegistry>,
        metadata: MetadataProbe,
        tracker: Arc<StatusTracker>,
    ) -> Self {
        Self {
            registry,
            metadata,
            tracker,
        }
    }

    /// Search root for an optional sub-directory of `drive_c`.
    fn search_root(&self, environment: &str, subpath: Option<&str>) -> PathBuf {
        let drive_c = self.registry.drive_c(environment);
        match subpath.filter(|s| !s.trim().is_empty()) {
            Some(sub) => {
                let scoped = drive_c.join(sub);
                if scoped.is_dir() {
                    scoped
                } else {
                    self.tracker.log(
                        environment,
                        format!("[WARN] Subpath '{sub}' does not exist. Scanning full prefix."),
                    );
                    self.registry.prefix(environment)
                }
            }
            None => drive_c,
        }
    }

    /// Enumerate, score and rank executables. A missing prefix yields an
    /// empty list.
    pub async fn enumerate(
        &self,
        environment: &str,
        subpath: Option<&str>,
        top_n: usize,
    ) -> ProvisionResult<Vec<ExeCandidate>> {
        let prefix = self.registry.prefix(environment);
        if !prefix.is_dir() {
            self.tracker
                .log(environment, format!("Prefix does not exist: {}", prefix.display()));
            return Ok(Vec::new());
        }

        let root = self.search_root(environment, subpath);
        self.tracker
            .log(environment, format!("Scanning for executables in: {}", root.display()));

        let walk_root = root.clone();
        let walk = tokio::task::spawn_blocking(move || walk_executables(&walk_root))
            .await
            .map_err(|e| ProvisionError::ToolFailure(format!("executable walk aborted: {e}")))?;

        let hint = folder_hint(subpath, environment);
        let now = epoch_secs(SystemTime::now());
        let mut candidates = Vec::with_capacity(walk.found.len());
        for exe in walk.found {
            let meta = self.metadata.probe(&exe.path).await;
            let facts = CandidateFacts {
                relative_path: relative_lossy(&exe.path, &prefix),
                product_name: meta.product_name.clone(),
                size: exe.size,
                mtime: exe.mtime,
            };
            let score = score_candidate(&facts, &hint, now);
            candidates.push(ExeCandidate {
                path: exe.path.to_string_lossy().into_owned(),
                product_name: meta.product_name,
                file_version: meta.file_version,
                size: exe.size,
                mtime: exe.mtime,
                score: score.score,
                sim_name: score.sim_name,
                sim_prod: score.sim_prod,
            });
        }

        let ranked = rank_candidates(candidates, top_n);
        self.tracker.log(
            environment,
            format!(
                "Found {} executables ({} excluded by name, {} directories skipped), kept top {}",
                walk.total_exes,
                walk.skipped_names,
                walk.skipped_dirs,
                ranked.len()
            ),
        );
        Ok(ranked)
    }
}
