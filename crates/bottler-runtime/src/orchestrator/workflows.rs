//! Workflow bodies.
//!
//! Each body runs inside a supervised task and returns the first fatal
//! error; soft failures are only logged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bottler_core::{
    DependencyReport, ExeCandidate, ProvisionError, ProvisionResult, ProvisionSettings,
    StatusTracker,
};

use tracing::debug;

use crate::candidates::CandidateScorer;
use crate::deps::DependencyResolver;
use crate::media::{MediaMounter, is_disk_image};
use crate::ops::EnvironmentOps;

/// Candidate finalize parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeRequest {
    pub environment: String,
    pub exe_path: String,
    pub create_shortcut: bool,
    pub create_environment: bool,
}

/// Components shared by every workflow.
pub struct Provisioner {
    pub(crate) settings: ProvisionSettings,
    pub(crate) tracker: Arc<StatusTracker>,
    pub(crate) resolver: DependencyResolver,
    pub(crate) scorer: CandidateScorer,
    pub(crate) media: MediaMounter,
    pub(crate) ops: EnvironmentOps,
}

fn file_name_lower(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_lowercase())
}

impl Provisioner {
    /// Log a scan result and install what it found.
    async fn install_detected(&self, environment: &str, report: &DependencyReport) {
        if !report.success {
            self.tracker.log(
                environment,
                format!(
                    "[WARN] Dependency scan failed: {}",
                    report.error.as_deref().unwrap_or("unknown error")
                ),
            );
            return;
        }
        let list: Vec<&str> = report.dependencies.iter().map(String::as_str).collect();
        self.tracker.log(
            environment,
            format!(
                "Detected {} dependencies ({} scan): {}",
                list.len(),
                match report.mode {
                    bottler_core::ScanMode::Static => "static",
                    bottler_core::ScanMode::Dynamic => "dynamic",
                },
                list.join(", ")
            ),
        );
        if !report.missing_dlls.is_empty() {
            let missing: Vec<&str> = report.missing_dlls.iter().map(String::as_str).collect();
            self.tracker
                .log(environment, format!("Missing DLLs: {}", missing.join(", ")));
        }
        self.ops.install_all(environment, &report.dependencies).await;
    }

    /// Re-enumerate candidates within the recorded scope and cache them.
    pub(crate) async fn refresh_candidates(
        &self,
        environment: &str,
    ) -> ProvisionResult<Vec<ExeCandidate>> {
        let subpath = self.tracker.subpath(environment);
        let candidates = self
            .scorer
            .enumerate(environment, subpath.as_deref(), self.settings.top_n)
            .await?;
        match candidates.first() {
            Some(top) => self.tracker.log(
                environment,
                format!("Top candidate: {} (score {})", top.path, top.score),
            ),
            None => self.tracker.log(environment, "No executable candidates found"),
        }
        self.tracker.set_candidates(environment, candidates.clone());
        Ok(candidates)
    }

    /// Create the environment if needed, install dependencies for a program
    /// or disk image, run it and re-enumerate candidates.
    pub async fn full_install(&self, environment: &str, program: &Path) -> ProvisionResult<()> {
        self.tracker
            .log(environment, format!("Full install started: {}", program.display()));
        self.ops.ensure(environment).await?;

        if is_disk_image(program) {
            let mount = self.media.mount(program, None).await?;
            self.tracker.log(
                environment,
                format!("Extracted disk image to {}", mount.root().display()),
            );
            let Some(setup) = mount.find_setup() else {
                self.tracker
                    .log(environment, "[ERROR] No setup executable found on disk image");
                mount.close()?;
                return Err(ProvisionError::NotFound(format!(
                    "setup executable in {}",
                    program.display()
                )));
            };
            self.tracker
                .log(environment, format!("Found installer: {}", setup.display()));

            let report = self.resolver.scan_preferring_dynamic(&setup, environment).await;
            self.install_detected(environment, &report).await;
            self.ops.run_program(environment, &setup).await?;
            self.ops.wait_idle(environment).await;
            mount.close()?;
        } else {
            if !program.is_file() {
                return Err(ProvisionError::NotFound(program.display().to_string()));
            }
            let staged = self.ops.stage_program(environment, program).await?;
            let report = self.resolver.scan(&staged, environment).await;
            self.install_detected(environment, &report).await;
            self.ops.run_program(environment, &staged).await?;
            self.ops.wait_idle(environment).await;
        }

        self.refresh_candidates(environment).await?;
        self.tracker.log(environment, "Full install finished");
        Ok(())
    }

    /// Copy a host folder into the environment and rank its executables.
    pub async fn folder_import(&self, environment: &str, folder: &Path) -> ProvisionResult<()> {
        self.tracker
            .log(environment, format!("Folder import started: {}", folder.display()));
        if !folder.is_dir() {
            return Err(ProvisionError::NotFound(folder.display().to_string()));
        }
        self.ops.ensure(environment).await?;
        let subdir = self.ops.import_folder(environment, folder).await?;
        self.tracker.set_subpath(environment, Some(subdir.clone()));
        self.tracker
            .log(environment, format!("Search scope set to: {subdir}"));
        self.refresh_candidates(environment).await?;
        self.tracker.log(environment, "Folder import finished");
        Ok(())
    }

    /// Resolve a chosen executable, literally or by file name against the
    /// cached candidates.
    pub fn resolve_executable(&self, environment: &str, exe_path: &str) -> ProvisionResult<PathBuf> {
        let literal = PathBuf::from(exe_path);
        if literal.is_file() {
            return Ok(literal);
        }
        let wanted = file_name_lower(&literal)
            .ok_or_else(|| ProvisionError::NotFound(exe_path.to_string()))?;
        self.tracker
            .cached_candidates(environment)
            .unwrap_or_default()
            .into_iter()
            .map(|c| PathBuf::from(c.path))
            .find(|p| file_name_lower(p).as_deref() == Some(wanted.as_str()))
            .ok_or_else(|| ProvisionError::NotFound(exe_path.to_string()))
    }

    /// Install dependencies for a chosen executable and optionally register
    /// a shortcut for it.
    pub async fn finalize(&self, request: &FinalizeRequest) -> ProvisionResult<()> {
        let environment = request.environment.as_str();
        self.tracker
            .log(environment, format!("Finalizing: {}", request.exe_path));
        let exe = self.resolve_executable(environment, &request.exe_path)?;
        if exe.to_string_lossy() != request.exe_path {
            self.tracker
                .log(environment, format!("Resolved to cached candidate: {}", exe.display()));
        }

        if request.create_environment {
            self.ops.ensure(environment).await?;
        }

        let report = self.resolver.scan(&exe, environment).await;
        self.install_detected(environment, &report).await;

        if request.create_shortcut {
            self.ops.create_shortcut(environment, &exe).await?;
        }
        self.tracker.log(environment, "Finalize finished");
        Ok(())
    }

    /// Synchronous dry-run scan in the scratch environment.
    pub async fn analyze(&self, program: &Path) -> DependencyReport {
        self.resolver
            .scan(program, &self.settings.analysis_environment)
            .await
    }

    /// Cached candidates, or a fresh scoped enumeration stored in the cache.
    ///
    /// The cache holds at least `settings.top_n` entries; `top_n` only trims
    /// the returned list. An environment without a prefix is left untouched.
    pub async fn candidates(
        &self,
        environment: &str,
        top_n: Option<usize>,
    ) -> ProvisionResult<Vec<ExeCandidate>> {
        let top_n = top_n.unwrap_or(self.settings.top_n);
        if let Some(cached) = self.tracker.cached_candidates(environment) {
            return Ok(cached.into_iter().take(top_n).collect());
        }
        if !self.ops.registry().exists(environment) {
            debug!(environment, "Candidates requested for missing prefix");
            return Ok(Vec::new());
        }
        let subpath = self.tracker.subpath(environment);
        let fresh = self
            .scorer
            .enumerate(environment, subpath.as_deref(), top_n.max(self.settings.top_n))
            .await?;
        self.tracker.set_candidates(environment, fresh.clone());
        Ok(fresh.into_iter().take(top_n).collect())
    }
}
