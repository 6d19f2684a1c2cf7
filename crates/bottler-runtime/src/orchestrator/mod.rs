//! Provisioning Orchestrator.
//!
//! Composes the registry, resolver, scorer, media manager and environment
//! operations into three background workflows plus two synchronous queries.
//! Workflow starts return immediately; progress is reported through the
//! [`StatusTracker`].

mod supervisor;
mod workflows;

use std::path::PathBuf;
use std::sync::Arc;

use bottler_core::ports::ToolRunner;
use bottler_core::{
    DependencyReport, ExeCandidate, ProvisionResult, ProvisionSettings, StatusTracker, Toolchain,
};
use tracing::info;

pub use supervisor::WorkflowSupervisor;
pub use workflows::{FinalizeRequest, Provisioner};

use crate::candidates::{CandidateScorer, MetadataProbe};
use crate::deps::DependencyResolver;
use crate::media::MediaMounter;
use crate::ops::EnvironmentOps;
use crate::registry::{EnvironmentRegistry, validate_environment_name};

/// Workflow names used in `[FATAL]` status lines.
pub const FULL_INSTALL: &str = "full_install";
pub const FOLDER_IMPORT: &str = "folder_import";
pub const FINALIZE: &str = "finalize";

/// Entry point for every provisioning request.
pub struct Orchestrator {
    provisioner: Arc<Provisioner>,
    registry: Arc<EnvironmentRegistry>,
    supervisor: WorkflowSupervisor,
}

impl Orchestrator {
    pub fn new(
        settings: ProvisionSettings,
        toolchain: Toolchain,
        runner: Arc<dyn ToolRunner>,
        tracker: Arc<StatusTracker>,
    ) -> Self {
        let timeouts = settings.timeouts;
        let registry = Arc::new(EnvironmentRegistry::new(toolchain, &settings.prefix_base));

        let resolver =
            DependencyResolver::new(Arc::clone(&registry), Arc::clone(&runner), timeouts);
        let probe = MetadataProbe::new(
            registry.toolchain().winedump.clone(),
            Arc::clone(&runner),
            timeouts.metadata_dump,
        );
        let scorer = CandidateScorer::new(Arc::clone(&registry), probe, Arc::clone(&tracker));
        let media = MediaMounter::new(
            Arc::clone(&registry),
            Arc::clone(&runner),
            &settings.media_dir,
            timeouts.archiver,
        );
        let ops = EnvironmentOps::new(
            Arc::clone(&registry),
            runner,
            Arc::clone(&tracker),
            timeouts,
        );

        info!(
            prefix_base = %settings.prefix_base.display(),
            variant = ?registry.variant(),
            "Orchestrator ready"
        );

        Self {
            provisioner: Arc::new(Provisioner {
                settings,
                tracker: Arc::clone(&tracker),
                resolver,
                scorer,
                media,
                ops,
            }),
            registry,
            supervisor: WorkflowSupervisor::new(tracker),
        }
    }

    pub fn tracker(&self) -> &Arc<StatusTracker> {
        &self.provisioner.tracker
    }

    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &ProvisionSettings {
        &self.provisioner.settings
    }

    /// True while a workflow for `environment` is in flight.
    pub fn is_busy(&self, environment: &str) -> bool {
        self.supervisor.is_active(environment)
    }

    /// Wait for the in-flight workflow of `environment`, if any.
    pub async fn wait(&self, environment: &str) {
        self.supervisor.wait(environment).await;
    }

    /// Start the full install workflow for a program or disk image.
    pub fn start_full_install(
        &self,
        environment: &str,
        program: impl Into<PathBuf>,
    ) -> ProvisionResult<()> {
        validate_environment_name(environment)?;
        let program = program.into();
        let provisioner = Arc::clone(&self.provisioner);
        let env = environment.to_string();
        self.supervisor.spawn(environment, FULL_INSTALL, async move {
            provisioner.full_install(&env, &program).await
        })
    }

    /// Start the folder import workflow.
    pub fn start_folder_import(
        &self,
        environment: &str,
        folder: impl Into<PathBuf>,
    ) -> ProvisionResult<()> {
        validate_environment_name(environment)?;
        let folder = folder.into();
        let provisioner = Arc::clone(&self.provisioner);
        let env = environment.to_string();
        self.supervisor.spawn(environment, FOLDER_IMPORT, async move {
            provisioner.folder_import(&env, &folder).await
        })
    }

    /// Start the finalize workflow for a chosen executable.
    pub fn start_finalize(&self, request: FinalizeRequest) -> ProvisionResult<()> {
        validate_environment_name(&request.environment)?;
        let provisioner = Arc::clone(&self.provisioner);
        let environment = request.environment.clone();
        self.supervisor.spawn(&environment, FINALIZE, async move {
            provisioner.finalize(&request).await
        })
    }

    /// Dependency scan without installing anything.
    pub async fn analyze(&self, program: impl Into<PathBuf>) -> DependencyReport {
        self.provisioner.analyze(&program.into()).await
    }

    /// Cached candidates or a fresh enumeration.
    pub async fn candidates(
        &self,
        environment: &str,
        top_n: Option<usize>,
    ) -> ProvisionResult<Vec<ExeCandidate>> {
        validate_environment_name(environment)?;
        self.provisioner.candidates(environment, top_n).await
    }
}
