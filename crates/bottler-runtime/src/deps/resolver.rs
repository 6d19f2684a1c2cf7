//! Static and dynamic dependency discovery.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use bottler_core::ports::{ToolInvocation, ToolRunner};
use bottler_core::{DependencyReport, ProvisionError, ProvisionResult, ScanMode, ToolTimeouts};
use tracing::{debug, info, warn};

use super::parse::{parse_import_table, parse_trace};
use crate::registry::EnvironmentRegistry;

/// Variables set for a traced run: module-load tracing plus software
/// rendering so the program starts headless.
pub const TRACE_ENV: &[(&str, &str)] = &[
    ("WINEDEBUG", "+loaddll"),
    ("LIBGL_ALWAYS_SOFTWARE", "1"),
    ("GALLIUM_DRIVER", "llvmpipe"),
    ("MESA_GL_VERSION_OVERRIDE", "3.3"),
];

/// Discovers the components a Windows executable needs.
pub struct DependencyResolver {
    registry: Arc<EnvironmentRegistry>,
    runner: Arc<dyn ToolRunner>,
    timeouts: ToolTimeouts,
}

fn ensure_file(program: &Path) -> ProvisionResult<()> {
    if program.is_file() {
        Ok(())
    } else {
        Err(ProvisionError::NotFound(program.display().to_string()))
    }
}

impl DependencyResolver {
    pub fn new(
        registry: Arc<EnvironmentRegistry>,
        runner: Arc<dyn ToolRunner>,
        timeouts: ToolTimeouts,
    ) -> Self {
        Self {
            registry,
            runner,
            timeouts,
        }
    }

    /// Read declared imports without executing the program.
    pub async fn scan_static(&self, program: &Path) -> ProvisionResult<DependencyReport> {
        ensure_file(program)?;
        let invocation = ToolInvocation::new(
            &self.registry.toolchain().winedump,
            [
                "-j".to_string(),
                "import".to_string(),
                program.to_string_lossy().into_owned(),
            ],
            self.timeouts.static_dump,
        );
        let output = self.runner.run(invocation).await?;
        if output.timed_out {
            return Err(ProvisionError::Timeout(format!(
                "winedump on {}",
                program.display()
            )));
        }
        if !output.success() {
            return Err(ProvisionError::ToolFailure(format!(
                "winedump failed: {}",
                output.stderr_excerpt(200)
            )));
        }

        let dlls = parse_import_table(&output.stdout);
        let report = DependencyReport::from_dlls(ScanMode::Static, dlls, BTreeSet::new());
        debug!(
            program = %program.display(),
            dependencies = report.dependencies.len(),
            "Static scan complete"
        );
        Ok(report)
    }

    /// Run the program inside `environment` with module-load tracing.
    ///
    /// The program is killed when the trace timeout expires; whatever was
    /// traced until then is parsed. A timeout is not a failure.
    pub async fn scan_dynamic(
        &self,
        program: &Path,
        environment: &str,
    ) -> ProvisionResult<DependencyReport> {
        ensure_file(program)?;
        let (key, value) = self.registry.wine_env(environment);
        let invocation = TRACE_ENV.iter().fold(
            ToolInvocation::new(
                &self.registry.toolchain().wine,
                [program.to_string_lossy().into_owned()],
                self.timeouts.trace,
            )
            .with_env(key, value),
            |inv, (k, v)| inv.with_env(*k, *v),
        );
        let output = self.runner.run(invocation).await?;

        let trace = parse_trace(&output.stderr);
        let report = DependencyReport::from_dlls(ScanMode::Dynamic, trace.all(), trace.failed);
        debug!(
            program = %program.display(),
            timed_out = output.timed_out,
            dependencies = report.dependencies.len(),
            missing = report.missing_dlls.len(),
            "Dynamic scan complete"
        );
        Ok(report)
    }

    /// Static scan first, dynamic fallback when it fails or maps nothing.
    ///
    /// Never errors: failures become a report with `success == false`.
    pub async fn scan(&self, program: &Path, environment: &str) -> DependencyReport {
        match self.scan_static(program).await {
            Ok(report) if !report.is_empty() => report,
            first => {
                if let Err(e) = &first {
                    info!(program = %program.display(), error = %e, "Static scan failed, tracing instead");
                }
                match self.scan_dynamic(program, environment).await {
                    Ok(report) => report,
                    Err(e) => {
                        warn!(program = %program.display(), error = %e, "Dynamic scan failed");
                        first.unwrap_or_else(|_| DependencyReport::failed(ScanMode::Dynamic, e.to_string()))
                    }
                }
            }
        }
    }

    /// Dynamic scan first, static fallback. Used for disk-image installers
    /// whose imports rarely name what the installed program needs.
    pub async fn scan_preferring_dynamic(
        &self,
        program: &Path,
        environment: &str,
    ) -> DependencyReport {
        match self.scan_dynamic(program, environment).await {
            Ok(report) if !report.is_empty() => report,
            first => match self.scan_static(program).await {
                Ok(report) => report,
                Err(e) => first.unwrap_or_else(|_| DependencyReport::failed(ScanMode::Static, e.to_string())),
            },
        }
    }
}
