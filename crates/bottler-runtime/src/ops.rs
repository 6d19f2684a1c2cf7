//! Environment operations driven through the Bottles toolchain.
//!
//! Every step is mirrored into the status tracker. Tool failures are logged
//! and returned; callers decide whether a step is fatal.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bottler_core::paths::relative_to_prefix;
use bottler_core::ports::{ToolInvocation, ToolOutput, ToolRunner};
use bottler_core::{
    DRIVE_C, InstallRoute, InstallVariant, ProvisionError, ProvisionResult, StatusTracker,
    ToolTimeouts, install_route,
};
use serde::Serialize;
use tracing::warn;
use walkdir::WalkDir;

use crate::registry::EnvironmentRegistry;

/// Environment template passed to `bottles-cli new`.
pub const ENVIRONMENT_TEMPLATE: &str = "gaming";

/// Installer output that counts as success despite a non-zero exit.
const ALREADY_INSTALLED: &str = "already installed";

/// Library descriptor the Flatpak Bottles GUI reads.
#[derive(Debug, Serialize)]
struct LibraryDescriptor<'a> {
    name: &'a str,
    path: String,
    environment: &'a str,
    runner: &'a str,
    dxvk: bool,
    vkd3d: bool,
    dxvk_nvapi: bool,
    arch: &'a str,
}

/// Outcome of installing a component set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallSummary {
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}

/// Replace spaces so the directory name survives shell-less tooling.
pub fn sanitize_dir_name(name: &str) -> String {
    name.trim().replace(' ', "_")
}

/// Recursively copy `src` into `dst`, recreating symlinks.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(io::Error::other)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(rel);
        let kind = entry.file_type();
        if kind.is_dir() {
            fs::create_dir_all(&target)?;
        } else if kind.is_symlink() {
            let link = fs::read_link(entry.path())?;
            #[cfg(unix)]
            std::os::unix::fs::symlink(&link, &target)?;
            #[cfg(not(unix))]
            fs::copy(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Canonical forms of `path` and `root`, or both as given when either one
/// cannot be resolved.
fn resolve_pair(path: &Path, root: &Path) -> (PathBuf, PathBuf) {
    match (path.canonicalize(), root.canonicalize()) {
        (Ok(p), Ok(r)) => (p, r),
        _ => (path.to_path_buf(), root.to_path_buf()),
    }
}

/// True when `path` lies inside `root`, resolving symlinks when possible.
pub fn is_contained(path: &Path, root: &Path) -> bool {
    let (path, root) = resolve_pair(path, root);
    relative_to_prefix(&path, &root).is_ok()
}

/// Shortcut target: path relative to the prefix without `drive_c/`.
pub fn shortcut_target(exe: &Path, prefix: &Path) -> ProvisionResult<String> {
    let rel = relative_to_prefix(exe, prefix)
        .map_err(|_| ProvisionError::PathViolation(exe.display().to_string()))?;
    let rel = rel.strip_prefix(DRIVE_C).unwrap_or(&rel);
    Ok(rel.to_string_lossy().into_owned())
}

/// Environment-level operations: create, install, run, copy, shortcut.
pub struct EnvironmentOps {
    registry: Arc<EnvironmentRegistry>,
    runner: Arc<dyn ToolRunner>,
    tracker: Arc<StatusTracker>,
    timeouts: ToolTimeouts,
}

impl EnvironmentOps {
    pub fn new(
        registry: Arc<EnvironmentRegistry>,
        runner: Arc<dyn ToolRunner>,
        tracker: Arc<StatusTracker>,
        timeouts: ToolTimeouts,
    ) -> Self {
        Self {
            registry,
            runner,
            tracker,
            timeouts,
        }
    }

    pub fn registry(&self) -> &EnvironmentRegistry {
        &self.registry
    }

    async fn run_cli<I, S>(
        &self,
        args: I,
        timeout: std::time::Duration,
    ) -> ProvisionResult<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let invocation = ToolInvocation::new(&self.registry.toolchain().bottles_cli, args, timeout);
        self.runner.run(invocation).await
    }

    /// Create a new environment, register it with the GUI library and
    /// repair the fresh prefix.
    pub async fn create(&self, name: &str) -> ProvisionResult<()> {
        self.tracker.log(name, format!("Creating environment: {name}"));
        let output = self
            .run_cli(
                ["new", "--bottle-name", name, "--environment", ENVIRONMENT_TEMPLATE],
                self.timeouts.create,
            )
            .await
            .inspect_err(|e| self.tracker.log(name, format!("[ERROR] create_environment: {e}")))?;

        if output.timed_out {
            self.tracker.log(
                name,
                format!(
                    "[ERROR] create_environment: Command timed out after {} seconds",
                    self.timeouts.create.as_secs()
                ),
            );
            return Err(ProvisionError::Timeout(format!("creating environment {name}")));
        }
        if !output.success() {
            let excerpt = output.stderr_excerpt(200);
            self.tracker
                .log(name, format!("[ERROR] create_environment: {excerpt}"));
            return Err(ProvisionError::ToolFailure(format!(
                "bottles-cli new failed: {excerpt}"
            )));
        }

        if self.registry.variant() == InstallVariant::Flatpak {
            if let Err(e) = self.register_library(name).await {
                warn!(environment = %name, error = %e, "Library registration failed");
                self.tracker
                    .log(name, format!("[WARN] library registration failed: {e}"));
            }
        }
        self.repair(name).await;
        self.tracker.log(name, format!("Environment ready: {name}"));
        Ok(())
    }

    /// Create the environment unless its prefix already exists.
    pub async fn ensure(&self, name: &str) -> ProvisionResult<()> {
        if self.registry.exists(name) {
            self.tracker.log(name, format!("Using existing environment: {name}"));
            return Ok(());
        }
        self.create(name).await
    }

    /// Write the GUI library descriptor unless one exists.
    async fn register_library(&self, name: &str) -> ProvisionResult<()> {
        let Some(path) = self.registry.library_descriptor(name) else {
            return Ok(());
        };
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }
        let descriptor = LibraryDescriptor {
            name,
            path: self.registry.prefix(name).to_string_lossy().into_owned(),
            environment: ENVIRONMENT_TEMPLATE,
            runner: "soda-7.0-9",
            dxvk: true,
            vkd3d: false,
            dxvk_nvapi: false,
            arch: "win64",
        };
        let json = serde_json::to_string_pretty(&descriptor)
            .map_err(|e| ProvisionError::ToolFailure(e.to_string()))?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, json).await?;
        self.tracker
            .log(name, format!("Registered in library: {}", path.display()));
        Ok(())
    }

    /// `wineboot --repair` on a fresh prefix. Failures are only logged.
    pub async fn repair(&self, name: &str) {
        let (key, value) = self.registry.wine_env(name);
        let invocation = ToolInvocation::new(
            &self.registry.toolchain().wine,
            ["wineboot", "--repair"],
            self.timeouts.repair,
        )
        .with_env(key, value);
        match self.runner.run(invocation).await {
            Ok(out) if out.success() => {}
            Ok(out) => warn!(environment = %name, stderr = %out.stderr_excerpt(200), "wineboot --repair failed"),
            Err(e) => warn!(environment = %name, error = %e, "wineboot --repair failed"),
        }
    }

    /// Install one component through its routed installer.
    pub async fn install_component(&self, name: &str, component: &str) -> bool {
        self.tracker
            .log(name, format!("install_component: {component} -> {name}"));
        let toolchain = self.registry.toolchain();
        let (key, value) = self.registry.wine_env(name);
        let invocation = match install_route(component) {
            InstallRoute::EnvironmentCli => ToolInvocation::new(
                &toolchain.bottles_cli,
                ["add", "-b", name, "-n", component, "-p", "dummy"],
                self.timeouts.install,
            ),
            InstallRoute::DependencyInstaller => {
                ToolInvocation::new(&toolchain.winetricks, [component], self.timeouts.install)
            }
        }
        .with_env(key, value);

        match self.runner.run(invocation).await {
            Ok(out) if out.success() || out.stdout.contains(ALREADY_INSTALLED) => {
                self.tracker.log(name, format!("  ✓ {component}"));
                true
            }
            Ok(out) => {
                let detail = if out.timed_out {
                    format!("timed out after {}s", self.timeouts.install.as_secs())
                } else {
                    out.stderr_excerpt(200)
                };
                self.tracker
                    .log(name, format!("  ✗ {component} – {detail}"));
                false
            }
            Err(e) => {
                self.tracker
                    .log(name, format!("[ERROR] install_component: {e}"));
                false
            }
        }
    }

    /// Install every component, in sorted order.
    pub async fn install_all(&self, name: &str, components: &BTreeSet<String>) -> InstallSummary {
        let mut summary = InstallSummary::default();
        if components.is_empty() {
            self.tracker.log(name, "No dependencies to install");
            return summary;
        }
        for component in components {
            if self.install_component(name, component).await {
                summary.installed.push(component.clone());
            } else {
                summary.failed.push(component.clone());
            }
        }
        self.tracker.log(
            name,
            format!(
                "Installed {}/{} dependencies",
                summary.installed.len(),
                components.len()
            ),
        );
        summary
    }

    /// Run a program inside the environment and wait for it to return.
    pub async fn run_program(&self, name: &str, program: &Path) -> ProvisionResult<()> {
        let args = vec![
            "run".to_string(),
            "--bottle".to_string(),
            name.to_string(),
            program.to_string_lossy().into_owned(),
        ];
        self.tracker.log(
            name,
            format!(
                "Running {} via: {} {}",
                program.display(),
                self.registry.toolchain().bottles_cli.join(" "),
                args.join(" ")
            ),
        );
        let output = self.run_cli(args, self.timeouts.run).await?;
        if output.timed_out {
            self.tracker.log(
                name,
                format!(
                    "[WARN] {} still running after {}s, stopped",
                    program.display(),
                    self.timeouts.run.as_secs()
                ),
            );
        } else if !output.success() {
            self.tracker.log(
                name,
                format!("[WARN] {} exited with {:?}", program.display(), output.exit_code),
            );
        }
        Ok(())
    }

    /// Block until the environment's server process is idle.
    pub async fn wait_idle(&self, name: &str) -> bool {
        let (key, value) = self.registry.wine_env(name);
        for _ in 0..self.timeouts.idle_attempts {
            let invocation = ToolInvocation::new(
                &self.registry.toolchain().wineserver,
                ["--wait"],
                self.timeouts.idle_wait,
            )
            .with_env(key.clone(), value.clone());
            match self.runner.run(invocation).await {
                Ok(out) if out.timed_out => {}
                Ok(_) => return true,
                Err(e) => {
                    self.tracker
                        .log(name, format!("[WARN] wineserver --wait failed: {e}"));
                    return false;
                }
            }
        }
        self.tracker.log(name, "[WARN] wineserver --wait timeout");
        false
    }

    /// Copy a single executable into `drive_c/<stem>/` unless it already
    /// lives in the prefix. Returns the path to use inside the environment.
    pub async fn stage_program(&self, name: &str, program: &Path) -> ProvisionResult<PathBuf> {
        let prefix = self.registry.prefix(name);
        if is_contained(program, &prefix) {
            return Ok(program.to_path_buf());
        }
        let stem = program
            .file_stem()
            .map(|s| sanitize_dir_name(&s.to_string_lossy()))
            .unwrap_or_else(|| "program".to_string());
        let file_name = program
            .file_name()
            .ok_or_else(|| ProvisionError::InvalidRequest(program.display().to_string()))?;
        let target_dir = self.registry.drive_c(name).join(stem);
        tokio::fs::create_dir_all(&target_dir).await?;
        let target = target_dir.join(file_name);
        tokio::fs::copy(program, &target).await?;
        self.tracker.log(
            name,
            format!("Copied {} -> {}", program.display(), target.display()),
        );
        Ok(target)
    }

    /// Copy a host directory into `drive_c/<sanitized name>`, replacing any
    /// previous copy. Returns the sub-directory name.
    pub async fn import_folder(&self, name: &str, source: &Path) -> ProvisionResult<String> {
        if !source.is_dir() {
            return Err(ProvisionError::NotFound(source.display().to_string()));
        }
        let dir_name = source
            .file_name()
            .map(|n| sanitize_dir_name(&n.to_string_lossy()))
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ProvisionError::InvalidRequest(source.display().to_string()))?;
        let target = self.registry.drive_c(name).join(&dir_name);

        let src = source.to_path_buf();
        let dst = target.clone();
        let copied = tokio::task::spawn_blocking(move || -> io::Result<u64> {
            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            if dst.exists() {
                fs::remove_dir_all(&dst)?;
            }
            copy_tree(&src, &dst)
        })
        .await
        .map_err(|e| ProvisionError::ToolFailure(format!("folder copy aborted: {e}")))?
        .inspect_err(|e| self.tracker.log(name, format!("[ERROR] copy_folder: {e}")))?;

        self.tracker.log(
            name,
            format!(
                "Copied {} -> {} ({copied} files)",
                source.display(),
                target.display()
            ),
        );
        Ok(dir_name)
    }

    /// Register a launcher entry for an executable inside the prefix.
    pub async fn create_shortcut(&self, name: &str, exe: &Path) -> ProvisionResult<()> {
        let (resolved, prefix) = resolve_pair(exe, &self.registry.prefix(name));
        let Ok(target) = shortcut_target(&resolved, &prefix) else {
            self.tracker
                .log(name, format!("[ERROR] Executable not inside environment: {}", exe.display()));
            return Err(ProvisionError::PathViolation(exe.display().to_string()));
        };
        let stem = exe
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let drive_c = self.registry.drive_c(name);
        self.tracker.log(
            name,
            format!(
                "Creating shortcut in cwd={} with path='{target}'",
                drive_c.display()
            ),
        );

        let (key, value) = self.registry.wine_env(name);
        let invocation = ToolInvocation::new(
            &self.registry.toolchain().bottles_cli,
            ["add", "-b", name, "-n", stem.as_str(), "-p", target.as_str()],
            self.timeouts.shortcut,
        )
        .with_env(key, value)
        .with_cwd(drive_c);
        let output = self.runner.run(invocation).await?;
        if output.success() {
            self.tracker.log(name, format!("Shortcut created: {stem}"));
            Ok(())
        } else {
            let detail = output.stderr_excerpt(200);
            self.tracker
                .log(name, format!("[ERROR] Shortcut failed: {detail}"));
            Err(ProvisionError::ToolFailure(format!("shortcut failed: {detail}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRunner, exit};
    use bottler_core::Toolchain;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ops(base: &Path, runner: ScriptedRunner) -> (EnvironmentOps, Arc<ScriptedRunner>, Arc<StatusTracker>) {
        let runner = Arc::new(runner);
        let tracker = Arc::new(StatusTracker::new());
        let ops = EnvironmentOps::new(
            Arc::new(EnvironmentRegistry::new(Toolchain::native(), base)),
            Arc::clone(&runner) as Arc<dyn ToolRunner>,
            Arc::clone(&tracker),
            ToolTimeouts {
                idle_attempts: 3,
                ..ToolTimeouts::default()
            },
        );
        (ops, runner, tracker)
    }

    #[test]
    fn test_shortcut_target_strips_drive_c() {
        let prefix = Path::new("/b/game");
        assert_eq!(
            shortcut_target(Path::new("/b/game/drive_c/Game/bin/g.exe"), prefix).unwrap(),
            "Game/bin/g.exe"
        );
        assert_eq!(
            shortcut_target(Path::new("/b/game/other/g.exe"), prefix).unwrap(),
            "other/g.exe"
        );
        assert!(matches!(
            shortcut_target(Path::new("/elsewhere/g.exe"), prefix),
            Err(ProvisionError::PathViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_install_routes_components() {
        let tmp = TempDir::new().unwrap();
        let runner = ScriptedRunner::new()
            .reply("winetricks vcrun2019", exit(1, "vcrun2019 already installed, skipping", ""))
            .reply("winetricks d3dx9", exit(1, "", "download failed"));
        let (ops, runner, tracker) = ops(tmp.path(), runner);
        let components: BTreeSet<String> =
            ["dxvk", "vcrun2019", "d3dx9"].iter().map(|s| (*s).to_string()).collect();

        let summary = ops.install_all("game", &components).await;
        assert_eq!(summary.installed, vec!["dxvk", "vcrun2019"]);
        assert_eq!(summary.failed, vec!["d3dx9"]);
        assert_eq!(runner.count("bottles-cli add -b game -n dxvk -p dummy"), 1);
        assert!(runner.calls().iter().all(|c| c.env.iter().any(|(k, _)| k == "WINEPREFIX")));
        let log = tracker.record("game").log;
        assert!(log.iter().any(|l| l.ends_with("✓ dxvk")));
        assert!(log.iter().any(|l| l.contains("✗ d3dx9 – download failed")));
    }

    #[tokio::test]
    async fn test_create_runs_new_then_repair() {
        let tmp = TempDir::new().unwrap();
        let (ops, runner, _) = ops(tmp.path(), ScriptedRunner::new());
        ops.create("game").await.unwrap();
        let lines = runner.lines();
        assert_eq!(lines[0], "bottles-cli new --bottle-name game --environment gaming");
        assert_eq!(lines[1], "wine wineboot --repair");
    }

    #[tokio::test]
    async fn test_create_failure_is_logged() {
        let tmp = TempDir::new().unwrap();
        let (ops, _, tracker) = ops(
            tmp.path(),
            ScriptedRunner::new().reply("bottles-cli new", exit(1, "", "runner missing")),
        );
        let err = ops.create("game").await.unwrap_err();
        assert!(matches!(err, ProvisionError::ToolFailure(_)));
        assert!(tracker.record("game").log.iter().any(|l| l.contains("runner missing")));
    }

    #[tokio::test]
    async fn test_ensure_skips_existing_prefix() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("game")).unwrap();
        let (ops, runner, _) = ops(tmp.path(), ScriptedRunner::new());
        ops.ensure("game").await.unwrap();
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wait_idle_gives_up_after_attempts() {
        let tmp = TempDir::new().unwrap();
        let (ops, runner, tracker) = ops(
            tmp.path(),
            ScriptedRunner::new().reply(
                "wineserver --wait",
                ToolOutput {
                    timed_out: true,
                    ..ToolOutput::default()
                },
            ),
        );
        assert!(!ops.wait_idle("game").await);
        assert_eq!(runner.count("wineserver --wait"), 3);
        assert!(tracker.record("game").log.last().unwrap().contains("wineserver --wait timeout"));
    }

    #[tokio::test]
    async fn test_import_folder_replaces_previous_copy() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src/My Game");
        fs::create_dir_all(src.join("bin")).unwrap();
        fs::write(src.join("bin/game.exe"), b"MZ").unwrap();
        let base = tmp.path().join("bottles");
        let stale = base.join("env/drive_c/My_Game/old.exe");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, b"old").unwrap();

        let (ops, _, _) = ops(&base, ScriptedRunner::new());
        let sub = ops.import_folder("env", &src).await.unwrap();
        assert_eq!(sub, "My_Game");
        assert!(base.join("env/drive_c/My_Game/bin/game.exe").is_file());
        assert!(!stale.exists());
    }

    #[tokio::test]
    async fn test_stage_program_copies_outside_files_only() {
        let tmp = TempDir::new().unwrap();
        let base = tmp.path().join("bottles");
        fs::create_dir_all(base.join("env/drive_c")).unwrap();
        let outside = tmp.path().join("Game Setup.exe");
        fs::write(&outside, b"MZ").unwrap();

        let (ops, _, _) = ops(&base, ScriptedRunner::new());
        let staged = ops.stage_program("env", &outside).await.unwrap();
        assert_eq!(staged, base.join("env/drive_c/Game_Setup/Game Setup.exe"));
        assert!(staged.is_file());
        let again = ops.stage_program("env", &staged).await.unwrap();
        assert_eq!(again, staged);
    }

    #[tokio::test]
    async fn test_shortcut_invocation_and_violation() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("env/drive_c/Game/game.exe");
        fs::create_dir_all(exe.parent().unwrap()).unwrap();
        fs::write(&exe, b"MZ").unwrap();
        let (ops, runner, _) = ops(tmp.path(), ScriptedRunner::new());

        ops.create_shortcut("env", &exe).await.unwrap();
        let call = &runner.calls()[0];
        assert_eq!(call.display(), "bottles-cli add -b env -n game -p Game/game.exe");
        assert_eq!(call.cwd.as_deref(), Some(tmp.path().join("env/drive_c").as_path()));
        assert_eq!(call.timeout, Duration::from_secs(30));

        let outside = tmp.path().join("elsewhere.exe");
        fs::write(&outside, b"MZ").unwrap();
        let err = ops.create_shortcut("env", &outside).await.unwrap_err();
        assert!(matches!(err, ProvisionError::PathViolation(_)));
        assert_eq!(runner.calls().len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_shortcut_through_symlinked_prefix_base() {
        let tmp = TempDir::new().unwrap();
        let real = tmp.path().join("real");
        let exe = real.join("env/drive_c/Game/game.exe");
        fs::create_dir_all(exe.parent().unwrap()).unwrap();
        fs::write(&exe, b"MZ").unwrap();
        let link = tmp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let (ops, runner, _) = ops(&link, ScriptedRunner::new());

        ops.create_shortcut("env", &exe).await.unwrap();
        ops.create_shortcut("env", &link.join("env/drive_c/Game/game.exe"))
            .await
            .unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.display().ends_with("-p Game/game.exe")));
    }
}
