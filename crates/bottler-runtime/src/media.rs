//! Media Mount Manager.
//!
//! Disk images are extracted with an archiver, never mounted. An ephemeral
//! extraction directory lives exactly as long as its [`MediaMount`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bottler_core::ports::{ToolInvocation, ToolRunner};
use bottler_core::{ProvisionError, ProvisionResult};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::registry::EnvironmentRegistry;

/// Installer names searched for, in priority order.
pub const SETUP_NAMES: &[&str] = &["setup.exe", "install.exe", "autorun.exe", "start.exe"];

/// Extensions treated as disk images.
pub const DISK_IMAGE_EXTENSIONS: &[&str] = &["iso", "img"];

/// True when `path` has a disk-image extension.
pub fn is_disk_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| DISK_IMAGE_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Extracted disk image.
///
/// Dropping it removes the directory when it was created ephemerally.
#[derive(Debug)]
pub struct MediaMount {
    root: PathBuf,
    ephemeral: Option<TempDir>,
}

impl MediaMount {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub const fn is_ephemeral(&self) -> bool {
        self.ephemeral.is_some()
    }

    /// Locate the installer at depth 0 or 1.
    pub fn find_setup(&self) -> Option<PathBuf> {
        find_setup_exe(&self.root)
    }

    /// Remove an ephemeral directory now, reporting failures.
    pub fn close(self) -> ProvisionResult<()> {
        match self.ephemeral {
            Some(dir) => dir.close().map_err(ProvisionError::from),
            None => Ok(()),
        }
    }
}

fn files_sorted(dir: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir)
        .map(|rd| rd.filter_map(Result::ok).map(|e| e.path()).collect())
        .unwrap_or_default();
    entries.sort();
    entries
}

fn match_setup(files: &[PathBuf]) -> Option<PathBuf> {
    SETUP_NAMES.iter().find_map(|wanted| {
        files
            .iter()
            .filter(|p| p.is_file())
            .find(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.eq_ignore_ascii_case(wanted))
            })
            .cloned()
    })
}

/// Search `root` and its immediate sub-directories for an installer.
///
/// Top-level matches win over nested ones; within a level the name order of
/// [`SETUP_NAMES`] decides.
pub fn find_setup_exe(root: &Path) -> Option<PathBuf> {
    let top = files_sorted(root);
    if let Some(found) = match_setup(&top) {
        return Some(found);
    }
    top.iter()
        .filter(|p| p.is_dir())
        .find_map(|dir| match_setup(&files_sorted(dir)))
}

fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).map_or(true, |mut rd| rd.next().is_none())
}

/// Extracts disk images with the host archiver.
pub struct MediaMounter {
    registry: Arc<EnvironmentRegistry>,
    runner: Arc<dyn ToolRunner>,
    scratch_dir: PathBuf,
    timeout: Duration,
}

impl MediaMounter {
    pub fn new(
        registry: Arc<EnvironmentRegistry>,
        runner: Arc<dyn ToolRunner>,
        scratch_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            runner,
            scratch_dir: scratch_dir.into(),
            timeout,
        }
    }

    /// Extract `image` into `target`, or into a fresh ephemeral directory
    /// under the scratch directory when `target` is `None`.
    pub async fn mount(&self, image: &Path, target: Option<&Path>) -> ProvisionResult<MediaMount> {
        if !image.is_file() {
            return Err(ProvisionError::NotFound(image.display().to_string()));
        }
        let archiver = self.registry.archiver()?;

        let (root, ephemeral) = match target {
            Some(dir) => {
                tokio::fs::create_dir_all(dir).await?;
                (dir.to_path_buf(), None)
            }
            None => {
                tokio::fs::create_dir_all(&self.scratch_dir).await?;
                let tmp = tempfile::Builder::new()
                    .prefix("bottler-media-")
                    .tempdir_in(&self.scratch_dir)?;
                (tmp.path().to_path_buf(), Some(tmp))
            }
        };
        let mount = MediaMount { root, ephemeral };

        info!(image = %image.display(), target = %mount.root.display(), "Extracting disk image");
        let invocation = ToolInvocation::new(
            archiver,
            [
                "x".to_string(),
                image.to_string_lossy().into_owned(),
                format!("-o{}", mount.root.display()),
                "-y".to_string(),
            ],
            self.timeout,
        );
        let output = self.runner.run(invocation).await?;

        if !output.success() {
            let detail = if output.timed_out {
                "timed out".to_string()
            } else {
                output.stderr_excerpt(200)
            };
            if mount.is_ephemeral() {
                warn!(image = %image.display(), detail = %detail, "Archiver reported failure");
            } else {
                return Err(ProvisionError::ToolFailure(format!(
                    "extraction of {} failed: {detail}",
                    image.display()
                )));
            }
        }

        if mount.is_ephemeral() && dir_is_empty(&mount.root) {
            return Err(ProvisionError::ToolFailure(format!(
                "empty extraction: {}",
                image.display()
            )));
        }
        debug!(root = %mount.root.display(), "Disk image extracted");
        Ok(mount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRunner, exit};
    use bottler_core::Toolchain;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"MZ").unwrap();
    }

    /// Archiver fake that writes `files` into the `-o` directory.
    fn extracting(files: &'static [&'static str]) -> ScriptedRunner {
        ScriptedRunner::new().on("7z", move |inv| {
            let out = inv
                .argv
                .iter()
                .find_map(|a| a.strip_prefix("-o"))
                .map(PathBuf::from)
                .unwrap();
            for f in files {
                touch(&out.join(f));
            }
            Ok(exit(0, "Everything is Ok", ""))
        })
    }

    fn registry(archiver: Option<&str>) -> Arc<EnvironmentRegistry> {
        let toolchain = match archiver {
            Some(cmd) => Toolchain::native().with_archiver(vec![cmd.to_string()]),
            None => Toolchain::native(),
        };
        Arc::new(EnvironmentRegistry::new(toolchain, "/b"))
    }

    fn mounter(runner: ScriptedRunner, scratch: &Path) -> MediaMounter {
        MediaMounter::new(
            registry(Some("7z")),
            Arc::new(runner),
            scratch,
            Duration::from_secs(5),
        )
    }

    fn image(dir: &Path) -> PathBuf {
        let iso = dir.join("game.iso");
        fs::write(&iso, b"ISO").unwrap();
        iso
    }

    #[test]
    fn test_find_setup_prefers_top_level_and_name_order() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(&tmp.path().join("disc/SETUP.EXE"));
        touch(&tmp.path().join("autorun.exe"));
        let found = find_setup_exe(tmp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "autorun.exe");

        touch(&tmp.path().join("Install.exe"));
        let found = find_setup_exe(tmp.path()).unwrap();
        assert_eq!(found.file_name().unwrap(), "Install.exe");
    }

    #[test]
    fn test_find_setup_ignores_depth_two() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(&tmp.path().join("a/b/setup.exe"));
        assert!(find_setup_exe(tmp.path()).is_none());
        touch(&tmp.path().join("a/start.exe"));
        assert!(find_setup_exe(tmp.path()).unwrap().ends_with("a/start.exe"));
    }

    #[test]
    fn test_disk_image_extensions() {
        assert!(is_disk_image(Path::new("/x/Game.ISO")));
        assert!(is_disk_image(Path::new("/x/game.img")));
        assert!(!is_disk_image(Path::new("/x/game.exe")));
    }

    #[tokio::test]
    async fn test_ephemeral_mount_is_removed_on_drop() {
        let tmp = tempfile::TempDir::new().unwrap();
        let iso = image(tmp.path());
        let m = mounter(extracting(&["DISC1/setup.exe"]), &tmp.path().join("scratch"));
        let mount = m.mount(&iso, None).await.unwrap();
        let root = mount.root().to_path_buf();
        assert!(mount.is_ephemeral());
        assert!(mount.find_setup().unwrap().ends_with("DISC1/setup.exe"));
        drop(mount);
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_no_setup_returns_none_and_cleans_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let iso = image(tmp.path());
        let m = mounter(extracting(&["readme.txt"]), &tmp.path().join("scratch"));
        let mount = m.mount(&iso, None).await.unwrap();
        let root = mount.root().to_path_buf();
        assert!(mount.find_setup().is_none());
        mount.close().unwrap();
        assert!(!root.exists());
    }

    #[tokio::test]
    async fn test_empty_ephemeral_extraction_fails_and_cleans_up() {
        let tmp = tempfile::TempDir::new().unwrap();
        let iso = image(tmp.path());
        let scratch = tmp.path().join("scratch");
        let m = mounter(ScriptedRunner::new().reply("7z", exit(2, "", "bad archive")), &scratch);
        let err = m.mount(&iso, None).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ToolFailure(_)));
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_persistent_target_survives() {
        let tmp = tempfile::TempDir::new().unwrap();
        let iso = image(tmp.path());
        let target = tmp.path().join("keep");
        let m = mounter(extracting(&["setup.exe"]), tmp.path());
        let mount = m.mount(&iso, Some(&target)).await.unwrap();
        assert!(!mount.is_ephemeral());
        drop(mount);
        assert!(target.join("setup.exe").exists());

        let failing = mounter(ScriptedRunner::new().reply("7z", exit(2, "", "boom")), tmp.path());
        let err = failing.mount(&iso, Some(&target)).await.unwrap_err();
        assert!(matches!(err, ProvisionError::ToolFailure(_)));
        assert!(target.exists());
    }

    #[tokio::test]
    async fn test_missing_archiver_and_image() {
        let tmp = tempfile::TempDir::new().unwrap();
        let iso = image(tmp.path());
        let none = MediaMounter::new(
            registry(None),
            Arc::new(ScriptedRunner::new()),
            tmp.path(),
            Duration::from_secs(1),
        );
        assert!(matches!(
            none.mount(&iso, None).await,
            Err(ProvisionError::ToolUnavailable(_))
        ));
        let m = mounter(ScriptedRunner::new(), tmp.path());
        assert!(matches!(
            m.mount(&tmp.path().join("missing.iso"), None).await,
            Err(ProvisionError::NotFound(_))
        ));
    }
}
