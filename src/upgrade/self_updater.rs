use crate::constants::{BINARY_TEMP_PREFIX, EXECUTABLE_MODE, TEMP_SUFFIX};
use crate::core::InstallReport;
use crate::source::ArtifactSource;
use crate::upgrade::verification::hash_file;
use crate::utils::progress::ProgressBar;
use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, error, info};

/// Failure reason when the artifact could not be downloaded.
pub const DOWNLOAD_FAILED: &str = "unsupported platform or download failed";

/// Failure reason when the download could not be moved into place.
pub const INSTALL_FAILED: &str = "download succeeded, install failed";

/// Atomic download-and-replace of the `mida` executable.
///
/// The new binary is downloaded into a dot-prefixed temporary file inside the
/// install directory, made executable, and renamed over the target in one
/// step. A concurrent reader therefore sees either the complete old binary or
/// the complete new one, never a partial write.
///
/// # Failure Handling
///
/// | Step                    | Result on failure                                  |
/// |-------------------------|----------------------------------------------------|
/// | temporary file creation | `Failure("unsupported platform or download failed")` |
/// | download                | `Failure("unsupported platform or download failed")` |
/// | `chmod 0755`            | `Failure("download succeeded, install failed")`      |
/// | rename onto the target  | `Failure("download succeeded, install failed")`      |
///
/// The temporary file is removed on every failure branch. There is no backup
/// and no rollback: a target that was replaced stays replaced.
///
/// # Examples
///
/// ```rust,no_run
/// use mida_setup::source::HttpSource;
/// use mida_setup::upgrade::BinaryInstaller;
///
/// # fn example() -> anyhow::Result<()> {
/// let source = HttpSource::new()?;
/// let installer = BinaryInstaller::new(&source, "/usr/local/bin", "mida");
///
/// let report = installer.install("https://files.mida.sprai.org/mida_linux_amd64", None);
/// println!("{}", report.result);
/// # Ok(())
/// # }
/// ```
pub struct BinaryInstaller<'a, S: ArtifactSource> {
    source: &'a S,
    /// Directory the executable lives in; also holds the temporary download.
    install_dir: PathBuf,
    /// File name of the executable inside `install_dir`.
    binary_name: String,
}

impl<'a, S: ArtifactSource> BinaryInstaller<'a, S> {
    pub fn new(source: &'a S, install_dir: impl Into<PathBuf>, binary_name: impl Into<String>) -> Self {
        Self {
            source,
            install_dir: install_dir.into(),
            binary_name: binary_name.into(),
        }
    }

    /// Final path of the installed executable.
    #[must_use]
    pub fn target(&self) -> PathBuf {
        self.install_dir.join(&self.binary_name)
    }

    /// Download `url` and atomically install it as the target executable.
    ///
    /// When `expected` is given, the installed file is hashed afterwards and a
    /// mismatch is recorded as a best-effort warning. The install itself is
    /// not undone.
    pub fn install(&self, url: &str, expected: Option<&str>) -> InstallReport {
        let target = self.target();

        let temp = match tempfile::Builder::new()
            .prefix(BINARY_TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&self.install_dir)
        {
            Ok(temp) => temp,
            Err(e) => {
                error!("Cannot create temporary file in {}: {}", self.install_dir.display(), e);
                return InstallReport::failure(DOWNLOAD_FAILED);
            }
        };
        debug!("Downloading {} into {}", url, temp.path().display());

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Downloading {}", self.binary_name));
        let fetched = self.source.fetch_to(url, temp.path());
        spinner.finish_and_clear();

        if let Err(e) = fetched {
            error!("{}: {}", e, e.reason().unwrap_or_default());
            discard(temp);
            return InstallReport::failure(DOWNLOAD_FAILED);
        }

        if let Err(e) = std::fs::set_permissions(temp.path(), Permissions::from_mode(EXECUTABLE_MODE)) {
            error!("Failed to make {} executable: {}", temp.path().display(), e);
            discard(temp);
            return InstallReport::failure(INSTALL_FAILED);
        }

        if let Err(e) = temp.persist(&target) {
            error!("Failed to move new binary onto {}: {}", target.display(), e.error);
            discard(e.file);
            return InstallReport::failure(INSTALL_FAILED);
        }

        info!("Installed {}", target.display());

        let mut report = InstallReport::success();
        verify_installed(&target, expected, &mut report);
        report
    }
}

fn discard(temp: NamedTempFile) {
    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        error!("Failed to remove temporary file {}: {}", path.display(), e);
    }
}

fn verify_installed(target: &Path, expected: Option<&str>, report: &mut InstallReport) {
    let Some(actual) = hash_file(target) else {
        report.record("verify", format!("cannot hash {}", target.display()));
        return;
    };
    info!("Installed binary hash: {}", actual);

    if let Some(expected) = expected
        && !actual.eq_ignore_ascii_case(expected)
    {
        report.record(
            "verify",
            format!("installed binary hash {actual} does not match published hash {expected}"),
        );
    }
}
