//! Installation of the instrumented browser archive.
//!
//! The browser ships as a zip archive addressed by a caller-supplied selector.
//! It is installed into a per-user directory, `<home>/.mida/browsers/<selector>`
//! by default, and handed over to the invoking user.
//!
//! # Installation Process
//!
//! 1. **Validation**: the selector must be a plain directory name
//! 2. **Download**: into a dot-prefixed temporary file in the base directory
//! 3. **Extraction**: fully, into a dot-prefixed temporary directory next to it
//! 4. **Pruning** (best-effort): non-essential subtrees such as `testing/`
//! 5. **Relocation**: the existing destination is removed wholesale and the
//!    extracted root is renamed into its place
//! 6. **Ownership** (best-effort): destination and base directory go to the
//!    invoking user; the entry point is made executable
//! 7. **Cleanup**: temporaries are removed whatever happened before
//!
//! Because every temporary lives in the base directory, the final rename never
//! crosses a filesystem boundary and a half-extracted tree never occupies the
//! destination.
//!
//! # Failure Handling
//!
//! Only four outcomes fail the install:
//!
//! | Reason                        | Cause                                   |
//! |-------------------------------|-----------------------------------------|
//! | `invalid archive selector`    | selector is empty or path-like          |
//! | `archive download failed`     | base directory or download unavailable  |
//! | `archive extraction failed`   | archive unreadable or unwritable        |
//! | `archive relocation failed`   | destination cannot be replaced          |
//!
//! Pruning, ownership and cleanup problems are recorded in the returned
//! [`InstallReport`] and logged, but never turn a success into a failure.
//!
//! The archive's integrity is not verified; no digest is published for it.

mod extract;


pub use extract::extract_zip;

use crate::constants::{ARCHIVE_TEMP_PREFIX, DIRECTORY_MODE, SELECTOR_PLACEHOLDER, TEMP_SUFFIX};
use crate::core::{InstallReport, SetupError};
use crate::host::HostEnvironment;
use crate::source::ArtifactSource;
use crate::utils::path_validation::validate_selector;
use crate::utils::progress::ProgressBar;
use std::fs::Permissions;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, error, info, warn};

/// Failure reason for a selector that is not a plain directory name.
pub const INVALID_SELECTOR: &str = "invalid archive selector";

/// Failure reason when the archive could not be downloaded.
pub const ARCHIVE_DOWNLOAD_FAILED: &str = "archive download failed";

/// Failure reason when the archive could not be extracted.
pub const ARCHIVE_EXTRACTION_FAILED: &str = "archive extraction failed";

/// Failure reason when the extracted tree could not be moved into place.
pub const ARCHIVE_RELOCATION_FAILED: &str = "archive relocation failed";

/// One requested archive installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInstallSpec {
    /// Archive name as given by the caller
    pub selector: String,
    /// Where the archive is downloaded from
    pub url: String,
    /// Invoking user that receives ownership; may be empty
    pub user: String,
    /// Per-user base directory holding every installed archive
    pub base_dir: PathBuf,
}

impl ArchiveInstallSpec {
    /// Build a spec, deriving the URL from `url_template` by substituting
    /// `{selector}`.
    pub fn new(
        selector: impl Into<String>,
        url_template: &str,
        user: impl Into<String>,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        let selector = selector.into();
        Self {
            url: url_template.replace(SELECTOR_PLACEHOLDER, &selector),
            selector,
            user: user.into(),
            base_dir: base_dir.into(),
        }
    }

    /// Final installation directory, `<base_dir>/<selector>`.
    #[must_use]
    pub fn destination(&self) -> PathBuf {
        self.base_dir.join(&self.selector)
    }
}

/// Shape of the archive: which part of it is installed and what is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Directory inside the extracted archive that becomes the destination.
    /// The whole extraction is used when it is absent.
    pub archive_root: PathBuf,
    /// Subtrees, relative to the extraction directory, removed before relocation
    pub prune_dirs: Vec<PathBuf>,
    /// Entry point inside the installed tree that must be executable
    pub executable: String,
}

/// Downloads, extracts and relocates browser archives.
pub struct ArchiveInstaller<'a, S: ArtifactSource, H: HostEnvironment> {
    source: &'a S,
    host: &'a H,
    layout: ArchiveLayout,
}

impl<'a, S: ArtifactSource, H: HostEnvironment> ArchiveInstaller<'a, S, H> {
    pub const fn new(source: &'a S, host: &'a H, layout: ArchiveLayout) -> Self {
        Self {
            source,
            host,
            layout,
        }
    }

    /// Install the archive described by `spec`.
    pub fn install(&self, spec: &ArchiveInstallSpec) -> InstallReport {
        if let Err(e) = validate_selector(&spec.selector) {
            error!("{}", e);
            return InstallReport::failure(INVALID_SELECTOR);
        }

        warn!("Archive {} is installed without integrity verification", spec.url);

        let created_dirs = match create_dir_tracked(&spec.base_dir) {
            Ok(created) => created,
            Err(e) => {
                error!("Cannot create {}: {}", spec.base_dir.display(), e);
                return InstallReport::failure(ARCHIVE_DOWNLOAD_FAILED);
            }
        };

        let mut report = InstallReport::success();

        let Some(archive) = self.download(spec) else {
            report.fail(ARCHIVE_DOWNLOAD_FAILED);
            return report;
        };

        let Some(extracted) = self.extract(archive.path(), &spec.base_dir) else {
            report.fail(ARCHIVE_EXTRACTION_FAILED);
            cleanup(archive, None, &mut report);
            return report;
        };

        self.prune(extracted.path(), &mut report);

        let destination = spec.destination();
        let relocated_whole = match self.relocate(extracted.path(), &destination) {
            Ok(whole) => whole,
            Err(e) => {
                let e = SetupError::RelocationFailed {
                    destination: destination.display().to_string(),
                    reason: e.to_string(),
                };
                error!("{}: {}", e, e.reason().unwrap_or_default());
                report.fail(ARCHIVE_RELOCATION_FAILED);
                cleanup(archive, Some(extracted), &mut report);
                return report;
            }
        };

        let scratch = if relocated_whole {
            // The scratch directory itself became the destination.
            let _ = extracted.keep();
            if let Err(e) =
                std::fs::set_permissions(&destination, Permissions::from_mode(DIRECTORY_MODE))
            {
                report.record("chmod", format!("{}: {e}", destination.display()));
            }
            None
        } else {
            Some(extracted)
        };

        self.hand_over(spec, &destination, &created_dirs, &mut report);

        if let Err(e) = self.make_entry_point_executable(&destination, &mut report) {
            error!("Cannot make {} executable: {}", self.layout.executable, e);
            report.fail(ARCHIVE_RELOCATION_FAILED);
        }

        cleanup(archive, scratch, &mut report);

        if report.is_success() {
            info!("Installed {} into {}", spec.selector, destination.display());
        }
        report
    }

    fn download(&self, spec: &ArchiveInstallSpec) -> Option<NamedTempFile> {
        let temp = tempfile::Builder::new()
            .prefix(ARCHIVE_TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(&spec.base_dir)
            .map_err(|e| error!("Cannot create temporary archive in {}: {}", spec.base_dir.display(), e))
            .ok()?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Downloading {}", spec.url));
        let fetched = self.source.fetch_to(&spec.url, temp.path());
        spinner.finish_and_clear();

        match fetched {
            Ok(bytes) => {
                debug!("Downloaded {} bytes into {}", bytes, temp.path().display());
                Some(temp)
            }
            Err(e) => {
                error!("{}: {}", e, e.reason().unwrap_or_default());
                None
            }
        }
    }

    fn extract(&self, archive: &Path, base_dir: &Path) -> Option<TempDir> {
        let dir = tempfile::Builder::new()
            .prefix(ARCHIVE_TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempdir_in(base_dir)
            .map_err(|e| error!("Cannot create extraction directory in {}: {}", base_dir.display(), e))
            .ok()?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Extracting archive");
        let extracted = extract_zip(archive, dir.path());
        spinner.finish_and_clear();

        match extracted {
            Ok(entries) => {
                debug!("Extracted {} entries into {}", entries, dir.path().display());
                Some(dir)
            }
            Err(e) => {
                let e = SetupError::ExtractionFailed {
                    archive: archive.display().to_string(),
                    reason: format!("{e:#}"),
                };
                error!("{}: {}", e, e.reason().unwrap_or_default());
                if let Err(e) = dir.close() {
                    warn!("Failed to remove partial extraction: {}", e);
                }
                None
            }
        }
    }

    fn prune(&self, extracted: &Path, report: &mut InstallReport) {
        for dir in &self.layout.prune_dirs {
            let path = extracted.join(dir);
            if !path.exists() {
                debug!("Nothing to prune at {}", path.display());
                continue;
            }
            match std::fs::remove_dir_all(&path) {
                Ok(()) => debug!("Pruned {}", path.display()),
                Err(e) => report.record("prune", format!("{}: {e}", dir.display())),
            }
        }
    }

    /// Move the archive root into `destination`, replacing whatever is there.
    ///
    /// Returns `true` when the whole extraction directory was moved because
    /// the configured root is absent.
    fn relocate(&self, extracted: &Path, destination: &Path) -> std::io::Result<bool> {
        let candidate = extracted.join(&self.layout.archive_root);
        let (root, whole) = if candidate.is_dir() {
            (candidate, false)
        } else {
            debug!(
                "{} not found in archive, installing the extraction root",
                self.layout.archive_root.display()
            );
            (extracted.to_path_buf(), true)
        };

        match std::fs::symlink_metadata(destination) {
            Ok(meta) if meta.is_dir() => {
                debug!("Removing previous installation at {}", destination.display());
                std::fs::remove_dir_all(destination)?;
            }
            Ok(_) => std::fs::remove_file(destination)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        std::fs::rename(&root, destination)?;
        Ok(whole)
    }

    fn hand_over(
        &self,
        spec: &ArchiveInstallSpec,
        destination: &Path,
        created_dirs: &[PathBuf],
        report: &mut InstallReport,
    ) {
        if let Err(e) = self.host.chown_recursive(destination, &spec.user) {
            report.record("chown", format!("{:#}", e));
        }

        let mut dirs: Vec<&Path> = created_dirs.iter().map(PathBuf::as_path).collect();
        if !dirs.contains(&spec.base_dir.as_path()) {
            dirs.push(&spec.base_dir);
        }
        for dir in dirs {
            if let Err(e) = self.host.chown(dir, &spec.user) {
                report.record("chown", format!("{:#}", e));
            }
        }
    }

    fn make_entry_point_executable(
        &self,
        destination: &Path,
        report: &mut InstallReport,
    ) -> std::io::Result<()> {
        let entry = destination.join(&self.layout.executable);
        if !entry.is_file() {
            report.record("chmod", format!("entry point {} not found", entry.display()));
            return Ok(());
        }

        let mode = std::fs::metadata(&entry)?.permissions().mode();
        std::fs::set_permissions(&entry, Permissions::from_mode(mode | 0o111))
    }
}

/// Create `dir` and any missing ancestors, returning the directories that
/// did not exist before, outermost first.
fn create_dir_tracked(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(path) = current {
        if path.exists() {
            break;
        }
        missing.push(path.to_path_buf());
        current = path.parent();
    }
    missing.reverse();

    std::fs::create_dir_all(dir)?;
    Ok(missing)
}

fn cleanup(archive: NamedTempFile, scratch: Option<TempDir>, report: &mut InstallReport) {
    let archive_path = archive.path().to_path_buf();
    if let Err(e) = archive.close() {
        report.record("cleanup", format!("{}: {e}", archive_path.display()));
    }

    if let Some(dir) = scratch {
        let dir_path = dir.path().to_path_buf();
        if let Err(e) = dir.close() {
            report.record("cleanup", format!("{}: {e}", dir_path.display()));
        }
    }
}
