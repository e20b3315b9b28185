//! End-to-end setup run.
//!
//! [`Setup`] wires the components together in the order a run needs them:
//!
//! ```text
//! privilege check ─► platform ─► manifest ─► reconcile ─► binary install
//!                                                              │
//!                          archive install ◄─ system packages ◄┘
//! ```
//!
//! Only four conditions abort a run, all before anything is modified:
//! missing privilege, an unsupported OS, an unavailable manifest, and (in the
//! CLI) an invalid configuration. Everything after the manifest is reported in
//! the returned [`SetupSummary`] instead.

use crate::config::SetupConfig;
use crate::core::{InstallReport, SetupError};
use crate::host::HostEnvironment;
use crate::installer::{ARCHIVE_DOWNLOAD_FAILED, ArchiveInstallSpec, ArchiveInstaller};
use crate::manifest::ManifestFetcher;
use crate::packages::{PackageManager, PackageOutcome, ensure_packages};
use crate::source::ArtifactSource;
use crate::upgrade::{BinaryInstaller, InstallVerdict, hash_file, reconcile};
use crate::utils::platform::Platform;
use tracing::{error, info, warn};

/// What the caller asked for on top of the binary check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Archive to install; empty means no archive
    pub selector: String,
    /// Install the auxiliary system packages
    pub install_deps: bool,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupSummary {
    pub platform: Platform,
    pub verdict: InstallVerdict,
    /// Present when the binary installer ran
    pub binary: Option<InstallReport>,
    /// One entry per configured package when `--install-deps` was honored
    pub packages: Vec<PackageOutcome>,
    /// Present when the archive installer ran
    pub archive: Option<InstallReport>,
    /// Informational messages about skipped steps
    pub notes: Vec<String>,
}

impl SetupSummary {
    /// Whether every operation that ran succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.binary.iter().chain(self.archive.iter()).all(InstallReport::is_success)
    }
}

/// A configured setup run.
pub struct Setup<'a, H, S, P>
where
    H: HostEnvironment,
    S: ArtifactSource,
    P: PackageManager,
{
    host: &'a H,
    source: &'a S,
    packages: &'a P,
    config: &'a SetupConfig,
    os: String,
}

impl<'a, H, S, P> Setup<'a, H, S, P>
where
    H: HostEnvironment,
    S: ArtifactSource,
    P: PackageManager,
{
    pub fn new(host: &'a H, source: &'a S, packages: &'a P, config: &'a SetupConfig) -> Self {
        Self {
            host,
            source,
            packages,
            config,
            os: std::env::consts::OS.to_string(),
        }
    }

    /// Pretend to run on `os` instead of the current operating system.
    #[must_use]
    pub fn with_os(mut self, os: impl Into<String>) -> Self {
        self.os = os.into();
        self
    }

    /// Execute the run.
    ///
    /// # Errors
    ///
    /// - [`SetupError::NotElevated`] when the process lacks root privilege
    /// - [`SetupError::UnsupportedPlatform`] on an OS without published builds
    /// - [`SetupError::ManifestUnavailable`] when the manifest cannot be fetched
    pub fn run(&self, options: &SetupOptions) -> Result<SetupSummary, SetupError> {
        if !self.host.is_elevated() {
            return Err(SetupError::NotElevated);
        }

        let platform = Platform::from_os(&self.os)?;
        info!("Running setup for {} system", platform);

        let manifest = ManifestFetcher::new(self.source).fetch(&self.config.manifest_url)?;
        let key = platform.artifact_key();

        let installed = self.host.find_executable(&self.config.binary_name);
        let verdict = reconcile(key, &manifest, installed.as_deref(), hash_file);

        let mut summary = SetupSummary {
            platform,
            verdict,
            binary: None,
            packages: Vec::new(),
            archive: None,
            notes: Vec::new(),
        };

        match verdict {
            InstallVerdict::NotInstalled => {
                info!("Did not find existing {} installation. Installing...", self.config.binary_name);
            }
            InstallVerdict::Outdated => {
                info!("Newer version of {} available. Installing...", self.config.binary_name);
            }
            InstallVerdict::UpToDate => {
                info!("{} is already up-to-date", self.config.binary_name);
            }
            InstallVerdict::UnknownPlatform => {
                warn!("Did not find a hash for {} in the manifest", key);
            }
        }

        if verdict.needs_install() {
            let installer =
                BinaryInstaller::new(self.source, &self.config.install_dir, &self.config.binary_name);
            summary.binary =
                Some(installer.install(&self.config.binary_url(platform), manifest.get(key)));
        }

        if options.install_deps {
            if platform.supports_system_packages() {
                summary.packages =
                    ensure_packages(self.packages, &self.config.system_packages, |cmd| {
                        self.host.find_executable(cmd).is_some()
                    });
            } else {
                summary.notes.push(format!("System packages are not managed on {platform}"));
            }
        }

        if !options.selector.is_empty() {
            if platform.supports_archive() {
                summary.archive = Some(self.install_archive(&options.selector));
            } else {
                summary.notes.push("Instrumented browser currently only supported on Linux".to_string());
            }
        }

        Ok(summary)
    }

    fn install_archive(&self, selector: &str) -> InstallReport {
        let user = self.host.invoking_user();
        let home = match self.host.home_dir_of(&user) {
            Ok(home) => home,
            Err(e) => {
                error!("Cannot determine home directory of '{}': {:#}", user, e);
                return InstallReport::failure(ARCHIVE_DOWNLOAD_FAILED);
            }
        };

        let spec = ArchiveInstallSpec::new(
            selector,
            &self.config.archive_url_template,
            user,
            self.config.browser_base_dir(&home),
        );
        ArchiveInstaller::new(self.source, self.host, self.config.archive_layout()).install(&spec)
    }
}
