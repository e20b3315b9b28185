use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_ARCHIVE_ROOT, DEFAULT_ARCHIVE_URL_TEMPLATE, DEFAULT_BINARY_BASE_URL,
    DEFAULT_BINARY_NAME, DEFAULT_BROWSER_DIR, DEFAULT_BROWSER_EXECUTABLE, DEFAULT_INSTALL_DIR,
    DEFAULT_MANIFEST_URL, DEFAULT_PRUNE_DIR, SELECTOR_PLACEHOLDER, SYSTEM_CONFIG_PATH,
};
use crate::core::SetupError;
use crate::installer::ArchiveLayout;
use crate::packages::SystemPackage;
use crate::utils::path_validation::validate_no_traversal;
use crate::utils::platform::{Platform, expand_path};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Installer configuration.
///
/// All fields default to the published MIDA layout, see
/// [module documentation](crate::config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    /// Location of `sha256sums.txt`
    pub manifest_url: String,
    /// Base URL the platform artifact name is appended to
    pub binary_base_url: String,
    /// Archive URL with a `{selector}` placeholder
    pub archive_url_template: String,
    /// File name of the installed executable
    pub binary_name: String,
    /// Directory the executable is installed into
    pub install_dir: PathBuf,
    /// Archive base directory, relative to the invoking user's home unless absolute
    pub browser_dir: PathBuf,
    /// Directory inside the extracted archive that gets installed
    pub archive_root: PathBuf,
    /// Subtrees of the extracted archive that are removed
    pub prune_dirs: Vec<PathBuf>,
    /// Entry point inside the installed archive that must be executable
    pub browser_executable: String,
    /// Packages installed by `--install-deps`
    pub system_packages: Vec<SystemPackage>,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            manifest_url: DEFAULT_MANIFEST_URL.to_string(),
            binary_base_url: DEFAULT_BINARY_BASE_URL.to_string(),
            archive_url_template: DEFAULT_ARCHIVE_URL_TEMPLATE.to_string(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            install_dir: PathBuf::from(DEFAULT_INSTALL_DIR),
            browser_dir: PathBuf::from(DEFAULT_BROWSER_DIR),
            archive_root: PathBuf::from(DEFAULT_ARCHIVE_ROOT),
            prune_dirs: vec![PathBuf::from(DEFAULT_PRUNE_DIR)],
            browser_executable: DEFAULT_BROWSER_EXECUTABLE.to_string(),
            system_packages: SystemPackage::defaults(),
        }
    }
}

/// Where a configuration was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config`
    Explicit(PathBuf),
    /// `$MIDA_SETUP_CONFIG`
    Environment(PathBuf),
    /// `/etc/mida/setup.toml`
    System(PathBuf),
    /// Nothing found; built-in defaults
    Defaults,
}

impl ConfigSource {
    /// Pick the configuration file following the resolution order.
    ///
    /// The system path is only chosen when it exists; the other two are
    /// returned as given so that a missing file is reported.
    pub fn locate(explicit: Option<&Path>, env_value: Option<PathBuf>, system: &Path) -> Self {
        if let Some(path) = explicit {
            return Self::Explicit(path.to_path_buf());
        }
        if let Some(path) = env_value.filter(|p| !p.as_os_str().is_empty()) {
            return Self::Environment(path);
        }
        if system.exists() {
            return Self::System(system.to_path_buf());
        }
        Self::Defaults
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Environment(p) | Self::System(p) => Some(p),
            Self::Defaults => None,
        }
    }
}

impl SetupConfig {
    /// Load the configuration following the resolution order.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ConfigError`] if the selected file cannot be
    /// read, is not valid TOML, or fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let source = ConfigSource::locate(
            explicit,
            std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from),
            Path::new(SYSTEM_CONFIG_PATH),
        );
        debug!("Configuration source: {:?}", source);

        match source.path() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Load the configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ConfigError`] if the file cannot be read, is not
    /// valid TOML, or fails validation.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| SetupError::ConfigError {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| SetupError::ConfigError {
            message: format!("Failed to parse {}: {e}", path.display()),
        })?;

        config.finalize()
    }

    /// Expand paths and check that the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ConfigError`] describing the first invalid value.
    pub fn finalize(mut self) -> Result<Self> {
        let invalid = |message: String| SetupError::ConfigError {
            message,
        };

        self.install_dir = expand(&self.install_dir).map_err(|e| invalid(e.to_string()))?;
        self.browser_dir = expand(&self.browser_dir).map_err(|e| invalid(e.to_string()))?;

        if self.manifest_url.trim().is_empty() {
            return Err(invalid("manifest_url must not be empty".to_string()).into());
        }
        if self.binary_name.is_empty() || self.binary_name.contains('/') {
            return Err(invalid(format!("binary_name '{}' is not a file name", self.binary_name)).into());
        }
        if self.browser_executable.is_empty() {
            return Err(invalid("browser_executable must not be empty".to_string()).into());
        }
        validate_no_traversal(&self.archive_root)
            .map_err(|e| invalid(format!("archive_root: {e}")))?;
        for dir in &self.prune_dirs {
            validate_no_traversal(dir).map_err(|e| invalid(format!("prune_dirs: {e}")))?;
        }
        if !self.archive_url_template.contains(SELECTOR_PLACEHOLDER) {
            warn!(
                "archive_url_template has no {} placeholder; every selector downloads the same archive",
                SELECTOR_PLACEHOLDER
            );
        }

        Ok(self)
    }

    /// URL of the binary artifact for `platform`.
    #[must_use]
    pub fn binary_url(&self, platform: Platform) -> String {
        format!("{}/{}", self.binary_base_url.trim_end_matches('/'), platform.artifact_key())
    }

    /// Per-user archive base directory below `home`.
    #[must_use]
    pub fn browser_base_dir(&self, home: &Path) -> PathBuf {
        home.join(&self.browser_dir)
    }

    #[must_use]
    pub fn archive_layout(&self) -> ArchiveLayout {
        ArchiveLayout {
            archive_root: self.archive_root.clone(),
            prune_dirs: self.prune_dirs.clone(),
            executable: self.browser_executable.clone(),
        }
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    match path.to_str() {
        Some(text) => expand_path(text),
        None => Ok(path.to_path_buf()),
    }
}
