//! Platform detection and host lookups.
//!
//! The installer only publishes builds for two operating systems. This module
//! maps the running OS onto the manifest key of its build and answers the
//! handful of capability questions the orchestrator asks (archive support,
//! system package support).

use crate::constants::{DARWIN_ARTIFACT, LINUX_ARTIFACT};
use crate::core::SetupError;
use anyhow::Result;
use std::fmt;
use std::path::PathBuf;

/// An operating system with a published `mida` build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux on amd64
    Linux,
    /// macOS on amd64
    MacOs,
}

impl Platform {
    /// Map an OS name, as reported by [`std::env::consts::OS`], to a platform.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::UnsupportedPlatform`] for unknown names.
    pub fn from_os(os: &str) -> Result<Self, SetupError> {
        match os {
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOs),
            other => Err(SetupError::UnsupportedPlatform {
                os: other.to_string(),
            }),
        }
    }

    /// Manifest key, and remote file name, of this platform's build.
    #[must_use]
    pub const fn artifact_key(self) -> &'static str {
        match self {
            Self::Linux => LINUX_ARTIFACT,
            Self::MacOs => DARWIN_ARTIFACT,
        }
    }

    /// Whether the instrumented browser archive is published for this platform.
    #[must_use]
    pub const fn supports_archive(self) -> bool {
        matches!(self, Self::Linux)
    }

    /// Whether auxiliary packages can be installed through `apt-get`.
    #[must_use]
    pub const fn supports_system_packages(self) -> bool {
        matches!(self, Self::Linux)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "OS X"),
        }
    }
}

/// Returns the home directory of the current process owner.
///
/// Used as the fallback when the invoking user's passwd entry cannot be
/// resolved.
///
/// # Errors
///
/// Returns an error when `$HOME` is unset and no passwd entry exists.
pub fn get_home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine home directory.\n\nCheck that the HOME environment variable is set"
        )
    })
}

/// Expand a leading `~` and environment variables in a configured path.
///
/// # Errors
///
/// Returns an error when the path references an undefined variable.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(path)
        .map_err(|e| anyhow::anyhow!("Failed to expand path '{path}': {e}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_os_known() {
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::MacOs);
    }

    #[test]
    fn test_from_os_unsupported() {
        let err = Platform::from_os("windows").unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { ref os } if os == "windows"));
    }

    #[test]
    fn test_artifact_keys() {
        assert_eq!(Platform::Linux.artifact_key(), "mida_linux_amd64");
        assert_eq!(Platform::MacOs.artifact_key(), "mida_darwin_amd64");
    }

    #[test]
    fn test_archive_support_is_linux_only() {
        assert!(Platform::Linux.supports_archive());
        assert!(!Platform::MacOs.supports_archive());
        assert!(!Platform::MacOs.supports_system_packages());
    }


    #[test]
    fn test_expand_path_plain() {
        assert_eq!(expand_path("/usr/local/bin").unwrap(), PathBuf::from("/usr/local/bin"));
    }

    #[test]
    fn test_expand_path_undefined_variable() {
        assert!(expand_path("$MIDA_SETUP_SURELY_UNDEFINED_VAR/bin").is_err());
    }
}
