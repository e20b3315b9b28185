//! Auxiliary system packages.
//!
//! The crawler drives a browser under a virtual display, so a working setup
//! also needs `xvfb` and a stock Chromium. When asked to, the installer makes
//! sure both are present through the OS package manager.
//!
//! A package is considered present when its probe command is on the search
//! path; only missing packages are handed to the package manager. Failures are
//! reported per package and never abort the run.

use crate::core::SetupError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// A package and the command whose presence shows it is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemPackage {
    /// Package name as known to the package manager
    pub name: String,
    /// Command looked up on the search path
    pub probe: String,
}

impl SystemPackage {
    pub fn new(name: impl Into<String>, probe: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            probe: probe.into(),
        }
    }

    /// The packages the crawler needs on a fresh Linux host.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![Self::new("xvfb", "xvfb-run"), Self::new("chromium-browser", "chromium-browser")]
    }
}

/// What happened to one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageStatus {
    /// The probe command was already available.
    AlreadyInstalled,
    /// The package manager installed the package.
    Installed,
    /// The package manager failed; the payload says why.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutcome {
    pub package: String,
    pub status: PackageStatus,
}

impl fmt::Display for PackageOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            PackageStatus::AlreadyInstalled => write!(f, "{}: already installed", self.package),
            PackageStatus::Installed => write!(f, "{}: installed", self.package),
            PackageStatus::Failed(reason) => write!(f, "{}: failed ({reason})", self.package),
        }
    }
}

/// Installs a single package.
pub trait PackageManager {
    /// # Errors
    ///
    /// Returns [`SetupError::PackageInstallFailed`] when the package manager
    /// cannot be started or exits unsuccessfully.
    fn install(&self, package: &str) -> Result<(), SetupError>;
}

/// `apt-get install -y <package>`
#[derive(Debug, Default, Clone, Copy)]
pub struct Apt;

impl PackageManager for Apt {
    fn install(&self, package: &str) -> Result<(), SetupError> {
        let failed = |reason: String| SetupError::PackageInstallFailed {
            package: package.to_string(),
            reason,
        };

        debug!("Running apt-get install -y {}", package);
        let output = Command::new("apt-get")
            .args(["install", "-y", package])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| failed(format!("cannot run apt-get: {e}")))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty()).unwrap_or_default();
        Err(failed(format!("apt-get exited with {}: {}", output.status, last_line.trim())))
    }
}

/// Install every package whose probe is missing.
///
/// `probe` answers whether a command is on the search path.
pub fn ensure_packages<P, F>(manager: &P, packages: &[SystemPackage], probe: F) -> Vec<PackageOutcome>
where
    P: PackageManager,
    F: Fn(&str) -> bool,
{
    packages
        .iter()
        .map(|package| {
            let status = if probe(&package.probe) {
                debug!("{} already installed", package.name);
                PackageStatus::AlreadyInstalled
            } else {
                info!("Installing {}", package.name);
                match manager.install(&package.name) {
                    Ok(()) => PackageStatus::Installed,
                    Err(e) => {
                        let reason = e.reason().unwrap_or_default().to_string();
                        warn!("{}: {}", e, reason);
                        PackageStatus::Failed(reason)
                    }
                }
            };
            PackageOutcome {
                package: package.name.clone(),
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeManager {
        broken: Vec<&'static str>,
        installed: RefCell<Vec<String>>,
    }

    impl PackageManager for FakeManager {
        fn install(&self, package: &str) -> Result<(), SetupError> {
            self.installed.borrow_mut().push(package.to_string());
            if self.broken.contains(&package) {
                return Err(SetupError::PackageInstallFailed {
                    package: package.to_string(),
                    reason: "E: Unable to locate package".to_string(),
                });
            }
            Ok(())
        }
    }

    #[test]
    fn test_present_packages_are_skipped() {
        let manager = FakeManager::default();
        let outcomes = ensure_packages(&manager, &SystemPackage::defaults(), |cmd| cmd == "xvfb-run");

        assert_eq!(outcomes[0].status, PackageStatus::AlreadyInstalled);
        assert_eq!(outcomes[1].status, PackageStatus::Installed);
        assert_eq!(*manager.installed.borrow(), vec!["chromium-browser".to_string()]);
    }

    #[test]
    fn test_failure_does_not_stop_other_packages() {
        let manager = FakeManager {
            broken: vec!["xvfb"],
            ..FakeManager::default()
        };
        let outcomes = ensure_packages(&manager, &SystemPackage::defaults(), |_| false);

        assert_eq!(
            outcomes[0].status,
            PackageStatus::Failed("E: Unable to locate package".to_string())
        );
        assert_eq!(outcomes[1].status, PackageStatus::Installed);
        assert_eq!(outcomes[0].to_string(), "xvfb: failed (E: Unable to locate package)");
    }

    #[test]
    fn test_defaults() {
        let defaults = SystemPackage::defaults();
        assert_eq!(defaults[0], SystemPackage::new("xvfb", "xvfb-run"));
        assert_eq!(defaults[1].name, "chromium-browser");
    }
}
