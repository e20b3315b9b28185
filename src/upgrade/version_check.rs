use crate::manifest::Manifest;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Classification of the local `mida` installation against the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallVerdict {
    /// No binary was found on the search path.
    NotInstalled,
    /// The installed binary matches the published digest.
    UpToDate,
    /// The installed binary differs from the published digest, or could not be hashed.
    Outdated,
    /// The manifest has no entry for this platform.
    ///
    /// Halts the binary install only; the archive phase still runs.
    UnknownPlatform,
}

impl InstallVerdict {
    /// Whether the binary installer should run for this verdict.
    #[must_use]
    pub const fn needs_install(self) -> bool {
        matches!(self, Self::NotInstalled | Self::Outdated)
    }
}

impl fmt::Display for InstallVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NotInstalled => "not installed",
            Self::UpToDate => "up to date",
            Self::Outdated => "outdated",
            Self::UnknownPlatform => "no published build for this platform",
        };
        f.write_str(text)
    }
}

/// Decide what to do about the local installation.
///
/// - `installed` is `None` ⇒ [`InstallVerdict::NotInstalled`], whatever the manifest says
/// - the manifest has no entry for `platform_key` ⇒ [`InstallVerdict::UnknownPlatform`]
/// - otherwise the local digest decides between [`InstallVerdict::UpToDate`] and
///   [`InstallVerdict::Outdated`]; an unknown digest counts as outdated
///
/// The hasher is injected so that this function has no side effects of its own.
///
/// ```rust
/// use mida_setup::manifest::Manifest;
/// use mida_setup::upgrade::{InstallVerdict, reconcile};
/// use std::path::Path;
///
/// let manifest = Manifest::parse("abc123 mida_linux_amd64");
/// let installed = Path::new("/usr/local/bin/mida");
///
/// let verdict = reconcile("mida_linux_amd64", &manifest, Some(installed), |_| {
///     Some("abc123".to_string())
/// });
/// assert_eq!(verdict, InstallVerdict::UpToDate);
/// ```
pub fn reconcile<H>(
    platform_key: &str,
    manifest: &Manifest,
    installed: Option<&Path>,
    hasher: H,
) -> InstallVerdict
where
    H: FnOnce(&Path) -> Option<String>,
{
    let Some(path) = installed else {
        return InstallVerdict::NotInstalled;
    };

    let Some(expected) = manifest.get(platform_key) else {
        debug!("Manifest has no entry for {}", platform_key);
        return InstallVerdict::UnknownPlatform;
    };

    match hasher(path) {
        Some(actual) if actual.eq_ignore_ascii_case(expected) => InstallVerdict::UpToDate,
        Some(actual) => {
            debug!("Installed digest {} differs from published {}", actual, expected);
            InstallVerdict::Outdated
        }
        None => InstallVerdict::Outdated,
    }
}
