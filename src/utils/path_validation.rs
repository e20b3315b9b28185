//! Path validation for caller-supplied names.
//!
//! The archive selector ends up both in a URL and as the last component of a
//! directory that is deleted and replaced. It therefore has to be a single
//! plain path component.

use crate::core::SetupError;
use std::path::{Component, Path};

/// Validates that an archive selector is a single plain path component.
///
/// # Errors
///
/// Returns [`SetupError::InvalidSelector`] if the selector:
/// - is empty
/// - contains a `/` or `\` separator or a NUL byte
/// - is `.` or `..`
pub fn validate_selector(selector: &str) -> Result<(), SetupError> {
    let reject = |reason: &str| SetupError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    };

    if selector.is_empty() {
        return Err(reject("selector is empty"));
    }
    if selector.contains(['/', '\\']) {
        return Err(reject("selector must not contain path separators"));
    }
    if selector.contains('\0') {
        return Err(reject("selector must not contain NUL bytes"));
    }

    let mut components = Path::new(selector).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) if name == selector => Ok(()),
        _ => Err(reject("selector must be a plain directory name")),
    }
}

/// Validates that a relative path stays inside the directory it is joined to.
///
/// Used for the configured archive root and prune directories, which are
/// resolved inside the extraction directory.
///
/// # Errors
///
/// Returns an error if the path is absolute or contains `..`.
pub fn validate_no_traversal(path: &Path) -> anyhow::Result<()> {
    for component in path.components() {
        match component {
            Component::ParentDir => {
                anyhow::bail!("Path contains parent directory reference (..): {}", path.display());
            }
            Component::RootDir | Component::Prefix(_) => {
                anyhow::bail!("Path must be relative: {}", path.display());
            }
            Component::CurDir | Component::Normal(_) => {}
        }
    }
    Ok(())
}
