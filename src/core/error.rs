//! Error handling for mida-setup
//!
//! This module provides the error taxonomy of the installer and the
//! user-friendly rendering used by the CLI. The error system is designed
//! around two core principles:
//! 1. **Strongly-typed errors** for precise handling inside the installer
//! 2. **User-friendly messages** with actionable suggestions for operators
//!
//! # Architecture
//!
//! - [`SetupError`] - Enumerated error types for every failure mode
//! - [`ErrorContext`] - Wrapper that adds details and a suggestion
//!
//! # Error Categories
//!
//! - **Run-fatal**: [`SetupError::NotElevated`], [`SetupError::UnsupportedPlatform`],
//!   [`SetupError::ManifestUnavailable`], [`SetupError::ConfigError`]
//! - **Operation-fatal** (reported inside an install report, never escalated):
//!   [`SetupError::DownloadFailed`], [`SetupError::ExtractionFailed`],
//!   [`SetupError::RelocationFailed`], [`SetupError::InvalidSelector`]
//! - **Non-fatal**: [`SetupError::UnreadableFile`] (treated as "hash unknown"),
//!   [`SetupError::PackageInstallFailed`]
//!
//! Only run-fatal errors leave the library as `Err`. Everything else is
//! translated into an [`InstallResult`](crate::core::InstallResult) by the
//! component that produced it.
//!
//! # Examples
//!
//! ```rust,no_run
//! use mida_setup::core::{SetupError, user_friendly_error};
//!
//! let error = SetupError::NotElevated;
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for mida-setup operations
///
/// Each variant carries the fields needed to explain the failure without a
/// stack trace: the URL that could not be fetched, the path that could not be
/// read, the destination that could not be replaced.
#[derive(Error, Debug)]
pub enum SetupError {
    /// The process is not running with superuser privilege.
    ///
    /// Checked before any network or filesystem action.
    #[error("Please execute with root privileges")]
    NotElevated,

    /// The running operating system has no published build.
    #[error("Unsupported operating system: {os}")]
    UnsupportedPlatform {
        /// Operating system name as reported by the standard library
        os: String,
    },

    /// The integrity manifest could not be retrieved or opened.
    ///
    /// There is no cached fallback, so this aborts the run.
    #[error("Unable to get SHA256 sums from {url}")]
    ManifestUnavailable {
        /// Manifest location
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// A local file could not be opened or read for hashing.
    #[error("Failed to open file {path} for hashing")]
    UnreadableFile {
        /// Path that could not be read
        path: String,
        /// Underlying failure
        reason: String,
    },

    /// A remote artifact could not be downloaded.
    #[error("Download failed: {url}")]
    DownloadFailed {
        /// Artifact location
        url: String,
        /// Underlying failure
        reason: String,
    },

    /// An archive could not be fully extracted.
    #[error("Failed to extract archive {archive}")]
    ExtractionFailed {
        /// Path of the downloaded archive
        archive: String,
        /// Underlying failure
        reason: String,
    },

    /// An extracted tree could not be moved into its destination.
    #[error("Cannot install into {destination}")]
    RelocationFailed {
        /// Final destination directory
        destination: String,
        /// Underlying failure
        reason: String,
    },

    /// The archive selector is not a plain name.
    #[error("Invalid archive selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector as supplied by the caller
        selector: String,
        /// Why it was rejected
        reason: String,
    },

    /// The configuration file is missing or malformed.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A system package could not be installed.
    #[error("Error installing {package}")]
    PackageInstallFailed {
        /// Package name
        package: String,
        /// Underlying failure
        reason: String,
    },

    /// Permission denied
    #[error("Permission denied: {operation}")]
    PermissionDenied {
        /// The operation that was denied
        operation: String,
        /// Path where permission was denied
        path: String,
    },

    /// File system error
    #[error("File system error: {operation}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the error occurred
        path: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl SetupError {
    /// The underlying failure description, when the variant records one.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::ManifestUnavailable { reason, .. }
            | Self::UnreadableFile { reason, .. }
            | Self::DownloadFailed { reason, .. }
            | Self::ExtractionFailed { reason, .. }
            | Self::RelocationFailed { reason, .. }
            | Self::InvalidSelector { reason, .. }
            | Self::PackageInstallFailed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl Clone for SetupError {
    fn clone(&self) -> Self {
        match self {
            Self::NotElevated => Self::NotElevated,
            Self::UnsupportedPlatform { os } => Self::UnsupportedPlatform { os: os.clone() },
            Self::ManifestUnavailable { url, reason } => Self::ManifestUnavailable {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::UnreadableFile { path, reason } => Self::UnreadableFile {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::DownloadFailed { url, reason } => Self::DownloadFailed {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::ExtractionFailed { archive, reason } => Self::ExtractionFailed {
                archive: archive.clone(),
                reason: reason.clone(),
            },
            Self::RelocationFailed { destination, reason } => Self::RelocationFailed {
                destination: destination.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSelector { selector, reason } => Self::InvalidSelector {
                selector: selector.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError { message } => Self::ConfigError { message: message.clone() },
            Self::PackageInstallFailed { package, reason } => Self::PackageInstallFailed {
                package: package.clone(),
                reason: reason.clone(),
            },
            Self::PermissionDenied { operation, path } => Self::PermissionDenied {
                operation: operation.clone(),
                path: path.clone(),
            },
            Self::FileSystemError { operation, path } => Self::FileSystemError {
                operation: operation.clone(),
                path: path.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::Other { message } => Self::Other { message: message.clone() },
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`SetupError`] and adds optional details and a
/// suggestion. This is the primary way the CLI presents a failed run.
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// ```rust,no_run
/// use mida_setup::core::{ErrorContext, SetupError};
///
/// let context = ErrorContext::new(SetupError::NotElevated)
///     .with_suggestion("Run again with sudo")
///     .with_details("The installer writes to /usr/local/bin");
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: SetupError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: SetupError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`SetupError`] anywhere in the chain and [`std::io::Error`]
/// kinds; everything else is rendered with its full cause chain. Malformed
/// configuration reaches this point as [`SetupError::ConfigError`].
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(setup_error) = error.chain().find_map(|e| e.downcast_ref::<SetupError>()) {
        return create_error_context(setup_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(SetupError::PermissionDenied {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Run the installer with sudo so it can write to the install directory")
                .with_details("This error occurs when the installer cannot read or write a file");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(SetupError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(
                    "This error occurs when a required file or directory cannot be found",
                );
            }
            _ => {}
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(SetupError::Other {
        message,
    })
}

/// Map each [`SetupError`] variant to an [`ErrorContext`] with tailored suggestions.
fn create_error_context(error: SetupError) -> ErrorContext {
    match &error {
        SetupError::NotElevated => ErrorContext::new(error)
            .with_suggestion("Run the installer again with sudo, e.g. 'sudo mida-setup'")
            .with_details("The installer replaces the system-wide mida binary and needs root privileges"),

        SetupError::UnsupportedPlatform { .. } => ErrorContext::new(error)
            .with_suggestion("MIDA builds are published for Linux and macOS only")
            .with_details("No binary artifact exists for this operating system"),

        SetupError::ManifestUnavailable { url, reason } => {
            let details = format!("Could not retrieve {url}: {reason}");
            ErrorContext::new(error)
                .with_suggestion("Check your network connection and the manifest_url setting")
                .with_details(details)
        }

        SetupError::ConfigError { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the configuration file or remove it to use the built-in defaults")
            .with_details(format!(
                "Configuration is read from --config, ${}, or {}",
                crate::constants::CONFIG_PATH_ENV,
                crate::constants::SYSTEM_CONFIG_PATH
            )),

        SetupError::PermissionDenied { path, .. } => {
            let suggestion = format!("Check the ownership and permissions of {path}");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("The installer could not access a required file or directory")
        }

        _ => {
            let details = error.reason().map(str::to_string);
            let ctx = ErrorContext::new(error);
            match details {
                Some(details) => ctx.with_details(details),
                None => ctx,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(SetupError::NotElevated.to_string(), "Please execute with root privileges");

        let error = SetupError::UnsupportedPlatform {
            os: "windows".to_string(),
        };
        assert_eq!(error.to_string(), "Unsupported operating system: windows");

        let error = SetupError::ManifestUnavailable {
            url: "https://example.com/sha256sums.txt".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Unable to get SHA256 sums from https://example.com/sha256sums.txt"
        );
    }

    #[test]
    fn test_error_reason() {
        let error = SetupError::DownloadFailed {
            url: "https://example.com/mida".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert_eq!(error.reason(), Some("HTTP 404"));
        assert_eq!(SetupError::NotElevated.reason(), None);
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(SetupError::NotElevated).with_suggestion("Use sudo");

        let display = format!("{ctx}");
        assert!(display.contains("Please execute with root privileges"));
        assert!(display.contains("Suggestion: Use sudo"));
    }

    #[test]
    fn test_user_friendly_error_setup_error() {
        let ctx = user_friendly_error(anyhow::Error::from(SetupError::NotElevated));
        assert!(matches!(ctx.error, SetupError::NotElevated));
        assert!(ctx.suggestion.unwrap().contains("sudo"));
    }

    #[test]
    fn test_user_friendly_error_finds_setup_error_behind_context() {
        let error = anyhow::Error::from(SetupError::ManifestUnavailable {
            url: "https://example.com/sums".to_string(),
            reason: "timed out".to_string(),
        })
        .context("setup aborted");

        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, SetupError::ManifestUnavailable { .. }));
        assert!(ctx.details.unwrap().contains("timed out"));
    }

    #[test]
    fn test_user_friendly_error_permission_denied() {
        use std::io::{Error, ErrorKind};

        let io_error = Error::new(ErrorKind::PermissionDenied, "access denied");
        let ctx = user_friendly_error(anyhow::Error::from(io_error));
        assert!(matches!(ctx.error, SetupError::PermissionDenied { .. }));
        assert!(ctx.suggestion.is_some());
    }

    #[test]
    fn test_user_friendly_error_generic_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("outer failure");
        let ctx = user_friendly_error(error);
        match ctx.error {
            SetupError::Other { message } => {
                assert!(message.contains("outer failure"));
                assert!(message.contains("root cause"));
            }
            other => panic!("Expected Other, got {other:?}"),
        }
    }

    #[test]
    fn test_error_clone_converts_io_error() {
        let error = SetupError::from(std::io::Error::other("disk on fire"));
        match error.clone() {
            SetupError::Other { message } => assert!(message.contains("disk on fire")),
            other => panic!("Expected Other, got {other:?}"),
        }
    }
}
