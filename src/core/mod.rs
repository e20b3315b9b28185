//! Core types for mida-setup
//!
//! This module holds the types shared by every installer component:
//!
//! ## `error` - Error Handling
//! - [`SetupError`] - Enumerated error types covering every failure mode
//! - [`ErrorContext`] - User-friendly wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to the user-friendly format
//!
//! ## `outcome` - Operation Results
//! - [`InstallResult`] - Success or failure of one mutating operation
//! - [`InstallReport`] - A result plus the best-effort steps that failed
//! - [`BestEffortFailure`] - A swallowed failure kept observable
//!
//! # Error Flow
//!
//! Components that mutate the system never let raw I/O errors escape. They
//! translate their own faults into an [`InstallResult::Failure`] and return
//! it inside an [`InstallReport`]. Only failures that make the whole run
//! pointless (missing privilege, no manifest) propagate as `Err`.
//!
//! ```rust
//! use mida_setup::core::{InstallReport, InstallResult};
//!
//! let mut report = InstallReport::success();
//! report.record("prune", "permission denied");
//! assert!(report.is_success());
//! assert_eq!(report.warnings.len(), 1);
//!
//! let failed = InstallReport::failure("archive download failed");
//! assert_eq!(failed.result, InstallResult::Failure("archive download failed".into()));
//! ```

pub mod error;
pub mod outcome;

pub use error::{ErrorContext, SetupError, user_friendly_error};
pub use outcome::{BestEffortFailure, InstallReport, InstallResult};
