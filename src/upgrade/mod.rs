//! Installation and update of the `mida` binary.
//!
//! This module decides whether the `mida` executable needs to be (re)installed
//! and performs the replacement when it does.
//!
//! # Update Process Flow
//!
//! ```text
//! 1. Lookup
//!    └── Resolve `mida` on the executable search path
//!
//! 2. Reconcile
//!    ├── Not found                   → NotInstalled
//!    ├── No manifest entry           → UnknownPlatform (binary step skipped)
//!    ├── Local digest == published   → UpToDate (nothing to do)
//!    └── Local digest differs/unknown → Outdated
//!
//! 3. Binary Update (NotInstalled or Outdated)
//!    ├── Download into a dot-prefixed temporary file in the install directory
//!    ├── chmod 0755
//!    └── Rename over the target in one step
//!
//! 4. Post-Update
//!    └── Hash the new binary and compare it to the manifest (warning on mismatch)
//! ```
//!
//! # Module Structure
//!
//! - [`verification`]: Streaming SHA-256 of local files
//! - [`version_check`]: The pure [`reconcile`] classification
//! - [`self_updater`]: The atomic [`BinaryInstaller`]

/// Atomic download-and-replace of the executable.
pub mod self_updater;
/// Streaming SHA-256 hashing of local files.
pub mod verification;
/// Classification of the local installation against the manifest.
pub mod version_check;


pub use self_updater::{BinaryInstaller, DOWNLOAD_FAILED, INSTALL_FAILED};
pub use verification::hash_file;
pub use version_check::{InstallVerdict, reconcile};
