//! mida-setup - installer and updater for the MIDA web crawler
//!
//! A privileged one-shot tool that keeps a host's `mida` binary current and,
//! on request, installs an instrumented browser build for the user who
//! invoked it through `sudo`.
//!
//! # Workflow
//!
//! 1. Refuse to run without root privilege
//! 2. Map the operating system to its published build name
//! 3. Fetch the SHA-256 manifest of published builds
//! 4. Hash the installed binary and decide whether it is current
//! 5. Replace the binary atomically when it is missing or outdated
//! 6. Optionally install system packages and an instrumented browser archive
//!
//! Steps 1 to 3 abort the run on failure. Later steps report their outcome as
//! an [`core::InstallReport`]: a success or failure plus the best-effort steps
//! (ownership, pruning, cleanup) that went wrong without affecting the result.
//!
//! # Modules
//!
//! - [`cli`] - Command-line parsing, logging setup and summary output
//! - [`config`] - `setup.toml` loading and defaults
//! - [`constants`] - Default URLs, paths and modes
//! - [`core`] - Error types and install outcomes
//! - [`host`] - Privilege, user and ownership operations of the host
//! - [`installer`] - Browser archive download, extraction and relocation
//! - [`manifest`] - Published hash manifest parsing and retrieval
//! - [`packages`] - Auxiliary system packages
//! - [`setup`] - The end-to-end run
//! - [`source`] - Artifact download over HTTP(S) or `file://`
//! - [`upgrade`] - Hashing, version reconciliation and atomic binary install
//! - [`utils`] - Platform detection, path validation, progress spinners
//!
//! # Example
//!
//! ```rust,no_run
//! use mida_setup::config::SetupConfig;
//! use mida_setup::host::SystemHost;
//! use mida_setup::packages::Apt;
//! use mida_setup::setup::{Setup, SetupOptions};
//! use mida_setup::source::HttpSource;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SetupConfig::load(None)?;
//! let source = HttpSource::new()?;
//! let options = SetupOptions {
//!     selector: "chromium".to_string(),
//!     install_deps: false,
//! };
//!
//! let summary = Setup::new(&SystemHost, &source, &Apt, &config).run(&options)?;
//! println!("binary was {}", summary.verdict);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod host;
pub mod installer;
pub mod manifest;
pub mod packages;
pub mod setup;
pub mod source;
pub mod upgrade;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
