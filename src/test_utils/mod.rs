//! Test utilities for mida-setup
//!
//! This module provides the pieces shared by unit and integration tests:
//! - [`RecordingHost`], a [`HostEnvironment`](crate::host::HostEnvironment)
//!   that records ownership changes instead of performing them
//! - [`Mirror`], a temporary directory served through `file://` URLs
//! - [`ZipFixture`], a builder for browser-shaped zip archives
//!
//! # Example
//!
//! ```rust,no_run
//! use mida_setup::test_utils::{Mirror, RecordingHost, ZipFixture};
//!
//! # fn example() -> anyhow::Result<()> {
//! let mirror = Mirror::new()?;
//! mirror.publish_archive("chromium", &ZipFixture::browser())?;
//! let host = RecordingHost::new("/home/tester");
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod host;

pub use fixtures::{Mirror, ZipFixture};
pub use host::{ChownCall, RecordingHost};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}
