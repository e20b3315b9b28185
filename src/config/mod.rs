//! Configuration management for mida-setup
//!
//! Every URL and path the installer touches is a configuration value. The
//! defaults reproduce the published MIDA layout, so most hosts never need a
//! configuration file; mirrors and tests override single fields.
//!
//! # Configuration File
//!
//! **Resolution order** (first match wins):
//!
//! 1. `--config <PATH>` on the command line (the file must exist)
//! 2. `$MIDA_SETUP_CONFIG` (the file must exist)
//! 3. `/etc/mida/setup.toml`, when present
//! 4. Built-in defaults
//!
//! Every field is optional:
//!
//! ```toml
//! manifest_url = "https://files.mida.sprai.org/sha256sums.txt"
//! binary_base_url = "https://files.mida.sprai.org"
//! archive_url_template = "https://files.mida.sprai.org/{selector}.zip"
//! binary_name = "mida"
//! install_dir = "/usr/local/bin"
//! browser_dir = ".mida/browsers"        # relative to the invoking user's home
//! archive_root = "out/release-1"
//! prune_dirs = ["testing"]
//! browser_executable = "chrome"
//!
//! [[system_packages]]
//! name = "xvfb"
//! probe = "xvfb-run"
//! ```
//!
//! Path values support `~` and `$VAR` expansion. Malformed TOML, unknown
//! keys and unsafe relative paths are configuration errors, fatal to the run.

mod setup;

pub use setup::{ConfigSource, SetupConfig};
