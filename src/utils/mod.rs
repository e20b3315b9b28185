//! Utilities shared by the installer components
//!
//! # Modules
//!
//! - [`platform`] - Platform mapping, home directory and path expansion
//! - [`path_validation`] - Validation of caller-supplied names and relative paths
//! - [`progress`] - Spinners for downloads and extraction

pub mod path_validation;
pub mod platform;
pub mod progress;

pub use path_validation::validate_selector;
pub use platform::{Platform, get_home_dir};
pub use progress::ProgressBar;
