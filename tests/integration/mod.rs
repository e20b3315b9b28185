//! Integration test suite for mida-setup
//!
//! These tests drive the library end-to-end against a `file://` mirror and a
//! [`RecordingHost`](mida_setup::test_utils::RecordingHost), so they need
//! neither network access nor root privilege.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **binary_install**: Manifest reconciliation and atomic binary replacement
//! - **archive_install**: Browser archive download, extraction and relocation
//! - **setup_flow**: Complete runs through [`Setup`](mida_setup::setup::Setup)
//! - **cli**: The `mida-setup` executable

#[path = "../common/mod.rs"]
mod common;

mod archive_install;
mod binary_install;
mod cli;
mod setup_flow;
