//! Shared helpers for the mida-setup integration tests
//!
//! [`TestEnv`] bundles a `file://` mirror with a scratch root holding the
//! install directory and the invoking user's home.

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use mida_setup::config::SetupConfig;
use mida_setup::test_utils::{Mirror, RecordingHost, ZipFixture, init_test_logging};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LINUX_ARTIFACT: &str = "mida_linux_amd64";

pub struct TestEnv {
    pub mirror: Mirror,
    root: TempDir,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        init_test_logging(None);
        let env = Self {
            mirror: Mirror::new()?,
            root: TempDir::new()?,
        };
        std::fs::create_dir_all(env.install_dir())?;
        std::fs::create_dir_all(env.home())?;
        Ok(env)
    }

    pub fn install_dir(&self) -> PathBuf {
        self.root.path().join("bin")
    }

    pub fn home(&self) -> PathBuf {
        self.root.path().join("home/tester")
    }

    pub fn binary(&self) -> PathBuf {
        self.install_dir().join("mida")
    }

    pub fn browser_dir(&self, selector: &str) -> PathBuf {
        self.home().join(".mida/browsers").join(selector)
    }

    pub fn host(&self) -> RecordingHost {
        RecordingHost::new(self.home())
    }

    /// Configuration pointing every URL and path into this environment
    pub fn config(&self) -> SetupConfig {
        SetupConfig {
            manifest_url: self.mirror.url("sha256sums.txt"),
            binary_base_url: self.mirror.url(""),
            archive_url_template: self.mirror.archive_url_template(),
            install_dir: self.install_dir(),
            ..SetupConfig::default()
        }
    }

    /// Publish `content` as the Linux build and list it in the manifest
    pub fn publish_linux_binary(&self, content: &[u8]) -> Result<String> {
        let (_, hash) = self.mirror.publish(LINUX_ARTIFACT, content)?;
        self.mirror.publish_manifest(&[(LINUX_ARTIFACT, &hash)])?;
        Ok(hash)
    }

    pub fn publish_browser(&self, selector: &str) -> Result<PathBuf> {
        self.mirror.publish_archive(selector, &ZipFixture::browser())
    }

    /// Write [`Self::config`] as TOML and return its path
    pub fn write_config_file(&self) -> Result<PathBuf> {
        let path = self.root.path().join("setup.toml");
        let text = toml::to_string(&self.config()).context("Failed to serialize config")?;
        std::fs::write(&path, text)?;
        Ok(path)
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }
}

/// `mida-setup` with a clean environment for deterministic output
pub fn mida_setup() -> Command {
    let mut cmd = Command::cargo_bin("mida-setup").expect("binary is built for integration tests");
    cmd.env("MIDA_SETUP_NO_PROGRESS", "1")
        .env_remove("RUST_LOG")
        .env_remove("MIDA_SETUP_CONFIG");
    cmd
}

/// Whether the test process itself runs as root
pub fn running_as_root() -> bool {
    nix::unistd::Uid::effective().is_root()
}
