//! Test fixtures for remote artifacts
//!
//! This module provides builders for the resources the installer downloads:
//! zip archives shaped like the instrumented browser build, and a local
//! directory that plays the role of the download server through `file://`
//! URLs.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// Builder for zip archives
#[derive(Clone, Debug, Default)]
pub struct ZipFixture {
    entries: Vec<ZipEntry>,
}

#[derive(Clone, Debug)]
enum ZipEntry {
    Dir(String),
    File {
        name: String,
        content: Vec<u8>,
        mode: u32,
    },
}

impl ZipFixture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Archive laid out like a browser build:
    ///
    /// ```text
    /// out/release-1/chrome               (mode 0644, made +x on install)
    /// out/release-1/locales/en-US.pak
    /// testing/test_data.txt              (pruned on install)
    /// ```
    pub fn browser() -> Self {
        Self::new()
            .dir("out/release-1/")
            .file("out/release-1/chrome", b"\x7fELF chrome")
            .file("out/release-1/locales/en-US.pak", b"locale")
            .file("testing/test_data.txt", b"test data")
    }

    pub fn dir(mut self, name: &str) -> Self {
        self.entries.push(ZipEntry::Dir(name.to_string()));
        self
    }

    pub fn file(self, name: &str, content: &[u8]) -> Self {
        self.file_with_mode(name, content, 0o644)
    }

    pub fn file_with_mode(mut self, name: &str, content: &[u8], mode: u32) -> Self {
        self.entries.push(ZipEntry::File {
            name: name.to_string(),
            content: content.to_vec(),
            mode,
        });
        self
    }

    /// Write the archive to `path`
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut zip = zip::ZipWriter::new(file);

        for entry in &self.entries {
            match entry {
                ZipEntry::Dir(name) => zip.add_directory(name.as_str(), SimpleFileOptions::default())?,
                ZipEntry::File {
                    name,
                    content,
                    mode,
                } => {
                    zip.start_file(
                        name.as_str(),
                        SimpleFileOptions::default().unix_permissions(*mode),
                    )?;
                    zip.write_all(content)?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }
}

/// A local directory served through `file://` URLs
pub struct Mirror {
    dir: TempDir,
}

impl Mirror {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `file://` URL of `name` on this mirror, whether or not it exists
    pub fn url(&self, name: &str) -> String {
        format!("file://{}", self.dir.path().join(name).display())
    }

    /// Archive URL template for this mirror
    pub fn archive_url_template(&self) -> String {
        self.url("{selector}.zip")
    }

    /// Publish a file and return its URL and SHA-256
    pub fn publish(&self, name: &str, content: &[u8]) -> Result<(String, String)> {
        fs::write(self.dir.path().join(name), content)
            .with_context(|| format!("Failed to publish {name}"))?;
        Ok((self.url(name), hex::encode(Sha256::digest(content))))
    }

    /// Publish a manifest listing `entries` as `<hash> <name>` lines
    pub fn publish_manifest(&self, entries: &[(&str, &str)]) -> Result<String> {
        let text: String = entries.iter().map(|(name, hash)| format!("{hash} {name}\n")).collect();
        let (url, _) = self.publish("sha256sums.txt", text.as_bytes())?;
        Ok(url)
    }

    /// Publish an archive as `<selector>.zip`
    pub fn publish_archive(&self, selector: &str, fixture: &ZipFixture) -> Result<PathBuf> {
        let path = self.dir.path().join(format!("{selector}.zip"));
        fixture.write_to(&path)?;
        Ok(path)
    }
}
