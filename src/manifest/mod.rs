//! The published integrity manifest (`sha256sums.txt`).
//!
//! The manifest is a line-oriented text file mapping build artifact names to
//! their expected SHA-256 digests, one entry per line:
//!
//! ```text
//! 3f2a...c9 mida_linux_amd64
//! 81bd...04 mida_darwin_amd64
//! ```
//!
//! # Parsing Rules
//!
//! - Each line is split on whitespace
//! - Lines that do not split into exactly two tokens are skipped
//! - The first token is the digest, the second the artifact name
//! - When a name appears more than once, the last occurrence wins
//!
//! Parsing never fails. A manifest that cannot be retrieved at all is fatal
//! to the run ([`SetupError::ManifestUnavailable`]); there is no cached copy
//! to fall back to.

use crate::constants::{MANIFEST_TEMP_PREFIX, MANIFEST_TEMP_SUFFIX};
use crate::core::SetupError;
use crate::source::ArtifactSource;
use crate::utils::progress::ProgressBar;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Mapping from artifact name to lowercase hex SHA-256.
///
/// Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: HashMap<String, String>,
}

impl Manifest {
    /// Parse manifest text.
    ///
    /// ```rust
    /// use mida_setup::manifest::Manifest;
    ///
    /// let manifest = Manifest::parse("abc123 mida_linux_amd64\nnot a valid line\n");
    /// assert_eq!(manifest.get("mida_linux_amd64"), Some("abc123"));
    /// assert_eq!(manifest.len(), 1);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        Self::from_lines(text.lines().map(str::to_string))
    }

    fn from_lines(lines: impl Iterator<Item = String>) -> Self {
        let mut entries = HashMap::new();
        let mut skipped = 0usize;

        for line in lines {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next(), tokens.next()) {
                (Some(hash), Some(name), None) => {
                    entries.insert(name.to_string(), hash.to_ascii_lowercase());
                }
                _ => skipped += 1,
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} malformed manifest line(s)", skipped);
        }

        Self {
            entries,
        }
    }

    /// Expected digest of `name`, if the manifest lists it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Downloads and parses the manifest.
pub struct ManifestFetcher<'a, S: ArtifactSource> {
    source: &'a S,
}

impl<'a, S: ArtifactSource> ManifestFetcher<'a, S> {
    pub const fn new(source: &'a S) -> Self {
        Self {
            source,
        }
    }

    /// Retrieve the manifest at `url`.
    ///
    /// The download lands in a private temporary file that is removed when
    /// this call returns, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::ManifestUnavailable`] if the manifest cannot be
    /// downloaded or the downloaded copy cannot be read.
    pub fn fetch(&self, url: &str) -> Result<Manifest, SetupError> {
        let unavailable = |reason: String| SetupError::ManifestUnavailable {
            url: url.to_string(),
            reason,
        };

        let temp = tempfile::Builder::new()
            .prefix(MANIFEST_TEMP_PREFIX)
            .suffix(MANIFEST_TEMP_SUFFIX)
            .tempfile()
            .map_err(|e| unavailable(format!("cannot create temporary file: {e}")))?;

        let spinner = ProgressBar::new_spinner();
        spinner.set_message(format!("Fetching {url}"));
        let fetched = self.source.fetch_to(url, temp.path());
        spinner.finish_and_clear();

        fetched.map_err(|e| unavailable(e.reason().unwrap_or_default().to_string()))?;

        let manifest = read_manifest(temp.path()).map_err(|e| unavailable(e.to_string()))?;
        tracing::debug!("Manifest lists {} artifact(s)", manifest.len());
        Ok(manifest)
    }
}

fn read_manifest(path: &Path) -> std::io::Result<Manifest> {
    let reader = BufReader::new(File::open(path)?);
    let lines = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
    Ok(Manifest::from_lines(lines.into_iter()))
}
