//! Artifact retrieval.
//!
//! All remote resources (the manifest, the binary, the browser archive) are
//! fetched through [`ArtifactSource`]. The installer never writes a download
//! straight into its final location: callers hand in the path of a temporary
//! file they own, and the source only fills it.
//!
//! [`HttpSource`] understands two URL schemes:
//!
//! - `http://` and `https://`, fetched with a blocking `reqwest` client without
//!   a request timeout and without retry
//! - `file://`, copied from the local filesystem, for mirrors and tests

use crate::core::SetupError;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Something that can place the bytes behind a URL into a local file.
pub trait ArtifactSource {
    /// Download `url` into `dest`, truncating it first.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError::DownloadFailed`] when the resource cannot be
    /// retrieved or written.
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, SetupError>;
}

/// [`ArtifactSource`] for `http(s)://` and `file://` URLs.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::blocking::Client,
    timeout: Option<Duration>,
}

impl HttpSource {
    /// Create a source with a client identifying itself as `mida-setup`.
    ///
    /// Requests never time out: browser archives are large and a slow
    /// mirror must not abort a download that is still making progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_timeout(None)
    }

    /// Create a source whose requests fail after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            timeout,
        })
    }

    /// Per-request timeout, `None` when requests may take arbitrarily long.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    fn fetch_http(&self, url: &str, dest: &Path) -> Result<u64, SetupError> {
        let failed = |reason: String| SetupError::DownloadFailed {
            url: url.to_string(),
            reason,
        };

        let mut response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| failed(e.to_string()))?;

        let mut file = File::create(dest).map_err(|e| failed(e.to_string()))?;
        let written = response.copy_to(&mut file).map_err(|e| failed(e.to_string()))?;
        file.sync_all().map_err(|e| failed(e.to_string()))?;
        Ok(written)
    }
}

fn fetch_file(url: &str, local: &str, dest: &Path) -> Result<u64, SetupError> {
    std::fs::copy(local, dest).map_err(|e| SetupError::DownloadFailed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

impl ArtifactSource for HttpSource {
    fn fetch_to(&self, url: &str, dest: &Path) -> Result<u64, SetupError> {
        tracing::debug!("Fetching {} into {}", url, dest.display());

        let written = if let Some(local) = url.strip_prefix("file://") {
            fetch_file(url, local, dest)?
        } else if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url, dest)?
        } else {
            return Err(SetupError::DownloadFailed {
                url: url.to_string(),
                reason: "unsupported URL scheme".to_string(),
            });
        };

        tracing::debug!("Fetched {} bytes from {}", written, url);
        Ok(written)
    }
}
