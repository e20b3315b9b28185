use crate::constants::HASH_BUF_SIZE;
use crate::core::SetupError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Compute the SHA-256 digest of a local file.
///
/// The file is streamed through the hasher in 64 KiB chunks, so binaries of
/// any size are hashed in constant memory.
///
/// # Returns
///
/// The lowercase hex digest, or `None` when the file cannot be opened or
/// read. A `None` is logged at `warn` and means "hash unknown" to callers.
///
/// # Examples
///
/// ```rust,no_run
/// use mida_setup::upgrade::verification::hash_file;
/// use std::path::Path;
///
/// match hash_file(Path::new("/usr/local/bin/mida")) {
///     Some(digest) => println!("SHA256: {digest}"),
///     None => println!("hash unknown"),
/// }
/// ```
#[must_use]
pub fn hash_file(path: &Path) -> Option<String> {
    match try_hash_file(path) {
        Ok(digest) => {
            debug!("SHA256 of {}: {}", path.display(), digest);
            Some(digest)
        }
        Err(e) => {
            warn!("{}: {}", e, e.reason().unwrap_or_default());
            None
        }
    }
}

fn try_hash_file(path: &Path) -> Result<String, SetupError> {
    let unreadable = |e: std::io::Error| SetupError::UnreadableFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = File::open(path).map_err(unreadable)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BUF_SIZE];

    loop {
        let read = file.read(&mut buf).map_err(unreadable)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Compare a file against an expected digest, ignoring case.
///
/// Returns `None` when the file cannot be hashed.
#[must_use]
pub fn matches_digest(path: &Path, expected: &str) -> Option<bool> {
    hash_file(path).map(|actual| actual.eq_ignore_ascii_case(expected))
}
