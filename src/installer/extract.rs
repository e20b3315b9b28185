//! Zip extraction with Unix mode preservation.

use anyhow::{Context, Result};
use std::fs::{File, Permissions};
use std::io::Read;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path};

const FILE_TYPE_MASK: u32 = 0o170_000;
const SYMLINK_TYPE: u32 = 0o120_000;

/// Extract every entry of `archive_path` below `dest_dir`.
///
/// Entries keep their stored permission bits. Symlink entries are recreated as
/// symlinks. Entries whose names would escape `dest_dir` are refused.
///
/// Returns the number of entries extracted.
///
/// # Errors
///
/// Returns an error when the archive cannot be opened or parsed, or when any
/// entry cannot be written. The extraction is not rolled back: callers
/// extract into a scratch directory they own.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open archive: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {}", archive_path.display()))?;

    std::fs::create_dir_all(dest_dir)
        .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

    for i in 0..archive.len() {
        let mut entry =
            archive.by_index(i).with_context(|| format!("Failed to read archive entry {i}"))?;

        let entry_path = entry
            .enclosed_name()
            .with_context(|| format!("Invalid entry path in archive: {}", entry.name()))?;

        if entry_path.is_absolute()
            || entry_path.components().any(|c| matches!(c, Component::ParentDir))
        {
            anyhow::bail!("Refusing to extract path outside the archive root: {}", entry_path.display());
        }

        let output_path = dest_dir.join(&entry_path);
        let mode = entry.unix_mode();

        if entry.is_dir() {
            std::fs::create_dir_all(&output_path)
                .with_context(|| format!("Failed to create directory: {}", output_path.display()))?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        if mode.is_some_and(|m| m & FILE_TYPE_MASK == SYMLINK_TYPE) {
            let mut link_target = String::new();
            entry
                .read_to_string(&mut link_target)
                .with_context(|| format!("Failed to read link target: {}", entry_path.display()))?;
            std::os::unix::fs::symlink(&link_target, &output_path)
                .with_context(|| format!("Failed to create symlink: {}", output_path.display()))?;
            continue;
        }

        let mut outfile = File::create(&output_path)
            .with_context(|| format!("Failed to create file: {}", output_path.display()))?;
        std::io::copy(&mut entry, &mut outfile)
            .with_context(|| format!("Failed to extract: {}", output_path.display()))?;

        if let Some(mode) = mode {
            std::fs::set_permissions(&output_path, Permissions::from_mode(mode & 0o7777))
                .with_context(|| format!("Failed to set permissions: {}", output_path.display()))?;
        }
    }

    Ok(archive.len())
}
