//! Privilege and host environment lookups.
//!
//! Every question the installer asks about the machine it runs on goes
//! through [`HostEnvironment`]: whether the process is elevated, which user
//! asked for the run, where that user's home is, where an executable lives on
//! the search path, and how to hand files back to that user. [`SystemHost`]
//! answers them for real; tests substitute a recording fake.
//!
//! # Invoking User
//!
//! The installer runs under `sudo`, so the effective user is root while the
//! files it creates in a home directory must belong to the person who typed
//! the command. The invoking user is resolved as:
//!
//! 1. `SUDO_USER`, when set
//! 2. `USER`, when set
//! 3. the empty string
//!
//! An empty user is not an error. Ownership changes are still attempted and
//! fail as best-effort steps.

use crate::constants::{SUDO_USER_ENV, USER_ENV};
use crate::utils::platform::get_home_dir;
use anyhow::{Context, Result};
use nix::unistd::{Uid, User};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Host queries and ownership changes needed by the installer.
pub trait HostEnvironment {
    /// Whether the process runs with superuser privilege.
    fn is_elevated(&self) -> bool;

    /// Name of the user on whose behalf the installer runs; may be empty.
    fn invoking_user(&self) -> String;

    /// Home directory of `user`.
    ///
    /// # Errors
    ///
    /// Returns an error when no home directory can be determined.
    fn home_dir_of(&self, user: &str) -> Result<PathBuf>;

    /// Absolute path of `name` on the executable search path, if present.
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Give `path` itself (not its contents) to `user` and the user's group.
    ///
    /// # Errors
    ///
    /// Returns an error when the user is unknown or the change is refused.
    fn chown(&self, path: &Path, user: &str) -> Result<()>;

    /// Give `path` and everything below it to `user` and the user's group.
    ///
    /// # Errors
    ///
    /// Returns an error on the first entry that cannot be changed.
    fn chown_recursive(&self, path: &Path, user: &str) -> Result<()>;
}

/// Resolve the invoking user from the values of `SUDO_USER` and `USER`.
#[must_use]
pub fn resolve_invoking_user(sudo_user: Option<String>, user: Option<String>) -> String {
    sudo_user.or(user).unwrap_or_default()
}

/// [`HostEnvironment`] backed by the real process and filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHost;

impl SystemHost {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn lookup(user: &str) -> Result<User> {
        User::from_name(user)
            .with_context(|| format!("Failed to look up user '{user}'"))?
            .ok_or_else(|| anyhow::anyhow!("Unknown user '{user}'"))
    }

    fn lchown_as(path: &Path, account: &User) -> Result<()> {
        std::os::unix::fs::lchown(path, Some(account.uid.as_raw()), Some(account.gid.as_raw()))
            .with_context(|| {
                format!("Failed to change owner of {} to {}", path.display(), account.name)
            })
    }
}

impl HostEnvironment for SystemHost {
    fn is_elevated(&self) -> bool {
        Uid::effective().is_root()
    }

    fn invoking_user(&self) -> String {
        resolve_invoking_user(std::env::var(SUDO_USER_ENV).ok(), std::env::var(USER_ENV).ok())
    }

    fn home_dir_of(&self, user: &str) -> Result<PathBuf> {
        match User::from_name(user) {
            Ok(Some(account)) => Ok(account.dir),
            Ok(None) | Err(_) => {
                tracing::debug!("No passwd entry for '{}', using the process home directory", user);
                get_home_dir()
            }
        }
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    fn chown(&self, path: &Path, user: &str) -> Result<()> {
        let account = Self::lookup(user)?;
        Self::lchown_as(path, &account)
    }

    fn chown_recursive(&self, path: &Path, user: &str) -> Result<()> {
        let account = Self::lookup(user)?;
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            Self::lchown_as(entry.path(), &account)?;
        }
        Ok(())
    }
}
