//! A [`HostEnvironment`] fake that records ownership changes.

use crate::host::HostEnvironment;
use anyhow::{Result, bail};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// One recorded `chown` or `chown_recursive` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChownCall {
    pub path: PathBuf,
    pub user: String,
    pub recursive: bool,
}

/// Configurable host for tests.
///
/// Ownership calls are recorded instead of performed. They fail for an empty
/// user, mirroring the real lookup, or for every user after
/// [`RecordingHost::failing_chown`].
#[derive(Debug)]
pub struct RecordingHost {
    elevated: bool,
    user: String,
    home: PathBuf,
    executables: HashMap<String, PathBuf>,
    fail_chown: bool,
    calls: RefCell<Vec<ChownCall>>,
}

impl RecordingHost {
    /// Elevated host whose invoking user `tester` lives in `home`
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            elevated: true,
            user: "tester".to_string(),
            home: home.into(),
            executables: HashMap::new(),
            fail_chown: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }

    pub fn with_user(mut self, user: &str) -> Self {
        self.user = user.to_string();
        self
    }

    pub fn with_executable(mut self, name: &str, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(name.to_string(), path.into());
        self
    }

    pub fn failing_chown(mut self) -> Self {
        self.fail_chown = true;
        self
    }

    pub fn chown_calls(&self) -> Vec<ChownCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, path: &Path, user: &str, recursive: bool) -> Result<()> {
        self.calls.borrow_mut().push(ChownCall {
            path: path.to_path_buf(),
            user: user.to_string(),
            recursive,
        });
        if user.is_empty() {
            bail!("Unknown user ''");
        }
        if self.fail_chown {
            bail!("Operation not permitted: {}", path.display());
        }
        Ok(())
    }
}

impl HostEnvironment for RecordingHost {
    fn is_elevated(&self) -> bool {
        self.elevated
    }

    fn invoking_user(&self) -> String {
        self.user.clone()
    }

    fn home_dir_of(&self, _user: &str) -> Result<PathBuf> {
        Ok(self.home.clone())
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables.get(name).cloned()
    }

    fn chown(&self, path: &Path, user: &str) -> Result<()> {
        self.record(path, user, false)
    }

    fn chown_recursive(&self, path: &Path, user: &str) -> Result<()> {
        self.record(path, user, true)
    }
}
