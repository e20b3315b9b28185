//! Outcome types returned by the mutating installer components.

use std::fmt;

/// Result of one mutating operation.
///
/// Failure reasons are short, stable strings. They are meant to be shown to
/// the operator as-is, so they never embed raw I/O error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallResult {
    /// The operation reached its final state.
    Success,
    /// The operation was abandoned; the payload says which step gave up.
    Failure(String),
}

impl InstallResult {
    /// Returns `true` for [`InstallResult::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for InstallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure(reason) => write!(f, "failure: {reason}"),
        }
    }
}

/// A best-effort step that failed without changing the operation's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestEffortFailure {
    /// Short name of the step, e.g. `prune` or `chown`
    pub step: String,
    /// What went wrong
    pub reason: String,
}

impl fmt::Display for BestEffortFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.step, self.reason)
    }
}

/// An [`InstallResult`] together with the best-effort failures seen on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Overall result
    pub result: InstallResult,
    /// Swallowed failures, in the order they happened
    pub warnings: Vec<BestEffortFailure>,
}

impl InstallReport {
    /// A successful report with no warnings.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            result: InstallResult::Success,
            warnings: Vec::new(),
        }
    }

    /// A failed report with no warnings.
    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            result: InstallResult::Failure(reason.into()),
            warnings: Vec::new(),
        }
    }

    /// Record a best-effort failure. Logged at `warn`.
    pub fn record(&mut self, step: impl Into<String>, reason: impl Into<String>) {
        let failure = BestEffortFailure {
            step: step.into(),
            reason: reason.into(),
        };
        tracing::warn!("Best-effort step '{}' failed: {}", failure.step, failure.reason);
        self.warnings.push(failure);
    }

    /// Replace the result, keeping the warnings gathered so far.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.result = InstallResult::Failure(reason.into());
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.result.is_success()
    }
}
