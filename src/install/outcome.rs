//! Results of install tasks and the coordinator's status.

use super::InstallError;

/// Result of one install task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Every step is satisfied.
    Success,
    /// The task stopped at a cancellation checkpoint.
    Cancelled,
    /// A step failed; later steps were not attempted.
    Failed(InstallError),
}

impl InstallOutcome {
    /// Whether the SDK should now be ready.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What the install lane is doing.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::{InstallOutcome, InstallStatus};
///
/// let status = InstallStatus::Finished(InstallOutcome::Cancelled);
/// assert!(!status.is_pending());
/// assert_eq!(status.outcome(), Some(&InstallOutcome::Cancelled));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstallStatus {
    /// Nothing has been scheduled yet.
    #[default]
    Idle,
    /// At least one request is queued or running.
    Pending,
    /// The lane drained; holds the outcome of the last run.
    Finished(InstallOutcome),
}

impl InstallStatus {
    /// Whether an install is queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Outcome of the last run, once the lane drained.
    pub fn outcome(&self) -> Option<&InstallOutcome> {
        match self {
            Self::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}
