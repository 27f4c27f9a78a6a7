//! Failures of an install task.

use crate::sdk::ManagedSdkError;
use std::fmt;
use thiserror::Error;

/// The step of an install task that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstallPhase {
    /// Installing the core SDK.
    Core,
    /// Installing the required component.
    Component,
    /// Updating to the latest release.
    Update,
}

impl fmt::Display for InstallPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Core => "core install",
            Self::Component => "component install",
            Self::Update => "update",
        })
    }
}

/// An install task step failed.
///
/// Recorded as the task's outcome; the next scheduling attempt starts a fresh
/// run, which skips every step already satisfied.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::{InstallError, InstallPhase, ManagedSdkError};
///
/// let error = InstallError {
///     phase: InstallPhase::Core,
///     source: ManagedSdkError::Cancelled,
/// };
/// assert!(error.to_string().starts_with("core install failed"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} failed: {source}")]
pub struct InstallError {
    /// Step that failed.
    pub phase: InstallPhase,
    /// Error reported by the managed SDK.
    #[source]
    pub source: ManagedSdkError,
}

impl InstallError {
    /// Whether retrying can never succeed (unsupported OS, version mismatch).
    pub fn is_fatal(&self) -> bool {
        self.source.is_fatal()
    }

    /// Actionable suggestion for resolving the failure.
    pub fn fix_suggestion(&self) -> &str {
        self.source.fix_suggestion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_phase() {
        let error = InstallError {
            phase: InstallPhase::Component,
            source: ManagedSdkError::CommandExit {
                program: "gcloud".to_string(),
                exit_code: Some(1),
                stderr: "ERROR".to_string(),
                fix: "Retry".to_string(),
            },
        };
        assert_eq!(
            error.to_string(),
            "component install failed: gcloud exited with code 1"
        );
        assert_eq!(error.fix_suggestion(), "Retry");
        assert!(!error.is_fatal());
    }

    #[test]
    fn test_fatal_follows_source() {
        let error = InstallError {
            phase: InstallPhase::Update,
            source: ManagedSdkError::VersionMismatch {
                expected: "400.0.0".to_string(),
                found: "LATEST".to_string(),
                fix: "Use latest".to_string(),
            },
        };
        assert!(error.is_fatal());
    }
}
