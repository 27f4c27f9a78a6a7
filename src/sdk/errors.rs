//! Error types reported by a managed SDK backend.
//!
//! Every variant carries an actionable fix suggestion so callers can surface
//! it to users unchanged.

use std::any::Any;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while probing or modifying a managed SDK installation.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::ManagedSdkError;
///
/// fn report(error: &ManagedSdkError) {
///     eprintln!("Cloud SDK error: {}", error);
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ManagedSdkError {
    /// The installation exists but could not be verified.
    ///
    /// Typical causes are a corrupted install or a `gcloud` binary that
    /// cannot be executed.
    #[error("Unable to verify the Cloud SDK installation: {message}")]
    Verification {
        /// What failed.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The host operating system or architecture is not supported.
    #[error("Unsupported operating system: {os}")]
    UnsupportedOs {
        /// The detected operating system.
        os: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The installed version differs from the pinned version.
    #[error("Cloud SDK version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version the managed SDK is pinned to.
        expected: String,
        /// Version actually installed.
        found: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A tool needed by the installer is missing.
    #[error("Missing prerequisite: {name}")]
    PrerequisiteMissing {
        /// Name of the missing tool.
        name: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// An external command could not be started.
    #[error("Failed to execute {program}: {message}")]
    CommandExecution {
        /// Program that failed to start.
        program: String,
        /// Description of the failure.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// An external command exited unsuccessfully.
    #[error("{program} {}", describe_exit(*.exit_code))]
    CommandExit {
        /// Program that failed.
        program: String,
        /// Exit code, if the process was not killed by a signal.
        exit_code: Option<i32>,
        /// Captured standard error.
        stderr: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// An external command did not finish in time.
    #[error("{program} timed out after {duration:?}")]
    Timeout {
        /// Program that timed out.
        program: String,
        /// How long it was allowed to run.
        duration: Duration,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// A filesystem operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// An installation step panicked.
    #[error("Installation step panicked: {message}")]
    Panicked {
        /// The panic message, if it carried one.
        message: String,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The operation observed a cancellation request and stopped.
    #[error("Operation cancelled")]
    Cancelled,
}

impl ManagedSdkError {
    /// Get an actionable suggestion for fixing this error.
    ///
    /// ```rust
    /// use cloud_sdk_manager::ManagedSdkError;
    ///
    /// assert!(ManagedSdkError::Cancelled.fix_suggestion().contains("again"));
    /// ```
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::Verification { fix, .. } => fix,
            Self::UnsupportedOs { fix, .. } => fix,
            Self::VersionMismatch { fix, .. } => fix,
            Self::PrerequisiteMissing { fix, .. } => fix,
            Self::CommandExecution { fix, .. } => fix,
            Self::CommandExit { fix, .. } => fix,
            Self::Timeout { fix, .. } => fix,
            Self::Io { fix, .. } => fix,
            Self::Panicked { fix, .. } => fix,
            Self::Cancelled => "Start the installation again when ready",
        }
    }

    /// Whether this error is an environment the installer can never fix.
    ///
    /// Unsupported platforms and version mismatches are not retried.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedOs { .. } | Self::VersionMismatch { .. }
        )
    }

    pub(crate) fn io(context: &str, err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{}: {}", context, err),
            fix: "Check permissions and free space in the managed SDK directory".to_string(),
        }
    }

    pub(crate) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        Self::Panicked {
            message,
            fix: "Retry the installation; report the panic if it persists".to_string(),
        }
    }

    pub(crate) fn verification(message: impl Into<String>) -> Self {
        Self::Verification {
            message: message.into(),
            fix: "Delete the managed Cloud SDK directory so it can be reinstalled".to_string(),
        }
    }
}

/// How a process ended, for messages: `exited with code N` or `was killed by a signal`.
pub(crate) fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with code {}", code),
        None => "was killed by a signal".to_string(),
    }
}
