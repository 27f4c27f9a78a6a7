//! Progress reporting for installation tasks.
//!
//! [`InstallProgress`] names the discrete stages of an install task. Stages
//! that do work carry a relative weight so a progress bar can advance
//! proportionally (the component install dominates).

use crate::SdkComponent;
use std::fmt;
use std::sync::Arc;

/// Total work units of a full install: core + component + update.
pub const TOTAL_WORK: u32 = 50;

/// Progress stages of an install task.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::{InstallProgress, SdkComponent};
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::InstallingComponent { component } => {
///             println!("Installing the {} component...", component.display_name());
///         }
///         other => println!("{}", other),
///     }
/// }
/// # on_progress(InstallProgress::InstallingComponent { component: SdkComponent::AppEngineJava });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    /// The task started.
    Started,
    /// Installing the core SDK.
    InstallingCore,
    /// Installing a component.
    InstallingComponent {
        /// The component being installed.
        component: SdkComponent,
    },
    /// Updating the SDK to the latest release.
    Updating,
    /// Every step is satisfied.
    Completed,
}

impl InstallProgress {
    /// Short description of the stage.
    ///
    /// ```rust
    /// use cloud_sdk_manager::InstallProgress;
    ///
    /// assert_eq!(InstallProgress::Updating.description(), "Updating the SDK");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Started => "Installing the Google Cloud SDK",
            Self::InstallingCore => "Installing the core SDK",
            Self::InstallingComponent { .. } => "Installing a component",
            Self::Updating => "Updating the SDK",
            Self::Completed => "Cloud SDK installation complete",
        }
    }

    /// Work units this stage accounts for, out of [`TOTAL_WORK`].
    pub fn work(&self) -> u32 {
        match self {
            Self::InstallingCore => 10,
            Self::InstallingComponent { .. } => 30,
            Self::Updating => 10,
            Self::Started | Self::Completed => 0,
        }
    }

    /// Check if this stage indicates completion.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for InstallProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => f.write_str("Installing the Google Cloud SDK... (may take up to several minutes)"),
            Self::InstallingComponent { component } => {
                write!(f, "Installing the {} component...", component.display_name())
            }
            other => write!(f, "{}...", other.description()),
        }
    }
}

/// Callback receiving progress stages.
pub type ProgressCallback = Arc<dyn Fn(InstallProgress) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptions() {
        assert_eq!(
            InstallProgress::InstallingCore.description(),
            "Installing the core SDK"
        );
        assert_eq!(
            InstallProgress::Completed.description(),
            "Cloud SDK installation complete"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(
            InstallProgress::InstallingComponent {
                component: SdkComponent::AppEngineJava
            }
            .to_string(),
            "Installing the App Engine Java component..."
        );
        assert_eq!(InstallProgress::Updating.to_string(), "Updating the SDK...");
    }

    #[test]
    fn test_work_adds_up() {
        let total: u32 = [
            InstallProgress::Started,
            InstallProgress::InstallingCore,
            InstallProgress::InstallingComponent {
                component: SdkComponent::AppEngineJava,
            },
            InstallProgress::Updating,
            InstallProgress::Completed,
        ]
        .iter()
        .map(InstallProgress::work)
        .sum();
        assert_eq!(total, TOTAL_WORK);
    }

    #[test]
    fn test_is_complete() {
        assert!(InstallProgress::Completed.is_complete());
        assert!(!InstallProgress::Started.is_complete());
        assert!(!InstallProgress::Updating.is_complete());
    }
}
