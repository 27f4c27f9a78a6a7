//! The entry point: hand out a usable SDK or start installing one.

use crate::install::{InstallCoordinator, InstallRequest};
use crate::sdk::{ManagedSdk, ManagedSdkError};
use crate::{probe, SdkComponent, SdkHandle, SdkState};
use std::sync::Arc;
use thiserror::Error;

/// Why [`SdkManager::get_sdk`] could not return a handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SdkError {
    /// The SDK is incomplete or stale; an installation has been scheduled.
    ///
    /// Expected and recoverable. Try again later.
    #[error("{}", .state.description())]
    NotReady {
        /// State observed by the probe.
        state: SdkState,
    },

    /// Probing the SDK failed.
    ///
    /// Nothing is scheduled; the installation on disk may be corrupt.
    #[error("failed to verify the Cloud SDK: {source}")]
    Verification {
        /// Error reported by the managed SDK.
        #[source]
        source: ManagedSdkError,
    },

    /// The SDK can never be made ready in this environment.
    #[error("the managed Cloud SDK is unsupported: {source}")]
    Unsupported {
        /// Error reported by the managed SDK.
        #[source]
        source: ManagedSdkError,
    },
}

impl SdkError {
    /// Whether the caller should simply retry later.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady { .. })
    }

    /// Actionable suggestion for resolving the error.
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::NotReady { .. } => {
                "Wait for the background installation to finish, then try again"
            }
            Self::Verification { source } | Self::Unsupported { source } => {
                source.fix_suggestion()
            }
        }
    }
}

/// Configuration for [`SdkManager`].
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::{ManagerOptions, SdkComponent};
///
/// let opts = ManagerOptions {
///     component: SdkComponent::Kubectl,
/// };
/// assert_eq!(ManagerOptions::default().component, SdkComponent::AppEngineJava);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManagerOptions {
    /// Component every handed-out SDK must provide.
    ///
    /// Default: [`SdkComponent::AppEngineJava`]
    pub component: SdkComponent,
}

/// Hands out a ready SDK, scheduling installation when it is not.
///
/// `get_sdk` probes the managed SDK, which may run up to three `gcloud`
/// processes. Call it from a background task, never in a loop.
///
/// # Example
///
/// ```rust,no_run
/// use cloud_sdk_manager::{
///     GcloudManagedSdk, InstallCoordinator, ManagedSdkOptions, SdkError, SdkManager,
/// };
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let sdk = Arc::new(GcloudManagedSdk::new(ManagedSdkOptions::default()).unwrap());
///     let coordinator = Arc::new(InstallCoordinator::new(sdk.clone()));
///     let manager = SdkManager::new(sdk, coordinator);
///
///     match manager.get_sdk().await {
///         Ok(handle) => println!("gcloud at {}", handle.gcloud_path().display()),
///         Err(SdkError::NotReady { state }) => {
///             println!("{}; installing in the background", state.description());
///             println!("{:?}", manager.coordinator().wait_for_outcome().await);
///         }
///         Err(e) => eprintln!("{} ({})", e, e.fix_suggestion()),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct SdkManager {
    sdk: Arc<dyn ManagedSdk>,
    coordinator: Arc<InstallCoordinator>,
    options: ManagerOptions,
}

impl SdkManager {
    /// Create a manager requiring the default component.
    pub fn new(sdk: Arc<dyn ManagedSdk>, coordinator: Arc<InstallCoordinator>) -> Self {
        Self::with_options(sdk, coordinator, ManagerOptions::default())
    }

    /// Create a manager with custom options.
    pub fn with_options(
        sdk: Arc<dyn ManagedSdk>,
        coordinator: Arc<InstallCoordinator>,
        options: ManagerOptions,
    ) -> Self {
        Self {
            sdk,
            coordinator,
            options,
        }
    }

    /// The coordinator installations are scheduled on.
    pub fn coordinator(&self) -> &Arc<InstallCoordinator> {
        &self.coordinator
    }

    /// Return a handle to the SDK if it is ready.
    ///
    /// # Errors
    ///
    /// - [`SdkError::NotReady`] if anything is missing or stale. An
    ///   installation is scheduled before returning (at most one per request).
    /// - [`SdkError::Verification`] if probing failed.
    /// - [`SdkError::Unsupported`] on an unsupported platform or when a fixed
    ///   SDK version conflicts with the installed one.
    pub async fn get_sdk(&self) -> Result<SdkHandle, SdkError> {
        let component = self.options.component;
        let state = match probe(self.sdk.as_ref(), component).await {
            Ok(state) => state,
            Err(source) if source.is_fatal() => {
                tracing::error!(error = %source, fix = source.fix_suggestion(), "managed Cloud SDK is unsupported");
                return Err(SdkError::Unsupported { source });
            }
            Err(source) => {
                tracing::warn!(error = %source, "failed to verify the managed Cloud SDK");
                return Err(SdkError::Verification { source });
            }
        };

        if state.is_ready() {
            return Ok(SdkHandle::new(self.sdk.sdk_home()));
        }

        tracing::debug!(?state, ?component, "managed Cloud SDK is not ready");
        self.coordinator
            .ensure_scheduled(InstallRequest::for_sdk(self.sdk.as_ref(), component));
        Err(SdkError::NotReady { state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockSdk, Probe, Step};
    use crate::InstallOutcome;
    use std::time::Duration;

    const JAVA: SdkComponent = SdkComponent::AppEngineJava;

    fn manager(sdk: &MockSdk) -> SdkManager {
        let sdk: Arc<dyn ManagedSdk> = Arc::new(sdk.clone());
        let coordinator = Arc::new(InstallCoordinator::new(sdk.clone()));
        SdkManager::new(sdk, coordinator)
    }

    async fn wait(manager: &SdkManager) -> Option<InstallOutcome> {
        tokio::time::timeout(
            Duration::from_secs(5),
            manager.coordinator().wait_for_outcome(),
        )
        .await
        .expect("install should finish")
    }

    #[tokio::test]
    async fn test_ready_sdk_returns_handle() {
        let sdk = MockSdk::new(true, true, true);
        let manager = manager(&sdk);

        let handle = manager.get_sdk().await.unwrap();
        assert_eq!(handle.home(), sdk.sdk_home().as_path());
        assert!(sdk.steps().is_empty());
        assert!(!manager.coordinator().is_busy());
    }

    #[tokio::test]
    async fn test_not_installed_schedules_once() {
        let sdk = MockSdk::new(false, false, false);
        sdk.keep_state();
        let gate = sdk.gate();
        let manager = manager(&sdk);

        let err = manager.get_sdk().await.unwrap_err();
        assert_eq!(
            err,
            SdkError::NotReady {
                state: SdkState::NotInstalled
            }
        );
        assert!(err.is_not_ready());
        assert!(manager.coordinator().is_busy());

        // A second caller while the install is in flight schedules nothing new.
        let err = manager.get_sdk().await.unwrap_err();
        assert!(err.is_not_ready());
        let request = InstallRequest::for_sdk(&sdk, SdkComponent::AppEngineJava);
        assert!(!manager.coordinator().ensure_scheduled(request));

        gate.add_permits(3);
        assert_eq!(wait(&manager).await, Some(InstallOutcome::Success));
        assert_eq!(sdk.steps(), vec![Step::Core, Step::Component(JAVA), Step::Update]);
    }

    #[tokio::test]
    async fn test_stale_sdk_is_not_ready() {
        let sdk = MockSdk::new(true, true, false);
        let manager = manager(&sdk);

        let err = manager.get_sdk().await.unwrap_err();
        assert_eq!(
            err,
            SdkError::NotReady {
                state: SdkState::Stale
            }
        );
    }

    #[tokio::test]
    async fn test_ready_after_install_completes() {
        let sdk = MockSdk::new(true, false, true);
        let manager = manager(&sdk);

        assert!(manager.get_sdk().await.is_err());
        assert_eq!(wait(&manager).await, Some(InstallOutcome::Success));

        let handle = manager.get_sdk().await.unwrap();
        assert!(handle.home().ends_with("google-cloud-sdk"));
        assert_eq!(sdk.steps(), vec![Step::Component(JAVA)]);
    }

    #[tokio::test]
    async fn test_verification_error_is_surfaced() {
        let sdk = MockSdk::new(true, true, true);
        sdk.fail_probe(ManagedSdkError::Verification {
            message: "unparseable version output".to_string(),
            fix: "Reinstall the SDK".to_string(),
        });
        let manager = manager(&sdk);

        match manager.get_sdk().await {
            Err(SdkError::Verification { source }) => {
                assert!(matches!(source, ManagedSdkError::Verification { .. }));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!manager.coordinator().is_busy());
        assert!(sdk.steps().is_empty());
    }

    #[tokio::test]
    async fn test_fatal_error_is_unsupported() {
        let sdk = MockSdk::new(false, false, false);
        sdk.fail_probe(ManagedSdkError::VersionMismatch {
            expected: "400.0.0".to_string(),
            found: "401.0.0".to_string(),
            fix: "Remove the managed SDK directory".to_string(),
        });
        let manager = manager(&sdk);

        let err = manager.get_sdk().await.unwrap_err();
        assert!(matches!(err, SdkError::Unsupported { .. }));
        assert_eq!(err.fix_suggestion(), "Remove the managed SDK directory");
        assert!(!manager.coordinator().is_busy());
    }

    #[tokio::test]
    async fn test_custom_component() {
        let sdk = MockSdk::new(true, false, true);
        let sdk_dyn: Arc<dyn ManagedSdk> = Arc::new(sdk.clone());
        let coordinator = Arc::new(InstallCoordinator::new(sdk_dyn.clone()));
        let manager = SdkManager::with_options(
            sdk_dyn,
            coordinator,
            ManagerOptions {
                component: SdkComponent::Kubectl,
            },
        );

        assert!(manager.get_sdk().await.is_err());
        assert_eq!(
            sdk.probes(),
            vec![Probe::Installed, Probe::Component(SdkComponent::Kubectl)]
        );
        let request = InstallRequest::for_sdk(&sdk, SdkComponent::Kubectl);
        assert!(!manager.coordinator().ensure_scheduled(request));

        assert_eq!(wait(&manager).await, Some(InstallOutcome::Success));
        assert_eq!(sdk.steps(), vec![Step::Component(SdkComponent::Kubectl)]);
    }
}
