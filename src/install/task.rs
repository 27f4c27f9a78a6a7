//! The install task: bring a managed SDK to a complete, current state.

use super::progress::ProgressCallback;
use super::{InstallError, InstallOutcome, InstallPhase, InstallProgress};
use crate::sdk::{ManagedSdk, ManagedSdkError, MessageListener, NoOpListener};
use crate::{CancelToken, SdkComponent};
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// One run of the install algorithm.
///
/// Steps run strictly in the order core install, component install, update.
/// Each step is probed first and skipped when already satisfied, so a task
/// can be rerun safely after a partial failure. A failed step aborts the run.
///
/// The task is not reentrant and must not run concurrently with another task
/// for the same managed SDK; [`InstallCoordinator`](crate::InstallCoordinator)
/// enforces that.
///
/// # Example
///
/// ```rust,no_run
/// use cloud_sdk_manager::{
///     CancelSource, GcloudManagedSdk, InstallProgress, InstallTask, ManagedSdkOptions,
///     SdkComponent,
/// };
/// use std::sync::Arc;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let sdk = Arc::new(GcloudManagedSdk::new(ManagedSdkOptions::default()).unwrap());
///     let cancel = CancelSource::new();
///     let task = InstallTask::new(sdk, SdkComponent::AppEngineJava, cancel.token())
///         .with_progress(Arc::new(|progress: InstallProgress| println!("{}", progress)));
///     println!("{:?}", task.run().await);
/// }
/// ```
pub struct InstallTask {
    sdk: Arc<dyn ManagedSdk>,
    component: SdkComponent,
    cancel: CancelToken,
    listener: Arc<dyn MessageListener>,
    on_progress: Option<ProgressCallback>,
}

impl InstallTask {
    /// Create a task installing `component` into `sdk`, observing `cancel`.
    pub fn new(sdk: Arc<dyn ManagedSdk>, component: SdkComponent, cancel: CancelToken) -> Self {
        Self {
            sdk,
            component,
            cancel,
            listener: Arc::new(NoOpListener),
            on_progress: None,
        }
    }

    /// Stream installer output to `listener`.
    pub fn with_listener(mut self, listener: Arc<dyn MessageListener>) -> Self {
        self.listener = listener;
        self
    }

    /// Report stages to `on_progress`.
    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Run every unsatisfied step and report the outcome.
    pub async fn run(&self) -> InstallOutcome {
        self.report(InstallProgress::Started);

        match self.run_steps().await {
            Ok(()) => {
                self.report(InstallProgress::Completed);
                InstallOutcome::Success
            }
            Err(InstallError {
                phase,
                source: ManagedSdkError::Cancelled,
            }) => {
                tracing::info!(%phase, "Cloud SDK installation cancelled");
                InstallOutcome::Cancelled
            }
            Err(error) => {
                if error.is_fatal() {
                    tracing::error!(%error, "Cloud SDK cannot be installed in this environment");
                } else {
                    tracing::warn!(%error, fix = error.fix_suggestion(), "failed to install the Google Cloud SDK");
                }
                InstallOutcome::Failed(error)
            }
        }
    }

    async fn run_steps(&self) -> Result<(), InstallError> {
        for phase in [InstallPhase::Core, InstallPhase::Component, InstallPhase::Update] {
            self.checkpoint(phase)?;
            // A panicking backend or listener fails this phase instead of the caller.
            AssertUnwindSafe(self.run_phase(phase))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ManagedSdkError::panicked(payload)))
                .map_err(at(phase))?;
        }
        Ok(())
    }

    /// Probe one step and run its installer if the step is unsatisfied.
    async fn run_phase(&self, phase: InstallPhase) -> Result<(), ManagedSdkError> {
        let sdk = self.sdk.as_ref();
        let (satisfied, progress) = match phase {
            InstallPhase::Core => (sdk.is_installed().await?, InstallProgress::InstallingCore),
            InstallPhase::Component => (
                sdk.has_component(self.component).await?,
                InstallProgress::InstallingComponent {
                    component: self.component,
                },
            ),
            InstallPhase::Update => (sdk.is_up_to_date().await?, InstallProgress::Updating),
        };
        if satisfied {
            return Ok(());
        }

        self.report(progress);
        let installer = match phase {
            InstallPhase::Core => sdk.new_installer()?,
            InstallPhase::Component => sdk.new_component_installer(self.component)?,
            InstallPhase::Update => sdk.new_updater()?,
        };
        installer.run(self.listener.as_ref(), &self.cancel).await
    }

    fn checkpoint(&self, phase: InstallPhase) -> Result<(), InstallError> {
        if self.cancel.is_cancelled() {
            return Err(InstallError {
                phase,
                source: ManagedSdkError::Cancelled,
            });
        }
        Ok(())
    }

    fn report(&self, progress: InstallProgress) {
        tracing::debug!(%progress, "install progress");
        if let Some(on_progress) = &self.on_progress {
            if panic::catch_unwind(AssertUnwindSafe(|| on_progress(progress))).is_err() {
                tracing::warn!("install progress callback panicked");
            }
        }
    }
}

fn at(phase: InstallPhase) -> impl Fn(ManagedSdkError) -> InstallError {
    move |source| InstallError { phase, source }
}
