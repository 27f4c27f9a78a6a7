//! Serialized, de-duplicated scheduling of install tasks.

use super::progress::ProgressCallback;
use super::{InstallOutcome, InstallStatus, InstallTask};
use crate::sdk::{ManagedSdk, MessageListener, TracingListener};
use crate::{CancelSource, SdkComponent};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};

/// Identifies an installation: which managed SDK, which component.
///
/// Equal requests are duplicates; scheduling one while an equal request is
/// queued or running does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstallRequest {
    /// Root directory of the managed SDK instance.
    pub root: PathBuf,
    /// Component the SDK must provide.
    pub component: SdkComponent,
}

impl InstallRequest {
    /// Request for `component` in `sdk`.
    pub fn for_sdk(sdk: &dyn ManagedSdk, component: SdkComponent) -> Self {
        Self {
            root: sdk.root(),
            component,
        }
    }
}

/// Where install tasks send their output.
#[derive(Clone)]
pub struct InstallReporter {
    /// Receives raw installer output.
    pub listener: Arc<dyn MessageListener>,
    /// Receives progress stages, if set.
    pub on_progress: Option<ProgressCallback>,
}

impl Default for InstallReporter {
    fn default() -> Self {
        Self {
            listener: Arc::new(TracingListener),
            on_progress: None,
        }
    }
}

struct Shared {
    /// Requests queued or running. Insertion is the scheduling decision.
    in_flight: Mutex<HashSet<InstallRequest>>,
    /// Cancellation for the task currently running.
    current: Mutex<Option<CancelSource>>,
    status: watch::Sender<InstallStatus>,
}

impl Shared {
    fn in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<InstallRequest>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> std::sync::MutexGuard<'_, Option<CancelSource>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Runs install tasks one at a time on a dedicated worker.
///
/// The coordinator is an ordinary value owned by the application; create one
/// per managed SDK and share it (for example through an `Arc`) with every
/// [`SdkManager`](crate::SdkManager) that needs it. Dropping it closes the
/// lane; a task already running finishes first.
///
/// # Example
///
/// ```rust,no_run
/// use cloud_sdk_manager::{
///     GcloudManagedSdk, InstallCoordinator, InstallRequest, ManagedSdkOptions, SdkComponent,
/// };
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let sdk = Arc::new(GcloudManagedSdk::new(ManagedSdkOptions::default()).unwrap());
///     let coordinator = InstallCoordinator::new(sdk.clone());
///
///     let request = InstallRequest::for_sdk(sdk.as_ref(), SdkComponent::AppEngineJava);
///     coordinator.ensure_scheduled(request);
///     println!("{:?}", coordinator.wait_for_outcome().await);
/// }
/// ```
pub struct InstallCoordinator {
    root: PathBuf,
    tx: mpsc::UnboundedSender<InstallRequest>,
    shared: Arc<Shared>,
}

impl InstallCoordinator {
    /// Start a coordinator whose tasks log installer output via `tracing`.
    ///
    /// Must be called within a tokio runtime.
    pub fn new(sdk: Arc<dyn ManagedSdk>) -> Self {
        Self::with_reporter(sdk, InstallReporter::default())
    }

    /// Start a coordinator whose tasks report to `reporter`.
    ///
    /// Must be called within a tokio runtime.
    pub fn with_reporter(sdk: Arc<dyn ManagedSdk>, reporter: InstallReporter) -> Self {
        let root = sdk.root();
        let (tx, rx) = mpsc::unbounded_channel();
        let (status, _) = watch::channel(InstallStatus::Idle);
        let shared = Arc::new(Shared {
            in_flight: Mutex::new(HashSet::new()),
            current: Mutex::new(None),
            status,
        });
        tokio::spawn(worker(sdk, reporter, rx, shared.clone()));
        Self { root, tx, shared }
    }

    /// Queue `request` unless an equal request is already queued or running.
    ///
    /// Returns `true` if the request was queued. Never blocks. Requests for
    /// a different managed SDK root are rejected.
    pub fn ensure_scheduled(&self, request: InstallRequest) -> bool {
        if request.root != self.root {
            tracing::error!(?request, root = %self.root.display(), "install request for a different managed SDK");
            return false;
        }
        let mut in_flight = self.shared.in_flight();
        if in_flight.contains(&request) {
            tracing::debug!(?request, "Cloud SDK install already scheduled");
            return false;
        }
        if self.tx.send(request.clone()).is_err() {
            tracing::error!(?request, "Cloud SDK install worker is gone");
            return false;
        }
        tracing::info!(?request, "scheduled Cloud SDK install");
        in_flight.insert(request);
        self.shared.status.send_replace(InstallStatus::Pending);
        true
    }

    /// Ask the running task to stop at its next checkpoint.
    ///
    /// Returns `false` if no task is running. Queued requests are not
    /// affected; schedule again after observing
    /// [`InstallOutcome::Cancelled`] to start over.
    pub fn cancel_current(&self) -> bool {
        match self.shared.current().as_ref() {
            Some(source) => {
                tracing::info!("cancelling Cloud SDK install");
                source.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether an install is queued or running.
    pub fn is_busy(&self) -> bool {
        !self.shared.in_flight().is_empty()
    }

    /// Current status of the lane.
    pub fn status(&self) -> InstallStatus {
        self.shared.status.borrow().clone()
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<InstallStatus> {
        self.shared.status.subscribe()
    }

    /// Wait until the lane drains and return the last outcome.
    ///
    /// Only the outcome of the task that drained the lane is reported. If
    /// another request was queued behind a cancelled or failed task, that
    /// earlier outcome is never published here or through [`status`](Self::status);
    /// it is logged instead.
    ///
    /// Returns `None` if nothing was ever scheduled or the worker stopped.
    pub async fn wait_for_outcome(&self) -> Option<InstallOutcome> {
        let mut rx = self.subscribe();
        let status = rx.wait_for(|status| !status.is_pending()).await.ok()?;
        status.outcome().cloned()
    }
}

async fn worker(
    sdk: Arc<dyn ManagedSdk>,
    reporter: InstallReporter,
    mut rx: mpsc::UnboundedReceiver<InstallRequest>,
    shared: Arc<Shared>,
) {
    while let Some(request) = rx.recv().await {
        let source = CancelSource::new();
        let mut task = InstallTask::new(sdk.clone(), request.component, source.token())
            .with_listener(reporter.listener.clone());
        if let Some(on_progress) = &reporter.on_progress {
            task = task.with_progress(on_progress.clone());
        }
        *shared.current() = Some(source);

        tracing::debug!(?request, "running Cloud SDK install");
        let outcome = task.run().await;
        tracing::info!(?request, ?outcome, "Cloud SDK install finished");

        *shared.current() = None;
        let mut in_flight = shared.in_flight();
        in_flight.remove(&request);
        if in_flight.is_empty() {
            shared.status.send_replace(InstallStatus::Finished(outcome));
        }
    }
    tracing::debug!("Cloud SDK install worker stopped");
}
