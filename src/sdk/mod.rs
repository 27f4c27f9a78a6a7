//! The managed Cloud SDK capability.
//!
//! [`ManagedSdk`] is the surface the orchestrator depends on: three read-only
//! probes, three installer factories and the SDK home path. The probes may
//! run external processes and take seconds. Installers are long-running,
//! stream messages to a [`MessageListener`] and honour a [`CancelToken`]
//! between their own phases.
//!
//! [`GcloudManagedSdk`] implements the capability on top of the real
//! `gcloud` CLI.

mod errors;
mod gcloud;

pub use errors::ManagedSdkError;
pub use gcloud::{GcloudManagedSdk, ManagedSdkOptions, SdkVersion};

use crate::{CancelToken, SdkComponent};
use futures::future::BoxFuture;
use std::path::PathBuf;

/// Receives raw output lines from installers.
pub trait MessageListener: Send + Sync {
    /// Called once per line of installer output.
    fn message(&self, raw: &str);
}

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpListener;

impl MessageListener for NoOpListener {
    fn message(&self, _raw: &str) {}
}

/// Forwards messages to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl MessageListener for TracingListener {
    fn message(&self, raw: &str) {
        tracing::debug!(target: "cloud_sdk_manager::installer", "{}", raw);
    }
}

/// A blocking installation step: core install, component install or update.
///
/// `run` must be safe to call when the step is already satisfied, and must
/// return [`ManagedSdkError::Cancelled`] if it stops because of `cancel`.
pub trait SdkInstaller: Send + Sync {
    /// Run the step to completion.
    fn run<'a>(
        &'a self,
        listener: &'a dyn MessageListener,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<(), ManagedSdkError>>;
}

/// A managed Cloud SDK instance living in one directory.
pub trait ManagedSdk: Send + Sync {
    /// Directory that owns this managed instance. Two instances with the same
    /// root manage the same files.
    fn root(&self) -> PathBuf;

    /// The SDK home (the `google-cloud-sdk` directory). Only meaningful once
    /// [`is_installed`](Self::is_installed) returns true.
    fn sdk_home(&self) -> PathBuf;

    /// Whether the core SDK is present and verifiable.
    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>>;

    /// Whether `component` is installed.
    fn has_component(
        &self,
        component: SdkComponent,
    ) -> BoxFuture<'_, Result<bool, ManagedSdkError>>;

    /// Whether the installation is at the latest available version.
    fn is_up_to_date(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>>;

    /// Installer for the core SDK.
    fn new_installer(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError>;

    /// Installer for a single component.
    fn new_component_installer(
        &self,
        component: SdkComponent,
    ) -> Result<Box<dyn SdkInstaller>, ManagedSdkError>;

    /// Updater bringing the SDK to the latest version.
    fn new_updater(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError>;
}
