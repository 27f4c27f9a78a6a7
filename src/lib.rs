//! # cloud-sdk-manager
//!
//! Acquisition and installation of a managed Google Cloud SDK.
//!
//! Tools that depend on `gcloud` ask [`SdkManager::get_sdk`] for an SDK.
//! When the managed installation is complete and current they get a
//! [`SdkHandle`] immediately. Otherwise an installation is scheduled in the
//! background and the caller gets [`SdkError::NotReady`] and tries again
//! later.
//!
//! ## Features
//!
//! - `SdkManager` facade: probe, hand out a handle or schedule an install
//! - `InstallCoordinator` running at most one install task at a time, with
//!   duplicate requests dropped, progress reporting and cancellation
//! - `GcloudManagedSdk` backend downloading, installing and updating the real
//!   SDK under a per-user cache directory
//! - `ManagedSdk` trait so the orchestration can run against any backend
//!
//! ## Example
//!
//! ```rust,no_run
//! use cloud_sdk_manager::{
//!     GcloudManagedSdk, InstallCoordinator, ManagedSdkOptions, SdkError, SdkManager,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk = Arc::new(GcloudManagedSdk::new(ManagedSdkOptions::default())?);
//!     let coordinator = Arc::new(InstallCoordinator::new(sdk.clone()));
//!     let manager = SdkManager::new(sdk, coordinator);
//!
//!     loop {
//!         match manager.get_sdk().await {
//!             Ok(handle) => {
//!                 println!("Cloud SDK ready at {}", handle.home().display());
//!                 return Ok(());
//!             }
//!             Err(SdkError::NotReady { state }) => {
//!                 println!("{}, installing...", state.description());
//!                 manager.coordinator().wait_for_outcome().await;
//!             }
//!             Err(e) => return Err(e.into()),
//!         }
//!     }
//! }
//! ```

mod cancel;
mod component;
mod install;
mod manager;
mod prober;
mod sdk;
mod state;

#[cfg(test)]
mod mock;

pub use cancel::{CancelSource, CancelToken};
pub use component::SdkComponent;
pub use install::{
    InstallCoordinator, InstallError, InstallOutcome, InstallPhase, InstallProgress,
    InstallReporter, InstallRequest, InstallStatus, InstallTask, ProgressCallback, TOTAL_WORK,
};
pub use manager::{ManagerOptions, SdkError, SdkManager};
pub use prober::probe;
pub use sdk::{
    GcloudManagedSdk, ManagedSdk, ManagedSdkError, ManagedSdkOptions, MessageListener,
    NoOpListener, SdkInstaller, SdkVersion, TracingListener,
};
pub use state::{SdkHandle, SdkState};
