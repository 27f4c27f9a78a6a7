//! Installing and updating the managed Cloud SDK.
//!
//! An [`InstallTask`] drives one managed SDK to a complete, current state:
//! core install, then the required component, then an update. Tasks never
//! run concurrently; the [`InstallCoordinator`] queues them on a single
//! worker and drops requests that are already queued or running.
//!
//! # Example
//!
//! ```rust,no_run
//! use cloud_sdk_manager::{
//!     GcloudManagedSdk, InstallCoordinator, InstallProgress, InstallReporter, InstallRequest,
//!     InstallStatus, ManagedSdkOptions, SdkComponent,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let sdk = Arc::new(GcloudManagedSdk::new(ManagedSdkOptions::default()).unwrap());
//!     let reporter = InstallReporter {
//!         on_progress: Some(Arc::new(|progress: InstallProgress| println!("{}", progress))),
//!         ..Default::default()
//!     };
//!     let coordinator = InstallCoordinator::with_reporter(sdk.clone(), reporter);
//!
//!     coordinator.ensure_scheduled(InstallRequest::for_sdk(sdk.as_ref(), SdkComponent::Kubectl));
//!     let mut status = coordinator.subscribe();
//!     while status.changed().await.is_ok() {
//!         if let InstallStatus::Finished(outcome) = &*status.borrow() {
//!             println!("{:?}", outcome);
//!             break;
//!         }
//!     }
//! }
//! ```

mod coordinator;
mod errors;
mod outcome;
mod progress;
mod task;

pub use coordinator::{InstallCoordinator, InstallReporter, InstallRequest};
pub use errors::{InstallError, InstallPhase};
pub use outcome::{InstallOutcome, InstallStatus};
pub use progress::{InstallProgress, ProgressCallback, TOTAL_WORK};
pub use task::InstallTask;
