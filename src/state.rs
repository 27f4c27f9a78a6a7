//! Probe results and the handle to a usable SDK.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// State of the managed SDK as observed by one probe.
///
/// Derived fresh on every probe and never cached: the SDK directory can be
/// changed by other processes at any time.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::SdkState;
///
/// assert!(SdkState::Ready.is_ready());
/// assert!(SdkState::Stale.needs_install());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SdkState {
    /// The core SDK is absent.
    NotInstalled,
    /// The core SDK is present but the required component is not.
    MissingComponent,
    /// Everything is present but a newer release is available.
    Stale,
    /// Installed, complete and current.
    Ready,
}

impl SdkState {
    /// Whether the SDK can be used as is.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Whether an installation task has work to do.
    pub fn needs_install(&self) -> bool {
        !self.is_ready()
    }

    /// Human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            Self::NotInstalled => "Cloud SDK is not installed",
            Self::MissingComponent => "Cloud SDK is missing a required component",
            Self::Stale => "Cloud SDK is out of date",
            Self::Ready => "Cloud SDK is ready",
        }
    }
}

/// A usable Cloud SDK installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkHandle {
    home: PathBuf,
}

impl SdkHandle {
    /// Bind a handle to an SDK home directory.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The SDK home (the `google-cloud-sdk` directory).
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// The `gcloud` executable inside the SDK.
    ///
    /// ```rust
    /// use cloud_sdk_manager::SdkHandle;
    /// use std::path::Path;
    ///
    /// let sdk = SdkHandle::new("/opt/google-cloud-sdk");
    /// assert!(sdk.gcloud_path().starts_with(Path::new("/opt/google-cloud-sdk/bin")));
    /// ```
    pub fn gcloud_path(&self) -> PathBuf {
        let name = if cfg!(windows) { "gcloud.cmd" } else { "gcloud" };
        self.home.join("bin").join(name)
    }
}
