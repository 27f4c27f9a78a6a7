//! [`ManagedSdk`] implementation driving the `gcloud` CLI.
//!
//! The managed SDK lives under
//! `<base_dir>/<LATEST | x.y.z>/google-cloud-sdk`. Probes run `gcloud` with
//! JSON output; installers download the release archive, run the bundled
//! install script, and use `gcloud components` for components and updates.

mod command;
mod installers;
mod parser;
mod platform;

use super::errors::describe_exit;
use super::{ManagedSdk, ManagedSdkError, SdkInstaller, TracingListener};
use crate::{CancelToken, SdkComponent};
use command::StructuredCommand;
use futures::future::BoxFuture;
use installers::{CoreInstaller, GcloudInstaller};
use platform::Platform;
use semver::Version;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Directory name of the SDK inside a versioned managed root.
const SDK_DIR_NAME: &str = "google-cloud-sdk";

/// Which Cloud SDK release the managed installation tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum SdkVersion {
    /// Always the newest release; updates are applied automatically.
    #[default]
    Latest,
    /// A pinned release; never updated.
    Fixed(Version),
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("LATEST"),
            Self::Fixed(v) => write!(f, "{}", v),
        }
    }
}

/// Configuration for [`GcloudManagedSdk`].
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::{ManagedSdkOptions, SdkVersion};
/// use std::time::Duration;
///
/// let options = ManagedSdkOptions {
///     command_timeout: Duration::from_secs(30),
///     ..Default::default()
/// };
/// assert_eq!(options.version, SdkVersion::Latest);
/// ```
#[derive(Debug, Clone)]
pub struct ManagedSdkOptions {
    /// Directory holding managed SDK versions.
    ///
    /// Default: `<user cache dir>/google-cloud-tools-java/managed-cloud-sdk`.
    pub base_dir: Option<PathBuf>,

    /// Release to track. Default: [`SdkVersion::Latest`].
    pub version: SdkVersion,

    /// Timeout for read-only `gcloud` probes. Default: 60 seconds.
    pub command_timeout: Duration,

    /// Timeout for each installer process. Default: 10 minutes.
    pub install_timeout: Duration,

    /// Override for the release archive URL.
    pub download_url: Option<String>,
}

impl Default for ManagedSdkOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            version: SdkVersion::Latest,
            command_timeout: Duration::from_secs(60),
            install_timeout: Duration::from_secs(600),
            download_url: None,
        }
    }
}

/// Default location for managed SDKs.
fn default_base_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.cache_dir()
            .join("google-cloud-tools-java")
            .join("managed-cloud-sdk")
    })
}

/// A managed Cloud SDK driven through the `gcloud` CLI.
#[derive(Debug, Clone)]
pub struct GcloudManagedSdk {
    platform: Platform,
    version: SdkVersion,
    root: PathBuf,
    home: PathBuf,
    gcloud: PathBuf,
    options: ManagedSdkOptions,
}

impl GcloudManagedSdk {
    /// Create a managed SDK handle. Nothing is touched on disk.
    ///
    /// Fails with [`ManagedSdkError::UnsupportedOs`] on platforms without a
    /// Cloud SDK release.
    pub fn new(options: ManagedSdkOptions) -> Result<Self, ManagedSdkError> {
        let platform = Platform::current()?;
        Self::with_platform(options, platform)
    }

    fn with_platform(
        options: ManagedSdkOptions,
        platform: Platform,
    ) -> Result<Self, ManagedSdkError> {
        let base = match options.base_dir.clone().or_else(default_base_dir) {
            Some(base) => base,
            None => {
                return Err(ManagedSdkError::Io {
                    message: "no user cache directory available".to_string(),
                    fix: "Set ManagedSdkOptions::base_dir explicitly".to_string(),
                })
            }
        };
        let root = base.join(options.version.to_string());
        let home = root.join(SDK_DIR_NAME);
        let gcloud = home.join(platform.gcloud_relative());
        Ok(Self {
            platform,
            version: options.version.clone(),
            root,
            home,
            gcloud,
            options,
        })
    }

    /// The release this instance tracks.
    pub fn version(&self) -> &SdkVersion {
        &self.version
    }

    /// Path of the `gcloud` executable inside the managed SDK.
    pub fn gcloud_path(&self) -> &PathBuf {
        &self.gcloud
    }

    async fn gcloud(&self, args: &[&str]) -> Result<String, ManagedSdkError> {
        if !self.gcloud.is_file() {
            return Err(ManagedSdkError::verification(format!(
                "{} not found",
                self.gcloud.display()
            )));
        }
        let mut cmd = StructuredCommand::new(&self.gcloud);
        for arg in args {
            cmd = cmd.arg(*arg);
        }
        let cmd = cmd.env("CLOUDSDK_CORE_DISABLE_PROMPTS", "1");
        command::run(
            &cmd,
            self.options.command_timeout,
            &TracingListener,
            &CancelToken::never(),
        )
        .await
        .map_err(|e| match e {
            ManagedSdkError::CommandExecution { message, .. } => {
                ManagedSdkError::verification(format!("cannot execute gcloud: {}", message))
            }
            ManagedSdkError::CommandExit {
                exit_code, stderr, ..
            } => ManagedSdkError::verification(format!(
                "gcloud {}: {}",
                describe_exit(exit_code),
                stderr.trim()
            )),
            other => other,
        })
    }

    async fn installed(&self) -> Result<bool, ManagedSdkError> {
        if !self.home.is_dir() {
            return Ok(false);
        }
        if !self.gcloud.is_file() {
            tracing::debug!(home = %self.home.display(), "partial Cloud SDK install without gcloud");
            return Ok(false);
        }
        let output = self.gcloud(&["version", "--format=json"]).await?;
        let found = parser::parse_sdk_version(&output)?;
        if let SdkVersion::Fixed(expected) = &self.version {
            if &found != expected {
                return Err(ManagedSdkError::VersionMismatch {
                    expected: expected.to_string(),
                    found: found.to_string(),
                    fix: format!("Delete {} so the pinned release is reinstalled", self.root.display()),
                });
            }
        }
        tracing::debug!(version = %found, home = %self.home.display(), "found managed Cloud SDK");
        Ok(true)
    }

    async fn component_installed(&self, component: SdkComponent) -> Result<bool, ManagedSdkError> {
        let filter = format!("--filter=id:{}", component.id());
        let output = self
            .gcloud(&["components", "list", "--format=json", filter.as_str()])
            .await?;
        let entries = parser::parse_components(&output)?;
        Ok(entries
            .iter()
            .any(|entry| entry.id == component.id() && entry.is_installed()))
    }

    async fn up_to_date(&self) -> Result<bool, ManagedSdkError> {
        if let SdkVersion::Fixed(_) = self.version {
            return Ok(true);
        }
        let output = self
            .gcloud(&["components", "list", "--format=json"])
            .await?;
        let entries = parser::parse_components(&output)?;
        Ok(!entries.iter().any(|entry| entry.has_update()))
    }

    fn download_url(&self) -> String {
        if let Some(url) = &self.options.download_url {
            return url.clone();
        }
        match &self.version {
            SdkVersion::Latest => self.platform.download_url(None),
            SdkVersion::Fixed(v) => self.platform.download_url(Some(v)),
        }
    }
}

impl ManagedSdk for GcloudManagedSdk {
    fn root(&self) -> PathBuf {
        self.root.clone()
    }

    fn sdk_home(&self) -> PathBuf {
        self.home.clone()
    }

    fn is_installed(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        Box::pin(self.installed())
    }

    fn has_component(
        &self,
        component: SdkComponent,
    ) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        Box::pin(self.component_installed(component))
    }

    fn is_up_to_date(&self) -> BoxFuture<'_, Result<bool, ManagedSdkError>> {
        Box::pin(self.up_to_date())
    }

    fn new_installer(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        Ok(Box::new(CoreInstaller {
            platform: self.platform,
            root: self.root.clone(),
            home: self.home.clone(),
            url: self.download_url(),
            timeout: self.options.install_timeout,
        }))
    }

    fn new_component_installer(
        &self,
        component: SdkComponent,
    ) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        Ok(Box::new(GcloudInstaller {
            gcloud: self.gcloud.clone(),
            args: vec![
                "components".to_string(),
                "install".to_string(),
                component.id().to_string(),
            ],
            timeout: self.options.install_timeout,
        }))
    }

    fn new_updater(&self) -> Result<Box<dyn SdkInstaller>, ManagedSdkError> {
        if let SdkVersion::Fixed(v) = &self.version {
            return Err(ManagedSdkError::VersionMismatch {
                expected: v.to_string(),
                found: "LATEST".to_string(),
                fix: "Pinned Cloud SDK releases cannot be updated; use SdkVersion::Latest"
                    .to_string(),
            });
        }
        Ok(Box::new(GcloudInstaller {
            gcloud: self.gcloud.clone(),
            args: vec!["components".to_string(), "update".to_string()],
            timeout: self.options.install_timeout,
        }))
    }
}
