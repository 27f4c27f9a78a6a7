//! Installer steps backed by external processes.

use super::command::{self, StructuredCommand};
use super::platform::Platform;
use crate::sdk::{ManagedSdkError, MessageListener, SdkInstaller};
use crate::CancelToken;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Tools the core installer shells out to.
const CORE_PREREQUISITES: &[&str] = &["curl", "tar"];

/// Check that every tool needed by the core installer is on PATH.
fn check_prerequisites() -> Result<(), ManagedSdkError> {
    for name in CORE_PREREQUISITES {
        if which::which(name).is_err() {
            return Err(ManagedSdkError::PrerequisiteMissing {
                name: (*name).to_string(),
                fix: format!("Install {} and make sure it is on PATH", name),
            });
        }
    }
    Ok(())
}

fn checkpoint(cancel: &CancelToken) -> Result<(), ManagedSdkError> {
    if cancel.is_cancelled() {
        Err(ManagedSdkError::Cancelled)
    } else {
        Ok(())
    }
}

/// Downloads, extracts and runs the bundled install script.
pub(crate) struct CoreInstaller {
    pub(crate) platform: Platform,
    pub(crate) root: PathBuf,
    pub(crate) home: PathBuf,
    pub(crate) url: String,
    pub(crate) timeout: Duration,
}

impl CoreInstaller {
    async fn install(
        &self,
        listener: &dyn MessageListener,
        cancel: &CancelToken,
    ) -> Result<(), ManagedSdkError> {
        check_prerequisites()?;
        checkpoint(cancel)?;

        // A previous run may have left a partial tree behind.
        if self.home.exists() {
            tracing::info!(home = %self.home.display(), "removing partial Cloud SDK install");
            tokio::fs::remove_dir_all(&self.home)
                .await
                .map_err(|e| ManagedSdkError::io("remove partial install", e))?;
        }
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ManagedSdkError::io("create managed SDK directory", e))?;

        let archive = self.root.join(archive_file_name(&self.url));
        listener.message(&format!("Downloading {}", self.url));
        let download = StructuredCommand::new("curl")
            .arg("-fsSL")
            .arg("-o")
            .arg(archive.as_os_str())
            .arg(&self.url);
        command::run(&download, self.timeout, listener, cancel).await?;
        checkpoint(cancel)?;

        listener.message(&format!("Extracting {}", archive.display()));
        let extract = StructuredCommand::new("tar")
            .arg("-xf")
            .arg(archive.as_os_str())
            .arg("-C")
            .arg(self.root.as_os_str());
        let extracted = command::run(&extract, self.timeout, listener, cancel).await;
        remove_archive(&archive).await;
        extracted?;
        checkpoint(cancel)?;

        let script = StructuredCommand::new(self.home.join(self.platform.install_script()))
            .arg("--path-update=false")
            .arg("--command-completion=false")
            .arg("--usage-reporting=false")
            .arg("--quiet")
            .env("CLOUDSDK_CORE_DISABLE_PROMPTS", "1");
        command::run(&script, self.timeout, listener, cancel).await?;

        let gcloud = self.home.join(self.platform.gcloud_relative());
        if !gcloud.is_file() {
            return Err(ManagedSdkError::verification(format!(
                "{} missing after installation",
                gcloud.display()
            )));
        }
        tracing::info!(home = %self.home.display(), "core Cloud SDK installed");
        Ok(())
    }
}

impl SdkInstaller for CoreInstaller {
    fn run<'a>(
        &'a self,
        listener: &'a dyn MessageListener,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<(), ManagedSdkError>> {
        Box::pin(self.install(listener, cancel))
    }
}

fn archive_file_name(url: &str) -> &str {
    url.rsplit('/').next().filter(|n| !n.is_empty()).unwrap_or("google-cloud-cli.archive")
}

async fn remove_archive(archive: &Path) {
    if let Err(e) = tokio::fs::remove_file(archive).await {
        tracing::warn!(archive = %archive.display(), error = %e, "failed to remove downloaded archive");
    }
}

/// Runs one `gcloud components ...` command.
pub(crate) struct GcloudInstaller {
    pub(crate) gcloud: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) timeout: Duration,
}

impl GcloudInstaller {
    async fn execute(
        &self,
        listener: &dyn MessageListener,
        cancel: &CancelToken,
    ) -> Result<(), ManagedSdkError> {
        let mut cmd = StructuredCommand::new(&self.gcloud);
        for arg in &self.args {
            cmd = cmd.arg(arg);
        }
        let cmd = cmd.arg("--quiet").env("CLOUDSDK_CORE_DISABLE_PROMPTS", "1");
        command::run(&cmd, self.timeout, listener, cancel).await?;
        Ok(())
    }
}

impl SdkInstaller for GcloudInstaller {
    fn run<'a>(
        &'a self,
        listener: &'a dyn MessageListener,
        cancel: &'a CancelToken,
    ) -> BoxFuture<'a, Result<(), ManagedSdkError>> {
        Box::pin(self.execute(listener, cancel))
    }
}
