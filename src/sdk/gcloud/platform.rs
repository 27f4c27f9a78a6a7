//! Host platform detection and Cloud SDK archive naming.

use crate::sdk::ManagedSdkError;
use semver::Version;

const DOWNLOAD_BASE: &str = "https://dl.google.com/dl/cloudsdk/channels/rapid/downloads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Os {
    Linux,
    Mac,
    Windows,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arch {
    X86_64,
    Arm,
    X86,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Platform {
    pub(crate) os: Os,
    pub(crate) arch: Arch,
}

impl Platform {
    /// The platform this process runs on.
    pub(crate) fn current() -> Result<Self, ManagedSdkError> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub(crate) fn from_parts(os: &str, arch: &str) -> Result<Self, ManagedSdkError> {
        let os = match os {
            "linux" => Os::Linux,
            "macos" => Os::Mac,
            "windows" => Os::Windows,
            other => {
                return Err(ManagedSdkError::UnsupportedOs {
                    os: other.to_string(),
                    fix: "The managed Cloud SDK supports Windows, Linux and macOS only".to_string(),
                })
            }
        };
        let arch = match arch {
            "x86_64" => Arch::X86_64,
            "aarch64" | "arm" => Arch::Arm,
            "x86" => Arch::X86,
            other => {
                return Err(ManagedSdkError::UnsupportedOs {
                    os: format!("{} ({})", os.name(), other),
                    fix: "Install the Cloud SDK manually for this architecture".to_string(),
                })
            }
        };
        Ok(Self { os, arch })
    }

    /// Archive file name for the requested version, `None` meaning latest.
    pub(crate) fn archive_name(&self, version: Option<&Version>) -> String {
        let extension = match self.os {
            Os::Windows => "zip",
            Os::Linux | Os::Mac => "tar.gz",
        };
        match version {
            Some(v) => format!(
                "google-cloud-cli-{}-{}-{}.{}",
                v,
                self.os.name(),
                self.arch.name(),
                extension
            ),
            None => format!(
                "google-cloud-cli-{}-{}.{}",
                self.os.name(),
                self.arch.name(),
                extension
            ),
        }
    }

    pub(crate) fn download_url(&self, version: Option<&Version>) -> String {
        format!("{}/{}", DOWNLOAD_BASE, self.archive_name(version))
    }

    /// `gcloud` executable name relative to the SDK home.
    pub(crate) fn gcloud_relative(&self) -> &'static str {
        match self.os {
            Os::Windows => "bin/gcloud.cmd",
            Os::Linux | Os::Mac => "bin/gcloud",
        }
    }

    /// Install script relative to the SDK home.
    pub(crate) fn install_script(&self) -> &'static str {
        match self.os {
            Os::Windows => "install.bat",
            Os::Linux | Os::Mac => "install.sh",
        }
    }
}

impl Os {
    fn name(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "darwin",
            Self::Windows => "windows",
        }
    }
}

impl Arch {
    fn name(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Arm => "arm",
            Self::X86 => "x86",
        }
    }
}
