//! Parsing of `gcloud` JSON output.

use crate::sdk::ManagedSdkError;
use regex::Regex;
use semver::Version;
use serde::Deserialize;

/// One entry of `gcloud components list --format=json`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ComponentEntry {
    pub(crate) id: String,
    pub(crate) state: ComponentState,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ComponentState {
    pub(crate) name: String,
}

pub(crate) const STATE_NOT_INSTALLED: &str = "Not Installed";
pub(crate) const STATE_UPDATE_AVAILABLE: &str = "Update Available";

impl ComponentEntry {
    pub(crate) fn is_installed(&self) -> bool {
        self.state.name != STATE_NOT_INSTALLED
    }

    pub(crate) fn has_update(&self) -> bool {
        self.state.name == STATE_UPDATE_AVAILABLE
    }
}

/// Parse the component list printed by `gcloud components list --format=json`.
pub(crate) fn parse_components(output: &str) -> Result<Vec<ComponentEntry>, ManagedSdkError> {
    serde_json::from_str(output).map_err(|e| {
        ManagedSdkError::verification(format!("unreadable component list: {}", e))
    })
}

/// Parse the SDK version printed by `gcloud version --format=json`.
///
/// The JSON object maps component names to versions; the core version lives
/// under `"Google Cloud SDK"`. Versions such as `400.0.0` are extracted with a
/// `major.minor.patch` pattern so suffixes do not break parsing.
pub(crate) fn parse_sdk_version(output: &str) -> Result<Version, ManagedSdkError> {
    let value: serde_json::Value = serde_json::from_str(output)
        .map_err(|e| ManagedSdkError::verification(format!("unreadable version output: {}", e)))?;

    let raw = value
        .get("Google Cloud SDK")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ManagedSdkError::verification("version output lacks \"Google Cloud SDK\""))?;

    let re = Regex::new(r"(\d+)\.(\d+)\.(\d+)").expect("Invalid regex pattern");
    let caps = re
        .captures(raw)
        .ok_or_else(|| ManagedSdkError::verification(format!("unparseable SDK version: {}", raw)))?;
    let version_str = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
    Version::parse(version_str)
        .map_err(|_| ManagedSdkError::verification(format!("unparseable SDK version: {}", raw)))
}
