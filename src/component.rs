//! Separately installable Cloud SDK components.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// An optional, separately installable module of the managed Cloud SDK.
///
/// Each variant maps to the component id understood by
/// `gcloud components install`.
///
/// # Extensibility
///
/// This enum is marked `#[non_exhaustive]` so new components can be added
/// without a breaking change. Always include a wildcard arm when matching.
///
/// # Example
///
/// ```rust
/// use cloud_sdk_manager::SdkComponent;
///
/// for component in SdkComponent::all() {
///     println!("{}: {}", component.display_name(), component.id());
/// }
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
#[non_exhaustive]
pub enum SdkComponent {
    /// App Engine extensions for Java (required by the IDE launchers).
    #[default]
    AppEngineJava,
    /// App Engine extensions for Python.
    AppEnginePython,
    /// Cloud Datastore emulator.
    CloudDatastoreEmulator,
    /// gcloud beta commands.
    Beta,
    /// kubectl.
    Kubectl,
}

impl SdkComponent {
    /// The component id passed to `gcloud components`.
    ///
    /// ```rust
    /// use cloud_sdk_manager::SdkComponent;
    ///
    /// assert_eq!(SdkComponent::AppEngineJava.id(), "app-engine-java");
    /// ```
    pub fn id(&self) -> &'static str {
        match self {
            Self::AppEngineJava => "app-engine-java",
            Self::AppEnginePython => "app-engine-python",
            Self::CloudDatastoreEmulator => "cloud-datastore-emulator",
            Self::Beta => "beta",
            Self::Kubectl => "kubectl",
        }
    }

    /// Human-readable name, used in progress messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AppEngineJava => "App Engine Java",
            Self::AppEnginePython => "App Engine Python",
            Self::CloudDatastoreEmulator => "Cloud Datastore Emulator",
            Self::Beta => "gcloud Beta Commands",
            Self::Kubectl => "kubectl",
        }
    }

    /// Look up a component by its gcloud id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().find(|c| c.id() == id)
    }

    /// Iterator over all known components.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }
}
