//! Read-only probing of a managed SDK.

use crate::sdk::{ManagedSdk, ManagedSdkError};
use crate::{SdkComponent, SdkState};

/// Determine the state of `sdk` with respect to `component`.
///
/// Checks run in order and stop at the first unsatisfied one, so an absent
/// SDK costs no process calls and a complete one costs up to three. Do not
/// call this in a tight loop.
///
/// # Errors
///
/// Any probe failure is returned unchanged; nothing is retried.
pub async fn probe(
    sdk: &dyn ManagedSdk,
    component: SdkComponent,
) -> Result<SdkState, ManagedSdkError> {
    if !sdk.is_installed().await? {
        return Ok(SdkState::NotInstalled);
    }
    if !sdk.has_component(component).await? {
        return Ok(SdkState::MissingComponent);
    }
    if !sdk.is_up_to_date().await? {
        return Ok(SdkState::Stale);
    }
    Ok(SdkState::Ready)
}
