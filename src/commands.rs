//! Console command handlers. Every error reaches the caller as a message.

use serde::Serialize;

use crate::{
    console::DashboardSummary,
    error::ConsoleError,
    db::models::{GlobalSetting, NewPicker, ProfileEdit},
    directory::PickerView,
    session::ConsoleSession,
    AppState,
};

const ENABLE_LOGS: bool = true;

/// Picker list for display. A failed fetch yields no rows plus the reason.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub pickers: Vec<PickerView>,
    pub error: Option<String>,
}

/// Log and flatten an error for the caller. Input problems are warnings.
fn report(err: ConsoleError) -> String {
    if err.is_validation() {
        crate::log_warn!("Rejected request: {err}");
    } else {
        crate::log_error!("Request failed: {err}");
    }
    err.to_string()
}

pub async fn login(
    state: &AppState,
    email: String,
    password: String,
) -> Result<ConsoleSession, String> {
    state.console.login(&email, &password).await.map_err(report)
}

pub async fn logout(state: &AppState) -> Result<(), String> {
    state.console.logout().await;
    Ok(())
}

/// Back to the dashboard; any open profile is closed.
pub async fn get_dashboard(state: &AppState) -> Result<DashboardSummary, String> {
    state.console.close_profile().await;
    state.console.dashboard().await.map_err(report)
}

/// Back to the picker list; any open profile is closed.
pub async fn list_pickers(state: &AppState) -> DirectoryListing {
    state.console.close_profile().await;
    match state.console.list_pickers().await {
        Ok(pickers) => DirectoryListing {
            pickers,
            error: None,
        },
        Err(err) => {
            crate::log_error!("Error fetching pickers data: {err}");
            DirectoryListing {
                pickers: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

pub async fn view_profile(state: &AppState, mobile_number: String) -> Result<PickerView, String> {
    state
        .console
        .view_profile(&mobile_number)
        .await
        .map_err(report)
}

pub async fn close_profile(state: &AppState) -> Result<(), String> {
    state.console.close_profile().await;
    Ok(())
}

pub async fn add_picker(state: &AppState, input: NewPicker) -> Result<PickerView, String> {
    state
        .console
        .add_picker(input)
        .await
        .map_err(report)
}

pub async fn save_profile(
    state: &AppState,
    mobile_number: String,
    edit: ProfileEdit,
) -> Result<PickerView, String> {
    state
        .console
        .save_profile(&mobile_number, edit)
        .await
        .map_err(report)
}

pub async fn delete_profile(state: &AppState, mobile_number: String) -> Result<(), String> {
    state
        .console
        .delete_profile(&mobile_number)
        .await
        .map_err(report)
}

pub async fn get_global_setting(state: &AppState) -> Result<GlobalSetting, String> {
    state
        .console
        .global_setting()
        .await
        .map_err(report)
}

pub async fn set_global_setting(state: &AppState, value: bool) -> Result<GlobalSetting, String> {
    state
        .console
        .set_global_setting(value)
        .await
        .map_err(report)
}

pub async fn toggle_global_setting(state: &AppState) -> Result<GlobalSetting, String> {
    state
        .console
        .toggle_global_setting()
        .await
        .map_err(report)
}
