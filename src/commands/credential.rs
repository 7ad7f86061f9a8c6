//! API credential commands.
//!
//! The secret itself never crosses back to the frontend; callers only
//! learn whether one is stored.

use super::SharedStudioStore;
use tauri::State;

/// Whether an API credential is currently stored
#[tauri::command]
pub fn has_credential(store_state: State<'_, SharedStudioStore>) -> Result<bool, String> {
    let store = store_state.lock().map_err(|e| e.to_string())?;
    Ok(store.get_credential().is_some())
}

/// Store an API credential
#[tauri::command]
pub fn set_credential(
    store_state: State<'_, SharedStudioStore>,
    secret: String,
) -> Result<(), String> {
    if secret.trim().is_empty() {
        return Err("Credential must not be empty".to_string());
    }
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    store.set_credential(secret.trim()).map_err(|e| e.to_string())
}

/// Remove the stored API credential
#[tauri::command]
pub fn clear_credential(store_state: State<'_, SharedStudioStore>) -> Result<(), String> {
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    store.clear_credential().map_err(|e| e.to_string())
}
