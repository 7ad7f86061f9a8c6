//! Character slot commands (active character and persisted default)

use super::SharedStudioStore;
use crate::character::CharacterImage;
use serde::{Deserialize, Serialize};
use tauri::State;
use tracing::info;

/// Character slot state for the frontend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterStatus {
    pub has_active_character: bool,
    pub has_default_character: bool,
    /// Whether the active character coincides with the persisted default
    pub active_is_default: bool,
}

fn status_of(store: &crate::store::StudioStore) -> CharacterStatus {
    CharacterStatus {
        has_active_character: store.active_character().is_some(),
        has_default_character: store.load_default_character().is_some(),
        active_is_default: store.active_matches_default(),
    }
}

/// Set the session's active character from a data URI
#[tauri::command]
pub fn set_active_character(
    store_state: State<'_, SharedStudioStore>,
    data_uri: String,
) -> Result<CharacterStatus, String> {
    let image = CharacterImage::from_data_uri(&data_uri).map_err(|e| e.to_string())?;

    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    store.set_active_character(image);
    Ok(status_of(&store))
}

/// Clear the session's active character
#[tauri::command]
pub fn clear_active_character(
    store_state: State<'_, SharedStudioStore>,
) -> Result<CharacterStatus, String> {
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    store.clear_active_character();
    Ok(status_of(&store))
}

/// Get the current character slot state
#[tauri::command]
pub fn get_character_status(
    store_state: State<'_, SharedStudioStore>,
) -> Result<CharacterStatus, String> {
    let store = store_state.lock().map_err(|e| e.to_string())?;
    Ok(status_of(&store))
}

/// Persist the active character as the default
#[tauri::command]
pub fn save_default_character(
    store_state: State<'_, SharedStudioStore>,
) -> Result<CharacterStatus, String> {
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    let image = store
        .active_character()
        .cloned()
        .ok_or_else(|| "No active character to save".to_string())?;
    store
        .save_default_character(&image)
        .map_err(|e| e.to_string())?;
    Ok(status_of(&store))
}

/// Load the persisted default character, making it the active character.
/// Returns the image as a data URI for the frontend preview, or `None`
/// when nothing is stored.
#[tauri::command]
pub fn load_default_character(
    store_state: State<'_, SharedStudioStore>,
) -> Result<Option<String>, String> {
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    match store.load_default_character() {
        Some(image) => {
            info!("Restored default character ({} bytes)", image.data().len());
            let uri = image.to_data_uri();
            store.set_active_character(image);
            Ok(Some(uri))
        }
        None => Ok(None),
    }
}

/// Remove the persisted default character
#[tauri::command]
pub fn delete_default_character(
    store_state: State<'_, SharedStudioStore>,
) -> Result<CharacterStatus, String> {
    let mut store = store_state.lock().map_err(|e| e.to_string())?;
    store.delete_default_character().map_err(|e| e.to_string())?;
    Ok(status_of(&store))
}
