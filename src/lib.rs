mod character;
mod commands;
mod compositor;
mod config;
mod error;
mod gemini;
mod generation;
mod store;

#[cfg(test)]
mod engine_tests;

use std::sync::{Arc, Mutex};
use tauri::Manager;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Character Studio starting...");

    tauri::Builder::default()
        .setup(|app| {
            // Character and credential store (wrapped in Arc for sharing)
            let store = store::StudioStore::load()?;
            app.manage(Arc::new(Mutex::new(store)));

            // Generation state machine
            let engine = Arc::new(Mutex::new(generation::GenerationEngine::new()));
            app.manage(engine);

            info!("App setup complete");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::set_active_character,
            commands::clear_active_character,
            commands::get_character_status,
            commands::save_default_character,
            commands::load_default_character,
            commands::delete_default_character,
            commands::has_credential,
            commands::set_credential,
            commands::clear_credential,
            commands::generate,
            commands::get_generation_status,
            commands::acknowledge_result,
            commands::get_settings,
            commands::set_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}
