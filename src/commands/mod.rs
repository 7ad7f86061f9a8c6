//! Tauri command handlers organized by domain.
//!
//! This module re-exports all command handlers for registration in lib.rs.

mod character;
mod credential;
mod generation;
mod settings;

// Re-export all commands for lib.rs registration
pub use character::*;
pub use credential::*;
pub use generation::*;
pub use settings::*;

use crate::generation::GenerationEngine;
use crate::store::StudioStore;
use std::sync::{Arc, Mutex};
use tauri::AppHandle;

/// Shared character and credential store for use in async contexts
pub type SharedStudioStore = Arc<Mutex<StudioStore>>;

/// Shared generation engine for use in async contexts
pub type SharedGenerationEngine = Arc<Mutex<GenerationEngine>>;

/// Helper to emit generation status
pub(crate) fn emit_status_arc(
    app: &AppHandle,
    engine_state: &SharedGenerationEngine,
) -> Result<(), String> {
    use tauri::Emitter;
    let status = {
        let engine = engine_state.lock().map_err(|e| e.to_string())?;
        engine.status()
    };
    app.emit("generation_status", status)
        .map_err(|e| e.to_string())
}
