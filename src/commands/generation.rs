//! Generation commands (run a request, poll status, acknowledge the result)

use super::{emit_status_arc, SharedGenerationEngine, SharedStudioStore};
use crate::config::Config;
use crate::error::GenerationError;
use crate::gemini::GeminiClient;
use crate::generation::{self, GenerationPhase, GenerationStatus};
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, State};
use tracing::{info, warn};

/// Terminal outcome returned to the caller of `generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub phase: GenerationPhase,
    /// Output image as a data URI on success
    pub image: Option<String>,
    pub error: Option<GenerationError>,
}

fn outcome_of(engine_state: &SharedGenerationEngine) -> Result<GenerationOutcome, String> {
    let engine = engine_state.lock().map_err(|e| e.to_string())?;
    let (image, error) = match engine.last_result() {
        Some(Ok(image)) => (Some(image.to_data_uri()), None),
        Some(Err(e)) => (None, Some(e.clone())),
        None => (None, None),
    };
    Ok(GenerationOutcome {
        phase: engine.phase().clone(),
        image,
        error,
    })
}

/// Run one generation request end to end.
///
/// Validation failures land in `Failed` without entering `Pending`; a valid
/// request enters `Pending`, makes exactly one remote call, and lands in
/// `Succeeded` or `Failed`. An authentication failure also clears the stored
/// credential so the next attempt prompts for a fresh key.
#[tauri::command]
pub async fn generate(
    app: AppHandle,
    store_state: State<'_, SharedStudioStore>,
    engine_state: State<'_, SharedGenerationEngine>,
    prompt: String,
) -> Result<GenerationOutcome, String> {
    // Clone the Arcs for use in async context
    let store_arc = store_state.inner().clone();
    let engine_arc = engine_state.inner().clone();

    // Snapshot inputs before any network activity
    let (character, credential) = {
        let store = store_arc.lock().map_err(|e| e.to_string())?;
        (
            store.active_character().cloned(),
            store.get_credential().map(str::to_string),
        )
    };

    let (character, prompt, credential) =
        match generation::resolve_inputs(character, &prompt, credential) {
            Ok(inputs) => inputs,
            Err(e) => {
                let mut engine = engine_arc.lock().map_err(|e| e.to_string())?;
                engine.fail(e);
                drop(engine);
                emit_status_arc(&app, &engine_arc)?;
                return outcome_of(&engine_arc);
            }
        };

    // Transition to pending; a second call while one is in flight is rejected
    {
        let mut engine = engine_arc.lock().map_err(|e| e.to_string())?;
        engine.begin().map_err(|e| e.to_string())?;
    }
    emit_status_arc(&app, &engine_arc)?;

    let config = Config::load_or_default();
    let timeout = std::time::Duration::from_secs(config.request_timeout_secs);
    let result = match GeminiClient::new(&credential, &config.endpoint, &config.model, timeout) {
        Ok(client) => generation::run_generation(&client, &character, &prompt).await,
        Err(e) => Err(e),
    };

    // Self-heal: a rejected key is cleared so it is not retried forever
    if let Err(GenerationError::InvalidCredential(_)) = &result {
        info!("Remote service rejected the credential, clearing it");
        let mut store = store_arc.lock().map_err(|e| e.to_string())?;
        if let Err(e) = store.clear_credential() {
            warn!("Failed to clear rejected credential: {}", e);
        }
    }

    {
        let mut engine = engine_arc.lock().map_err(|e| e.to_string())?;
        match result {
            Ok(image) => engine.succeed(image),
            Err(e) => engine.fail(e),
        }
    }
    emit_status_arc(&app, &engine_arc)?;

    outcome_of(&engine_arc)
}

/// Get the current generation status
#[tauri::command]
pub fn get_generation_status(
    engine_state: State<'_, SharedGenerationEngine>,
) -> Result<GenerationStatus, String> {
    let engine = engine_state.lock().map_err(|e| e.to_string())?;
    Ok(engine.status())
}

/// Acknowledge a terminal result, returning the engine to idle
#[tauri::command]
pub fn acknowledge_result(
    app: AppHandle,
    engine_state: State<'_, SharedGenerationEngine>,
) -> Result<(), String> {
    {
        let mut engine = engine_state.lock().map_err(|e| e.to_string())?;
        engine.acknowledge();
    }
    emit_status_arc(&app, engine_state.inner())
}
