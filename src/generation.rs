//! Generation orchestration.
//!
//! Drives one generation request end to end: validate inputs, enter
//! `Pending`, make exactly one remote call, route the payload (pixels
//! directly, text through the compositor), and land in a terminal state.
//! Terminal states return to `Idle` once the caller acknowledges the result,
//! so the machine never lingers. Nothing is persisted across restarts.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::character::CharacterImage;
use crate::compositor;
use crate::error::GenerationError;
use crate::gemini::{GeminiClient, GenerationPayload};

/// Engine state exposed to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPhase {
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// Outcome of one request: the output image or a classified failure.
pub type GenerationResult = Result<CharacterImage, GenerationError>;

/// Status update emitted on every phase change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationStatus {
    pub phase: GenerationPhase,
    pub error: Option<GenerationError>,
    /// Correlation ID for the current or last request, for log matching
    pub request_id: Option<String>,
}

/// Single-request state machine. One instance per session; the caller
/// disables its trigger while the phase is `Pending`, and a `begin` that
/// races past the disabled trigger is rejected here.
pub struct GenerationEngine {
    phase: GenerationPhase,
    result: Option<GenerationResult>,
    request_id: Option<String>,
}

impl GenerationEngine {
    pub fn new() -> Self {
        Self {
            phase: GenerationPhase::Idle,
            result: None,
            request_id: None,
        }
    }

    pub fn phase(&self) -> &GenerationPhase {
        &self.phase
    }

    pub fn status(&self) -> GenerationStatus {
        GenerationStatus {
            phase: self.phase.clone(),
            error: self.result.as_ref().and_then(|r| r.as_ref().err().cloned()),
            request_id: self.request_id.clone(),
        }
    }

    pub fn last_result(&self) -> Option<&GenerationResult> {
        self.result.as_ref()
    }

    /// Enter `Pending`. Only valid from `Idle`; anything else means a
    /// request is still in flight or unacknowledged.
    pub fn begin(&mut self) -> Result<String, GenerationError> {
        if self.phase != GenerationPhase::Idle {
            warn!("Rejected generate call in phase {:?}", self.phase);
            return Err(GenerationError::Unknown(
                "a generation request is already in progress".to_string(),
            ));
        }

        let request_id = uuid::Uuid::new_v4().to_string();
        info!("Generation {} entering Pending", request_id);
        self.phase = GenerationPhase::Pending;
        self.result = None;
        self.request_id = Some(request_id.clone());
        Ok(request_id)
    }

    /// Record a terminal success.
    pub fn succeed(&mut self, image: CharacterImage) {
        info!(
            "Generation {} succeeded ({} bytes)",
            self.request_id.as_deref().unwrap_or("?"),
            image.data().len()
        );
        self.phase = GenerationPhase::Succeeded;
        self.result = Some(Ok(image));
    }

    /// Record a terminal failure. Validation failures land here straight
    /// from `Idle` (no network was attempted); everything else from
    /// `Pending`.
    pub fn fail(&mut self, error: GenerationError) {
        warn!(
            "Generation {} failed: {} ({})",
            self.request_id.as_deref().unwrap_or("?"),
            error,
            error.kind()
        );
        if self.request_id.is_none() {
            self.request_id = Some(uuid::Uuid::new_v4().to_string());
        }
        self.phase = GenerationPhase::Failed;
        self.result = Some(Err(error));
    }

    /// Caller acknowledged the terminal result; return to `Idle`.
    /// Idempotent from `Idle`; a no-op while `Pending`.
    pub fn acknowledge(&mut self) {
        match self.phase {
            GenerationPhase::Succeeded | GenerationPhase::Failed => {
                debug!("Generation result acknowledged, returning to Idle");
                self.phase = GenerationPhase::Idle;
                self.result = None;
                self.request_id = None;
            }
            GenerationPhase::Pending => {
                warn!("Acknowledge ignored while a request is pending");
            }
            GenerationPhase::Idle => {}
        }
    }
}

impl Default for GenerationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Preconditions, checked before `Pending` and before any network activity.
/// On success, hands back the owned inputs the request will use. The prompt
/// comes back trimmed; surrounding whitespace never reaches the remote call.
pub fn resolve_inputs(
    character: Option<CharacterImage>,
    prompt: &str,
    credential: Option<String>,
) -> Result<(CharacterImage, String, String), GenerationError> {
    let character = character.ok_or(GenerationError::MissingCharacter)?;
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GenerationError::MissingPrompt);
    }
    let credential = credential
        .filter(|secret| !secret.trim().is_empty())
        .ok_or(GenerationError::MissingCredential)?;
    Ok((character, prompt.to_string(), credential))
}

/// One remote call plus payload routing. Text-only payloads go through the
/// compositor with the original character image.
pub async fn run_generation(
    client: &GeminiClient,
    character: &CharacterImage,
    prompt: &str,
) -> Result<CharacterImage, GenerationError> {
    match client.generate(prompt, character).await? {
        GenerationPayload::Image(image) => {
            debug!("Remote service returned pixels directly");
            Ok(image)
        }
        GenerationPayload::Text(description) => {
            debug!(
                "Remote service returned a description ({} chars), compositing",
                description.len()
            );
            compositor::compose_description(character, &description)
        }
    }
}
