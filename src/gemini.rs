//! Google Gemini API client for character image generation.
//!
//! Thin wrapper around the generateContent endpoint. One request carries the
//! framed prompt plus the character image as inline data; the response may
//! hold a generated image, a textual description, or nothing usable.

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::character::CharacterImage;
use crate::error::{classify_remote_message, GenerationError};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// What a successful generateContent call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationPayload {
    /// The service returned pixels directly
    Image(CharacterImage),
    /// The service returned only a textual description
    Text(String),
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

// -- Request types --

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

/// Inline binary part. Requests go out proto-style (`mime_type`), which the
/// endpoint accepts alongside camelCase; responses come back camelCase
/// (`mimeType`), so deserialization takes both.
#[derive(Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(alias = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// -- Response types --

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Build the instruction text that frames the user prompt.
pub fn framed_prompt(prompt: &str) -> String {
    format!(
        "Preserve this character's style and appearance exactly. \
         Depict the following situation: {}",
        prompt
    )
}

impl GeminiClient {
    pub fn new(
        api_key: &str,
        endpoint: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::MissingCredential);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Unknown(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// URL with the model identifier and the API key as a query credential.
    fn request_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.endpoint,
            self.model,
            urlencoding::encode(&self.api_key)
        )
    }

    fn build_request_body(prompt: &str, character: &CharacterImage) -> GenerateRequest {
        GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart {
                        text: Some(framed_prompt(prompt)),
                        inline_data: None,
                    },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: character.mime_type().to_string(),
                            data: character.data_base64(),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 2048,
            },
        }
    }

    /// Pull the first usable payload out of a parsed response.
    fn extract_payload(response: GenerateResponse) -> Result<GenerationPayload, GenerationError> {
        let parts = response
            .candidates
            .into_iter()
            .next()
            .map(|c| c.content.parts)
            .unwrap_or_default();

        let mut description: Option<String> = None;
        for part in parts {
            if let Some(inline) = part.inline_data {
                use base64::Engine;
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(inline.data.as_bytes())
                    .map_err(|e| {
                        GenerationError::RemoteError(format!("invalid image payload: {}", e))
                    })?;
                return Ok(GenerationPayload::Image(CharacterImage::new(
                    inline.mime_type,
                    bytes,
                )));
            }
            if description.is_none() {
                if let Some(text) = part.text {
                    if !text.trim().is_empty() {
                        description = Some(text);
                    }
                }
            }
        }

        description
            .map(GenerationPayload::Text)
            .ok_or(GenerationError::EmptyResponse)
    }

    /// Issue exactly one generateContent call. No retry.
    pub async fn generate(
        &self,
        prompt: &str,
        character: &CharacterImage,
    ) -> Result<GenerationPayload, GenerationError> {
        let body = Self::build_request_body(prompt, character);

        info!(
            "Gemini generation request: model={}, prompt={} chars, image={} bytes",
            self.model,
            prompt.len(),
            character.data().len()
        );

        let response = self
            .client
            .post(self.request_url())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::RemoteError(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ErrorResponse>(&raw) {
                Ok(err) => err.error.message,
                Err(_) => format!("HTTP {}", status),
            };
            warn!("Gemini API error: {} - {}", status, message);
            return Err(classify_remote_message(&message));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::RemoteError(format!("failed to parse response: {}", e)))?;

        debug!("Gemini response parsed, extracting payload");
        Self::extract_payload(parsed)
    }
}
