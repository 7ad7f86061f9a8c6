//! Error taxonomy for the generation engine.
//!
//! Every failure a generation request can produce is classified into one of
//! these variants before it reaches the frontend. Raw transport or fs errors
//! never cross a command boundary.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classified failure for a generation request or store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum GenerationError {
    #[error("No character image has been uploaded")]
    MissingCharacter,
    #[error("Prompt is empty")]
    MissingPrompt,
    #[error("No API credential is configured")]
    MissingCredential,
    #[error("API credential was rejected: {0}")]
    InvalidCredential(String),
    #[error("Generation service error: {0}")]
    RemoteError(String),
    #[error("Generation service returned no usable content")]
    EmptyResponse,
    #[error("Failed to load character image: {0}")]
    ImageLoadError(String),
    #[error("Storage limit exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl GenerationError {
    /// Stable discriminant string for the frontend and for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::MissingCharacter => "missing_character",
            GenerationError::MissingPrompt => "missing_prompt",
            GenerationError::MissingCredential => "missing_credential",
            GenerationError::InvalidCredential(_) => "invalid_credential",
            GenerationError::RemoteError(_) => "remote_error",
            GenerationError::EmptyResponse => "empty_response",
            GenerationError::ImageLoadError(_) => "image_load_error",
            GenerationError::QuotaExceeded(_) => "quota_exceeded",
            GenerationError::Unknown(_) => "unknown",
        }
    }
}

/// Markers that identify an invalid or revoked API key in a remote error
/// message. Matched case-insensitively as substrings.
const INVALID_CREDENTIAL_MARKERS: &[&str] = &[
    "api key not valid",
    "api_key_invalid",
    "invalid api key",
    "api key expired",
    "permission_denied",
];

/// Classify a remote error message, detecting credential failures.
pub fn classify_remote_message(message: &str) -> GenerationError {
    let lower = message.to_lowercase();
    if INVALID_CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
    {
        GenerationError::InvalidCredential(message.to_string())
    } else {
        GenerationError::RemoteError(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(GenerationError::MissingCharacter.kind(), "missing_character");
        assert_eq!(GenerationError::MissingPrompt.kind(), "missing_prompt");
        assert_eq!(GenerationError::MissingCredential.kind(), "missing_credential");
        assert_eq!(
            GenerationError::InvalidCredential("x".to_string()).kind(),
            "invalid_credential"
        );
        assert_eq!(GenerationError::RemoteError("x".to_string()).kind(), "remote_error");
        assert_eq!(GenerationError::EmptyResponse.kind(), "empty_response");
        assert_eq!(
            GenerationError::ImageLoadError("x".to_string()).kind(),
            "image_load_error"
        );
        assert_eq!(
            GenerationError::QuotaExceeded("x".to_string()).kind(),
            "quota_exceeded"
        );
        assert_eq!(GenerationError::Unknown("x".to_string()).kind(), "unknown");
    }

    #[test]
    fn test_classify_invalid_credential_markers() {
        let err = classify_remote_message("API key not valid. Please pass a valid API key.");
        assert!(matches!(err, GenerationError::InvalidCredential(_)));

        let err = classify_remote_message("Error: API_KEY_INVALID");
        assert!(matches!(err, GenerationError::InvalidCredential(_)));

        let err = classify_remote_message("PERMISSION_DENIED: caller lacks access");
        assert!(matches!(err, GenerationError::InvalidCredential(_)));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let err = classify_remote_message("INVALID API KEY");
        assert!(matches!(err, GenerationError::InvalidCredential(_)));
    }

    #[test]
    fn test_classify_other_messages_as_remote() {
        let err = classify_remote_message("Internal server error");
        assert_eq!(
            err,
            GenerationError::RemoteError("Internal server error".to_string())
        );

        let err = classify_remote_message("Resource has been exhausted");
        assert!(matches!(err, GenerationError::RemoteError(_)));
    }

    #[test]
    fn test_display_carries_message() {
        let err = GenerationError::RemoteError("quota exceeded for model".to_string());
        assert!(err.to_string().contains("quota exceeded for model"));

        let err = GenerationError::MissingPrompt;
        assert_eq!(err.to_string(), "Prompt is empty");
    }

    #[test]
    fn test_serialization_shape() {
        let err = GenerationError::InvalidCredential("bad key".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "invalid_credential");
        assert_eq!(json["message"], "bad key");

        let err = GenerationError::MissingCharacter;
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "missing_character");
    }
}
