//! Character image payloads.
//!
//! A character image is an immutable binary payload plus its MIME type. It
//! travels as a self-describing data URI (`data:<mime>;base64,<payload>`),
//! which works both for display in the frontend and for transmission to the
//! generation service.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

/// An uploaded or generated character image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterImage {
    mime_type: String,
    data: Vec<u8>,
}

impl CharacterImage {
    /// Wrap raw image bytes with their MIME type.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    ///
    /// Rejects non-image MIME types and malformed payloads so a bad upload
    /// is caught at the boundary instead of at request time.
    pub fn from_data_uri(uri: &str) -> Result<Self, GenerationError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| GenerationError::ImageLoadError("not a data URI".to_string()))?;

        let (mime_type, payload) = rest.split_once(";base64,").ok_or_else(|| {
            GenerationError::ImageLoadError("data URI is not base64-encoded".to_string())
        })?;

        if !mime_type.starts_with("image/") {
            return Err(GenerationError::ImageLoadError(format!(
                "unsupported MIME type: {}",
                mime_type
            )));
        }

        let data = BASE64
            .decode(payload)
            .map_err(|e| GenerationError::ImageLoadError(format!("invalid base64: {}", e)))?;

        if data.is_empty() {
            return Err(GenerationError::ImageLoadError(
                "empty image payload".to_string(),
            ));
        }

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Render as a data URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Base64 form of the raw payload, as sent in `inline_data`.
    pub fn data_base64(&self) -> String {
        BASE64.encode(&self.data)
    }
}
