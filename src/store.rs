//! Durable store for the default character and the API credential.
//!
//! Two logical slots backed by a single schema-versioned JSON file under
//! `~/.characterstudio`. Writes are atomic (temp file + rename) and the file
//! carries 0600 permissions on Unix since it may hold the API key. A fixed
//! cap on the serialized file models the size-limited medium: an oversized
//! write fails with `QuotaExceeded` and leaves the previous contents intact.
//!
//! The store also owns the in-memory active character for the session. The
//! active character and the persisted default may diverge; callers can ask
//! whether they currently coincide to render a "saved" indicator.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::character::CharacterImage;
use crate::error::GenerationError;

/// Current schema version for the store file
const SCHEMA_VERSION: u32 = 1;

/// Maximum size of the serialized store file. Matches the order of magnitude
/// browsers allow for local storage, which is where oversized character
/// uploads historically failed.
const MAX_STORE_BYTES: usize = 5 * 1024 * 1024;

/// Persisted slots with schema versioning
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    schema_version: u32,
    /// Default character image as a data URI
    default_character: Option<String>,
    /// API credential secret
    api_credential: Option<String>,
    /// Unix timestamp of the last write, for support diagnostics
    updated_at: Option<i64>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            default_character: None,
            api_credential: None,
            updated_at: None,
        }
    }
}

/// Store for the two persisted slots plus the session's active character.
#[derive(Debug)]
pub struct StudioStore {
    file: StoreFile,
    path: PathBuf,
    /// In-memory active character; session lifetime, never persisted as such
    active_character: Option<CharacterImage>,
}

impl StudioStore {
    /// Get the default storage path
    fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".characterstudio").join("store.json"))
    }

    /// Load the store from disk or start empty
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Ok(Self::load_from_path(path))
    }

    /// Load the store from a specific path.
    ///
    /// Never fails: an unreadable or corrupt file is logged and treated as
    /// an empty store so the app can still start.
    pub fn load_from_path(path: PathBuf) -> Self {
        let file = if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(anyhow::Error::from)
                .and_then(|content| serde_json::from_str::<StoreFile>(&content).map_err(Into::into))
            {
                Ok(file) => {
                    if file.schema_version != SCHEMA_VERSION {
                        warn!(
                            "Store schema version mismatch: {} vs {}, may need migration",
                            file.schema_version, SCHEMA_VERSION
                        );
                    }
                    info!("Loaded store from {:?}", path);
                    file
                }
                Err(e) => {
                    warn!("Failed to load store from {:?}, starting empty: {}", path, e);
                    StoreFile::default()
                }
            }
        } else {
            debug!("No store file found at {:?}, starting empty", path);
            StoreFile::default()
        };

        Self {
            file,
            path,
            active_character: None,
        }
    }

    /// Persist the current slots with atomic write and strict permissions.
    ///
    /// Checks the serialized size against the quota before touching the
    /// existing file, so a rejected write never partially persists.
    fn save(&self) -> Result<(), GenerationError> {
        let content = serde_json::to_string_pretty(&self.file)
            .map_err(|e| GenerationError::Unknown(format!("failed to serialize store: {}", e)))?;

        if content.len() > MAX_STORE_BYTES {
            return Err(GenerationError::QuotaExceeded(format!(
                "store would be {} bytes (max {})",
                content.len(),
                MAX_STORE_BYTES
            )));
        }

        self.write_atomic(&content)
            .map_err(|e| GenerationError::Unknown(format!("failed to write store: {:#}", e)))
    }

    fn write_atomic(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp file {:?}", temp_path))?;

        // The credential is a secret; keep the file private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, permissions)
                .with_context(|| "Failed to set permissions on store file")?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to rename temp file to {:?}", self.path))?;

        debug!("Saved store to {:?}", self.path);
        Ok(())
    }

    // -- Default character slot --

    /// Persist the given image as the default character.
    pub fn save_default_character(
        &mut self,
        image: &CharacterImage,
    ) -> Result<(), GenerationError> {
        let previous = self.file.default_character.take();
        let previous_stamp = self.file.updated_at;
        self.file.default_character = Some(image.to_data_uri());
        self.file.updated_at = Some(chrono::Utc::now().timestamp());

        if let Err(e) = self.save() {
            // Roll back so memory matches disk
            self.file.default_character = previous;
            self.file.updated_at = previous_stamp;
            return Err(e);
        }

        info!("Saved default character ({} bytes)", image.data().len());
        Ok(())
    }

    /// Load the persisted default character, or `None` when nothing is
    /// stored. A corrupt slot is treated as absent.
    pub fn load_default_character(&self) -> Option<CharacterImage> {
        let uri = self.file.default_character.as_deref()?;
        match CharacterImage::from_data_uri(uri) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Stored default character is unreadable: {}", e);
                None
            }
        }
    }

    /// Remove the persisted default character. Idempotent.
    pub fn delete_default_character(&mut self) -> Result<(), GenerationError> {
        if self.file.default_character.is_none() {
            return Ok(());
        }
        self.file.default_character = None;
        self.file.updated_at = Some(chrono::Utc::now().timestamp());
        self.save()?;
        info!("Deleted default character");
        Ok(())
    }

    // -- Credential slot --

    pub fn get_credential(&self) -> Option<&str> {
        self.file.api_credential.as_deref()
    }

    pub fn set_credential(&mut self, secret: &str) -> Result<(), GenerationError> {
        let previous = self.file.api_credential.take();
        let previous_stamp = self.file.updated_at;
        self.file.api_credential = Some(secret.to_string());
        self.file.updated_at = Some(chrono::Utc::now().timestamp());

        if let Err(e) = self.save() {
            self.file.api_credential = previous;
            self.file.updated_at = previous_stamp;
            return Err(e);
        }

        info!("API credential stored");
        Ok(())
    }

    /// Clear the stored credential. Called by the orchestrator when the
    /// remote service reports an authentication failure, so a revoked key
    /// self-heals on next use instead of failing silently forever.
    pub fn clear_credential(&mut self) -> Result<(), GenerationError> {
        if self.file.api_credential.is_none() {
            return Ok(());
        }
        self.file.api_credential = None;
        self.file.updated_at = Some(chrono::Utc::now().timestamp());
        self.save()?;
        info!("API credential cleared");
        Ok(())
    }

    // -- Active character (session only) --

    pub fn set_active_character(&mut self, image: CharacterImage) {
        debug!(
            "Active character set ({}, {} bytes)",
            image.mime_type(),
            image.data().len()
        );
        self.active_character = Some(image);
    }

    pub fn active_character(&self) -> Option<&CharacterImage> {
        self.active_character.as_ref()
    }

    pub fn clear_active_character(&mut self) {
        self.active_character = None;
    }

    /// Whether the active character coincides with the persisted default.
    /// Drives the "saved" indicator only; nothing load-bearing.
    pub fn active_matches_default(&self) -> bool {
        match (&self.active_character, &self.file.default_character) {
            (Some(active), Some(stored)) => active.to_data_uri() == *stored,
            _ => false,
        }
    }
}
