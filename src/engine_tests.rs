//! Cross-module scenario tests.
//!
//! These exercise the paths a session actually takes: validation failures
//! landing in `Failed`, the credential self-heal loop after an auth
//! rejection, default-character persistence across a restart, and the
//! text-description path through the compositor.

use crate::character::CharacterImage;
use crate::compositor;
use crate::error::{classify_remote_message, GenerationError};
use crate::generation::{resolve_inputs, GenerationEngine, GenerationPhase};
use crate::store::StudioStore;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use tempfile::tempdir;

fn png_character(width: u32, height: u32) -> CharacterImage {
    let canvas = RgbaImage::from_pixel(width, height, image::Rgba([200, 200, 200, 255]));
    let mut bytes = Vec::new();
    canvas
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    CharacterImage::new("image/png", bytes)
}

#[test]
fn scenario_validation_failure_lands_in_failed_and_acknowledges() {
    let dir = tempdir().unwrap();
    let store = StudioStore::load_from_path(dir.path().join("store.json"));
    let mut engine = GenerationEngine::new();

    // No character uploaded yet; the request never reaches the network
    let resolved = resolve_inputs(
        store.active_character().cloned(),
        "wave hello",
        store.get_credential().map(str::to_string),
    );
    let err = resolved.unwrap_err();
    assert_eq!(err, GenerationError::MissingCharacter);

    engine.fail(err);
    assert_eq!(engine.phase(), &GenerationPhase::Failed);
    assert!(engine.status().error.is_some());

    engine.acknowledge();
    assert_eq!(engine.phase(), &GenerationPhase::Idle);
    assert!(engine.status().error.is_none());
}

#[test]
fn scenario_rejected_credential_self_heals() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let mut store = StudioStore::load_from_path(path.clone());
    store.set_active_character(png_character(8, 8));
    store.set_credential("revoked-key").unwrap();

    // Inputs resolve while the stale key is still stored
    assert!(resolve_inputs(
        store.active_character().cloned(),
        "a prompt",
        store.get_credential().map(str::to_string),
    )
    .is_ok());

    // The remote service rejects the key; the orchestrator clears it
    let err = classify_remote_message("API key not valid. Please pass a valid API key.");
    assert!(matches!(err, GenerationError::InvalidCredential(_)));
    store.clear_credential().unwrap();

    // The next attempt now fails fast, before any network activity
    let resolved = resolve_inputs(
        store.active_character().cloned(),
        "a prompt",
        store.get_credential().map(str::to_string),
    );
    assert_eq!(resolved.unwrap_err(), GenerationError::MissingCredential);

    // And the cleared slot survives a restart
    let reloaded = StudioStore::load_from_path(path);
    assert!(reloaded.get_credential().is_none());
}

#[test]
fn scenario_default_character_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("store.json");
    let character = png_character(16, 16);

    {
        let mut store = StudioStore::load_from_path(path.clone());
        store.set_active_character(character.clone());
        store.save_default_character(&character).unwrap();
        assert!(store.active_matches_default());
    }

    // Fresh process: the default loads and becomes the active character
    let mut store = StudioStore::load_from_path(path);
    let restored = store.load_default_character().unwrap();
    assert_eq!(restored, character);
    store.set_active_character(restored);
    assert!(store.active_matches_default());
}

#[test]
fn scenario_text_description_is_composited_onto_the_character() {
    let character = png_character(400, 300);
    let result =
        compositor::compose_description(&character, "The character waves from a hilltop")
            .unwrap();

    assert_eq!(result.mime_type(), "image/png");
    let output = image::load_from_memory(result.data()).unwrap();
    assert_eq!(output.width(), 400);
    assert_eq!(output.height(), 300);

    let mut engine = GenerationEngine::new();
    engine.begin().unwrap();
    engine.succeed(result);
    assert_eq!(engine.phase(), &GenerationPhase::Succeeded);
    let status = engine.status();
    assert!(status.error.is_none());
    assert!(status.request_id.is_some());
}

#[test]
fn scenario_second_request_is_rejected_while_pending() {
    let mut engine = GenerationEngine::new();
    engine.begin().unwrap();

    let rejected = engine.begin();
    assert!(rejected.is_err());
    assert_eq!(engine.phase(), &GenerationPhase::Pending);

    // The in-flight request still completes normally
    engine.succeed(png_character(4, 4));
    assert_eq!(engine.phase(), &GenerationPhase::Succeeded);
}
