//! Integration-level unit tests for the SettingsEngine public API.
//!
//! These tests exercise the SettingsEngine through its public trait interface,
//! validating default loading, value persistence, and reset behavior.

use linkvault::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use linkvault::types::errors::SettingsError;
use linkvault::types::settings::AppSettings;
use tempfile::TempDir;

/// Helper: create a SettingsEngine backed by a temp directory that lives for the
/// duration of the test (the caller holds the `TempDir` handle).
fn engine_in_temp(dir: &TempDir) -> SettingsEngine {
    let path = dir
        .path()
        .join("settings.json")
        .to_string_lossy()
        .to_string();
    SettingsEngine::new(Some(path))
}

#[test]
fn test_load_defaults_when_no_config_file_exists() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);

    let settings = engine.load().unwrap();

    assert_eq!(settings, AppSettings::default());
    assert_eq!(settings.server.api_port, 8080);
    assert_eq!(settings.server.transfer_port, 9000);
    assert_eq!(settings.transfer.fetch_timeout_secs, 30);
    assert_eq!(settings.general.active_profile_id, 1);
}

/// A change made through `set_value` is visible to a fresh engine on the same file.
#[test]
fn test_set_value_persists_changes() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("server.transfer_port", serde_json::json!(9100))
            .unwrap();
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        let loaded = engine2.load().unwrap();
        assert_eq!(loaded.server.transfer_port, 9100);
    }
}

#[test]
fn test_reset_restores_defaults() {
    let dir = TempDir::new().unwrap();

    {
        let mut engine = engine_in_temp(&dir);
        engine.load().unwrap();
        engine
            .set_value("general.database_file", serde_json::json!("other.db"))
            .unwrap();
        engine
            .set_value("transfer.fetch_timeout_secs", serde_json::json!(5))
            .unwrap();
        assert_eq!(engine.get_settings().general.database_file, "other.db");

        engine.reset().unwrap();
        assert_eq!(*engine.get_settings(), AppSettings::default());
    }

    {
        let mut engine2 = engine_in_temp(&dir);
        assert_eq!(engine2.load().unwrap(), AppSettings::default());
    }
}

#[test]
fn test_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    assert!(matches!(
        engine.set_value("server.nope", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("server..api_port", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert!(matches!(
        engine.set_value("server.api_port.low", serde_json::json!(1)),
        Err(SettingsError::InvalidKey(_))
    ));
    assert_eq!(engine.get_settings().server.api_port, 8080);
}

#[test]
fn test_wrong_type_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    engine.load().unwrap();

    let result = engine.set_value("server.preferred_interfaces", serde_json::json!("wlan"));
    assert!(matches!(result, Err(SettingsError::InvalidValue(_))));
}

#[test]
fn test_malformed_file_is_serialization_error() {
    let dir = TempDir::new().unwrap();
    let mut engine = engine_in_temp(&dir);
    std::fs::write(engine.get_config_path(), "{not json").unwrap();

    assert!(matches!(
        engine.load(),
        Err(SettingsError::SerializationError(_))
    ));
}
