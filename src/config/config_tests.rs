use super::*;
use std::fs;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.version, CONFIG_VERSION);
    assert_eq!(config.focus.history_capacity, 80);
    assert_eq!(config.focus.pre_margin_ms, 500);
    assert_eq!(config.focus.post_margin_ms, 50);
    assert_eq!(config.dedupe.lru_size, 200);
    assert_eq!(config.dedupe.per_app_window_secs, 30);
    assert!(config.secret_safe.enabled);
    assert_eq!(config.secret_safe.token_ttl_secs, 30);
    assert!(config.board_rules.is_none());
    assert!(!config.persistence.enabled);
}

#[test]
fn test_default_blocklist_contains_password_managers() {
    let config = Config::default();
    for app in ["1password", "bitwarden", "lastpass"] {
        assert!(
            config.secret_safe.blocklist_apps.iter().any(|b| b == app),
            "default blocklist should contain {}",
            app
        );
    }
}

#[test]
fn test_partial_json_fills_defaults() {
    let json = r#"{"dedupe": {"lruSize": 10}, "secretSafe": {"enabled": false}}"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.dedupe.lru_size, 10);
    assert_eq!(config.dedupe.per_app_window_secs, DEFAULT_DEDUPE_PER_APP_WINDOW_SECS);
    assert!(!config.secret_safe.enabled);
    assert_eq!(config.secret_safe.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
    assert_eq!(config.focus, FocusConfig::default());
}

#[test]
fn test_config_serialization_uses_camel_case() {
    let json = serde_json::to_string(&Config::default()).unwrap();
    assert!(json.contains("\"secretSafe\""));
    assert!(json.contains("\"perAppWindowSecs\""));
    assert!(!json.contains("board_rules"));
}

#[test]
fn test_duration_helpers() {
    let config = Config::default();
    assert_eq!(config.focus.pre_margin(), chrono::Duration::milliseconds(500));
    assert_eq!(config.focus.post_margin(), chrono::Duration::milliseconds(50));
    assert_eq!(config.dedupe.per_app_window(), chrono::Duration::seconds(30));
    assert_eq!(config.secret_safe.token_ttl(), chrono::Duration::seconds(30));
    assert_eq!(
        config.history.sweep_interval(),
        std::time::Duration::from_millis(1000)
    );
}

#[test]
fn test_language_ide_lookup_is_case_insensitive() {
    let focus = FocusConfig::default();
    assert_eq!(focus.language_ide("Python").unwrap().canonical, "PyCharm");
    assert_eq!(
        focus.language_ide("js").unwrap().canonical,
        "Visual Studio Code"
    );
    assert!(focus.language_ide("cobol").is_none());
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(&dir.path().join("settings.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut config = Config::default();
    config.secret_safe.enabled = false;
    config.history.per_app_capture.insert("Slack".to_string(), false);
    save_config(&path, &config).unwrap();

    assert!(!path.with_extension("tmp").exists(), "temp file should be renamed");
    let loaded = load_config(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_broken_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ this is not json").unwrap();

    let config = load_config(&path);
    assert_eq!(config, Config::default());
    assert!(!path.exists(), "broken config should be moved");
    assert!(dir.path().join("settings.broken.json").exists());
}

#[test]
fn test_default_paths_end_with_expected_names() {
    assert!(default_config_path().ends_with("copypaste/settings.json"));
    assert!(default_database_path().ends_with("copypaste/history.sqlite"));
}
