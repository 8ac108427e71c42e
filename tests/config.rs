use std::fs;

use tempfile::TempDir;

use glimpse::config::AssistantConfig;

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let config = AssistantConfig::load(&dir.path().join("absent.json")).unwrap();

    assert_eq!(config.interval_seconds, 10);
    assert_eq!(config.widening_intervals, vec![15, 30, 60, 120, 300]);
    assert_eq!(config.model_name, "llama3.2:3b");
    assert_eq!(config.request_timeout_secs, 60);
    assert!(config.system_prompt.contains("spelling error"));
}

#[test]
fn partial_file_keeps_defaults_for_absent_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glimpse.json");
    fs::write(
        &path,
        r#"{ "model_name": "mistral:7b", "widening_intervals": [5, 10] }"#,
    )
    .unwrap();

    let config = AssistantConfig::load(&path).unwrap();
    assert_eq!(config.model_name, "mistral:7b");
    assert_eq!(config.widening_intervals, vec![5, 10]);
    assert_eq!(config.interval_seconds, 10);
    assert_eq!(config.ollama_url, "http://localhost:11434");
}

#[test]
fn invalid_json_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glimpse.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(AssistantConfig::load(&path).is_err());
}

#[test]
fn round_trips_through_serde() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("glimpse.json");

    let mut config = AssistantConfig::default();
    config.database_path = "/tmp/captures.sqlite3".into();
    config.log_level = "debug".into();
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = AssistantConfig::load(&path).unwrap();
    assert_eq!(loaded.database_path, config.database_path);
    assert_eq!(loaded.log_level, "debug");
}
