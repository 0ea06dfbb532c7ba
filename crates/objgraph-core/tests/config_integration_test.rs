use objgraph_core::{ConfigError, ConfigManager, ExploreConfig, LoggingConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_default_configuration() {
    let config = ExploreConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.output_dir, PathBuf::from("."));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.log_dir, PathBuf::from("logs"));
    assert!(config.namespace.is_none());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("objgraph.toml");
    fs::write(
        &path,
        r#"
namespace = "magic"
match_edges = false

[logging]
level = "info"
"#,
    )
    .unwrap();

    let config = ConfigManager::load_from(&path).unwrap().into_config();
    assert_eq!(config.namespace.as_deref(), Some("magic"));
    assert!(!config.match_edges);
    assert_eq!(config.max_depth, 10);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.log_dir, LoggingConfig::default().log_dir);
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("objgraph.toml");
    fs::write(&path, "ignore_pattern = [\"[unclosed\"]\n").unwrap();

    assert!(matches!(
        ConfigManager::load_from(&path),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_missing_file_is_a_read_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        ConfigManager::load_from(&temp_dir.path().join("absent.toml")),
        Err(ConfigError::ReadError(_))
    ));
}

#[test]
fn test_config_round_trips_through_toml() {
    let mut config = ExploreConfig::default();
    config.ignored_types.push("Matrix".to_string());
    config.max_depth = 3;

    let serialized = toml::to_string(&config).unwrap();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("objgraph.toml");
    fs::write(&path, serialized).unwrap();

    let loaded = ConfigManager::load_from(&path).unwrap();
    assert_eq!(loaded.config().max_depth, 3);
    assert_eq!(loaded.config().ignored_types, vec!["Matrix".to_string()]);
}
