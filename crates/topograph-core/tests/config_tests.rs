use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;
use topograph_core::config::{
    ConfigError, DEFAULT_CURRENT_NAMESPACE, DEFAULT_LOGS_COMMAND, DEFAULT_RESTART_THRESHOLD,
    DEFAULT_RESTART_WINDOW_MINUTES, MAX_RESTART_WINDOW_MINUTES,
};
use topograph_core::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.analysis.restart_threshold, DEFAULT_RESTART_THRESHOLD);
    assert_eq!(config.analysis.restart_window_minutes, DEFAULT_RESTART_WINDOW_MINUTES);
    assert_eq!(config.analysis.logs_command, DEFAULT_LOGS_COMMAND);
    assert_eq!(config.namer.current_namespace, DEFAULT_CURRENT_NAMESPACE);
}

#[test]
fn test_default_config_string_round_trips() {
    let text = Config::default_config_string();
    assert!(text.contains("[analysis]"));
    assert!(text.contains("[namer]"));
    let parsed = Config::from_toml_str(&text).unwrap();
    assert_eq!(parsed, Config::default());
}

#[test]
fn test_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("topograph.toml");
    fs::write(
        &path,
        r#"
[analysis]
restart_window_minutes = 15
set_probe_command = "kubectl set probe"
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.analysis.restart_window_minutes, 15);
    assert_eq!(config.analysis.set_probe_command, "kubectl set probe");
    assert_eq!(config.analysis.restart_threshold, DEFAULT_RESTART_THRESHOLD);
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError(_)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("topograph.toml");
    fs::write(&path, "[analysis\nrestart_threshold = ").unwrap();
    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
fn test_negative_threshold_is_invalid() {
    let err = Config::from_toml_str("[analysis]\nrestart_threshold = -1\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_huge_window_is_invalid() {
    let text = format!("[analysis]\nrestart_window_minutes = {}\n", i64::MAX);
    let err = Config::from_toml_str(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));

    let largest = format!("[analysis]\nrestart_window_minutes = {MAX_RESTART_WINDOW_MINUTES}\n");
    let config = Config::from_toml_str(&largest).unwrap();
    assert_eq!(config.analysis.restart_window(), chrono::Duration::days(365));
}

fn overrides(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn test_overrides_are_validated() {
    let zero_window = Config::default().with_overrides(overrides(&[("TOPOGRAPH_RESTART_WINDOW_MINUTES", "0")]));
    assert!(matches!(zero_window, Err(ConfigError::Invalid(_))));

    let max = i64::MAX.to_string();
    let huge_window = Config::default().with_overrides(overrides(&[("TOPOGRAPH_RESTART_WINDOW_MINUTES", &max)]));
    assert!(matches!(huge_window, Err(ConfigError::Invalid(_))));

    let negative = Config::default().with_overrides(overrides(&[("TOPOGRAPH_RESTART_THRESHOLD", "-3")]));
    assert!(matches!(negative, Err(ConfigError::Invalid(_))));
}

#[test]
fn test_overrides_apply() {
    let config = Config::default()
        .with_overrides(overrides(&[
            ("TOPOGRAPH_RESTART_WINDOW_MINUTES", "30"),
            ("TOPOGRAPH_RESTART_THRESHOLD", "not a number"),
            ("TOPOGRAPH_NAMESPACE", "shop"),
        ]))
        .unwrap();
    assert_eq!(config.analysis.restart_window_minutes, 30);
    assert_eq!(config.analysis.restart_threshold, DEFAULT_RESTART_THRESHOLD);
    assert_eq!(config.namer.current_namespace, "shop");
}
