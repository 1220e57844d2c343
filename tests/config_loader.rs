use irma_session::config::{Config, ConfigError, ReturnUrlConfig, SessionConfig};
use std::fs;
use tempfile::TempDir;

/// Test that Config::default() produces the documented values.
#[test]
fn test_config_default_values() {
    let config = Config::default();

    assert_eq!(config.session.event_buffer, 64);
    assert_eq!(config.session.event_tap_capacity, 256);
    assert_eq!(
        config.return_url.allowed_schemes,
        ["https", "http", "tel", "mailto"]
    );
    assert!(config.validate().is_ok());
}

/// Test that Config::config_path() returns a path ending with the expected filename.
#[test]
fn test_config_path_ends_with_expected() {
    let path = Config::config_path();
    assert!(path.ends_with("irma-session/config.toml"));
}

/// Test validation fails when the event buffer is zero.
#[test]
fn test_validation_fails_zero_event_buffer() {
    let config = Config {
        session: SessionConfig {
            event_buffer: 0,
            ..SessionConfig::default()
        },
        return_url: ReturnUrlConfig::default(),
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("event_buffer"));
        }
        _ => panic!("Expected ValidationError"),
    }
}

/// Test validation fails when no return URL scheme is allowed.
#[test]
fn test_validation_fails_no_schemes() {
    let config = Config {
        session: SessionConfig::default(),
        return_url: ReturnUrlConfig {
            allowed_schemes: Vec::new(),
        },
    };

    match config.validate().unwrap_err() {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("scheme"));
        }
        _ => panic!("Expected ValidationError"),
    }
}

/// Test that partial TOML fills in defaults.
#[test]
fn test_parse_partial_toml() {
    let toml_content = r#"
[session]
event_buffer = 8

[return_url]
allowed_schemes = ["https"]
"#;

    let config: Config = toml::from_str(toml_content).expect("Should parse valid TOML");

    assert_eq!(config.session.event_buffer, 8);
    assert_eq!(config.session.event_tap_capacity, 256);
    assert_eq!(config.return_url.allowed_schemes, ["https"]);
}

/// Test that a missing file yields the default config.
#[test]
fn test_load_from_missing_file_is_default() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config::load_from(&dir.path().join("absent.toml")).expect("default");
    assert_eq!(config, Config::default());
}

/// Test that invalid TOML on disk is a parse error.
#[test]
fn test_load_from_invalid_toml() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "this is not valid toml [[[").expect("write");

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ParseError { .. })
    ));
}

/// Test that a file failing validation is rejected.
#[test]
fn test_load_from_rejects_invalid_values() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[session]\nevent_tap_capacity = 0\n").expect("write");

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// Test round-trip serialization/deserialization.
#[test]
fn test_config_roundtrip() {
    let config = Config::default();
    let serialized = toml::to_string(&config).expect("serialize");
    let parsed: Config = toml::from_str(&serialized).expect("parse");
    assert_eq!(parsed, config);
}
