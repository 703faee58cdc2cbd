//! Config file loading, environment layering and validation.

use std::io::Write;
use std::path::PathBuf;

use metserver_rs::config::{ConfigLoader, SourceMode};
use metserver_rs::error::ConfigError;

fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("metserver-test")
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_missing_files_fall_back_to_defaults() {
    let loader = ConfigLoader::with_paths(vec![PathBuf::from(
        "/nonexistent/metserver-test/metserver.toml",
    )])
    .with_env_prefix("METSERVER_TEST_NONE_".into());
    let config = loader.load().unwrap();
    assert_eq!(config.server.port, 30384);
    assert!(config.serial.enabled);
    assert!(!config.relay.enabled);
}

#[test]
fn test_toml_file_overrides_defaults() {
    let file = write_temp(
        ".toml",
        r#"
[server]
port = 40001

[relay]
enabled = true
host = "10.1.2.3"
port = 5001

[sampling]
interval_secs = 5
"#,
    );

    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .with_env_prefix("METSERVER_TEST_TOML_".into());
    let config = loader.load().unwrap();

    assert_eq!(config.server.port, 40001);
    assert!(config.relay.enabled);
    assert_eq!(config.relay.host, "10.1.2.3");
    assert_eq!(config.sampling.interval_secs, 5);
    // untouched sections keep their defaults
    assert_eq!(config.wind.group, "239.192.0.4");
    assert_eq!(config.serial.baud, 9600);
    assert_eq!(config.validate().unwrap(), SourceMode::RelayWithSerialFallback);
}

#[test]
fn test_json_file_overrides_defaults() {
    let file = write_temp(
        ".json",
        r#"{"server": {"port": 40002}, "serial": {"enabled": false}, "relay": {"enabled": true, "host": "10.1.2.4"}}"#,
    );

    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .with_env_prefix("METSERVER_TEST_JSON_".into());
    let config = loader.load().unwrap();

    assert_eq!(config.server.port, 40002);
    assert_eq!(config.validate().unwrap(), SourceMode::RelayOnly);
}

#[test]
fn test_malformed_file_is_a_parse_error() {
    let file = write_temp(".toml", "[server\nport = oops");
    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .with_env_prefix("METSERVER_TEST_BAD_".into());
    assert!(matches!(loader.load(), Err(ConfigError::Parse(_))));
}

#[test]
fn test_env_overrides_win_over_file() {
    let file = write_temp(".toml", "[server]\nport = 40003\n");

    std::env::set_var("METSERVER_TEST_ENV_PORT", "40004");
    std::env::set_var("METSERVER_TEST_ENV_LOG_LEVEL", "debug");

    let loader = ConfigLoader::with_paths(vec![file.path().to_path_buf()])
        .with_env_prefix("METSERVER_TEST_ENV_".into());
    let config = loader.load().unwrap();

    assert_eq!(config.server.port, 40004);
    assert_eq!(config.logging.level, "debug");

    std::env::remove_var("METSERVER_TEST_ENV_PORT");
    std::env::remove_var("METSERVER_TEST_ENV_LOG_LEVEL");
}

#[test]
fn test_invalid_env_override_is_a_parse_error() {
    std::env::set_var("METSERVER_TEST_ENVBAD_PORT", "not-a-port");

    let loader = ConfigLoader::with_paths(Vec::new())
        .with_env_prefix("METSERVER_TEST_ENVBAD_".into());
    assert!(matches!(loader.load(), Err(ConfigError::Parse(_))));

    std::env::remove_var("METSERVER_TEST_ENVBAD_PORT");
}
