use std::collections::HashMap;

use super::*;

fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn passphrase_is_required() {
    let err = config_from(&[]).unwrap_err();
    assert!(matches!(err, ConfigError::Missing("ADMIN_PASSPHRASE")));
}

#[test]
fn blank_passphrase_counts_as_missing() {
    assert!(matches!(config_from(&[("ADMIN_PASSPHRASE", "  ")]), Err(ConfigError::Missing(_))));
}

#[test]
fn defaults_apply() {
    let config = config_from(&[("ADMIN_PASSPHRASE", "lotus")]).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
    assert_eq!(config.database_url, None);
    assert_eq!(config.storage, None);
}

#[test]
fn invalid_port_is_reported() {
    let err = config_from(&[("ADMIN_PASSPHRASE", "lotus"), ("PORT", "eighty")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
}

#[test]
fn storage_needs_url_and_key() {
    let config = config_from(&[("ADMIN_PASSPHRASE", "lotus"), ("STORAGE_URL", "https://proj.example.co")]).unwrap();
    assert_eq!(config.storage, None);
}

#[test]
fn storage_config_parses_with_defaults() {
    let config = config_from(&[
        ("ADMIN_PASSPHRASE", "lotus"),
        ("STORAGE_URL", "https://proj.example.co/"),
        ("STORAGE_SERVICE_KEY", "secret"),
        ("DATABASE_URL", "postgres://localhost/studio"),
        ("DB_MAX_CONNECTIONS", "12"),
    ])
    .unwrap();

    let storage = config.storage.unwrap();
    assert_eq!(storage.base_url, "https://proj.example.co");
    assert_eq!(storage.bucket, DEFAULT_STORAGE_BUCKET);
    assert_eq!(storage.timeout_secs, DEFAULT_STORAGE_TIMEOUT_SECS);
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/studio"));
    assert_eq!(config.db_max_connections, 12);
}

#[test]
fn invalid_storage_timeout_is_reported() {
    let err = config_from(&[
        ("ADMIN_PASSPHRASE", "lotus"),
        ("STORAGE_URL", "https://proj.example.co"),
        ("STORAGE_SERVICE_KEY", "secret"),
        ("STORAGE_TIMEOUT_SECS", "-1"),
    ])
    .unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_TIMEOUT_SECS", .. }));
}

#[test]
fn upload_and_panel_limits_default_and_override() {
    let config = config_from(&[("ADMIN_PASSPHRASE", "lotus")]).unwrap();
    assert_eq!(config.upload_max_bytes, DEFAULT_UPLOAD_MAX_BYTES);
    assert_eq!(config.max_open_panels, DEFAULT_MAX_OPEN_PANELS);

    let config =
        config_from(&[("ADMIN_PASSPHRASE", "lotus"), ("UPLOAD_MAX_BYTES", "1048576"), ("MAX_OPEN_PANELS", "2")])
            .unwrap();
    assert_eq!(config.upload_max_bytes, 1_048_576);
    assert_eq!(config.max_open_panels, 2);
}

#[test]
fn zero_open_panels_is_invalid() {
    let err = config_from(&[("ADMIN_PASSPHRASE", "lotus"), ("MAX_OPEN_PANELS", "0")]).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { key: "MAX_OPEN_PANELS", .. }));
}
