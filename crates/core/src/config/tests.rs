//! Tests for configuration module

use super::*;
use crate::error::{Error, Result};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn create_temp_config_file(content: &str) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .map_err(|e| Error::config(format!("Failed to create temp file: {e}")))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::config(format!("Failed to write temp file: {e}")))?;
    file.flush()
        .map_err(|e| Error::config(format!("Failed to flush temp file: {e}")))?;
    Ok(file)
}

fn with_env_var<F, T>(key: &str, value: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    std::env::set_var(key, value);
    let result = f();
    std::env::remove_var(key);
    result
}

#[test]
fn test_from_toml_str_valid() {
    let toml = r#"
        [store]
        provider = "rest"
        host = "graph.internal"
        http_port = 17474
        database = "people"
        user = "alice"
        password = "secret"
    "#;

    let config = Config::from_toml_str(toml).expect("Failed to parse valid TOML");
    assert_eq!(config.store.host, "graph.internal");
    assert_eq!(config.store.http_port, 17474);
    assert_eq!(config.store.database, "people");
    assert_eq!(config.store.user, "alice");
    assert!(config.validate().is_ok());
}

#[test]
fn test_from_toml_str_minimal() {
    let config = Config::from_toml_str("").expect("Failed to parse empty TOML");
    assert_eq!(config.store.provider, "rest");
    assert_eq!(config.store.host, "localhost");
    assert_eq!(config.store.http_port, 7474);
    assert_eq!(config.store.database, "neo4j");
    assert_eq!(config.store.timeout_secs, 30);
    assert_eq!(config.store.max_batch_size, default_max_batch_size());
}

#[test]
fn test_from_toml_str_invalid() {
    let result = Config::from_toml_str("[store\nhost = ");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_base_and_transaction_urls() {
    let config = Config::from_toml_str(
        r#"
        [store]
        scheme = "https"
        host = "db.example.org"
        http_port = 7473
        database = "movies"
    "#,
    )
    .expect("Failed to parse TOML");

    assert_eq!(config.store.base_url(), "https://db.example.org:7473");
    assert_eq!(
        config.store.transaction_url(),
        "https://db.example.org:7473/db/movies/tx"
    );
}

#[test]
fn test_validate_rejects_unknown_provider() {
    let mut config = Config::default();
    config.store.provider = "bolt".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("Invalid store provider 'bolt'"));
}

#[test]
fn test_validate_rejects_bad_scheme() {
    let mut config = Config::default();
    config.store.scheme = "ftp".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_limits() {
    let mut config = Config::default();
    config.store.timeout_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.store.max_batch_size = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_debug_redacts_password() {
    let mut config = StoreConfig::default();
    config.password = "hunter2".to_string();
    let debug = format!("{config:?}");
    assert!(!debug.contains("hunter2"));
    assert!(debug.contains("***REDACTED***"));
}

#[test]
fn test_from_file_reads_values() -> Result<()> {
    let file = create_temp_config_file(
        r#"
        [store]
        provider = "mock"
        max_batch_size = 25
    "#,
    )?;

    let config = Config::from_file(file.path())?;
    assert_eq!(config.store.provider, "mock");
    assert_eq!(config.store.max_batch_size, 25);
    Ok(())
}

#[test]
fn test_from_file_missing_uses_defaults() -> Result<()> {
    let config = Config::from_file(Path::new("/nonexistent/graphlink/config.toml"))?;
    assert_eq!(config.store.provider, "rest");
    assert_eq!(config.store.host, "localhost");
    Ok(())
}

#[test]
fn test_env_prefix_overrides_file() -> Result<()> {
    let file = create_temp_config_file(
        r#"
        [store]
        scheme = "http"
    "#,
    )?;

    let config = with_env_var("GRAPHLINK_STORE__SCHEME", "https", || {
        Config::from_file(file.path())
    })?;
    assert_eq!(config.store.scheme, "https");
    Ok(())
}

#[test]
fn test_neo4j_env_overrides() -> Result<()> {
    let file = create_temp_config_file("[store]\n")?;

    let config = with_env_var("NEO4J_PASSWORD", "from-env", || {
        Config::from_file(file.path())
    })?;
    assert_eq!(config.store.password, "from-env");
    Ok(())
}

#[test]
fn test_round_trip_through_toml() -> Result<()> {
    let mut config = Config::default();
    config.store.database = "graphs".to_string();
    let toml = config.to_toml()?;
    let back = Config::from_toml_str(&toml)?;
    assert_eq!(back.store.database, "graphs");
    Ok(())
}

#[test]
fn test_save_creates_parent_directories() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.store.database = "saved".to_string();
    config.save(&path)?;

    let loaded = Config::from_file(&path)?;
    assert_eq!(loaded.store.database, "saved");
    Ok(())
}

#[test]
fn test_save_reports_io_failures() -> Result<()> {
    let blocker = create_temp_config_file("")?;

    // a regular file cannot act as a directory
    let result = Config::default().save(&blocker.path().join("config.toml"));
    assert!(matches!(result, Err(Error::Io(_))));

    let dir = tempfile::tempdir()?;
    let result = Config::default().save(dir.path());
    let err = result.unwrap_err();
    assert!(matches!(err, Error::WithContext { .. }));
    assert!(err.to_string().starts_with("Failed to write config file"));
    Ok(())
}
