//! Config save/load roundtrip integration tests.

use playbooks_core::config::{BindMode, Config, StorageBackend};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, config.gateway.port);
    assert_eq!(loaded.gateway.bind, config.gateway.bind);
    assert_eq!(loaded.session.storage, config.session.storage);
    assert_eq!(loaded.runtime.fallback_on_failure, config.runtime.fallback_on_failure);
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json5");

    let mut config = Config::default();
    config.gateway.port = 9090;
    config.gateway.bind = BindMode::Lan;
    config.session.storage = StorageBackend::Memory;
    config.session.idle_ttl_secs = Some(600);
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gateway.port, 9090);
    assert_eq!(loaded.gateway.bind, BindMode::Lan);
    assert_eq!(loaded.session.storage, StorageBackend::Memory);
    assert_eq!(loaded.session.idle_ttl_secs, Some(600));
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/config.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_parse_json5() {
    let config = Config::parse("{ gateway: { port: 4000 }, // comment\n }").unwrap();
    assert_eq!(config.gateway.port, 4000);
    assert!(Config::parse("not valid json").is_err());
}
