//! Tests for configuration loading and validation

use std::io::Write;
use std::path::Path;

use elastic_pool::config::{AppConfig, ConfigError, ConfigSource, WorkerPoolConfig};

#[test]
fn test_pool_config_defaults() {
    let cfg = WorkerPoolConfig::default();
    assert_eq!(cfg.initial_workers, 10);
    assert_eq!(cfg.thread_name_prefix, "pool-worker");
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.initial_worker_count(), Ok(10));
}

#[test]
fn test_pool_config_invalid_initial_workers() {
    let cfg = WorkerPoolConfig::new().with_initial_workers(-5);
    assert!(cfg.validate().is_err());
    assert!(cfg.initial_worker_count().is_err());
}

#[test]
fn test_pool_config_invalid_stack_size() {
    let cfg = WorkerPoolConfig::new().with_thread_stack_size(0);
    assert!(cfg.validate().is_err());
}

#[test]
fn test_pool_config_invalid_prefix() {
    let cfg = WorkerPoolConfig::new().with_thread_name_prefix("");
    assert!(cfg.validate().is_err());
}

#[test]
fn test_app_config_from_json() {
    let json = r#"{
        "workers": { "initial": 3, "thread_name_prefix": "job-runner" },
        "log": { "level": "debug" }
    }"#;

    let cfg = AppConfig::from_json_str(json).unwrap();
    assert_eq!(cfg.workers.initial, 3);
    assert_eq!(cfg.log.level, "debug");
    assert!(cfg.log.echo_jobs);

    let pool_cfg = cfg.pool_config();
    assert_eq!(pool_cfg.initial_workers, 3);
    assert_eq!(pool_cfg.thread_name_prefix, "job-runner");
}

#[test]
fn test_app_config_missing_fields_use_defaults() {
    let cfg = AppConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.workers.initial, 10);
}

#[test]
fn test_app_config_rejects_negative_workers() {
    let err = AppConfig::from_json_str(r#"{ "workers": { "initial": -1 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_app_config_rejects_bad_json() {
    let err = AppConfig::from_json_str("workers: 3").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_load_from_file_with_env_override() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "workers": {{ "initial": 4 }} }}"#).unwrap();

    let env = |var: &str| match var {
        "WORKER_POOL_LOG_LEVEL" => Some("warn".to_string()),
        _ => None,
    };
    let (cfg, source) = AppConfig::load_with(Some(file.path()), env).unwrap();

    assert_eq!(cfg.workers.initial, 4);
    assert_eq!(cfg.log.level, "warn");
    assert_eq!(source, ConfigSource::File(file.path().to_path_buf()));
}

#[test]
fn test_load_env_override_is_validated() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "workers": {{ "initial": 4 }} }}"#).unwrap();

    let env = |var: &str| (var == "WORKER_POOL_WORKERS_INITIAL").then(|| "-2".to_string());
    let err = AppConfig::load_with(Some(file.path()), env).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let err = AppConfig::load_with(Some(Path::new("/nonexistent/worker-pool.json")), |_| None)
        .unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_load_without_file_uses_defaults() {
    let (cfg, source) = AppConfig::load_with(None, |_| None).unwrap();
    assert_eq!(source, ConfigSource::Defaults);
    assert_eq!(cfg.workers.initial, 10);
}
