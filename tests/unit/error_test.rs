//! Tests for error types

use elastic_pool::config::ConfigError;
use elastic_pool::core::PoolError;

#[test]
fn test_invalid_argument_error() {
    let err = PoolError::InvalidArgument("initial worker count must be >= 0, got -2".to_string());
    assert_eq!(
        format!("{}", err),
        "invalid argument: initial worker count must be >= 0, got -2"
    );
}

#[test]
fn test_already_stopped_error() {
    let err = PoolError::AlreadyStopped;
    assert_eq!(format!("{}", err), "already stopped");
}

#[test]
fn test_already_started_error() {
    let err = PoolError::AlreadyStarted;
    assert_eq!(format!("{}", err), "management loop already started");
}

#[test]
fn test_spawn_error() {
    let err = PoolError::Spawn("resource temporarily unavailable".to_string());
    assert_eq!(
        format!("{}", err),
        "failed to spawn thread: resource temporarily unavailable"
    );
}

#[test]
fn test_config_env_error() {
    let err = ConfigError::Env {
        var: "WORKER_POOL_WORKERS_INITIAL",
        value: "ten".to_string(),
    };
    assert_eq!(
        format!("{}", err),
        "invalid value for WORKER_POOL_WORKERS_INITIAL: \"ten\""
    );
}
