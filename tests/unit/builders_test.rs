//! Tests for pool builders

use elastic_pool::builders::{build_logging_pool, build_pool};
use elastic_pool::config::AppConfig;
use elastic_pool::core::{LoggingExecutor, PoolError};

#[test]
fn test_build_logging_pool_from_config() {
    let cfg = AppConfig::from_json_str(r#"{ "workers": { "initial": 2 }, "log": { "echo_jobs": false } }"#)
        .unwrap();

    let pool = build_logging_pool(&cfg).unwrap();
    assert_eq!(pool.worker_ids(), vec![1, 2]);
    pool.shutdown().unwrap();
}

#[test]
fn test_build_pool_rejects_negative_count() {
    let mut cfg = AppConfig::default();
    cfg.workers.initial = -1;

    match build_pool(&cfg, LoggingExecutor::new()) {
        Err(PoolError::InvalidArgument(msg)) => assert!(msg.contains("config invalid")),
        Err(e) => panic!("Expected InvalidArgument, got: {e:?}"),
        Ok(_) => panic!("Expected InvalidArgument, got a pool"),
    }
}
