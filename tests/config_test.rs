//! Configuration system tests.

use metrix::core::{Config, ConfigBuilder, LogLevel, ManualClock};
use metrix::{Counter, Strategy, UnknownMetricPolicy};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::new().unwrap();
    assert_eq!(config.counter.ttl, Duration::from_secs(300));
    assert_eq!(config.counter.strategy, Strategy::Log);
    assert_eq!(config.counter.unknown_metric, None);
    assert!(!config.sweep.enabled);
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_config_builder() {
    let config = ConfigBuilder::new()
        .ttl(Duration::from_secs(60))
        .strategy(Strategy::Ring)
        .unknown_metric(UnknownMetricPolicy::Error)
        .sweep_interval(Duration::from_secs(10))
        .log_level(LogLevel::Warn)
        .build()
        .unwrap();

    assert_eq!(config.counter.ttl, Duration::from_secs(60));
    assert_eq!(config.counter.strategy, Strategy::Ring);
    assert_eq!(config.counter.unknown_metric_policy(), UnknownMetricPolicy::Error);
    assert!(config.sweep.enabled);
    assert_eq!(config.logging.level, LogLevel::Warn);
}

#[test]
fn test_partial_yaml_keeps_defaults() {
    let config = ConfigBuilder::new()
        .from_yaml("counter:\n  strategy: ring\n")
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.counter.strategy, Strategy::Ring);
    assert_eq!(config.counter.ttl, Duration::from_secs(300));
    assert_eq!(config.counter.unknown_metric_policy(), UnknownMetricPolicy::Zero);
}

#[test]
fn test_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "counter:\n  ttl: 2m\n  strategy: log\n  unknown_metric: zero\nlogging:\n  level: trace\n  structured: true"
    )
    .unwrap();

    let config = ConfigBuilder::new()
        .from_file(file.path())
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.counter.ttl, Duration::from_secs(120));
    assert_eq!(config.counter.unknown_metric, Some(UnknownMetricPolicy::Zero));
    assert_eq!(config.logging.level, LogLevel::Trace);
    assert!(config.logging.structured);
}

#[test]
fn test_config_validation() {
    assert!(ConfigBuilder::new().ttl(Duration::ZERO).build().is_err());
    assert!(ConfigBuilder::new().ttl(Duration::from_millis(100)).build().is_err());
    assert!(ConfigBuilder::new().sweep_interval(Duration::ZERO).build().is_err());
    assert!(ConfigBuilder::new()
        .from_yaml("counter:\n  strategy: bucket\n")
        .is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ConfigBuilder::new()
        .from_file(std::path::Path::new("/nonexistent/metrix.yaml"))
        .unwrap_err();
    assert_eq!(err.category(), "io");
}

#[test]
fn test_counter_from_loaded_config() {
    let config = ConfigBuilder::new()
        .from_yaml("counter:\n  ttl: 30s\n  strategy: ring\n")
        .unwrap()
        .build()
        .unwrap();

    let counter = Counter::from_config(&config.counter, Arc::new(ManualClock::at_secs(10))).unwrap();
    assert_eq!(counter.strategy(), Strategy::Ring);
    assert_eq!(counter.ttl().as_secs(), 30);
}
