//! Configuration management for Metrix.
//!
//! This module provides configuration handling with:
//! - YAML file support
//! - Builder for programmatic construction (used for CLI overrides)
//! - Validation and defaults

use crate::core::{MetrixError, Result};
use crate::counter::{Strategy, Ttl, UnknownMetricPolicy, MAX_RING_TTL_SECS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Complete configuration for Metrix
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Counter configuration
    pub counter: CounterConfig,
    /// Background sweep configuration
    pub sweep: SweepConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Counter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Maximum age of an event before it stops counting
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Counting strategy
    pub strategy: Strategy,
    /// Behaviour for queries on never-recorded names; `None` uses the
    /// strategy's default
    pub unknown_metric: Option<UnknownMetricPolicy>,
}

/// Background sweep configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Run a periodic sweep of expired events
    pub enabled: bool,
    /// Sweep interval
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,
    /// Structured logging format
    pub structured: bool,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            ttl: Duration::from_secs(300), // 5 minutes
            strategy: Strategy::Log,
            unknown_metric: None,
        }
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            enabled: false,
            interval: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: LogLevel::Info,
            structured: false,
        }
    }
}

impl CounterConfig {
    /// Validated ttl
    pub fn ttl(&self) -> Result<Ttl> {
        Ttl::new(self.ttl)
    }

    /// Unknown-metric policy after applying the strategy default
    pub fn unknown_metric_policy(&self) -> UnknownMetricPolicy {
        self.unknown_metric
            .unwrap_or_else(|| self.strategy.default_unknown_metric_policy())
    }
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Result<Self> {
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let ttl = self.counter.ttl()?;
        if self.counter.strategy == Strategy::Ring && ttl.as_secs() > MAX_RING_TTL_SECS {
            return Err(MetrixError::config(format!(
                "ring ttl {} exceeds the maximum of {}s",
                ttl, MAX_RING_TTL_SECS
            )));
        }

        if self.sweep.enabled && self.sweep.interval.is_zero() {
            return Err(MetrixError::config(
                "sweep interval must be greater than 0 when sweeping is enabled",
            ));
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Configuration builder for programmatic construction
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with defaults
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Load configuration from YAML string
    pub fn from_yaml(mut self, yaml: &str) -> Result<Self> {
        self.config = serde_yaml::from_str(yaml)
            .map_err(|e| MetrixError::config(format!("Failed to parse YAML config: {}", e)))?;
        Ok(self)
    }

    /// Load configuration from a YAML file
    pub fn from_file(self, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        self.from_yaml(&content)
    }

    /// Set ttl
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.counter.ttl = ttl;
        self
    }

    /// Set counting strategy
    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.config.counter.strategy = strategy;
        self
    }

    /// Set unknown-metric policy
    pub fn unknown_metric(mut self, policy: UnknownMetricPolicy) -> Self {
        self.config.counter.unknown_metric = Some(policy);
        self
    }

    /// Enable background sweeping at the given interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep.enabled = true;
        self.config.sweep.interval = interval;
        self
    }

    /// Set log level
    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
