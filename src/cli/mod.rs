//! Command-line interface for Metrix.
//!
//! `metrix` reads metric names from stdin, one per line, records each line as
//! one occurrence and periodically prints how many occurrences of every metric
//! fall inside the reporting window:
//!
//! ```text
//! tail -F access.log | awk '{print $9}' | metrix --ttl 5m --window 1m
//! ```

use crate::core::config::ConfigBuilder;
use crate::core::{Config, LogLevel, MetrixError, Result, SystemClock};
use crate::counter::{spawn_sweeper, Counter, Strategy, UnknownMetricPolicy};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

/// Sliding-window event counter fed from stdin
#[derive(Parser, Debug)]
#[command(name = "metrix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/metrix/config.yaml)
    #[arg(short, long, env = "METRIX_CONFIG")]
    pub config: Option<PathBuf>,

    /// How long an event keeps counting, e.g. "300s" or "5m"
    #[arg(long, env = "METRIX_TTL", value_parser = humantime::parse_duration)]
    pub ttl: Option<Duration>,

    /// Counting strategy: "log" or "ring"
    #[arg(long, env = "METRIX_STRATEGY")]
    pub strategy: Option<Strategy>,

    /// Answer for never-recorded metrics: "error" or "zero"
    #[arg(long, env = "METRIX_UNKNOWN_METRIC")]
    pub unknown_metric: Option<UnknownMetricPolicy>,

    /// Trailing window to report (default: the ttl)
    #[arg(short, long, env = "METRIX_WINDOW", value_parser = humantime::parse_duration)]
    pub window: Option<Duration>,

    /// How often to print a report
    #[arg(long, env = "METRIX_REPORT_INTERVAL", default_value = "10s", value_parser = humantime::parse_duration)]
    pub report_interval: Duration,

    /// Sweep expired events in the background at this interval
    #[arg(long, env = "METRIX_SWEEP_INTERVAL", value_parser = humantime::parse_duration)]
    pub sweep_interval: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long, env = "METRIX_DEBUG")]
    pub debug: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments and `METRIX_*` environment variables
    /// 2. Config file
    /// 3. Defaults
    ///
    /// Returns the config file that was read, if any.
    pub async fn load_config(&self) -> Result<(Config, Option<PathBuf>)> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => dirs::config_dir()
                .map(|d| d.join("metrix").join("config.yaml"))
                .filter(|path| path.exists()),
        };

        let mut loaded_from = None;
        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    builder = builder.from_yaml(&content)?;
                    loaded_from = Some(path);
                },
                Err(e) => {
                    return Err(MetrixError::config(format!(
                        "Failed to read config file {:?}: {}",
                        path, e
                    )));
                },
            }
        }

        Ok((self.build_config_from_args(builder)?, loaded_from))
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(ttl) = self.ttl {
            builder = builder.ttl(ttl);
        }
        if let Some(strategy) = self.strategy {
            builder = builder.strategy(strategy);
        }
        if let Some(policy) = self.unknown_metric {
            builder = builder.unknown_metric(policy);
        }
        if let Some(interval) = self.sweep_interval {
            builder = builder.sweep_interval(interval);
        }
        if self.debug {
            builder = builder.log_level(LogLevel::Debug);
        }

        builder.build()
    }

    /// Initialize logging based on configuration.
    ///
    /// Logs go to stderr so reports on stdout stay machine-readable.
    pub fn init_logging(&self, config: &Config) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let env_log_level = std::env::var("METRIX_LOG_LEVEL")
            .unwrap_or_else(|_| config.logging.level.as_str().to_string());
        let log_level = if self.debug {
            "debug"
        } else {
            env_log_level.as_str()
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

        let fmt_layer = if config.logging.structured {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .compact()
        } else {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
        };

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| MetrixError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the Metrix application.
pub async fn execute(cli: Cli) -> Result<()> {
    let (config, loaded_from) = cli.load_config().await?;

    cli.init_logging(&config)?;
    match &loaded_from {
        Some(path) => tracing::info!("Loaded configuration from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults"),
    }

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Strategy: {}", config.counter.strategy);
        println!("  TTL: {}", humantime::format_duration(config.counter.ttl));
        println!("  Unknown metrics: {:?}", config.counter.unknown_metric_policy());
        println!("  Background sweep: {}", config.sweep.enabled);
        return Ok(());
    }

    run(&config, cli.window, cli.report_interval).await
}

async fn run(config: &Config, window: Option<Duration>, report_interval: Duration) -> Result<()> {
    if report_interval.is_zero() {
        return Err(MetrixError::config("report interval must be greater than 0"));
    }

    let counter = Arc::new(Counter::from_config(&config.counter, Arc::new(SystemClock))?);
    let window = window.unwrap_or_else(|| counter.ttl().as_duration());

    let sweeper = config
        .sweep
        .enabled
        .then(|| spawn_sweeper(Arc::clone(&counter), config.sweep.interval))
        .transpose()?;

    tracing::info!(
        strategy = %counter.strategy(),
        ttl = %counter.ttl(),
        window = %humantime::format_duration(window),
        "Counting metric names from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(report_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => record_line(&counter, &line),
                    None => {
                        tracing::debug!("stdin closed");
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                print_report(&report(&counter, window)?);
            }
            _ = &mut shutdown => {
                tracing::info!("Received shutdown signal, stopping...");
                break;
            }
        }
    }

    print_report(&report(&counter, window)?);

    if let Some(sweeper) = sweeper {
        sweeper.shutdown().await;
    }

    Ok(())
}

/// Records one input line. Surrounding whitespace is trimmed and blank lines
/// are skipped.
fn record_line(counter: &Counter, line: &str) {
    let name = line.trim();
    if !name.is_empty() {
        counter.record(name);
    }
}

/// Count of every known metric within `window`, sorted by name.
pub fn report(counter: &Counter, window: Duration) -> Result<Vec<(String, u64)>> {
    counter
        .metric_names()
        .into_iter()
        .map(|name| {
            let count = counter.count_window(&name, window)?;
            Ok((name, count))
        })
        .collect()
}

fn print_report(rows: &[(String, u64)]) {
    for (name, count) in rows {
        println!("{}\t{}", name, count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Clock, ManualClock};

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["metrix"]).unwrap();

        assert!(cli.config.is_none());
        assert!(cli.ttl.is_none());
        assert!(cli.strategy.is_none());
        assert_eq!(cli.report_interval, Duration::from_secs(10));
        assert!(!cli.debug);
        assert!(!cli.check_config);
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "metrix",
            "--ttl",
            "2m",
            "--strategy",
            "ring",
            "--unknown-metric",
            "error",
            "--sweep-interval",
            "5s",
            "--window",
            "30s",
            "--debug",
        ])
        .unwrap();

        let builder = ConfigBuilder::new()
            .from_yaml("counter:\n  ttl: 10m\n  strategy: log\n")
            .unwrap();
        let config = cli.build_config_from_args(builder).unwrap();

        assert_eq!(config.counter.ttl, Duration::from_secs(120));
        assert_eq!(config.counter.strategy, Strategy::Ring);
        assert_eq!(config.counter.unknown_metric, Some(UnknownMetricPolicy::Error));
        assert!(config.sweep.enabled);
        assert_eq!(config.sweep.interval, Duration::from_secs(5));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(cli.window, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["metrix", "--strategy", "bucket"]).is_err());
        assert!(Cli::try_parse_from(["metrix", "--ttl", "-5s"]).is_err());

        let cli = Cli::try_parse_from(["metrix", "--ttl", "0s"]).unwrap();
        assert!(cli.build_config_from_args(ConfigBuilder::new()).is_err());
    }

    #[tokio::test]
    async fn test_missing_explicit_config_file() {
        let cli = Cli::try_parse_from(["metrix", "--config", "/nonexistent/metrix.yaml"]).unwrap();
        let err = cli.load_config().await.unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_record_line_and_report() {
        let clock = Arc::new(ManualClock::at_secs(100));
        let config = ConfigBuilder::new()
            .ttl(Duration::from_secs(60))
            .build()
            .unwrap();
        let counter =
            Counter::from_config(&config.counter, Arc::clone(&clock) as Arc<dyn Clock>).unwrap();

        for line in ["GET\n", "  POST ", "", "   ", "GET"] {
            record_line(&counter, line);
        }

        let rows = report(&counter, Duration::from_secs(60)).unwrap();
        assert_eq!(rows, vec![("GET".to_string(), 2), ("POST".to_string(), 1)]);

        clock.advance(Duration::from_secs(61));
        let rows = report(&counter, Duration::from_secs(60)).unwrap();
        assert_eq!(rows, vec![("GET".to_string(), 0), ("POST".to_string(), 0)]);
    }
}
