//! Core building blocks shared by the counters and the CLI.
//!
//! This module contains the error type, configuration and the time
//! source abstraction.

pub mod clock;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use config::{Config, ConfigBuilder, CounterConfig, LogLevel, LoggingConfig, SweepConfig};
pub use error::{MetrixError, Result};
