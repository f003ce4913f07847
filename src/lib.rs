//! Metrix - in-memory sliding-window event counters.
//!
//! Metrix answers "how many times did `name` happen in the last N seconds"
//! without keeping unbounded history. Callers record occurrences of named
//! metrics and query trailing windows; events older than the configured
//! time-to-live never count again.
//!
//! # Strategies
//!
//! - [`LogCounter`]: sorted timestamp log per metric, O(log n) queries by
//!   absolute start time, expired prefix purged on every touch.
//! - [`RingCounter`]: ring of per-second slots per metric, O(ttl) queries by
//!   trailing interval, bounded memory, stale slots reset on touch.
//!
//! Both implement [`WindowCounter`]; [`Counter`] picks one from
//! configuration at runtime.
//!
//! # Architecture
//!
//! - `core`: errors, configuration, time source
//! - `counter`: the counting strategies and optional background sweeper
//! - `cli`: command-line front end counting names read from stdin
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use metrix::{RingCounter, WindowCounter};
//!
//! let counter = RingCounter::new(Duration::from_secs(300))?;
//! counter.record("login");
//! counter.record("login");
//!
//! assert_eq!(counter.count_since("login", Duration::from_secs(60))?, 2);
//! assert_eq!(counter.count_since("logout", Duration::from_secs(60))?, 0);
//! # Ok::<(), metrix::core::MetrixError>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod core;
pub mod counter;

// Re-export core types for convenience
pub use crate::core::{Config, MetrixError, Result, Timestamp};
pub use crate::counter::{
    Counter, LogCounter, RingCounter, Strategy, Sweep, Ttl, UnknownMetricPolicy, WindowCounter,
};
