//! Sliding-window event counters.
//!
//! Callers [`record`](WindowCounter::record) occurrences of named metrics and
//! ask how many happened within a trailing window. Two strategies implement
//! the same [`WindowCounter`] capability:
//!
//! - [`LogCounter`]: sorted timestamp log per metric. O(log n) queries by
//!   absolute start time, memory grows with the event rate.
//! - [`RingCounter`]: `ttl` per-second slots per metric. O(ttl) queries by
//!   trailing interval, memory is bounded regardless of event rate.
//!
//! Both expire data lazily when an operation touches a series. A background
//! sweep ([`spawn_sweeper`]) is available for registries with many idle
//! metrics but is not needed for correct counts.

pub mod any;
pub mod log;
mod registry;
pub mod ring;
pub mod sweeper;
pub mod ttl;

pub use any::Counter;
pub use log::LogCounter;
pub use ring::{RingCounter, MAX_RING_TTL_SECS};
pub use sweeper::{spawn_sweeper, SweeperHandle};
pub use ttl::Ttl;

use crate::core::{MetrixError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Proactive expiry of stored events.
pub trait Sweep: Send + Sync {
    /// Drops everything that has aged past the ttl. Returns the number of
    /// events (log) or slots (ring) cleared.
    fn sweep(&self) -> usize;
}

/// Record/query capability shared by every counting strategy.
pub trait WindowCounter: Sweep {
    /// How a query names its window. Fixed per strategy.
    type Selector;

    /// Records one occurrence of `name` at the current time. Never fails;
    /// any string, including the empty one, is a valid name.
    fn record(&self, name: &str);

    /// Number of recorded occurrences of `name` inside the window described
    /// by `selector`.
    ///
    /// Names that were never recorded are handled according to the
    /// counter's [`UnknownMetricPolicy`].
    fn count_since(&self, name: &str, selector: Self::Selector) -> Result<u64>;

    /// Names of every metric recorded so far, sorted.
    fn metric_names(&self) -> Vec<String>;

    fn ttl(&self) -> Ttl;
}

/// Counting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Sorted timestamp log with binary-search queries
    Log,
    /// Ring of per-second slots
    Ring,
}

impl Strategy {
    /// The log counter reports unknown names as errors, the ring counter as
    /// zero.
    pub fn default_unknown_metric_policy(self) -> UnknownMetricPolicy {
        match self {
            Strategy::Log => UnknownMetricPolicy::Error,
            Strategy::Ring => UnknownMetricPolicy::Zero,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Log => "log",
            Strategy::Ring => "ring",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Strategy::Log),
            "ring" => Ok(Strategy::Ring),
            other => Err(MetrixError::config(format!(
                "Unknown strategy '{}', expected 'log' or 'ring'",
                other
            ))),
        }
    }
}

/// What a query for a never-recorded metric returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownMetricPolicy {
    /// Fail with [`MetrixError::UnknownMetric`]
    Error,
    /// Report a count of zero
    Zero,
}

impl UnknownMetricPolicy {
    pub(crate) fn resolve(self, name: &str) -> Result<u64> {
        match self {
            UnknownMetricPolicy::Error => Err(MetrixError::unknown_metric(name)),
            UnknownMetricPolicy::Zero => Ok(0),
        }
    }
}

impl FromStr for UnknownMetricPolicy {
    type Err = MetrixError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(UnknownMetricPolicy::Error),
            "zero" => Ok(UnknownMetricPolicy::Zero),
            other => Err(MetrixError::config(format!(
                "Unknown metric policy '{}', expected 'error' or 'zero'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("log".parse::<Strategy>().unwrap(), Strategy::Log);
        assert_eq!(" RING ".parse::<Strategy>().unwrap(), Strategy::Ring);
        assert!("bucket".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Ring.to_string(), "ring");
    }

    #[test]
    fn test_policy_resolution() {
        assert_eq!(UnknownMetricPolicy::Zero.resolve("x").unwrap(), 0);

        let err = UnknownMetricPolicy::Error.resolve("x").unwrap_err();
        assert!(err.is_unknown_metric());
        assert_eq!("zero".parse::<UnknownMetricPolicy>().unwrap(), UnknownMetricPolicy::Zero);
    }
}
