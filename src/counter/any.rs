//! Strategy chosen at runtime from configuration.

use crate::core::{Clock, CounterConfig, Result};
use crate::counter::{LogCounter, RingCounter, Strategy, Sweep, Ttl, WindowCounter};
use std::sync::Arc;
use std::time::Duration;

/// Either counting strategy behind one trailing-window interface.
///
/// Use this when the strategy is a deployment decision (read from
/// [`CounterConfig`]) rather than fixed in code. Queries go through
/// [`count_window`](Counter::count_window), which each strategy answers in
/// its own selector shape.
#[derive(Debug)]
pub enum Counter {
    Log(LogCounter),
    Ring(RingCounter),
}

impl Counter {
    /// Builds the configured strategy. Fails with
    /// [`MetrixError::InvalidConfiguration`](crate::core::MetrixError::InvalidConfiguration)
    /// for an invalid ttl, or one too long for the ring strategy.
    pub fn from_config(config: &CounterConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let ttl = config.ttl()?;
        let policy = config.unknown_metric_policy();

        let counter = match config.strategy {
            Strategy::Log => {
                Counter::Log(LogCounter::with_clock(ttl, clock).unknown_metric_policy(policy))
            },
            Strategy::Ring => {
                Counter::Ring(RingCounter::with_clock(ttl, clock)?.unknown_metric_policy(policy))
            },
        };

        tracing::debug!(strategy = %config.strategy, %ttl, ?policy, "counter created");
        Ok(counter)
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Counter::Log(_) => Strategy::Log,
            Counter::Ring(_) => Strategy::Ring,
        }
    }

    pub fn record(&self, name: &str) {
        match self {
            Counter::Log(counter) => counter.record(name),
            Counter::Ring(counter) => counter.record(name),
        }
    }

    /// Occurrences of `name` within the trailing `window`, clipped to the
    /// ttl.
    pub fn count_window(&self, name: &str, window: Duration) -> Result<u64> {
        match self {
            Counter::Log(counter) => counter.count_last(name, window),
            Counter::Ring(counter) => counter.count_since(name, window),
        }
    }

    pub fn metric_names(&self) -> Vec<String> {
        match self {
            Counter::Log(counter) => counter.metric_names(),
            Counter::Ring(counter) => counter.metric_names(),
        }
    }

    pub fn ttl(&self) -> Ttl {
        match self {
            Counter::Log(counter) => counter.ttl(),
            Counter::Ring(counter) => counter.ttl(),
        }
    }
}

impl Sweep for Counter {
    fn sweep(&self) -> usize {
        match self {
            Counter::Log(counter) => counter.sweep(),
            Counter::Ring(counter) => counter.sweep(),
        }
    }
}
