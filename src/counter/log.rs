//! Sorted timestamp log with binary-search queries.
//!
//! Every occurrence is stored as its own timestamp, appended in
//! non-decreasing order. Queries locate the first event at or after the
//! requested start with a binary search, so they cost O(log n). Expired
//! events always form a prefix of the log and are dropped by a linear scan
//! from the front whenever a series is touched.
//!
//! The linear purge is O(1) amortized only as long as the expired prefix
//! per operation stays small. Long ttls with sustained high event rates
//! keep that assumption; a series left idle for a long time pays for the
//! whole prefix on its next access.

use crate::core::{Clock, Result, SystemClock, Timestamp};
use crate::counter::registry::Registry;
use crate::counter::{Sweep, Ttl, UnknownMetricPolicy, WindowCounter};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Events of one metric, oldest first.
#[derive(Debug, Default)]
struct EventLog {
    events: VecDeque<Timestamp>,
}

impl EventLog {
    /// Appends `at`, holding order if the clock stepped backwards.
    fn push(&mut self, at: Timestamp) {
        let at = match self.events.back() {
            Some(&last) if at < last => {
                tracing::warn!(%at, %last, "clock moved backwards, recording at last event time");
                last
            },
            _ => at,
        };
        self.events.push_back(at);
    }

    /// Drops events older than `expired_before`.
    ///
    /// Linear scan from the front rather than a binary search: the expired
    /// part is a contiguous prefix and is usually a handful of entries.
    fn purge(&mut self, expired_before: Timestamp) -> usize {
        let expired = self
            .events
            .iter()
            .take_while(|&&at| at < expired_before)
            .count();

        if expired > 0 {
            self.events.drain(..expired);
            tracing::trace!(expired, remaining = self.events.len(), "purged expired events");
        }

        expired
    }

    /// Events with timestamp >= `start`.
    fn count_since(&self, start: Timestamp) -> u64 {
        let (Some(&first), Some(&last)) = (self.events.front(), self.events.back()) else {
            return 0;
        };

        let len = self.events.len();
        let count = if start < first {
            len
        } else if start > last {
            0
        } else {
            len - self.events.partition_point(|&at| at < start)
        };

        count as u64
    }

    fn len(&self) -> usize {
        self.events.len()
    }
}

/// Sliding-window counter backed by per-metric timestamp logs.
///
/// Queries take an absolute start [`Timestamp`]. Every operation, reads
/// included, first purges the touched series, so two reads without writes
/// in between may differ purely because time passed.
///
/// By default a query for a never-recorded metric fails with
/// [`MetrixError::UnknownMetric`](crate::core::MetrixError::UnknownMetric).
#[derive(Debug)]
pub struct LogCounter {
    ttl: Ttl,
    clock: Arc<dyn Clock>,
    unknown_metric: UnknownMetricPolicy,
    registry: Registry<EventLog>,
}

impl LogCounter {
    /// Creates a counter on the wall clock. Fails for a zero or
    /// fractional-second ttl.
    pub fn new(ttl: Duration) -> Result<Self> {
        Ok(Self::with_clock(Ttl::new(ttl)?, Arc::new(SystemClock)))
    }

    pub fn with_clock(ttl: Ttl, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            unknown_metric: UnknownMetricPolicy::Error,
            registry: Registry::new(),
        }
    }

    /// Overrides how queries for never-recorded metrics are answered.
    pub fn unknown_metric_policy(mut self, policy: UnknownMetricPolicy) -> Self {
        self.unknown_metric = policy;
        self
    }

    /// Events of `name` within the last `interval`, clipped to the ttl.
    pub fn count_last(&self, name: &str, interval: Duration) -> Result<u64> {
        let start = self.clock.now().saturating_sub(self.ttl.clip(interval));
        self.count_since(name, start)
    }

    /// Number of timestamps currently held for `name`, without purging.
    pub fn stored_events(&self, name: &str) -> usize {
        self.registry
            .get(name)
            .map_or(0, |series| series.lock().len())
    }

    fn expired_before(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.ttl.as_duration())
    }
}

impl Sweep for LogCounter {
    fn sweep(&self) -> usize {
        self.registry
            .all()
            .iter()
            .map(|series| {
                let mut log = series.lock();
                log.purge(self.expired_before(self.clock.now()))
            })
            .sum()
    }
}

impl WindowCounter for LogCounter {
    type Selector = Timestamp;

    fn record(&self, name: &str) {
        let series = self.registry.get_or_create(name, EventLog::default);
        let mut log = series.lock();
        // Read the clock under the lock so concurrent writers append in order
        let now = self.clock.now();
        log.purge(self.expired_before(now));
        log.push(now);
    }

    fn count_since(&self, name: &str, start: Timestamp) -> Result<u64> {
        let Some(series) = self.registry.get(name) else {
            return self.unknown_metric.resolve(name);
        };

        let mut log = series.lock();
        log.purge(self.expired_before(self.clock.now()));
        Ok(log.count_since(start))
    }

    fn metric_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn ttl(&self) -> Ttl {
        self.ttl
    }
}
