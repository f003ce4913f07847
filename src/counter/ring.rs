//! Ring of per-second slots with lazy expiry.
//!
//! Each metric owns exactly `ttl` slots. An event at second `s` lands in
//! slot `(s - series_start) mod ttl`, so a slot is reused every `ttl`
//! seconds. Residue from the previous cycle is cleared when the slot is next
//! incremented, and any slot found past the horizon during a read is cleared
//! on the spot. Nothing is evicted in the background.
//!
//! Writes are O(1) and memory is `ttl` slots per metric regardless of the
//! event rate; reads walk every slot and cost O(ttl).

use crate::core::{Clock, MetrixError, Result, SystemClock};
use crate::counter::registry::Registry;
use crate::counter::{Sweep, Ttl, UnknownMetricPolicy, WindowCounter};
use std::sync::Arc;
use std::time::Duration;

/// Longest ttl a ring accepts: one day of slots, about 2 MiB per metric.
pub const MAX_RING_TTL_SECS: u64 = 86_400;

/// One second-granularity accumulator.
///
/// Empty (no `last_updated`) until first incremented, Active afterwards,
/// and back to Empty once found stale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Slot {
    count: u64,
    last_updated: Option<u64>,
}

impl Slot {
    #[inline]
    fn reset(&mut self) {
        *self = Slot::default();
    }

    /// Last update is at least `ttl` seconds before `now`.
    #[inline]
    fn is_expired(&self, now: u64, ttl: u64) -> bool {
        self.last_updated
            .is_some_and(|updated| updated.saturating_add(ttl) <= now)
    }
}

#[derive(Debug)]
struct Ring {
    slots: Box<[Slot]>,
    /// Second of the first event ever recorded; anchors slot indexing.
    start: Option<u64>,
}

impl Ring {
    /// `ttl` is bounded by [`MAX_RING_TTL_SECS`] at counter construction.
    fn new(ttl: u64) -> Self {
        Self {
            slots: vec![Slot::default(); ttl as usize].into_boxed_slice(),
            start: None,
        }
    }

    fn index(second: u64, start: u64, ttl: u64) -> usize {
        // (second - start) mod ttl without underflow when the clock regresses
        let (offset, base) = (second % ttl, start % ttl);
        let index = if offset >= base {
            offset - base
        } else {
            offset + (ttl - base)
        };
        index as usize
    }

    fn increment(&mut self, second: u64, ttl: u64) {
        let start = *self.start.get_or_insert(second);
        let slot = &mut self.slots[Self::index(second, start, ttl)];

        // A slot shared with `second` holds either this second or one at
        // least a full cycle away; the latter must not leak into this cycle.
        if slot
            .last_updated
            .is_some_and(|updated| updated.abs_diff(second) >= ttl)
        {
            tracing::trace!(second, stale = ?slot.last_updated, "resetting stale slot");
            slot.reset();
        }

        slot.count += 1;
        slot.last_updated = Some(second);
    }

    /// Sum of slots updated within the last `interval` seconds, clearing
    /// expired slots on the way.
    fn count(&mut self, now: u64, interval: u64, ttl: u64) -> u64 {
        let effective = interval.min(ttl);
        let mut total = 0;

        for slot in self.slots.iter_mut() {
            let Some(updated) = slot.last_updated else {
                continue;
            };

            if slot.is_expired(now, ttl) {
                slot.reset();
            } else if updated.saturating_add(effective) > now {
                total += slot.count;
            }
        }

        total
    }

    fn expire(&mut self, now: u64, ttl: u64) -> usize {
        self.slots
            .iter_mut()
            .filter(|slot| slot.is_expired(now, ttl))
            .map(Slot::reset)
            .count()
    }
}

/// Sliding-window counter backed by per-metric rings of `ttl` one-second
/// slots.
///
/// Queries take a trailing interval; whole seconds only, fractions are
/// truncated. Intervals longer than the ttl are clipped to it. A query for
/// a never-recorded metric returns zero by default.
#[derive(Debug)]
pub struct RingCounter {
    ttl: Ttl,
    clock: Arc<dyn Clock>,
    unknown_metric: UnknownMetricPolicy,
    registry: Registry<Ring>,
}

impl RingCounter {
    /// Creates a counter on the wall clock. Fails for a zero or
    /// fractional-second ttl.
    pub fn new(ttl: Duration) -> Result<Self> {
        Self::with_clock(Ttl::new(ttl)?, Arc::new(SystemClock))
    }

    /// Fails when `ttl` exceeds [`MAX_RING_TTL_SECS`].
    pub fn with_clock(ttl: Ttl, clock: Arc<dyn Clock>) -> Result<Self> {
        if ttl.as_secs() > MAX_RING_TTL_SECS {
            return Err(MetrixError::config(format!(
                "ring ttl {} exceeds the maximum of {}s",
                ttl, MAX_RING_TTL_SECS
            )));
        }

        Ok(Self {
            ttl,
            clock,
            unknown_metric: UnknownMetricPolicy::Zero,
            registry: Registry::new(),
        })
    }

    /// Overrides how queries for never-recorded metrics are answered.
    pub fn unknown_metric_policy(mut self, policy: UnknownMetricPolicy) -> Self {
        self.unknown_metric = policy;
        self
    }

    /// Number of non-empty slots for `name`, without expiring anything.
    pub fn active_slots(&self, name: &str) -> usize {
        self.registry.get(name).map_or(0, |series| {
            series
                .lock()
                .slots
                .iter()
                .filter(|slot| slot.last_updated.is_some())
                .count()
        })
    }
}

impl Sweep for RingCounter {
    fn sweep(&self) -> usize {
        let ttl = self.ttl.as_secs();
        self.registry
            .all()
            .iter()
            .map(|series| {
                let mut ring = series.lock();
                ring.expire(self.clock.now().as_secs(), ttl)
            })
            .sum()
    }
}

impl WindowCounter for RingCounter {
    type Selector = Duration;

    fn record(&self, name: &str) {
        let ttl = self.ttl.as_secs();
        let series = self.registry.get_or_create(name, || Ring::new(ttl));
        let mut ring = series.lock();
        ring.increment(self.clock.now().as_secs(), ttl);
    }

    fn count_since(&self, name: &str, interval: Duration) -> Result<u64> {
        let Some(series) = self.registry.get(name) else {
            return self.unknown_metric.resolve(name);
        };

        let mut ring = series.lock();
        Ok(ring.count(
            self.clock.now().as_secs(),
            interval.as_secs(),
            self.ttl.as_secs(),
        ))
    }

    fn metric_names(&self) -> Vec<String> {
        self.registry.names()
    }

    fn ttl(&self) -> Ttl {
        self.ttl
    }
}
