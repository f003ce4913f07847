//! Common test utilities and fixtures.

#![allow(dead_code)]

use metrix::core::{Clock, ManualClock};
use metrix::{LogCounter, RingCounter, Ttl};
use std::sync::Arc;

/// Arbitrary fixed start so tests never depend on the wall clock.
pub const START_SECS: u64 = 1_700_000_000;

/// Manual clock shared between a test and the counter under test.
pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::at_secs(START_SECS))
}

pub fn log_counter(ttl_secs: u64) -> (LogCounter, Arc<ManualClock>) {
    let clock = manual_clock();
    let counter = LogCounter::with_clock(ttl(ttl_secs), Arc::clone(&clock) as Arc<dyn Clock>);
    (counter, clock)
}

pub fn ring_counter(ttl_secs: u64) -> (RingCounter, Arc<ManualClock>) {
    let clock = manual_clock();
    let counter =
        RingCounter::with_clock(ttl(ttl_secs), Arc::clone(&clock) as Arc<dyn Clock>).unwrap();
    (counter, clock)
}

pub fn ttl(secs: u64) -> Ttl {
    Ttl::from_secs(secs).unwrap()
}

/// Records `name` `times` times.
pub fn record_n<F: Fn(&str)>(record: F, name: &str, times: usize) {
    for _ in 0..times {
        record(name);
    }
}
