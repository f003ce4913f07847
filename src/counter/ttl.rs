//! Retention horizon shared by both counting strategies.

use crate::core::{MetrixError, Result};
use std::fmt;
use std::num::NonZeroU64;
use std::time::Duration;

/// Maximum event age, in whole seconds. Always at least one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ttl(NonZeroU64);

impl Ttl {
    /// Rejects zero and fractional-second durations.
    pub fn new(ttl: Duration) -> Result<Self> {
        if ttl.subsec_nanos() != 0 {
            return Err(MetrixError::config(format!(
                "ttl must be a whole number of seconds, got {:?}",
                ttl
            )));
        }
        Self::from_secs(ttl.as_secs())
    }

    pub fn from_secs(secs: u64) -> Result<Self> {
        NonZeroU64::new(secs)
            .map(Ttl)
            .ok_or_else(|| MetrixError::config("ttl must be at least one second"))
    }

    #[inline]
    pub const fn as_secs(self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub const fn as_duration(self) -> Duration {
        Duration::from_secs(self.0.get())
    }

    /// Clips a requested window to the retention horizon.
    #[inline]
    pub fn clip(self, window: Duration) -> Duration {
        window.min(self.as_duration())
    }
}

impl TryFrom<Duration> for Ttl {
    type Error = MetrixError;

    fn try_from(ttl: Duration) -> Result<Self> {
        Ttl::new(ttl)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.as_secs())
    }
}
