//! Optional periodic expiry for counters with many idle metrics.
//!
//! Counts are correct without it: expired data is always cleared when a
//! series is next touched. The sweeper only releases memory held by series
//! nobody touches anymore.

use crate::core::{MetrixError, Result};
use crate::counter::Sweep;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper and waits for the task to finish.
    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        if let Err(e) = self.task.await {
            tracing::warn!("Sweeper task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task on the current tokio runtime that sweeps `counter` every
/// `interval`. The first sweep happens one interval after spawning.
///
/// Fails with [`MetrixError::InvalidConfiguration`] for a zero interval.
///
/// # Panics
///
/// Panics if called outside a tokio runtime.
pub fn spawn_sweeper<C>(counter: Arc<C>, interval: Duration) -> Result<SweeperHandle>
where
    C: Sweep + ?Sized + 'static,
{
    if interval.is_zero() {
        return Err(MetrixError::config("sweep interval must be greater than 0"));
    }

    let shutdown = Arc::new(Notify::new());
    let stop = Arc::clone(&shutdown);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = stop.notified() => {
                    tracing::debug!("Sweeper stopping");
                    break;
                }
                _ = ticker.tick() => {
                    let cleared = counter.sweep();
                    if cleared > 0 {
                        tracing::debug!(cleared, "Swept expired events");
                    }
                }
            }
        }
    });

    Ok(SweeperHandle { shutdown, task })
}
