//! Metric name to series mapping with per-series locking.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Lazily populated registry of per-metric series.
///
/// Lookups clone the series `Arc` out of the map so the shard lock is
/// released before the series mutex is taken. Operations on different
/// metrics therefore only contend on the map shard for the lookup itself.
pub(crate) struct Registry<S> {
    series: DashMap<Arc<str>, Arc<Mutex<S>>>,
}

impl<S> Registry<S> {
    pub(crate) fn new() -> Self {
        Self {
            series: DashMap::new(),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<Arc<Mutex<S>>> {
        self.series.get(name).map(|entry| Arc::clone(entry.value()))
    }

    pub(crate) fn get_or_create(&self, name: &str, init: impl FnOnce() -> S) -> Arc<Mutex<S>> {
        // Fast path: series already exists
        if let Some(series) = self.get(name) {
            return series;
        }

        let entry = self.series.entry(Arc::from(name)).or_insert_with(|| {
            tracing::debug!(metric = name, "creating metric series");
            Arc::new(Mutex::new(init()))
        });
        Arc::clone(entry.value())
    }

    pub(crate) fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.series.iter().map(|e| e.key().to_string()).collect();
        names.sort_unstable();
        names
    }

    /// Snapshot of every series, for whole-registry passes such as sweeping.
    pub(crate) fn all(&self) -> Vec<Arc<Mutex<S>>> {
        self.series.iter().map(|e| Arc::clone(e.value())).collect()
    }
}

impl<S> fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("metrics", &self.series.len())
            .finish()
    }
}
