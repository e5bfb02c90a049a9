//! Lookup counters for provider registries

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by `ProviderRegistry::request`
#[derive(Debug, Default)]
pub struct Metrics {
    lookups: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    fetch_failures: AtomicU64,
    unresolved: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_hits", "Metric incremented");
    }

    pub fn cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "cache_misses", "Metric incremented");
    }

    pub fn fetch_failed(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "fetch_failures", "Metric incremented");
    }

    /// No provider pattern matched
    pub fn unresolved(&self) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "unresolved", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups: self.lookups.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            unresolved: self.unresolved.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lookups: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub fetch_failures: u64,
    pub unresolved: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_snapshot_is_zero() {
        assert_eq!(Metrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.lookup();
        metrics.lookup();
        metrics.cache_miss();
        metrics.cache_hit();
        metrics.fetch_failed();
        metrics.unresolved();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                lookups: 2,
                cache_hits: 1,
                cache_misses: 1,
                fetch_failures: 1,
                unresolved: 1,
            }
        );
    }
}
