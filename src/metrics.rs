use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use serde::{Serialize, Deserialize};

/// Scheduler counters. All are atomic so the handle can be cloned freely.
#[derive(Clone, Default)]
pub struct Metrics {
    pub roadmaps_built: Arc<AtomicU64>,
    pub sets_generated: Arc<AtomicU64>,
    /// Sets added to reach the nine-per-day floor
    pub sets_backfilled: Arc<AtomicU64>,
    /// Pools that had to widen past the target level
    pub level_fallbacks: Arc<AtomicU64>,
    /// Slices that wrapped around a short pool
    pub pool_wraparounds: Arc<AtomicU64>,
    pub pool_cache_hits: Arc<AtomicU64>,
    pub pool_cache_misses: Arc<AtomicU64>,
    pub weekly_checks_submitted: Arc<AtomicU64>,
    pub promotions: Arc<AtomicU64>,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub roadmaps_built: u64,
    pub sets_generated: u64,
    pub sets_backfilled: u64,
    pub level_fallbacks: u64,
    pub pool_wraparounds: u64,
    pub pool_cache_hits: u64,
    pub pool_cache_misses: u64,
    pub weekly_checks_submitted: u64,
    pub promotions: u64,
}

fn bump(counter: &AtomicU64, by: u64) {
    counter.fetch_add(by, Ordering::Relaxed);
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_roadmap_built(&self) {
        bump(&self.roadmaps_built, 1);
    }

    pub fn record_sets_generated(&self, n: u64) {
        bump(&self.sets_generated, n);
    }

    pub fn record_sets_backfilled(&self, n: u64) {
        bump(&self.sets_backfilled, n);
    }

    pub fn record_level_fallback(&self) {
        bump(&self.level_fallbacks, 1);
    }

    pub fn record_wraparound(&self) {
        bump(&self.pool_wraparounds, 1);
    }

    pub fn record_cache_hit(&self) {
        bump(&self.pool_cache_hits, 1);
    }

    pub fn record_cache_miss(&self) {
        bump(&self.pool_cache_misses, 1);
    }

    pub fn record_weekly_check(&self, promoted: bool) {
        bump(&self.weekly_checks_submitted, 1);
        if promoted {
            bump(&self.promotions, 1);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |c: &Arc<AtomicU64>| c.load(Ordering::Relaxed);
        MetricsSnapshot {
            roadmaps_built: load(&self.roadmaps_built),
            sets_generated: load(&self.sets_generated),
            sets_backfilled: load(&self.sets_backfilled),
            level_fallbacks: load(&self.level_fallbacks),
            pool_wraparounds: load(&self.pool_wraparounds),
            pool_cache_hits: load(&self.pool_cache_hits),
            pool_cache_misses: load(&self.pool_cache_misses),
            weekly_checks_submitted: load(&self.weekly_checks_submitted),
            promotions: load(&self.promotions),
        }
    }
}
