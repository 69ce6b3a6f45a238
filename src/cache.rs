use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;
use std::num::NonZeroUsize;
use std::sync::Arc;
use lru::LruCache;
use parking_lot::Mutex;
use crate::problems::selector::CandidatePool;
use crate::skills::model::{Level, Skill};

/// Shuffled candidate pools, keyed by everything that determines them.
/// The bank behind a sampler is fixed for its lifetime, so entries never
/// go stale; capacity bounds memory.
#[derive(Clone)]
pub struct PoolCache {
    pools: Arc<Mutex<LruCache<u64, Arc<CandidatePool>>>>,
}

fn cache_key(seed_context: &str, skill: Skill, level: Level, min_pool: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed_context.hash(&mut hasher);
    skill.hash(&mut hasher);
    level.hash(&mut hasher);
    min_pool.hash(&mut hasher);
    hasher.finish()
}

impl PoolCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        PoolCache { pools: Arc::new(Mutex::new(LruCache::new(capacity))) }
    }

    pub fn get(&self, seed_context: &str, skill: Skill, level: Level, min_pool: usize) -> Option<Arc<CandidatePool>> {
        let key = cache_key(seed_context, skill, level, min_pool);
        let hit = self.pools.lock().get(&key).cloned();
        if hit.is_some() {
            tracing::trace!(seed_context = seed_context, "Pool cache hit");
        } else {
            tracing::trace!(seed_context = seed_context, "Pool cache miss");
        }
        hit
    }

    pub fn put(&self, seed_context: &str, skill: Skill, level: Level, min_pool: usize, pool: Arc<CandidatePool>) {
        let key = cache_key(seed_context, skill, level, min_pool);
        self.pools.lock().put(key, pool);
    }

    pub fn len(&self) -> usize {
        self.pools.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.pools.lock().clear();
    }
}
