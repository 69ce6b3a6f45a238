use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use crate::cache::PoolCache;
use crate::config::{FallbackConfig, SchedulerConfig};
use crate::metrics::Metrics;
use crate::problems::bank::QuestionBank;
use crate::problems::fallback::level_fallback_order;
use crate::problems::rng::{seeded_shuffle, RngFactory, XorShift32};
use crate::skills::model::{Level, Skill};

/// Shuffled candidate IDs for one (week, day, skill, level) context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidatePool {
    pub ids: Vec<String>,
    /// True when levels other than the target had to be pulled in.
    pub widened: bool,
}

/// What to sample.
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest<'a> {
    pub skill: Skill,
    pub level: Level,
    /// 1-based set number within the day for this skill.
    pub set_sequence: usize,
    pub seed_context: &'a str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    pub ids: Vec<String>,
    /// The slice ran past the end of the pool and continued from the start.
    pub wrapped: bool,
    /// IDs from the avoid list, or repeats within the set, had to be used.
    pub reused: bool,
    pub widened: bool,
}

/// Seed context shared by every set of one skill on one day.
pub fn seed_context(week_id: &str, day_index: u8, skill: Skill, level: Level) -> String {
    format!("{}|{}|{}|{}", week_id, day_index, skill, level)
}

/// `"{week}:d{day}:{skill}_{seq}"`
pub fn set_id(week_id: &str, day_index: u8, skill: Skill, sequence: usize) -> String {
    format!("{}:d{}:{}_{}", week_id, day_index, skill, sequence)
}

/// Trailing `_<n>` of a set id; 1 when absent or unparsable.
pub fn parse_set_sequence(set_id: &str) -> usize {
    set_id
        .rsplit_once('_')
        .and_then(|(_, tail)| tail.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

/// Reproducible, collision-avoiding question selection.
#[derive(Clone)]
pub struct QuestionSampler {
    bank: Arc<dyn QuestionBank>,
    pool_multiplier: usize,
    fallback: FallbackConfig,
    cache: PoolCache,
    rng_factory: RngFactory,
    metrics: Metrics,
}

impl QuestionSampler {
    pub fn new(bank: Arc<dyn QuestionBank>, config: &SchedulerConfig, metrics: Metrics) -> Self {
        QuestionSampler {
            bank,
            pool_multiplier: config.sampler.pool_multiplier.max(1),
            fallback: config.fallback,
            cache: PoolCache::new(config.sampler.cache_capacity),
            rng_factory: XorShift32::boxed,
            metrics,
        }
    }

    /// Swap the PRNG. Cached pools built with the old one are dropped.
    pub fn with_rng_factory(mut self, factory: RngFactory) -> Self {
        self.rng_factory = factory;
        self.cache.clear();
        self
    }

    pub fn bank(&self) -> &Arc<dyn QuestionBank> {
        &self.bank
    }

    /// Build (or fetch) the shuffled pool. Exact-level items come first in
    /// the search; nearer levels are added until the pool holds
    /// `count * pool_multiplier` IDs or every level is exhausted.
    pub fn candidate_pool(&self, skill: Skill, level: Level, seed_context: &str, count: usize) -> Arc<CandidatePool> {
        let min_pool = count * self.pool_multiplier;
        if let Some(pool) = self.cache.get(seed_context, skill, level, min_pool) {
            self.metrics.record_cache_hit();
            return pool;
        }
        self.metrics.record_cache_miss();

        let mut by_level: BTreeMap<Level, Vec<String>> = BTreeMap::new();
        for question in self.bank.list_by_skill(skill) {
            by_level.entry(question.level_tag).or_default().push(question.id);
        }

        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        let mut widened = false;
        for (i, candidate_level) in level_fallback_order(level, self.fallback.for_skill(skill)).into_iter().enumerate() {
            if i > 0 {
                if ids.len() >= min_pool {
                    break;
                }
                widened = true;
            }
            for id in by_level.remove(&candidate_level).unwrap_or_default() {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        if widened {
            self.metrics.record_level_fallback();
            tracing::debug!(
                skill = %skill,
                level = %level,
                pool = ids.len(),
                wanted = min_pool,
                "Candidate pool widened past target level"
            );
        }
        if ids.is_empty() {
            tracing::warn!(skill = %skill, "Question bank has no items for skill");
        }

        let mut rng = (self.rng_factory)(seed_context);
        seeded_shuffle(&mut ids, rng.as_mut());

        let pool = Arc::new(CandidatePool { ids, widened });
        self.cache.put(seed_context, skill, level, min_pool, pool.clone());
        pool
    }

    /// Take `count` IDs starting at `(set_sequence - 1) * count` in the
    /// shuffled pool, skipping anything in `avoid`. Returns fewer than
    /// `count` only when the skill has no questions at all.
    pub fn sample(&self, request: SampleRequest<'_>, avoid: &HashSet<String>) -> Sample {
        let pool = self.candidate_pool(request.skill, request.level, request.seed_context, request.count);
        let mut sample = pick_slice(&pool.ids, request.set_sequence, request.count, avoid);
        sample.widened = pool.widened;

        if sample.wrapped {
            self.metrics.record_wraparound();
            tracing::debug!(
                skill = %request.skill,
                set_sequence = request.set_sequence,
                pool = pool.ids.len(),
                "Set slice wrapped around candidate pool"
            );
        }
        if sample.reused {
            tracing::warn!(
                skill = %request.skill,
                level = %request.level,
                pool = pool.ids.len(),
                count = request.count,
                "Candidate pool too small, reusing questions"
            );
        }
        sample
    }

    /// Same as [`sample`](Self::sample) with the sequence parsed from a set id.
    pub fn sample_for_set(
        &self,
        set_id: &str,
        skill: Skill,
        level: Level,
        seed_context: &str,
        avoid: &HashSet<String>,
    ) -> Sample {
        self.sample(
            SampleRequest {
                skill,
                level,
                set_sequence: parse_set_sequence(set_id),
                seed_context,
                count: skill.set_size(),
            },
            avoid,
        )
    }
}

fn pick_slice(pool: &[String], set_sequence: usize, count: usize, avoid: &HashSet<String>) -> Sample {
    let n = pool.len();
    if n == 0 || count == 0 {
        return Sample::default();
    }

    // Set ids are external input, so the sequence can be arbitrarily large.
    let skipped = set_sequence.max(1) - 1;
    let start = ((skipped as u128 * count as u128) % n as u128) as usize;
    let wrapped = skipped
        .checked_mul(count)
        .map_or(true, |offset| offset.saturating_add(count) > n);
    let mut sample = Sample { wrapped, ..Sample::default() };

    let mut chosen = HashSet::new();
    let circular = move || (0..n).map(move |k| &pool[(start + k) % n]);

    for id in circular() {
        if sample.ids.len() == count {
            break;
        }
        if !avoid.contains(id) && chosen.insert(id.clone()) {
            sample.ids.push(id.clone());
        }
    }

    if sample.ids.len() < count {
        sample.reused = true;
        for id in circular() {
            if sample.ids.len() == count {
                break;
            }
            if chosen.insert(id.clone()) {
                sample.ids.push(id.clone());
            }
        }
    }

    // Only reachable when the whole pool is smaller than one set.
    let mut k = 0;
    while sample.ids.len() < count {
        sample.ids.push(pool[(start + k) % n].clone());
        k += 1;
    }

    sample
}
