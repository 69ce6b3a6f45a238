use std::sync::Arc;
use crate::config::SchedulerConfig;
use crate::memory::store::{JsonFileStore, KvStore};
use crate::metrics::Metrics;
use crate::problems::bank::QuestionBank;
use crate::problems::selector::QuestionSampler;
use crate::state::providers::{Clock, EntitlementProvider, SystemClock};

/// Everything a command needs, passed explicitly.
/// Collaborators are injected here; nothing in the core reaches for globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn KvStore>,
    pub bank: Arc<dyn QuestionBank>,
    pub clock: Arc<dyn Clock>,
    pub entitlement: Arc<dyn EntitlementProvider>,
    pub config: Arc<SchedulerConfig>,
    pub sampler: QuestionSampler,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(
        store: Arc<dyn KvStore>,
        bank: Arc<dyn QuestionBank>,
        clock: Arc<dyn Clock>,
        entitlement: Arc<dyn EntitlementProvider>,
        config: SchedulerConfig,
    ) -> Self {
        let metrics = Metrics::new();
        let sampler = QuestionSampler::new(bank.clone(), &config, metrics.clone());
        AppState {
            store,
            bank,
            clock,
            entitlement,
            config: Arc::new(config),
            sampler,
            metrics,
        }
    }

    /// File-backed store under the configured data dir, system clock.
    pub fn with_defaults(
        bank: Arc<dyn QuestionBank>,
        entitlement: Arc<dyn EntitlementProvider>,
        config: SchedulerConfig,
    ) -> Self {
        let store = Arc::new(JsonFileStore::new(config.storage.data_dir.clone()));
        Self::new(store, bank, Arc::new(SystemClock), entitlement, config)
    }

    pub fn kv(&self) -> &dyn KvStore {
        self.store.as_ref()
    }
}
