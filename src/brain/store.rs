use crate::brain::Roadmap;
use crate::error::CoachError;
use crate::memory::{keys, store::{self, KvStore}};

/// Save the roadmap, replacing the stored week whole.
pub fn save(kv: &dyn KvStore, roadmap: &Roadmap) -> Result<(), CoachError> {
    store::write(kv, keys::ROADMAP, roadmap)
        .map_err(|e| e.with_context(format!("saving roadmap {}", roadmap.week_id)))
}

/// Load the stored roadmap. Anything unreadable or misshapen is `None`.
pub fn load(kv: &dyn KvStore) -> Option<Roadmap> {
    store::read::<Roadmap>(kv, keys::ROADMAP).and_then(Roadmap::normalized)
}
