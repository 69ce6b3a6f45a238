use crate::error::CoachError;
use crate::memory::{keys, store::{self, KvStore}};
use crate::progression::promotion::PromotionState;

pub fn load(kv: &dyn KvStore) -> Option<PromotionState> {
    store::read::<PromotionState>(kv, keys::PROMOTION).map(PromotionState::normalized)
}

pub fn save(kv: &dyn KvStore, state: &PromotionState) -> Result<(), CoachError> {
    store::write(kv, keys::PROMOTION, state).map_err(|e| e.with_context("saving promotion state"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::store::MemoryStore;
    use crate::skills::model::Level;

    #[test]
    fn test_loose_state_is_clamped() {
        let kv = MemoryStore::new();
        kv.write_raw(
            keys::PROMOTION,
            serde_json::json!({"goalLevel": "n4", "currentPracticeLevel": 2, "promotionStreak": 1}),
        )
        .unwrap();
        let state = load(&kv).unwrap();
        assert_eq!(state.goal_level, Level::N4);
        assert_eq!(state.current_practice_level, Level::N4);
        assert_eq!(state.promotion_streak, 1);
        assert!(state.history.is_empty());
    }
}
