use serde::{Serialize, Deserialize};
use crate::skills::model::Level;

/// Which neighbour to try first when two levels are equally far from the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelTieBreak {
    #[default]
    Easier,
    Harder,
}

/// All five levels, nearest to `target` first.
pub fn level_fallback_order(target: Level, tie: LevelTieBreak) -> Vec<Level> {
    let mut order = Level::ALL.to_vec();
    order.sort_by_key(|level| {
        let distance = level.rank().abs_diff(target.rank());
        let harder = level.rank() > target.rank();
        let side = match tie {
            LevelTieBreak::Easier => harder,
            LevelTieBreak::Harder => !harder,
        };
        (distance, side)
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_starts_at_target_and_prefers_easier() {
        assert_eq!(
            level_fallback_order(Level::N3, LevelTieBreak::Easier),
            vec![Level::N3, Level::N4, Level::N2, Level::N5, Level::N1]
        );
    }

    #[test]
    fn test_order_prefers_harder_when_asked() {
        assert_eq!(
            level_fallback_order(Level::N3, LevelTieBreak::Harder),
            vec![Level::N3, Level::N2, Level::N4, Level::N1, Level::N5]
        );
    }

    #[test]
    fn test_edges() {
        assert_eq!(
            level_fallback_order(Level::N5, LevelTieBreak::Easier),
            vec![Level::N5, Level::N4, Level::N3, Level::N2, Level::N1]
        );
        assert_eq!(
            level_fallback_order(Level::N1, LevelTieBreak::Easier),
            vec![Level::N1, Level::N2, Level::N3, Level::N4, Level::N5]
        );
    }
}
