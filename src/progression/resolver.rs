use crate::skills::model::Level;

/// Starting practice level from the diagnostic estimate and the goal.
///
/// At or one below the goal starts at the goal; two or more below starts
/// one level under the goal; no estimate starts at the goal.
pub fn resolve_practice_level(estimate: Option<Level>, goal: Level) -> Level {
    let Some(estimate) = estimate else {
        return goal;
    };
    let gap = goal.rank().saturating_sub(estimate.rank());
    let level = if gap >= 2 { goal.easier() } else { goal };
    tracing::debug!(estimate = %estimate, goal = %goal, practice_level = %level, "Resolved practice level");
    level
}
