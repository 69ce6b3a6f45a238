use serde::{Serialize, Deserialize};
use crate::config::PromotionRules;
use crate::progression::resolver::resolve_practice_level;
use crate::sessions::{SkillScores, WeeklyCheckResult};
use crate::skills::model::{lenient_level, lenient_rate, Level};

/// One graded weekly check and the promotion decision it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCheckEntry {
    pub week_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Level,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub correct: u32,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate: f64,
    #[serde(default)]
    pub by_skill: SkillScores,
    #[serde(default)]
    pub all_skills_passed_90: bool,
    #[serde(default)]
    pub promotion_streak_after_save: u32,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default, deserialize_with = "lenient_level")]
    pub current_practice_level_after_save: Level,
}

/// The learner's practice level and how close they are to the next one.
/// `current_practice_level` never exceeds `goal_level`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionState {
    #[serde(deserialize_with = "lenient_level")]
    pub goal_level: Level,
    #[serde(default, deserialize_with = "lenient_level")]
    pub current_practice_level: Level,
    #[serde(default)]
    pub promotion_streak: u32,
    #[serde(default)]
    pub history: Vec<WeeklyCheckEntry>,
}

impl PromotionState {
    /// First-use state, with the starting level taken from the resolver.
    pub fn seeded(goal_level: Level, estimate: Option<Level>) -> Self {
        PromotionState {
            goal_level,
            current_practice_level: resolve_practice_level(estimate, goal_level),
            promotion_streak: 0,
            history: Vec::new(),
        }
    }

    /// Clamp a decoded state back inside its invariants.
    pub fn normalized(mut self) -> Self {
        if self.current_practice_level > self.goal_level {
            tracing::warn!(
                current = %self.current_practice_level,
                goal = %self.goal_level,
                "Stored practice level above goal, clamping"
            );
            self.current_practice_level = self.goal_level;
        }
        self
    }

    /// Retarget the learner. The level is clamped under the new goal and
    /// the streak starts over.
    pub fn change_goal(&mut self, goal_level: Level) {
        if goal_level == self.goal_level {
            return;
        }
        tracing::info!(from = %self.goal_level, to = %goal_level, "Goal level changed");
        self.goal_level = goal_level;
        self.current_practice_level = self.current_practice_level.min(goal_level);
        self.promotion_streak = 0;
    }

    pub fn latest_entry(&self) -> Option<&WeeklyCheckEntry> {
        self.history.last()
    }

    /// Apply one weekly-check result.
    ///
    /// The streak grows on an all-skill pass and resets otherwise. On
    /// reaching the promotion streak the level moves up one (capped at the
    /// goal) and the streak resets whether or not the level moved. A second
    /// result for the same week replaces that week's history entry, but the
    /// streak keeps counting from the running state rather than replaying
    /// history.
    pub fn record_weekly_check(
        &mut self,
        week_id: &str,
        created_at: &str,
        result: &WeeklyCheckResult,
        rules: &PromotionRules,
    ) -> WeeklyCheckEntry {
        let passed = result.by_skill.rates().all_at_least(rules.pass_rate);
        let mut streak = if passed { self.promotion_streak + 1 } else { 0 };
        let mut promoted = false;

        if streak >= rules.streak_to_promote {
            let candidate = self.current_practice_level.harder().min(self.goal_level);
            if candidate != self.current_practice_level {
                tracing::info!(
                    from = %self.current_practice_level,
                    to = %candidate,
                    week_id = week_id,
                    "Promoted practice level"
                );
                self.current_practice_level = candidate;
                promoted = true;
            } else {
                tracing::info!(level = %candidate, week_id = week_id, "Promotion streak reached at goal level");
            }
            streak = 0;
        }
        self.promotion_streak = streak;

        let entry = WeeklyCheckEntry {
            week_id: week_id.to_string(),
            created_at: created_at.to_string(),
            level: result.level,
            total: result.total,
            correct: result.correct,
            rate: result.rate,
            by_skill: result.by_skill.clone(),
            all_skills_passed_90: passed,
            promotion_streak_after_save: self.promotion_streak,
            promoted,
            current_practice_level_after_save: self.current_practice_level,
        };

        match self.history.iter().position(|e| e.week_id == week_id) {
            Some(pos) => {
                tracing::warn!(week_id = week_id, "Weekly check re-submitted, replacing history entry");
                self.history[pos] = entry.clone();
            }
            None => self.history.push(entry.clone()),
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sessions::SkillScores;
    use crate::skills::model::SkillRates;

    fn result(level: Level, vocab: f64, grammar: f64, reading: f64) -> WeeklyCheckResult {
        let scores = SkillScores::from_rates(&SkillRates::new(vocab, grammar, reading), 10);
        WeeklyCheckResult::from_scores(level, scores)
    }

    #[test]
    fn test_three_passing_weeks_promote_once() {
        let rules = PromotionRules::default();
        let mut state = PromotionState::seeded(Level::N3, Some(Level::N5));
        assert_eq!(state.current_practice_level, Level::N4);

        let rates = [(0.95, 0.95, 0.95), (0.92, 0.92, 0.92), (0.91, 0.91, 0.91)];
        for (i, (v, g, r)) in rates.iter().enumerate() {
            let week = format!("2026-W{:02}", 40 + i);
            state.record_weekly_check(&week, "t", &result(Level::N4, *v, *g, *r), &rules);
        }

        assert_eq!(state.current_practice_level, Level::N3);
        assert_eq!(state.promotion_streak, 0);
        assert_eq!(state.history.len(), 3);
        assert!(state.latest_entry().unwrap().promoted);
        assert_eq!(state.history[1].promotion_streak_after_save, 2);
    }

    #[test]
    fn test_one_failing_skill_resets_streak() {
        let rules = PromotionRules::default();
        let mut state = PromotionState::seeded(Level::N3, Some(Level::N4));
        state.record_weekly_check("w1", "t", &result(Level::N4, 1.0, 1.0, 1.0), &rules);
        state.record_weekly_check("w2", "t", &result(Level::N4, 1.0, 1.0, 1.0), &rules);
        assert_eq!(state.promotion_streak, 2);

        let entry = state.record_weekly_check("w3", "t", &result(Level::N4, 1.0, 0.8, 1.0), &rules);
        assert!(!entry.all_skills_passed_90);
        assert_eq!(state.promotion_streak, 0);
        assert_eq!(state.current_practice_level, Level::N4);
    }

    #[test]
    fn test_exactly_ninety_percent_passes() {
        let rules = PromotionRules::default();
        let mut state = PromotionState::seeded(Level::N4, Some(Level::N4));
        let entry = state.record_weekly_check("w1", "t", &result(Level::N4, 0.9, 0.9, 0.9), &rules);
        assert!(entry.all_skills_passed_90);
        assert_eq!(state.promotion_streak, 1);
    }

    #[test]
    fn test_streak_at_goal_resets_without_promotion() {
        let rules = PromotionRules::default();
        let mut state = PromotionState::seeded(Level::N4, Some(Level::N4));
        for week in ["w1", "w2", "w3"] {
            state.record_weekly_check(week, "t", &result(Level::N4, 1.0, 1.0, 1.0), &rules);
        }
        assert_eq!(state.current_practice_level, Level::N4);
        assert_eq!(state.promotion_streak, 0);
        assert!(!state.latest_entry().unwrap().promoted);
    }

    #[test]
    fn test_resubmitting_week_replaces_entry() {
        let rules = PromotionRules::default();
        let mut state = PromotionState::seeded(Level::N3, Some(Level::N4));
        state.record_weekly_check("w1", "first", &result(Level::N4, 0.5, 0.5, 0.5), &rules);
        state.record_weekly_check("w1", "second", &result(Level::N4, 1.0, 1.0, 1.0), &rules);
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].created_at, "second");
        assert_eq!(state.promotion_streak, 1);
    }

    #[test]
    fn test_change_goal_clamps_and_resets() {
        let mut state = PromotionState::seeded(Level::N2, Some(Level::N2));
        state.promotion_streak = 2;
        state.change_goal(Level::N4);
        assert_eq!(state.current_practice_level, Level::N4);
        assert_eq!(state.promotion_streak, 0);
    }

    #[test]
    fn test_decodes_lenient_levels() {
        let raw = r#"{"goalLevel":"n3","currentPracticeLevel":1,"promotionStreak":2}"#;
        let state: PromotionState = serde_json::from_str(raw).unwrap();
        let state = state.normalized();
        assert_eq!(state.goal_level, Level::N3);
        assert_eq!(state.current_practice_level, Level::N3);
        assert!(state.history.is_empty());
    }
}
