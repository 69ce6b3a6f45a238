use jlpt_coach_lib::config::PromotionRules;
use jlpt_coach_lib::progression::{resolve_practice_level, PromotionState};
use jlpt_coach_lib::sessions::{SkillScores, WeeklyCheckResult};
use jlpt_coach_lib::skills::{classify, Level, Skill, SkillRates, WeaknessShape};
use jlpt_coach_lib::brain::allocation::allocate;

fn check(level: Level, rate: f64) -> WeeklyCheckResult {
    WeeklyCheckResult::from_scores(level, SkillScores::from_rates(&SkillRates::new(rate, rate, rate), 10))
}

#[test]
fn test_far_below_goal_practices_one_level_down() {
    assert_eq!(resolve_practice_level(Some(Level::N5), Level::N3), Level::N4);
    assert_eq!(resolve_practice_level(Some(Level::N4), Level::N3), Level::N3);
    assert_eq!(resolve_practice_level(None, Level::N2), Level::N2);
}

#[test]
fn test_three_strong_weeks_reach_goal() {
    let rules = PromotionRules::default();
    let mut state = PromotionState::seeded(Level::N3, Some(Level::N5));
    assert_eq!(state.current_practice_level, Level::N4);

    let first = state.record_weekly_check("2026-W42", "t1", &check(Level::N4, 0.95), &rules);
    assert_eq!(first.promotion_streak_after_save, 1);
    let second = state.record_weekly_check("2026-W43", "t2", &check(Level::N4, 0.92), &rules);
    assert_eq!(second.promotion_streak_after_save, 2);
    let third = state.record_weekly_check("2026-W44", "t3", &check(Level::N4, 0.91), &rules);

    assert!(third.promoted);
    assert_eq!(third.current_practice_level_after_save, Level::N3);
    assert_eq!(state.current_practice_level, Level::N3);
    assert_eq!(state.promotion_streak, 0);

    // At the goal now: further passes never push past it.
    for week in ["2026-W45", "2026-W46", "2026-W47"] {
        state.record_weekly_check(week, "t", &check(Level::N3, 1.0), &rules);
    }
    assert_eq!(state.current_practice_level, Level::N3);
}

#[test]
fn test_weak_reading_plan() {
    let shape = classify(&SkillRates::new(0.8, 0.8, 0.4));
    assert_eq!(shape, WeaknessShape::OneWeak { skill: Skill::Reading });
    let allocation = allocate(&shape, 1);
    assert_eq!((allocation.vocab, allocation.grammar, allocation.reading), (2, 2, 5));
}

#[test]
fn test_two_weak_tie_alternates_by_day() {
    let shape = classify(&SkillRates::new(0.5, 0.5, 0.9));
    let odd = allocate(&shape, 1);
    let even = allocate(&shape, 2);
    assert_eq!(odd.total(), 9);
    assert_eq!(even.total(), 9);
    assert_eq!(odd.reading, 2);
    assert_ne!((odd.vocab, odd.grammar), (even.vocab, even.grammar));
}
