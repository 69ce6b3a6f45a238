//! Commands the UI layer calls. Each one loads a snapshot from the store,
//! runs it through the core and writes it back whole.

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::analytics::{compute_analytics, AnalyticsPayload};
use crate::brain::roadmap::{week_id_for, RoadmapBuilder, RoadmapRequest, WeaknessInput};
use crate::brain::{self, PracticeSet, Roadmap};
use crate::error::CoachError;
use crate::metrics::MetricsSnapshot;
use crate::progression::{self, PromotionState, WeeklyCheckEntry};
use crate::sessions::progress::AnswerOutcome;
use crate::sessions::{self, WeeklyCheckBuilder, WeeklyCheckSession};
use crate::skills::model::{Level, SkillRates};
use crate::skills::store::{self as diagnostic_store, DiagnosticResult};
use crate::state::app::AppState;
use crate::state::providers::Plan;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetAnswerResponse {
    pub outcome: AnswerOutcome,
    pub set: PracticeSet,
}

fn require_promotion(state: &AppState) -> Result<PromotionState, CoachError> {
    progression::store::load(state.kv())
        .ok_or_else(|| CoachError::new("learner not initialized", "progression"))
}

fn require_roadmap(state: &AppState) -> Result<Roadmap, CoachError> {
    brain::store::load(state.kv()).ok_or_else(|| CoachError::new("no roadmap stored", "roadmap"))
}

/// Rates that drive next week's weakness shape: the latest weekly check,
/// else the diagnostic, else all zero.
fn current_rates(state: &AppState, promotion: &PromotionState) -> SkillRates {
    if let Some(entry) = promotion.latest_entry() {
        return entry.by_skill.rates();
    }
    match diagnostic_store::load_diagnostic(state.kv()) {
        Some(diagnostic) => diagnostic.rates,
        None => {
            tracing::debug!("No diagnostic or weekly check yet, using zero rates");
            SkillRates::default()
        }
    }
}

fn build_roadmap(state: &AppState, promotion: &PromotionState, start: NaiveDate) -> Result<Roadmap, CoachError> {
    let rates = current_rates(state, promotion);
    let request = RoadmapRequest::starting(
        start,
        promotion.goal_level,
        promotion.current_practice_level,
        WeaknessInput::Rates(rates),
    );
    let roadmap = RoadmapBuilder::new(&state.sampler, &state.metrics).build(&request, &state.clock.now_iso());
    brain::store::save(state.kv(), &roadmap)?;
    Ok(roadmap)
}

pub fn save_diagnostic(
    state: &AppState,
    estimated_level: Option<Level>,
    rates: SkillRates,
) -> Result<DiagnosticResult, CoachError> {
    let diagnostic = DiagnosticResult {
        estimated_level,
        rates: SkillRates::new(rates.vocab, rates.grammar, rates.reading),
        created_at: state.clock.now_iso(),
    };
    diagnostic_store::save_diagnostic(state.kv(), &diagnostic)?;
    tracing::info!(estimate = ?estimated_level, "Diagnostic saved");
    Ok(diagnostic)
}

/// Seed the promotion state. An existing state keeps its history and only
/// has its goal changed.
pub fn initialize_learner(state: &AppState, goal_level: Level, estimate: Option<Level>) -> Result<PromotionState, CoachError> {
    let promotion = match progression::store::load(state.kv()) {
        Some(mut existing) => {
            existing.change_goal(goal_level);
            existing
        }
        None => {
            let estimate = estimate.or_else(|| diagnostic_store::load_diagnostic(state.kv()).and_then(|d| d.estimated_level));
            let seeded = PromotionState::seeded(goal_level, estimate);
            tracing::info!(
                goal = %goal_level,
                practice_level = %seeded.current_practice_level,
                "Learner initialized"
            );
            seeded
        }
    };
    progression::store::save(state.kv(), &promotion)?;
    Ok(promotion)
}

pub fn get_promotion_state(state: &AppState) -> Option<PromotionState> {
    progression::store::load(state.kv())
}

pub fn change_goal(state: &AppState, goal_level: Level) -> Result<PromotionState, CoachError> {
    let mut promotion = require_promotion(state)?;
    promotion.change_goal(goal_level);
    progression::store::save(state.kv(), &promotion)?;
    Ok(promotion)
}

/// The stored week while today falls inside it, else a new week starting today.
pub fn get_or_create_roadmap(state: &AppState) -> Result<Roadmap, CoachError> {
    let today = state.clock.today();
    if let Some(roadmap) = brain::store::load(state.kv()) {
        if roadmap.covers(today) {
            return Ok(roadmap);
        }
        tracing::info!(week_id = %roadmap.week_id, today = %today, "Stored roadmap expired, building a new week");
    }
    let promotion = require_promotion(state)?;
    build_roadmap(state, &promotion, today)
}

pub fn regenerate_roadmap(state: &AppState, start: Option<NaiveDate>) -> Result<Roadmap, CoachError> {
    let promotion = require_promotion(state)?;
    build_roadmap(state, &promotion, start.unwrap_or_else(|| state.clock.today()))
}

pub fn record_set_answer(state: &AppState, set_id: &str, qid: &str, correct: bool) -> Result<SetAnswerResponse, CoachError> {
    let mut roadmap = require_roadmap(state)?;
    let now = state.clock.now_iso();
    let set = roadmap
        .find_set_mut(set_id)
        .ok_or_else(|| CoachError::new("unknown practice set", "roadmap").with_context(set_id))?;

    let outcome = set.progress.record_answer(qid, correct, &now);
    let set = set.clone();
    roadmap.updated_at = now;
    brain::store::save(state.kv(), &roadmap)?;

    tracing::debug!(set_id = set_id, qid = qid, outcome = ?outcome, "Set answer recorded");
    Ok(SetAnswerResponse { outcome, set })
}

pub fn finish_set(state: &AppState, set_id: &str) -> Result<PracticeSet, CoachError> {
    let mut roadmap = require_roadmap(state)?;
    let now = state.clock.now_iso();
    let set = roadmap
        .find_set_mut(set_id)
        .ok_or_else(|| CoachError::new("unknown practice set", "roadmap").with_context(set_id))?;

    if !set.progress.finish(&now) {
        tracing::debug!(set_id = set_id, "Set not finished yet");
    }
    let set = set.clone();
    roadmap.updated_at = now;
    brain::store::save(state.kv(), &roadmap)?;
    Ok(set)
}

/// Resume the week's open check, or build one at the current practice level.
pub fn start_weekly_check(state: &AppState) -> Result<WeeklyCheckSession, CoachError> {
    let promotion = require_promotion(state)?;
    let week_id = brain::store::load(state.kv())
        .map(|r| r.week_id)
        .unwrap_or_else(|| week_id_for(state.clock.today()));

    if let Some(existing) = sessions::load_session(state.kv()) {
        if existing.week_id == week_id && existing.level == promotion.current_practice_level {
            return Ok(existing);
        }
        tracing::info!(stale_week = %existing.week_id, week_id = %week_id, "Discarding stale weekly check");
    }

    let session = WeeklyCheckBuilder::new(state.bank.as_ref(), &state.config.weekly_check).build(
        &week_id,
        promotion.current_practice_level,
        promotion.goal_level,
        &state.clock.now_iso(),
    );
    sessions::save_session(state.kv(), &session)?;
    Ok(session)
}

pub fn answer_weekly_check(state: &AppState, qid: &str, choice: usize) -> Result<WeeklyCheckSession, CoachError> {
    let mut session = sessions::load_session(state.kv())
        .ok_or_else(|| CoachError::new("no weekly check in progress", "weekly_check"))?;
    if session.answer(qid, choice) {
        sessions::save_session(state.kv(), &session)?;
    }
    Ok(session)
}

/// Grade the open check, apply the promotion rules and close the session.
pub fn submit_weekly_check(state: &AppState) -> Result<WeeklyCheckEntry, CoachError> {
    let session = sessions::load_session(state.kv())
        .ok_or_else(|| CoachError::new("no weekly check in progress", "weekly_check"))?;
    let mut promotion = require_promotion(state)?;

    if !session.is_complete() {
        tracing::warn!(
            week_id = %session.week_id,
            answered = session.answers.len(),
            total = session.questions.len(),
            "Submitting incomplete weekly check, unanswered items count wrong"
        );
    }

    let result = session.grade(state.bank.as_ref());
    let entry = promotion.record_weekly_check(&session.week_id, &state.clock.now_iso(), &result, &state.config.promotion);
    progression::store::save(state.kv(), &promotion)?;
    sessions::clear_session(state.kv())?;

    state.metrics.record_weekly_check(entry.promoted);
    tracing::info!(
        week_id = %entry.week_id,
        rate = entry.rate,
        passed = entry.all_skills_passed_90,
        streak = entry.promotion_streak_after_save,
        "Weekly check submitted"
    );
    Ok(entry)
}

pub fn get_analytics(state: &AppState) -> AnalyticsPayload {
    let roadmap = brain::store::load(state.kv());
    let promotion = progression::store::load(state.kv());
    compute_analytics(roadmap.as_ref(), promotion.as_ref())
}

pub fn get_plan(state: &AppState) -> Plan {
    state.entitlement.plan()
}

pub fn get_metrics(state: &AppState) -> MetricsSnapshot {
    state.metrics.snapshot()
}
