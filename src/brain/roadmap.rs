use std::collections::{BTreeMap, HashSet};
use chrono::{Duration, NaiveDate};
use serde::{Serialize, Deserialize};
use crate::brain::allocation::{allocate, DailyAllocation, DAILY_SET_TARGET, PRACTICE_DAYS, WEEKLY_CHECK_DAY};
use crate::brain::{PracticeSet, Roadmap, RoadmapDay, DATE_FORMAT};
use crate::metrics::Metrics;
use crate::problems::selector::{seed_context, set_id, QuestionSampler, SampleRequest};
use crate::sessions::progress::SetProgress;
use crate::skills::classifier::{classify, WeaknessShape};
use crate::skills::model::{Level, Skill, SkillRates};

/// Where the week's weakness shape comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaknessInput {
    Rates(SkillRates),
    Shape(WeaknessShape),
}

impl WeaknessInput {
    pub fn shape(&self) -> WeaknessShape {
        match self {
            WeaknessInput::Rates(rates) => classify(rates),
            WeaknessInput::Shape(shape) => *shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadmapRequest {
    pub week_id: String,
    pub goal_level: Level,
    pub practice_level: Level,
    pub start_date: NaiveDate,
    pub weakness: WeaknessInput,
}

impl RoadmapRequest {
    /// Request for the week starting `start_date`, with its ISO week as id.
    pub fn starting(start_date: NaiveDate, goal_level: Level, practice_level: Level, weakness: WeaknessInput) -> Self {
        RoadmapRequest {
            week_id: week_id_for(start_date),
            goal_level,
            practice_level,
            start_date,
            weakness,
        }
    }
}

/// ISO week of a date, e.g. `2026-W42`.
pub fn week_id_for(date: NaiveDate) -> String {
    date.format("%G-W%V").to_string()
}

// Backfill tries vocab first, then the rest in priority order.
const BACKFILL_ORDER: [Skill; 3] = [Skill::Vocab, Skill::Grammar, Skill::Reading];

/// Composes classification, allocation and sampling into a 7-day plan.
pub struct RoadmapBuilder<'a> {
    sampler: &'a QuestionSampler,
    metrics: &'a Metrics,
}

/// Per-day bookkeeping so sets of one skill do not share questions.
#[derive(Default)]
struct DayLedger {
    used: BTreeMap<Skill, HashSet<String>>,
    next_sequence: BTreeMap<Skill, usize>,
}

impl<'a> RoadmapBuilder<'a> {
    pub fn new(sampler: &'a QuestionSampler, metrics: &'a Metrics) -> Self {
        RoadmapBuilder { sampler, metrics }
    }

    pub fn build(&self, request: &RoadmapRequest, now_iso: &str) -> Roadmap {
        let shape = request.weakness.shape();
        tracing::info!(
            week_id = %request.week_id,
            practice_level = %request.practice_level,
            goal_level = %request.goal_level,
            ?shape,
            "Building weekly roadmap"
        );

        let mut days = Vec::with_capacity(usize::from(WEEKLY_CHECK_DAY));
        for day_index in 1..=PRACTICE_DAYS {
            days.push(self.build_practice_day(request, &shape, day_index));
        }
        days.push(RoadmapDay {
            day_index: WEEKLY_CHECK_DAY,
            date_iso: date_for(request.start_date, WEEKLY_CHECK_DAY),
            focus_skill: None,
            is_weekly_check_day: true,
            allocation: Some(DailyAllocation::zero()),
            practice_level: request.practice_level,
            sets: Vec::new(),
        });

        self.metrics.record_roadmap_built();
        Roadmap {
            week_id: request.week_id.clone(),
            goal_level: request.goal_level,
            days,
            created_at: now_iso.to_string(),
            updated_at: now_iso.to_string(),
        }
    }

    fn build_practice_day(&self, request: &RoadmapRequest, shape: &WeaknessShape, day_index: u8) -> RoadmapDay {
        let allocation = allocate(shape, day_index);
        let mut ledger = DayLedger::default();
        let mut sets = Vec::new();

        for (skill, count) in allocation.by_share() {
            for _ in 0..count {
                if let Some(set) = self.make_set(request, day_index, skill, &mut ledger) {
                    sets.push(set);
                }
            }
        }
        let planned = sets.len();

        let target = DAILY_SET_TARGET as usize;
        while sets.len() < target {
            let backfill = BACKFILL_ORDER
                .iter()
                .find_map(|skill| self.make_set(request, day_index, *skill, &mut ledger));
            match backfill {
                Some(set) => sets.push(set),
                None => {
                    tracing::error!(
                        week_id = %request.week_id,
                        day_index,
                        sets = sets.len(),
                        "Question bank is empty, cannot reach daily set target"
                    );
                    break;
                }
            }
        }

        let backfilled = sets.len() - planned;
        if backfilled > 0 {
            self.metrics.record_sets_backfilled(backfilled as u64);
            tracing::warn!(week_id = %request.week_id, day_index, backfilled, "Backfilled practice sets");
        }
        self.metrics.record_sets_generated(sets.len() as u64);

        RoadmapDay {
            day_index,
            date_iso: date_for(request.start_date, day_index),
            focus_skill: Some(allocation.by_share()[0].0),
            is_weekly_check_day: false,
            allocation: Some(allocation),
            practice_level: request.practice_level,
            sets,
        }
    }

    fn make_set(&self, request: &RoadmapRequest, day_index: u8, skill: Skill, ledger: &mut DayLedger) -> Option<PracticeSet> {
        let sequence = ledger.next_sequence.get(&skill).copied().unwrap_or(0) + 1;
        let context = seed_context(&request.week_id, day_index, skill, request.practice_level);
        let used = ledger.used.entry(skill).or_default();

        let sample = self.sampler.sample(
            SampleRequest {
                skill,
                level: request.practice_level,
                set_sequence: sequence,
                seed_context: &context,
                count: skill.set_size(),
            },
            used,
        );
        if sample.ids.is_empty() {
            return None;
        }

        used.extend(sample.ids.iter().cloned());
        ledger.next_sequence.insert(skill, sequence);

        Some(PracticeSet {
            set_id: set_id(&request.week_id, day_index, skill, sequence),
            skill,
            level_tag: request.practice_level,
            planned_count: skill.set_size(),
            progress: SetProgress::new(&sample.ids),
            question_ids: sample.ids,
        })
    }
}

fn date_for(start: NaiveDate, day_index: u8) -> String {
    (start + Duration::days(i64::from(day_index) - 1)).format(DATE_FORMAT).to_string()
}
