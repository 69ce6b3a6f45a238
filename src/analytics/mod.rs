use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};
use crate::brain::Roadmap;
use crate::progression::PromotionState;
use crate::skills::model::{Level, Skill};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DayCompletion {
    pub day_index: u8,
    pub date_iso: String,
    pub finished_sets: usize,
    pub total_sets: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsPayload {
    pub week_id: Option<String>,
    pub current_practice_level: Option<Level>,
    pub promotion_streak: u32,
    pub day_completion: Vec<DayCompletion>,
    pub mastered_by_skill: BTreeMap<String, u32>,
    pub wrong_by_skill: BTreeMap<String, u32>,
    pub skill_history: BTreeMap<String, Vec<(String, f64)>>, // week id → rate
    pub weekly_trends: BTreeMap<String, f64>,
}

/// Summarize the current week's practice and the weekly-check history.
pub fn compute_analytics(roadmap: Option<&Roadmap>, promotion: Option<&PromotionState>) -> AnalyticsPayload {
    let mut payload = AnalyticsPayload::default();

    if let Some(roadmap) = roadmap {
        payload.week_id = Some(roadmap.week_id.clone());
        for day in &roadmap.days {
            payload.day_completion.push(DayCompletion {
                day_index: day.day_index,
                date_iso: day.date_iso.clone(),
                finished_sets: day.finished_sets(),
                total_sets: day.sets.len(),
            });
            for set in &day.sets {
                *payload.mastered_by_skill.entry(set.skill.to_string()).or_insert(0) += set.progress.mastered.len() as u32;
                *payload.wrong_by_skill.entry(set.skill.to_string()).or_insert(0) += set.progress.wrong_ever.len() as u32;
            }
        }
    }

    if let Some(state) = promotion {
        payload.current_practice_level = Some(state.current_practice_level);
        payload.promotion_streak = state.promotion_streak;

        for skill in Skill::ALL {
            let history: Vec<(String, f64)> = state
                .history
                .iter()
                .map(|entry| (entry.week_id.clone(), entry.by_skill.get(skill).rate))
                .collect();

            // Trend is last minus first; needs at least two checks.
            if let (Some(first), Some(last)) = (history.first(), history.last()) {
                if history.len() >= 2 {
                    payload.weekly_trends.insert(skill.to_string(), last.1 - first.1);
                }
            }
            payload.skill_history.insert(skill.to_string(), history);
        }
    }

    payload
}
