pub mod allocation;
pub mod roadmap;
pub mod store;

use chrono::NaiveDate;
use serde::{Serialize, Deserialize};
use crate::brain::allocation::{DailyAllocation, WEEKLY_CHECK_DAY};
use crate::sessions::progress::SetProgress;
use crate::skills::model::{lenient_level, Level, Skill};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One practice unit: a fixed number of questions for one skill.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSet {
    pub set_id: String,
    pub skill: Skill,
    #[serde(deserialize_with = "lenient_level")]
    pub level_tag: Level,
    pub planned_count: usize,
    pub question_ids: Vec<String>,
    #[serde(default)]
    pub progress: SetProgress,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapDay {
    pub day_index: u8,
    pub date_iso: String,
    #[serde(default)]
    pub focus_skill: Option<Skill>,
    #[serde(default)]
    pub is_weekly_check_day: bool,
    #[serde(default)]
    pub allocation: Option<DailyAllocation>,
    #[serde(deserialize_with = "lenient_level")]
    pub practice_level: Level,
    #[serde(default)]
    pub sets: Vec<PracticeSet>,
}

impl RoadmapDay {
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date_iso, DATE_FORMAT).ok()
    }

    pub fn finished_sets(&self) -> usize {
        self.sets.iter().filter(|s| s.progress.is_finished()).count()
    }
}

/// A week of practice. Replaced whole when the next week is generated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    pub week_id: String,
    #[serde(deserialize_with = "lenient_level")]
    pub goal_level: Level,
    pub days: Vec<RoadmapDay>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Roadmap {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.days.first().and_then(RoadmapDay::date)
    }

    /// True when `date` is one of this week's seven days.
    pub fn covers(&self, date: NaiveDate) -> bool {
        match (self.start_date(), self.days.last().and_then(RoadmapDay::date)) {
            (Some(first), Some(last)) => first <= date && date <= last,
            _ => false,
        }
    }

    pub fn day_for(&self, date: NaiveDate) -> Option<&RoadmapDay> {
        self.days.iter().find(|d| d.date() == Some(date))
    }

    pub fn find_set(&self, set_id: &str) -> Option<&PracticeSet> {
        self.days.iter().flat_map(|d| d.sets.iter()).find(|s| s.set_id == set_id)
    }

    pub fn find_set_mut(&mut self, set_id: &str) -> Option<&mut PracticeSet> {
        self.days.iter_mut().flat_map(|d| d.sets.iter_mut()).find(|s| s.set_id == set_id)
    }

    /// Check the week's shape: seven days numbered 1..=7 on consecutive
    /// dates, with only day 7 as the (empty) weekly-check day.
    pub fn validate(&self) -> Result<(), String> {
        if self.days.len() != usize::from(WEEKLY_CHECK_DAY) {
            return Err(format!("expected 7 days, found {}", self.days.len()));
        }
        let mut previous: Option<NaiveDate> = None;
        for (i, day) in self.days.iter().enumerate() {
            let expected_index = i + 1;
            if usize::from(day.day_index) != expected_index {
                return Err(format!("day {} has index {}", expected_index, day.day_index));
            }
            let date = day.date().ok_or_else(|| format!("day {} has bad date '{}'", expected_index, day.date_iso))?;
            if let Some(prev) = previous {
                if date.signed_duration_since(prev).num_days() != 1 {
                    return Err(format!("day {} is not one day after day {}", expected_index, i));
                }
            }
            previous = Some(date);
            let is_check = day.day_index == WEEKLY_CHECK_DAY;
            if day.is_weekly_check_day != is_check || (is_check && !day.sets.is_empty()) {
                return Err(format!("day {} has the wrong weekly-check shape", expected_index));
            }
        }
        Ok(())
    }

    /// Repair a decoded roadmap, or reject it when its week shape is broken.
    pub fn normalized(mut self) -> Option<Roadmap> {
        if let Err(reason) = self.validate() {
            tracing::warn!(week_id = %self.week_id, reason = %reason, "Stored roadmap is malformed, discarding");
            return None;
        }
        for set in self.days.iter_mut().flat_map(|d| d.sets.iter_mut()) {
            set.planned_count = set.skill.set_size();
            set.progress.normalize(&set.question_ids);
        }
        Some(self)
    }
}
