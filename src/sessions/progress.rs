use serde::{Serialize, Deserialize};

/// Mastery bookkeeping for one practice set.
///
/// `finished_at` is set exactly when `mastered.len() >= total`. `wrong_ever`
/// only grows. A wrong answer sends the question to the back of `remaining`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SetProgress {
    pub total: usize,
    pub mastered: Vec<String>,
    pub remaining: Vec<String>,
    pub wrong_ever: Vec<String>,
    pub attempts: u32,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
}

/// What a single answer did to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    NewlyMastered,
    AlreadyMastered,
    Missed,
    /// The question is not part of this set; nothing changed.
    Ignored,
}

impl SetProgress {
    /// Fresh progress for a set. Repeated IDs (tiny pools) count once.
    pub fn new(question_ids: &[String]) -> Self {
        let remaining = unique(question_ids);
        SetProgress {
            total: remaining.len(),
            remaining,
            ..Self::default()
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    fn contains(&self, qid: &str) -> bool {
        self.remaining.iter().any(|id| id == qid) || self.mastered.iter().any(|id| id == qid)
    }

    /// Apply one answer. Finishing happens in the same call once every
    /// question is mastered.
    pub fn record_answer(&mut self, qid: &str, correct: bool, now_iso: &str) -> AnswerOutcome {
        if !self.contains(qid) {
            tracing::warn!(qid = qid, "Answer for a question outside this set, ignoring");
            return AnswerOutcome::Ignored;
        }

        self.attempts += 1;
        if self.started_at.is_none() {
            self.started_at = Some(now_iso.to_string());
        }

        let outcome = if correct {
            if self.mastered.iter().any(|id| id == qid) {
                AnswerOutcome::AlreadyMastered
            } else {
                self.mastered.push(qid.to_string());
                self.remaining.retain(|id| id != qid);
                AnswerOutcome::NewlyMastered
            }
        } else {
            if !self.wrong_ever.iter().any(|id| id == qid) {
                self.wrong_ever.push(qid.to_string());
            }
            if let Some(pos) = self.remaining.iter().position(|id| id == qid) {
                let requeued = self.remaining.remove(pos);
                self.remaining.push(requeued);
            }
            AnswerOutcome::Missed
        };

        self.finish(now_iso);
        outcome
    }

    /// Mark finished if every question is mastered. Idempotent; returns
    /// whether the set is finished afterwards.
    pub fn finish(&mut self, now_iso: &str) -> bool {
        if self.finished_at.is_none() && self.mastered.len() >= self.total {
            self.finished_at = Some(now_iso.to_string());
            tracing::debug!(total = self.total, attempts = self.attempts, "Practice set finished");
        }
        self.is_finished()
    }

    /// Repair a record decoded from storage against the set's question list.
    pub fn normalize(&mut self, question_ids: &[String]) {
        self.total = unique(question_ids).len();

        let mut seen = std::collections::HashSet::new();
        self.mastered.retain(|id| question_ids.contains(id) && seen.insert(id.clone()));

        let mut seen = std::collections::HashSet::new();
        self.wrong_ever.retain(|id| seen.insert(id.clone()));

        let mut remaining: Vec<String> = Vec::new();
        for id in self.remaining.iter().chain(question_ids) {
            if question_ids.contains(id) && !self.mastered.contains(id) && !remaining.contains(id) {
                remaining.push(id.clone());
            }
        }
        self.remaining = remaining;

        if self.finished_at.is_some() && self.mastered.len() < self.total {
            tracing::warn!(
                mastered = self.mastered.len(),
                total = self.total,
                "Stored set marked finished before mastery, clearing"
            );
            self.finished_at = None;
        }
        if self.finished_at.is_none() && self.total > 0 && self.mastered.len() >= self.total {
            tracing::warn!(total = self.total, "Stored set fully mastered but not finished, finishing");
            let stamp = self.started_at.clone().unwrap_or_default();
            self.finish(&stamp);
        }
    }
}

fn unique(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().filter(|id| seen.insert(id.as_str())).cloned().collect()
}
