pub mod progress;

use std::collections::{BTreeMap, HashSet};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::config::WeeklyCheckConfig;
use crate::error::CoachError;
use crate::memory::{keys, store::{self, KvStore}};
use crate::problems::bank::{Question, QuestionBank};
use crate::skills::model::{lenient_level, lenient_rate, Level, Skill, SkillRates};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SkillScore {
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub total: u32,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub rate: f64,
}

impl SkillScore {
    pub fn from_counts(correct: u32, total: u32) -> Self {
        let rate = if total == 0 { 0.0 } else { f64::from(correct) / f64::from(total) };
        SkillScore { correct, total, rate }
    }
}

/// Per-skill scores. Missing skills read as zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct SkillScores {
    pub vocab: SkillScore,
    pub grammar: SkillScore,
    pub reading: SkillScore,
}

impl SkillScores {
    pub fn get(&self, skill: Skill) -> &SkillScore {
        match skill {
            Skill::Vocab => &self.vocab,
            Skill::Grammar => &self.grammar,
            Skill::Reading => &self.reading,
        }
    }

    fn get_mut(&mut self, skill: Skill) -> &mut SkillScore {
        match skill {
            Skill::Vocab => &mut self.vocab,
            Skill::Grammar => &mut self.grammar,
            Skill::Reading => &mut self.reading,
        }
    }

    pub fn rates(&self) -> SkillRates {
        SkillRates::new(self.vocab.rate, self.grammar.rate, self.reading.rate)
    }

    /// Scores carrying the given rates over `per_skill` questions each.
    pub fn from_rates(rates: &SkillRates, per_skill: u32) -> Self {
        let mut scores = SkillScores::default();
        for skill in Skill::ALL {
            let rate = rates.get(skill);
            let correct = (rate * f64::from(per_skill)).round() as u32;
            *scores.get_mut(skill) = SkillScore { correct, total: per_skill, rate };
        }
        scores
    }
}

/// Graded outcome of one weekly check.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCheckResult {
    pub level: Level,
    pub total: u32,
    pub correct: u32,
    pub rate: f64,
    pub by_skill: SkillScores,
}

impl WeeklyCheckResult {
    pub fn from_scores(level: Level, by_skill: SkillScores) -> Self {
        let total: u32 = Skill::ALL.iter().map(|s| by_skill.get(*s).total).sum();
        let correct: u32 = Skill::ALL.iter().map(|s| by_skill.get(*s).correct).sum();
        let overall = SkillScore::from_counts(correct, total);
        WeeklyCheckResult { level, total, correct, rate: overall.rate, by_skill }
    }
}

/// A question slot in the weekly check. `skill` is the skill the slot
/// scores for, even when the item was borrowed from another skill's pool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionQuestion {
    pub id: String,
    pub skill: Skill,
    #[serde(default, deserialize_with = "lenient_level")]
    pub level_tag: Level,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyCheckSession {
    pub week_id: String,
    #[serde(deserialize_with = "lenient_level")]
    pub goal_level: Level,
    #[serde(deserialize_with = "lenient_level")]
    pub level: Level,
    pub questions: Vec<SessionQuestion>,
    /// Question id to chosen option index.
    #[serde(default)]
    pub answers: BTreeMap<String, usize>,
    #[serde(default)]
    pub created_at: String,
}

impl WeeklyCheckSession {
    /// Record (or overwrite) the choice for a question in this session.
    pub fn answer(&mut self, qid: &str, choice: usize) -> bool {
        if !self.questions.iter().any(|q| q.id == qid) {
            tracing::warn!(qid = qid, "Answer for question outside weekly check, ignoring");
            return false;
        }
        self.answers.insert(qid.to_string(), choice);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.questions.iter().all(|q| self.answers.contains_key(&q.id))
    }

    /// Score answers against the bank. Unanswered or unknown items count wrong.
    pub fn grade(&self, bank: &dyn QuestionBank) -> WeeklyCheckResult {
        let mut by_skill = SkillScores::default();
        for question in &self.questions {
            let expected = bank.find(&question.id).map(|q| q.correct_index);
            let correct = matches!(
                (self.answers.get(&question.id), expected),
                (Some(given), Some(expected)) if *given == expected
            );
            let score = by_skill.get_mut(question.skill);
            score.total += 1;
            if correct {
                score.correct += 1;
            }
        }
        for skill in Skill::ALL {
            let score = by_skill.get_mut(skill);
            *score = SkillScore::from_counts(score.correct, score.total);
        }
        WeeklyCheckResult::from_scores(self.level, by_skill)
    }
}

/// Assembles the weekly check: per skill, a block at the practice level
/// plus a block one level harder, topped up from wider pools when short.
pub struct WeeklyCheckBuilder<'a> {
    bank: &'a dyn QuestionBank,
    config: &'a WeeklyCheckConfig,
}

impl<'a> WeeklyCheckBuilder<'a> {
    pub fn new(bank: &'a dyn QuestionBank, config: &'a WeeklyCheckConfig) -> Self {
        WeeklyCheckBuilder { bank, config }
    }

    pub fn build(&self, week_id: &str, level: Level, goal_level: Level, created_at: &str) -> WeeklyCheckSession {
        self.build_with_rng(week_id, level, goal_level, created_at, &mut rand::thread_rng())
    }

    pub fn build_with_rng<R: Rng + ?Sized>(
        &self,
        week_id: &str,
        level: Level,
        goal_level: Level,
        created_at: &str,
        rng: &mut R,
    ) -> WeeklyCheckSession {
        let everything: Vec<Question> = Skill::ALL.iter().flat_map(|s| self.bank.list_by_skill(*s)).collect();
        let mut taken: HashSet<String> = HashSet::new();
        let mut questions = Vec::new();

        for skill in Skill::ALL {
            let own = self.bank.list_by_skill(skill);
            let per_skill = self.config.per_skill();
            let mut slot: Vec<SessionQuestion> = Vec::with_capacity(per_skill);

            let tiers: [(Option<Level>, &[Question], usize); 4] = [
                (Some(level), own.as_slice(), self.config.current_level_count),
                (Some(level.harder()), own.as_slice(), self.config.harder_level_count),
                (None, own.as_slice(), usize::MAX),
                (None, everything.as_slice(), usize::MAX),
            ];
            for (tier, (tier_level, pool, quota)) in tiers.into_iter().enumerate() {
                let need = per_skill.saturating_sub(slot.len()).min(quota);
                if need == 0 {
                    continue;
                }
                let candidates: Vec<&Question> = pool
                    .iter()
                    .filter(|q| tier_level.map_or(true, |l| q.level_tag == l) && !taken.contains(&q.id))
                    .collect();
                if tier >= 2 && !candidates.is_empty() {
                    tracing::debug!(skill = %skill, tier, need, "Weekly check backfilling from wider pool");
                }
                for q in candidates.choose_multiple(rng, need) {
                    taken.insert(q.id.clone());
                    slot.push(SessionQuestion { id: q.id.clone(), skill, level_tag: q.level_tag });
                }
            }

            // Bank has fewer distinct items than the check needs: repeat.
            let fallback: &[Question] = if own.is_empty() { everything.as_slice() } else { own.as_slice() };
            while slot.len() < per_skill {
                let Some(q) = fallback.choose(rng) else {
                    tracing::warn!(skill = %skill, "Question bank empty, weekly check is short");
                    break;
                };
                slot.push(SessionQuestion { id: q.id.clone(), skill, level_tag: q.level_tag });
            }

            questions.extend(slot);
        }

        questions.shuffle(rng);
        tracing::info!(week_id = week_id, level = %level, questions = questions.len(), "Weekly check built");

        WeeklyCheckSession {
            week_id: week_id.to_string(),
            goal_level,
            level,
            questions,
            answers: BTreeMap::new(),
            created_at: created_at.to_string(),
        }
    }
}

/// The in-progress weekly check, if one was started.
pub fn load_session(kv: &dyn KvStore) -> Option<WeeklyCheckSession> {
    store::read::<Option<WeeklyCheckSession>>(kv, keys::WEEKLY_CHECK_SESSION).flatten()
}

pub fn save_session(kv: &dyn KvStore, session: &WeeklyCheckSession) -> Result<(), CoachError> {
    store::write(kv, keys::WEEKLY_CHECK_SESSION, &Some(session))
        .map_err(|e| e.with_context("saving weekly check session"))
}

pub fn clear_session(kv: &dyn KvStore) -> Result<(), CoachError> {
    store::write::<Option<WeeklyCheckSession>>(kv, keys::WEEKLY_CHECK_SESSION, &None)
        .map_err(|e| e.with_context("clearing weekly check session"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::store::MemoryStore;
    use crate::problems::bank::InMemoryQuestionBank;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn question(id: &str, skill: Skill, level: Level) -> Question {
        Question {
            id: id.to_string(),
            skill,
            level_tag: level,
            prompt: format!("prompt {}", id),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 1,
        }
    }

    fn stocked_bank(per_level: usize) -> InMemoryQuestionBank {
        let mut questions = Vec::new();
        for skill in Skill::ALL {
            for level in [Level::N4, Level::N3] {
                for i in 0..per_level {
                    questions.push(question(&format!("{}-{}-{}", skill, level, i), skill, level));
                }
            }
        }
        InMemoryQuestionBank::new(questions)
    }

    fn build(bank: &InMemoryQuestionBank, level: Level, seed: u64) -> WeeklyCheckSession {
        let config = WeeklyCheckConfig::default();
        let mut rng = StdRng::seed_from_u64(seed);
        WeeklyCheckBuilder::new(bank, &config).build_with_rng("2026-W42", level, Level::N3, "t", &mut rng)
    }

    #[test]
    fn test_builds_thirty_questions_split_by_level() {
        let bank = stocked_bank(20);
        let session = build(&bank, Level::N4, 7);
        assert_eq!(session.questions.len(), 30);

        for skill in Skill::ALL {
            let slots: Vec<_> = session.questions.iter().filter(|q| q.skill == skill).collect();
            assert_eq!(slots.len(), 10);
            assert_eq!(slots.iter().filter(|q| q.level_tag == Level::N4).count(), 6);
            assert_eq!(slots.iter().filter(|q| q.level_tag == Level::N3).count(), 4);
        }

        let unique: HashSet<_> = session.questions.iter().map(|q| &q.id).collect();
        assert_eq!(unique.len(), 30);
    }

    #[test]
    fn test_same_seed_same_check() {
        let bank = stocked_bank(20);
        assert_eq!(build(&bank, Level::N4, 11), build(&bank, Level::N4, 11));
    }

    #[test]
    fn test_short_levels_backfill_from_skill_pool() {
        // Only two items per level per skill: 4 distinct, the rest from the wider tiers.
        let bank = stocked_bank(2);
        let session = build(&bank, Level::N4, 3);
        assert_eq!(session.questions.len(), 30);
        for skill in Skill::ALL {
            assert_eq!(session.questions.iter().filter(|q| q.skill == skill).count(), 10);
        }
    }

    #[test]
    fn test_empty_skill_borrows_from_bank() {
        let bank = InMemoryQuestionBank::new(
            (0..40).map(|i| question(&format!("v{}", i), Skill::Vocab, Level::N4)).collect(),
        );
        let session = build(&bank, Level::N4, 5);
        assert_eq!(session.questions.len(), 30);
        assert_eq!(session.questions.iter().filter(|q| q.skill == Skill::Reading).count(), 10);
    }

    #[test]
    fn test_grading_counts_unanswered_as_wrong() {
        let bank = stocked_bank(20);
        let mut session = build(&bank, Level::N4, 9);
        let ids: Vec<(String, Skill)> = session.questions.iter().map(|q| (q.id.clone(), q.skill)).collect();
        for (id, skill) in &ids {
            // Reading gets every answer wrong, grammar leaves one blank.
            let choice = if *skill == Skill::Reading { 0 } else { 1 };
            session.answer(id, choice);
        }
        let blank = ids.iter().find(|(_, s)| *s == Skill::Grammar).map(|(id, _)| id.clone()).unwrap();
        session.answers.remove(&blank);
        assert!(!session.is_complete());

        let result = session.grade(&bank);
        assert_eq!(result.total, 30);
        assert_eq!(result.by_skill.vocab.rate, 1.0);
        assert_eq!(result.by_skill.grammar.correct, 9);
        assert_eq!(result.by_skill.reading.correct, 0);
        assert_eq!(result.correct, 19);
    }

    #[test]
    fn test_answer_outside_session_is_ignored() {
        let bank = stocked_bank(20);
        let mut session = build(&bank, Level::N4, 1);
        assert!(!session.answer("nope", 0));
        assert!(session.answers.is_empty());
    }

    #[test]
    fn test_session_persists_and_clears() {
        let kv = MemoryStore::new();
        assert!(load_session(&kv).is_none());
        let bank = stocked_bank(20);
        let session = build(&bank, Level::N4, 2);
        save_session(&kv, &session).unwrap();
        assert_eq!(load_session(&kv), Some(session));
        clear_session(&kv).unwrap();
        assert!(load_session(&kv).is_none());
    }

    fn bank_at(levels: &[(Level, usize)]) -> InMemoryQuestionBank {
        let mut questions = Vec::new();
        for skill in Skill::ALL {
            for (level, n) in levels {
                for i in 0..*n {
                    questions.push(question(&format!("{}-{}-{}", skill, level, i), skill, *level));
                }
            }
        }
        InMemoryQuestionBank::new(questions)
    }

    #[test]
    fn test_top_level_check_stays_at_n1() {
        let bank = bank_at(&[(Level::N2, 20), (Level::N1, 20)]);
        let session = build(&bank, Level::N1, 13);
        assert_eq!(session.questions.len(), 30);
        for skill in Skill::ALL {
            let slots: Vec<_> = session.questions.iter().filter(|q| q.skill == skill).collect();
            assert_eq!(slots.len(), 10);
            assert!(slots.iter().all(|q| q.level_tag == Level::N1));
            let unique: HashSet<_> = slots.iter().map(|q| &q.id).collect();
            assert_eq!(unique.len(), 10);
        }
    }

    #[test]
    fn test_sparse_n1_falls_through_to_skill_pool() {
        let bank = bank_at(&[(Level::N2, 20), (Level::N1, 3)]);
        let session = build(&bank, Level::N1, 17);
        for skill in Skill::ALL {
            let slots: Vec<_> = session.questions.iter().filter(|q| q.skill == skill).collect();
            assert_eq!(slots.len(), 10);
            assert_eq!(slots.iter().filter(|q| q.level_tag == Level::N1).count(), 3);
            assert_eq!(slots.iter().filter(|q| q.level_tag == Level::N2).count(), 7);
            let unique: HashSet<_> = slots.iter().map(|q| &q.id).collect();
            assert_eq!(unique.len(), 10);
        }
    }
}
