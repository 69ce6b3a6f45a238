use std::collections::BTreeMap;
use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::skills::model::{Level, Skill};

/// A single multiple-choice item from the question bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub skill: Skill,
    pub level_tag: Level,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub correct_index: usize,
}

/// Read-only question source. Only `list_by_skill` is required; the
/// level and id lookups derive from it.
pub trait QuestionBank: Send + Sync {
    fn list_by_skill(&self, skill: Skill) -> Vec<Question>;

    /// IDs for one skill at one level, in bank order.
    fn ids_at(&self, skill: Skill, level: Level) -> Vec<String> {
        self.list_by_skill(skill)
            .into_iter()
            .filter(|q| q.level_tag == level)
            .map(|q| q.id)
            .collect()
    }

    /// Up to `count` questions for one skill at one level, in bank order.
    fn take_at(&self, skill: Skill, level: Level, count: usize) -> Vec<Question> {
        self.list_by_skill(skill)
            .into_iter()
            .filter(|q| q.level_tag == level)
            .take(count)
            .collect()
    }

    fn get_at(&self, skill: Skill, level: Level, id: &str) -> Option<Question> {
        self.list_by_skill(skill)
            .into_iter()
            .find(|q| q.level_tag == level && q.id == id)
    }

    fn find(&self, id: &str) -> Option<Question> {
        Skill::ALL
            .iter()
            .find_map(|skill| self.list_by_skill(*skill).into_iter().find(|q| q.id == id))
    }
}

/// Bank held in memory, grouped by skill. Duplicate IDs keep the first copy.
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionBank {
    by_skill: BTreeMap<Skill, Vec<Question>>,
}

impl InMemoryQuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        let mut by_skill: BTreeMap<Skill, Vec<Question>> = BTreeMap::new();
        let mut seen = std::collections::HashSet::new();
        for question in questions {
            if !seen.insert(question.id.clone()) {
                tracing::warn!(id = %question.id, "Duplicate question id in bank, keeping first");
                continue;
            }
            by_skill.entry(question.skill).or_default().push(question);
        }
        InMemoryQuestionBank { by_skill }
    }

    pub fn len(&self) -> usize {
        self.by_skill.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load every `*.json` file in `dir`, each holding an array of questions.
    /// Unreadable files are skipped; a missing directory yields an empty bank.
    pub fn load_dir(dir: &Path) -> Self {
        let mut questions = Vec::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = ?dir, error = %e, "Question directory not readable, bank is empty");
                return Self::default();
            }
        };

        let mut paths: Vec<_> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();

        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(text) => match serde_json::from_str::<Vec<Question>>(&text) {
                    Ok(mut batch) => questions.append(&mut batch),
                    Err(e) => {
                        tracing::warn!(path = ?path, error = %e, "Failed to parse question file");
                    }
                },
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "Failed to read question file");
                }
            }
        }

        let bank = Self::new(questions);
        tracing::info!(path = ?dir, count = bank.len(), "Question bank loaded");
        bank
    }
}

impl QuestionBank for InMemoryQuestionBank {
    fn list_by_skill(&self, skill: Skill) -> Vec<Question> {
        self.by_skill.get(&skill).cloned().unwrap_or_default()
    }
}
