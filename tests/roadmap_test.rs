use std::collections::HashSet;
use std::sync::Arc;
use chrono::NaiveDate;
use jlpt_coach_lib::brain::roadmap::{RoadmapBuilder, RoadmapRequest, WeaknessInput};
use jlpt_coach_lib::brain::Roadmap;
use jlpt_coach_lib::config::SchedulerConfig;
use jlpt_coach_lib::metrics::Metrics;
use jlpt_coach_lib::problems::{InMemoryQuestionBank, Question, QuestionSampler};
use jlpt_coach_lib::skills::{Level, Skill, SkillRates, WeaknessShape};

fn bank(skills: &[Skill], per_level: usize) -> InMemoryQuestionBank {
    let mut questions = Vec::new();
    for skill in skills {
        for level in [Level::N5, Level::N4, Level::N3] {
            for i in 0..per_level {
                questions.push(Question {
                    id: format!("{}-{}-{:03}", skill, level, i),
                    skill: *skill,
                    level_tag: level,
                    prompt: String::new(),
                    choices: vec!["a".into(), "b".into()],
                    correct_index: 0,
                });
            }
        }
    }
    InMemoryQuestionBank::new(questions)
}

fn build(bank: InMemoryQuestionBank, weakness: WeaknessInput) -> (Roadmap, Metrics) {
    let metrics = Metrics::new();
    let sampler = QuestionSampler::new(Arc::new(bank), &SchedulerConfig::default(), metrics.clone());
    let start = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
    let request = RoadmapRequest::starting(start, Level::N3, Level::N4, weakness);
    let roadmap = RoadmapBuilder::new(&sampler, &metrics).build(&request, "2026-10-12T00:00:00.000Z");
    (roadmap, metrics)
}

#[test]
fn test_week_shape() {
    let (roadmap, metrics) = build(bank(&Skill::ALL, 120), WeaknessInput::Rates(SkillRates::new(0.5, 0.8, 0.8)));

    assert_eq!(roadmap.week_id, "2026-W42");
    assert!(roadmap.validate().is_ok());
    assert_eq!(roadmap.days.len(), 7);
    assert_eq!(roadmap.days[0].date_iso, "2026-10-12");
    assert_eq!(roadmap.days[6].date_iso, "2026-10-18");

    for day in &roadmap.days[..6] {
        assert_eq!(day.sets.len(), 9);
        assert_eq!(day.focus_skill, Some(Skill::Vocab));
        assert!(!day.is_weekly_check_day);
        for set in &day.sets {
            assert_eq!(set.question_ids.len(), set.skill.set_size());
            assert_eq!(set.level_tag, Level::N4);
        }
    }

    let check_day = &roadmap.days[6];
    assert!(check_day.is_weekly_check_day);
    assert!(check_day.sets.is_empty());
    assert_eq!(check_day.focus_skill, None);
    assert_eq!(check_day.allocation.map(|a| a.total()), Some(0));

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.roadmaps_built, 1);
    assert_eq!(snapshot.sets_generated, 54);
    assert_eq!(snapshot.sets_backfilled, 0);
}

#[test]
fn test_question_ids_unique_per_skill_per_day() {
    let (roadmap, _) = build(bank(&Skill::ALL, 120), WeaknessInput::Shape(WeaknessShape::OneWeak { skill: Skill::Grammar }));
    for day in &roadmap.days {
        for skill in Skill::ALL {
            let ids: Vec<&String> = day
                .sets
                .iter()
                .filter(|s| s.skill == skill)
                .flat_map(|s| s.question_ids.iter())
                .collect();
            let unique: HashSet<&String> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len(), "day {} skill {}", day.day_index, skill);
        }
    }
}

#[test]
fn test_set_ids_are_unique_and_sequenced() {
    let (roadmap, _) = build(bank(&Skill::ALL, 120), WeaknessInput::Shape(WeaknessShape::AllEqual));
    let ids: Vec<&str> = roadmap.days.iter().flat_map(|d| d.sets.iter()).map(|s| s.set_id.as_str()).collect();
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
    assert!(unique.contains("2026-W42:d1:vocab_1"));
    assert!(unique.contains("2026-W42:d6:reading_3"));
}

#[test]
fn test_same_inputs_same_roadmap() {
    let weakness = WeaknessInput::Rates(SkillRates::new(0.3, 0.6, 0.9));
    let (a, _) = build(bank(&Skill::ALL, 120), weakness);
    let (b, _) = build(bank(&Skill::ALL, 120), weakness);
    assert_eq!(a, b);
}

#[test]
fn test_empty_skill_is_backfilled() {
    // Reading is weakest but has no questions at all.
    let (roadmap, metrics) = build(
        bank(&[Skill::Vocab, Skill::Grammar], 120),
        WeaknessInput::Shape(WeaknessShape::OneWeak { skill: Skill::Reading }),
    );
    for day in &roadmap.days[..6] {
        assert_eq!(day.sets.len(), 9);
        assert!(day.sets.iter().all(|s| s.skill != Skill::Reading));
    }
    assert!(metrics.snapshot().sets_backfilled > 0);
}

#[test]
fn test_empty_bank_yields_empty_days() {
    let (roadmap, _) = build(InMemoryQuestionBank::default(), WeaknessInput::Shape(WeaknessShape::AllEqual));
    assert_eq!(roadmap.days.len(), 7);
    assert!(roadmap.days.iter().all(|d| d.sets.is_empty()));
}

#[test]
fn test_missing_level_falls_back_to_nearest() {
    // Only N5 and N3 exist; practice level N4 must borrow from a neighbour.
    let mut questions = Vec::new();
    for level in [Level::N5, Level::N3] {
        for i in 0..60 {
            questions.push(Question {
                id: format!("v-{}-{}", level, i),
                skill: Skill::Vocab,
                level_tag: level,
                prompt: String::new(),
                choices: vec!["a".into()],
                correct_index: 0,
            });
        }
    }
    let (roadmap, metrics) = build(InMemoryQuestionBank::new(questions), WeaknessInput::Shape(WeaknessShape::AllEqual));
    let first = &roadmap.days[0].sets[0];
    assert_eq!(first.question_ids.len(), 10);
    assert!(metrics.snapshot().level_fallbacks > 0);
}
