use serde::{Serialize, Deserialize};
use crate::skills::classifier::WeaknessShape;
use crate::skills::model::Skill;

pub const PRACTICE_DAYS: u8 = 6;
pub const WEEKLY_CHECK_DAY: u8 = 7;
/// Sets per practice day.
pub const DAILY_SET_TARGET: u32 = 9;

/// Practice sets per skill for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DailyAllocation {
    #[serde(default)]
    pub vocab: u32,
    #[serde(default)]
    pub grammar: u32,
    #[serde(default)]
    pub reading: u32,
}

impl DailyAllocation {
    pub const fn zero() -> Self {
        DailyAllocation { vocab: 0, grammar: 0, reading: 0 }
    }

    pub fn get(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Vocab => self.vocab,
            Skill::Grammar => self.grammar,
            Skill::Reading => self.reading,
        }
    }

    fn with(mut self, skill: Skill, sets: u32) -> Self {
        match skill {
            Skill::Vocab => self.vocab = sets,
            Skill::Grammar => self.grammar = sets,
            Skill::Reading => self.reading = sets,
        }
        self
    }

    pub fn total(&self) -> u32 {
        self.vocab + self.grammar + self.reading
    }

    /// Skills with their counts, largest share first; ties keep skill priority.
    pub fn by_share(&self) -> [(Skill, u32); 3] {
        let mut shares = Skill::ALL.map(|s| (s, self.get(s)));
        shares.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        shares
    }
}

/// Split the nine daily sets for a practice day (1..=6).
pub fn allocate(shape: &WeaknessShape, day_index: u8) -> DailyAllocation {
    let base = DailyAllocation::zero();
    match *shape {
        WeaknessShape::AllEqual => DailyAllocation { vocab: 3, grammar: 3, reading: 3 },
        WeaknessShape::OneWeak { skill } => Skill::ALL
            .iter()
            .fold(base, |acc, s| acc.with(*s, if *s == skill { 5 } else { 2 })),
        WeaknessShape::TwoWeakTie { weak_a, weak_b, strongest } => {
            let (a, b) = if day_index % 2 == 0 { (3, 4) } else { (4, 3) };
            base.with(weak_a, a).with(weak_b, b).with(strongest, 2)
        }
        WeaknessShape::Stair { order: [w1, w2, w3] } => base.with(w1, 4).with(w2, 3).with(w3, 2),
    }
}

/// Like [`allocate`], but the weekly-check day always gets nothing.
pub fn allocation_for_day(shape: &WeaknessShape, day_index: u8) -> DailyAllocation {
    if day_index >= WEEKLY_CHECK_DAY {
        DailyAllocation::zero()
    } else {
        allocate(shape, day_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skills::classifier::classify;
    use crate::skills::model::SkillRates;

    fn shapes() -> Vec<WeaknessShape> {
        vec![
            WeaknessShape::AllEqual,
            WeaknessShape::OneWeak { skill: Skill::Grammar },
            WeaknessShape::TwoWeakTie { weak_a: Skill::Grammar, weak_b: Skill::Reading, strongest: Skill::Vocab },
            WeaknessShape::Stair { order: [Skill::Reading, Skill::Vocab, Skill::Grammar] },
        ]
    }

    #[test]
    fn test_practice_days_sum_to_nine_and_check_day_to_zero() {
        for shape in shapes() {
            for day in 1..=PRACTICE_DAYS {
                assert_eq!(allocation_for_day(&shape, day).total(), DAILY_SET_TARGET);
            }
            assert_eq!(allocation_for_day(&shape, WEEKLY_CHECK_DAY).total(), 0);
        }
    }

    #[test]
    fn test_one_weak_day_three() {
        let shape = classify(&SkillRates::new(40.0, 90.0, 90.0));
        assert_eq!(allocate(&shape, 3), DailyAllocation { vocab: 5, grammar: 2, reading: 2 });
    }

    #[test]
    fn test_two_weak_tie_alternates_by_parity() {
        let shape = classify(&SkillRates::new(50.0, 50.0, 90.0));
        assert_eq!(allocate(&shape, 2), DailyAllocation { vocab: 3, grammar: 4, reading: 2 });
        assert_eq!(allocate(&shape, 3), DailyAllocation { vocab: 4, grammar: 3, reading: 2 });
    }

    #[test]
    fn test_stair_weakest_gets_most() {
        let shape = WeaknessShape::Stair { order: [Skill::Reading, Skill::Vocab, Skill::Grammar] };
        for day in 1..=PRACTICE_DAYS {
            assert_eq!(allocate(&shape, day), DailyAllocation { vocab: 3, grammar: 2, reading: 4 });
        }
    }

    #[test]
    fn test_by_share_orders_descending_with_priority() {
        let alloc = DailyAllocation { vocab: 2, grammar: 5, reading: 2 };
        assert_eq!(alloc.by_share(), [(Skill::Grammar, 5), (Skill::Vocab, 2), (Skill::Reading, 2)]);
    }
}
