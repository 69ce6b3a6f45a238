use serde::{Serialize, Deserialize};
use crate::skills::model::{Skill, SkillRates};

/// Which skill(s) are comparatively weak this week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeaknessShape {
    AllEqual,
    OneWeak { skill: Skill },
    TwoWeakTie { weak_a: Skill, weak_b: Skill, strongest: Skill },
    /// Weakest first.
    Stair { order: [Skill; 3] },
}

/// Classify three skill rates into exactly one shape.
pub fn classify(rates: &SkillRates) -> WeaknessShape {
    let [low, mid, high] = rates.ascending();
    let (r_low, r_mid, r_high) = (rates.get(low), rates.get(mid), rates.get(high));

    let shape = if r_low == r_mid && r_mid == r_high {
        WeaknessShape::AllEqual
    } else if r_low < r_mid && r_mid == r_high {
        WeaknessShape::OneWeak { skill: low }
    } else if r_low == r_mid && r_mid < r_high {
        WeaknessShape::TwoWeakTie { weak_a: low, weak_b: mid, strongest: high }
    } else {
        WeaknessShape::Stair { order: [low, mid, high] }
    };

    tracing::debug!(?rates, ?shape, "Classified weakness shape");
    shape
}
