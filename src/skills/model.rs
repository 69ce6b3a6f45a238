use serde::{Serialize, Deserialize, Deserializer};
use std::fmt;

/// One of the three assessed skills. Declaration order is the tie-break
/// priority used everywhere a stable skill ordering is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skill {
    Vocab,
    Grammar,
    Reading,
}

impl Skill {
    pub const ALL: [Skill; 3] = [Skill::Vocab, Skill::Grammar, Skill::Reading];

    pub const fn as_str(self) -> &'static str {
        match self {
            Skill::Vocab => "vocab",
            Skill::Grammar => "grammar",
            Skill::Reading => "reading",
        }
    }

    /// Questions per practice set.
    pub const fn set_size(self) -> usize {
        match self {
            Skill::Vocab | Skill::Grammar => 10,
            Skill::Reading => 5,
        }
    }
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JLPT level, N5 (easiest) through N1 (hardest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Level {
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::N5, Level::N4, Level::N3, Level::N2, Level::N1];

    /// 0 for N5 up to 4 for N1.
    pub const fn rank(self) -> usize {
        self as usize
    }

    pub fn from_rank(rank: usize) -> Level {
        Level::ALL[rank.min(Level::ALL.len() - 1)]
    }

    /// One level harder, saturating at N1.
    pub fn harder(self) -> Level {
        Level::from_rank(self.rank() + 1)
    }

    /// One level easier, saturating at N5.
    pub fn easier(self) -> Level {
        Level::from_rank(self.rank().saturating_sub(1))
    }

    /// Accepts `N3`, `n3`, ` 3 ` (the JLPT number, so 3 is N3).
    pub fn parse_lenient(raw: &str) -> Option<Level> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('N')
            .or_else(|| trimmed.strip_prefix('n'))
            .unwrap_or(trimmed);
        digits.parse::<u8>().ok().and_then(Level::from_jlpt_number)
    }

    pub fn from_jlpt_number(n: u8) -> Option<Level> {
        match n {
            5 => Some(Level::N5),
            4 => Some(Level::N4),
            3 => Some(Level::N3),
            2 => Some(Level::N2),
            1 => Some(Level::N1),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Level::N5 => "N5",
            Level::N4 => "N4",
            Level::N3 => "N3",
            Level::N2 => "N2",
            Level::N1 => "N1",
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::N5
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Stored level tags come from several generations of the app ("N3", "n3", 3).
impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = Level;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a JLPT level such as \"N3\" or 3")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Level::parse_lenient(value)
                    .ok_or_else(|| E::custom(format!("unknown level tag: {}", value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u8::try_from(value)
                    .ok()
                    .and_then(Level::from_jlpt_number)
                    .ok_or_else(|| E::custom(format!("unknown level number: {}", value)))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                u64::try_from(value)
                    .map_err(|_| E::custom(format!("unknown level number: {}", value)))
                    .and_then(|v| self.visit_u64(v))
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

/// Deserialize an optional level, mapping anything unreadable to `None`.
pub fn lenient_level_opt<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value::<Level>(value).ok())
}

/// Deserialize a level, mapping anything unreadable to N5.
pub fn lenient_level<'de, D>(deserializer: D) -> Result<Level, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_level_opt(deserializer).map(Option::unwrap_or_default)
}

/// Bring a raw accuracy into [0, 1]. Values above 1 are read as percentages.
pub fn normalize_rate(raw: f64) -> f64 {
    if !raw.is_finite() {
        return 0.0;
    }
    let scaled = if raw > 1.0 { raw / 100.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

/// Deserialize a rate from a number or numeric string; junk becomes 0.
pub fn lenient_rate<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(normalize_rate(raw))
}

/// Accuracy per skill, always all three present and normalized to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SkillRates {
    #[serde(default, deserialize_with = "lenient_rate")]
    pub vocab: f64,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub grammar: f64,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub reading: f64,
}

impl SkillRates {
    /// Build from raw values on either a [0, 1] or [0, 100] scale.
    pub fn new(vocab: f64, grammar: f64, reading: f64) -> Self {
        SkillRates {
            vocab: normalize_rate(vocab),
            grammar: normalize_rate(grammar),
            reading: normalize_rate(reading),
        }
    }

    pub fn get(&self, skill: Skill) -> f64 {
        match skill {
            Skill::Vocab => self.vocab,
            Skill::Grammar => self.grammar,
            Skill::Reading => self.reading,
        }
    }

    pub fn set(&mut self, skill: Skill, rate: f64) {
        let rate = normalize_rate(rate);
        match skill {
            Skill::Vocab => self.vocab = rate,
            Skill::Grammar => self.grammar = rate,
            Skill::Reading => self.reading = rate,
        }
    }

    /// Skills ordered weakest first; exact ties keep vocab < grammar < reading.
    pub fn ascending(&self) -> [Skill; 3] {
        let mut order = Skill::ALL;
        order.sort_by(|a, b| {
            self.get(*a)
                .partial_cmp(&self.get(*b))
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(b))
        });
        order
    }

    /// True when every skill meets `threshold` (a [0, 1] rate).
    pub fn all_at_least(&self, threshold: f64) -> bool {
        Skill::ALL.iter().all(|s| self.get(*s) >= threshold)
    }
}
