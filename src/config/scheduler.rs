use std::path::{Path, PathBuf};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use crate::problems::fallback::LevelTieBreak;
use crate::skills::model::Skill;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Candidate pool target, as a multiple of the set size.
    pub pool_multiplier: usize,
    pub cache_capacity: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig { pool_multiplier: 3, cache_capacity: 64 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyCheckConfig {
    pub current_level_count: usize,
    pub harder_level_count: usize,
}

impl WeeklyCheckConfig {
    pub fn per_skill(&self) -> usize {
        self.current_level_count + self.harder_level_count
    }
}

impl Default for WeeklyCheckConfig {
    fn default() -> Self {
        WeeklyCheckConfig { current_level_count: 6, harder_level_count: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionRules {
    /// Per-skill rate every skill must reach, in [0, 1].
    pub pass_rate: f64,
    pub streak_to_promote: u32,
}

impl Default for PromotionRules {
    fn default() -> Self {
        PromotionRules { pass_rate: 0.9, streak_to_promote: 3 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub vocab: LevelTieBreak,
    pub grammar: LevelTieBreak,
    pub reading: LevelTieBreak,
}

impl FallbackConfig {
    pub fn for_skill(&self, skill: Skill) -> LevelTieBreak {
        match skill {
            Skill::Vocab => self.vocab,
            Skill::Grammar => self.grammar,
            Skill::Reading => self.reading,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { data_dir: app_data_dir().join("data") }
    }
}

/// Tunables for the scheduler. Every field has a default, so a partial
/// (or empty) TOML file is valid.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub sampler: SamplerConfig,
    pub weekly_check: WeeklyCheckConfig,
    pub promotion: PromotionRules,
    pub fallback: FallbackConfig,
    pub storage: StorageConfig,
}

fn app_data_dir() -> PathBuf {
    // Use platform-specific app data directory
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push("Library/Application Support/com.jlptcoach.app");
            return dir;
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            let mut dir = PathBuf::from(appdata);
            dir.push("com.jlptcoach.app");
            return dir;
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let mut dir = PathBuf::from(home);
            dir.push(".local/share/com.jlptcoach.app");
            return dir;
        }
    }

    // Fallback
    PathBuf::from(".")
}

/// `JLPT_COACH_CONFIG` if set, else `scheduler.toml` in the app data dir.
pub fn config_path() -> PathBuf {
    std::env::var_os("JLPT_COACH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| app_data_dir().join("scheduler.toml"))
}

impl SchedulerConfig {
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: SchedulerConfig = toml::from_str(content).context("invalid scheduler config")?;
        Ok(config.sanitized())
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scheduler config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing scheduler config at {}", path.display()))
    }

    /// Load from [`config_path`], falling back to defaults on any problem.
    pub fn load_or_default() -> Self {
        let path = config_path();
        if !path.exists() {
            tracing::info!(path = ?path, "No scheduler config found, using defaults");
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => {
                tracing::info!(path = ?path, "Loaded scheduler config");
                config
            }
            Err(e) => {
                tracing::warn!(path = ?path, error = %format!("{:#}", e), "Bad scheduler config, using defaults");
                Self::default()
            }
        }
    }

    // Values that would break the scheduler's guarantees are pulled back into range.
    fn sanitized(mut self) -> Self {
        self.sampler.pool_multiplier = self.sampler.pool_multiplier.max(1);
        self.sampler.cache_capacity = self.sampler.cache_capacity.max(1);
        self.promotion.streak_to_promote = self.promotion.streak_to_promote.max(1);
        self.promotion.pass_rate = crate::skills::model::normalize_rate(self.promotion.pass_rate);
        self
    }
}
