pub mod scheduler;

pub use scheduler::{
    FallbackConfig, PromotionRules, SamplerConfig, SchedulerConfig, StorageConfig, WeeklyCheckConfig,
};
