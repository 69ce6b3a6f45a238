pub mod model;
pub mod classifier;
pub mod store;

pub use classifier::{classify, WeaknessShape};
pub use model::{Level, Skill, SkillRates};
