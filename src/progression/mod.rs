pub mod promotion;
pub mod resolver;
pub mod store;

pub use promotion::{PromotionState, WeeklyCheckEntry};
pub use resolver::resolve_practice_level;
