pub mod app;
pub mod providers;

pub use app::AppState;
pub use providers::{Clock, EntitlementProvider, FixedClock, Plan, StaticPlan, SystemClock};
