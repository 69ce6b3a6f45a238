pub mod analytics;
pub mod brain;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod memory;
pub mod metrics;
pub mod problems;
pub mod progression;
pub mod routes;
pub mod sessions;
pub mod skills;
pub mod state;

use std::path::Path;
use std::sync::Arc;

/// Start-up for a host process: logging, config, question bank, state.
/// Stores under the configured data dir and uses the system clock.
pub fn init(question_dir: &Path, plan: state::Plan) -> state::AppState {
    logging::init_logging();
    tracing::info!("JLPT coach starting");

    let config = config::SchedulerConfig::load_or_default();
    let bank = problems::InMemoryQuestionBank::load_dir(question_dir);
    if bank.is_empty() {
        tracing::warn!(path = ?question_dir, "Question bank is empty, practice sets will be empty");
    }

    state::AppState::with_defaults(Arc::new(bank), Arc::new(state::StaticPlan(plan)), config)
}
