use serde::{Serialize, Deserialize};
use crate::error::CoachError;
use crate::memory::{keys, store::{self, KvStore}};
use crate::skills::model::{lenient_level_opt, Level, SkillRates};

/// Outcome of the placement diagnostic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticResult {
    #[serde(default, deserialize_with = "lenient_level_opt")]
    pub estimated_level: Option<Level>,
    #[serde(default)]
    pub rates: SkillRates,
    #[serde(default)]
    pub created_at: String,
}

/// Load the stored diagnostic, if any readable one exists.
pub fn load_diagnostic(kv: &dyn KvStore) -> Option<DiagnosticResult> {
    let diagnostic = store::read::<DiagnosticResult>(kv, keys::DIAGNOSTIC);
    if diagnostic.is_none() {
        tracing::debug!("No diagnostic on record");
    }
    diagnostic
}

pub fn save_diagnostic(kv: &dyn KvStore, diagnostic: &DiagnosticResult) -> Result<(), CoachError> {
    store::write(kv, keys::DIAGNOSTIC, diagnostic)
        .map_err(|e| e.with_context("saving diagnostic"))
}
