pub mod store;

/// Store keys for the records the scheduler owns.
pub mod keys {
    pub const ROADMAP: &str = "jlpt.roadmap";
    pub const PROMOTION: &str = "jlpt.promotion";
    pub const DIAGNOSTIC: &str = "jlpt.diagnostic";
    pub const WEEKLY_CHECK_SESSION: &str = "jlpt.weekly_check.session";
}
