use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde::{Serialize, Deserialize};

/// Time source. Injected so roadmap and promotion logic stay deterministic.
pub trait Clock: Send + Sync {
    fn now_iso(&self) -> String;
    fn today(&self) -> NaiveDate;

    fn today_iso(&self) -> String {
        self.today().format(crate::brain::DATE_FORMAT).to_string()
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_iso(&self) -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Settable clock for tests and replays.
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock { now: RwLock::new(now) }
    }

    /// Midnight UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self::new(date.and_time(chrono::NaiveTime::MIN).and_utc())
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.write() = now;
    }

    pub fn advance_days(&self, days: i64) {
        let mut now = self.now.write();
        *now += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now_iso(&self) -> String {
        self.now.read().to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn today(&self) -> NaiveDate {
        self.now.read().date_naive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
}

/// Billing collaborator. The scheduler never branches on it; it is only
/// passed through to the UI.
pub trait EntitlementProvider: Send + Sync {
    fn plan(&self) -> Plan;
}

pub struct StaticPlan(pub Plan);

impl EntitlementProvider for StaticPlan {
    fn plan(&self) -> Plan {
        self.0
    }
}
