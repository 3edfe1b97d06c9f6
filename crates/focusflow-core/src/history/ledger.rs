//! Persisted history types and the load-time day rollover.
//!
//! The ledger is stored as one JSON document:
//!
//! ```text
//! { "today": DailyHistory, "yesterday": DailyHistory | null }
//! ```
//!
//! Documents written by the browser widget used shorter field names
//! (`totalStudy`, `type`, `duration`, `timestamp`); those are accepted as
//! aliases on read and never written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Category;

/// One committed timer run. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    id: i64,
    #[serde(alias = "type")]
    category: Category,
    #[serde(alias = "duration")]
    duration_seconds: u64,
    description: String,
    #[serde(alias = "timestamp", with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(
        id: i64,
        category: Category,
        duration_seconds: u64,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            category,
            duration_seconds,
            description,
            created_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Sessions and per-category totals for one local calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHistory {
    date: NaiveDate,
    #[serde(alias = "totalStudy")]
    total_study_seconds: u64,
    #[serde(alias = "totalCoding")]
    total_coding_seconds: u64,
    sessions: Vec<Session>,
}

impl DailyHistory {
    /// An empty day.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            total_study_seconds: 0,
            total_coding_seconds: 0,
            sessions: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn total_study_seconds(&self) -> u64 {
        self.total_study_seconds
    }

    pub fn total_coding_seconds(&self) -> u64 {
        self.total_coding_seconds
    }

    pub fn total_seconds(&self, category: Category) -> u64 {
        match category {
            Category::Study => self.total_study_seconds,
            Category::Coding => self.total_coding_seconds,
        }
    }

    /// Sessions in commit order.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Append a session and bump the matching total in the same step, so
    /// totals always equal the per-category sum of `sessions`.
    pub(crate) fn append(&mut self, session: Session) {
        let total = match session.category {
            Category::Study => &mut self.total_study_seconds,
            Category::Coding => &mut self.total_coding_seconds,
        };
        *total = total.saturating_add(session.duration_seconds);
        self.sessions.push(session);
    }
}

/// The full persisted state: today plus at most one day of back-history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryLedger {
    pub today: DailyHistory,
    /// The day before `today`, kept read-only for display and export.
    pub yesterday: Option<DailyHistory>,
}

impl HistoryLedger {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            today: DailyHistory::new(date),
            yesterday: None,
        }
    }
}

/// On-disk shape. `today` may be null in documents written before any
/// session existed, which counts as no persisted data.
#[derive(Deserialize)]
struct StoredLedger {
    today: Option<DailyHistory>,
    #[serde(default)]
    yesterday: Option<DailyHistory>,
}

/// Parse a stored ledger document.
///
/// `Ok(None)` means the document is well formed but holds no `today`.
pub fn parse_ledger(blob: &str) -> Result<Option<HistoryLedger>, serde_json::Error> {
    let stored: StoredLedger = serde_json::from_str(blob)?;
    Ok(stored.today.map(|today| HistoryLedger {
        today,
        yesterday: stored.yesterday,
    }))
}

/// Decide which day is "today" for a freshly started process.
///
/// - same date: the persisted ledger is reused as is;
/// - different date: the persisted `today` becomes `yesterday` and a fresh
///   day starts (any older `yesterday` is dropped);
/// - nothing persisted: a fresh day with no `yesterday`.
///
/// The persisted date is compared for equality only. A persisted day that
/// lies in the future (clock moved backwards) is still rolled into
/// `yesterday`.
pub fn resolve_today_on_load(
    persisted: Option<HistoryLedger>,
    current_date: NaiveDate,
) -> HistoryLedger {
    match persisted {
        Some(ledger) if ledger.today.date == current_date => ledger,
        Some(ledger) => {
            tracing::info!(
                from = %ledger.today.date,
                to = %current_date,
                "rolling history over to a new day"
            );
            HistoryLedger {
                today: DailyHistory::new(current_date),
                yesterday: Some(ledger.today),
            }
        }
        None => HistoryLedger::empty(current_date),
    }
}
