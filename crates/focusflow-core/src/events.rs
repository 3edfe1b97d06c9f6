use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::Category;

/// Every state change in the tracker produces an Event.
/// The presentation layer polls for them; nothing in the core consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        category: Category,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        category: Category,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    /// Timer frozen; the host must now commit or discard the run.
    ResetRequested {
        category: Category,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    SessionCommitted {
        category: Category,
        session_id: i64,
        duration_seconds: u64,
        description: String,
        at: DateTime<Utc>,
    },
    SessionDiscarded {
        category: Category,
        elapsed_seconds: u64,
        at: DateTime<Utc>,
    },
    /// Timer back to stopped with zero elapsed time.
    TimerReset {
        category: Category,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn category(&self) -> Category {
        match self {
            Event::TimerStarted { category, .. }
            | Event::TimerPaused { category, .. }
            | Event::ResetRequested { category, .. }
            | Event::SessionCommitted { category, .. }
            | Event::SessionDiscarded { category, .. }
            | Event::TimerReset { category, .. } => *category,
        }
    }
}
