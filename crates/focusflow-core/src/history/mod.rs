mod engine;
mod ledger;

pub use engine::{describe_default, HistoryEngine};
pub use ledger::{parse_ledger, resolve_today_on_load, DailyHistory, HistoryLedger, Session};
