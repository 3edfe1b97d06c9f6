//! History engine: owns the ledger and writes it through to the store.
//!
//! Every mutation of `today` is followed by a full write of the ledger under
//! one key. A failed write is logged and kept for the host to inspect via
//! [`HistoryEngine::take_persist_error`]; memory stays authoritative and the
//! next mutation writes the complete state again.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::ledger::{parse_ledger, resolve_today_on_load, DailyHistory, HistoryLedger, Session};
use crate::error::CoreError;
use crate::storage::KeyValueStore;
use crate::timer::Category;

/// Description used when the user leaves the field blank.
pub fn describe_default(category: Category) -> String {
    format!("Completed {category} session.")
}

pub struct HistoryEngine<S> {
    store: S,
    key: String,
    ledger: HistoryLedger,
    last_persist_error: Option<CoreError>,
}

impl<S: KeyValueStore> HistoryEngine<S> {
    /// Load the ledger for the local calendar date of this process.
    pub fn load(store: S, key: impl Into<String>) -> Self {
        Self::load_for_date(store, key, Local::now().date_naive())
    }

    /// Load the ledger and resolve the day boundary against `current_date`.
    ///
    /// This is the only place the day boundary is checked. An engine that
    /// stays alive past midnight keeps committing into the day it loaded.
    /// An unreadable or malformed ledger is treated as absent.
    pub fn load_for_date(store: S, key: impl Into<String>, current_date: NaiveDate) -> Self {
        let key = key.into();
        let persisted = match store.get(&key) {
            Ok(Some(blob)) => match parse_ledger(&blob) {
                Ok(ledger) => ledger,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "discarding malformed history ledger");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "history store unreadable, starting empty");
                None
            }
        };

        let ledger = resolve_today_on_load(persisted.clone(), current_date);
        let changed = persisted.as_ref() != Some(&ledger);

        let mut engine = Self {
            store,
            key,
            ledger,
            last_persist_error: None,
        };
        if changed {
            engine.persist();
        }
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn today(&self) -> &DailyHistory {
        &self.ledger.today
    }

    pub fn yesterday(&self) -> Option<&DailyHistory> {
        self.ledger.yesterday.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The most recent persist failure since the last call, if any.
    pub fn take_persist_error(&mut self) -> Option<CoreError> {
        self.last_persist_error.take()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record a finished run in today's history and persist the ledger.
    ///
    /// A blank or missing description falls back to
    /// [`describe_default`]. Zero-second runs are never recorded.
    pub fn commit_session(
        &mut self,
        category: Category,
        duration_seconds: u64,
        description: Option<&str>,
    ) -> &DailyHistory {
        self.commit_session_at(category, duration_seconds, description, Utc::now());
        &self.ledger.today
    }

    /// Same as [`commit_session`](Self::commit_session) with an explicit
    /// commit time. Returns the new session, `None` for a zero duration.
    pub fn commit_session_at(
        &mut self,
        category: Category,
        duration_seconds: u64,
        description: Option<&str>,
        at: DateTime<Utc>,
    ) -> Option<Session> {
        if duration_seconds == 0 {
            tracing::debug!(%category, "skipping zero-duration session");
            return None;
        }
        // stored with millisecond precision
        let at = DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at);

        let description = match description.map(str::trim) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => describe_default(category),
        };
        let session = Session::new(
            self.next_id(at),
            category,
            duration_seconds,
            description,
            at,
        );
        tracing::info!(
            %category,
            duration_seconds,
            session_id = session.id(),
            "session committed"
        );
        self.ledger.today.append(session.clone());
        self.persist();
        Some(session)
    }

    /// Write the complete ledger to the store. Returns whether it succeeded.
    pub fn persist(&mut self) -> bool {
        let result = serde_json::to_string(&self.ledger)
            .map_err(CoreError::from)
            .and_then(|blob| self.store.set(&self.key, &blob).map_err(CoreError::from));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to persist history ledger");
                self.last_persist_error = Some(e);
                false
            }
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Commit time in epoch ms, bumped past the last id of the day so ids
    /// stay unique and increasing within `today`. A stored id already at
    /// `i64::MAX` cannot be bumped; the commit time is used instead.
    fn next_id(&self, at: DateTime<Utc>) -> i64 {
        let candidate = at.timestamp_millis();
        match self.ledger.today.sessions().last() {
            Some(last) if last.id() >= candidate => {
                last.id().checked_add(1).unwrap_or_else(|| {
                    tracing::warn!(last_id = last.id(), "session id space exhausted");
                    candidate
                })
            }
            _ => candidate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    const KEY: &str = "focus_flow_data";

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    /// Store whose writes can be switched off.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        failing: bool,
        writes: usize,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if self.failing {
                return Err(StoreError::Unavailable("quota exceeded".into()));
            }
            self.writes += 1;
            self.inner.set(key, value)
        }
    }

    #[test]
    fn describe_default_names_the_category() {
        assert_eq!(describe_default(Category::Study), "Completed Study session.");
        assert_eq!(describe_default(Category::Coding), "Completed Coding session.");
    }

    #[test]
    fn fresh_store_starts_empty_and_writes_ledger() {
        let engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
        assert!(engine.today().is_empty());
        assert_eq!(engine.today().date(), date("2024-01-02"));
        assert!(engine.yesterday().is_none());
        let stored = engine.store().get(KEY).unwrap().unwrap();
        assert_eq!(parse_ledger(&stored).unwrap().unwrap(), *engine.ledger());
    }

    #[test]
    fn commit_appends_and_persists() {
        let mut engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
        let today = engine.commit_session(Category::Study, 65, Some("read ch.1"));
        assert_eq!(today.total_study_seconds(), 65);
        assert_eq!(today.sessions()[0].description(), "read ch.1");

        let stored = engine.store().get(KEY).unwrap().unwrap();
        let reloaded = parse_ledger(&stored).unwrap().unwrap();
        assert_eq!(reloaded.today.sessions().len(), 1);
        assert_eq!(reloaded.today.total_study_seconds(), 65);
    }

    #[test]
    fn blank_description_uses_default() {
        let mut engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
        engine.commit_session(Category::Coding, 10, None);
        engine.commit_session(Category::Coding, 10, Some("   "));
        for session in engine.today().sessions() {
            assert_eq!(session.description(), "Completed Coding session.");
        }
    }

    #[test]
    fn zero_duration_is_not_recorded() {
        let mut engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
        let at = Utc::now();
        assert!(engine.commit_session_at(Category::Study, 0, None, at).is_none());
        assert!(engine.today().is_empty());
        assert_eq!(engine.today().total_study_seconds(), 0);
    }

    #[test]
    fn ids_increase_within_same_millisecond() {
        let mut engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
        let at = Utc::now();
        let a = engine.commit_session_at(Category::Study, 1, None, at).unwrap();
        let b = engine.commit_session_at(Category::Coding, 1, None, at).unwrap();
        assert_eq!(a.id(), at.timestamp_millis());
        assert_eq!(b.id(), a.id() + 1);
    }

    #[test]
    fn commit_after_max_stored_id_does_not_overflow() {
        let blob = format!(
            r#"{{"today": {{"date": "2024-01-02", "totalStudySeconds": 5,
                "totalCodingSeconds": 0, "sessions": [
                {{"id": {}, "category": "Study", "durationSeconds": 5,
                  "description": "late", "createdAt": 1704153600000}}]}},
               "yesterday": null}}"#,
            i64::MAX
        );
        let store = MemoryStore::with_value(KEY, &blob);
        let mut engine = HistoryEngine::load_for_date(store, KEY, date("2024-01-02"));
        assert_eq!(engine.today().sessions()[0].id(), i64::MAX);

        let at = Utc::now();
        let session = engine.commit_session_at(Category::Study, 3, None, at).unwrap();
        assert_eq!(session.id(), at.timestamp_millis());
        assert_eq!(engine.today().total_study_seconds(), 8);
        assert!(engine.take_persist_error().is_none());
    }

    #[test]
    fn malformed_blob_falls_back_to_empty() {
        let store = MemoryStore::with_value(KEY, "{\"today\": 42");
        let engine = HistoryEngine::load_for_date(store, KEY, date("2024-01-02"));
        assert_eq!(*engine.ledger(), HistoryLedger::empty(date("2024-01-02")));
    }

    #[test]
    fn persist_failure_keeps_memory_and_retries_on_next_write() {
        let store = FlakyStore {
            failing: true,
            ..FlakyStore::default()
        };
        let mut engine = HistoryEngine::load_for_date(store, KEY, date("2024-01-02"));
        assert!(engine.take_persist_error().is_some());

        engine.commit_session(Category::Study, 30, Some("first"));
        assert_eq!(engine.today().total_study_seconds(), 30);
        assert!(matches!(
            engine.take_persist_error(),
            Some(CoreError::Store(StoreError::Unavailable(_)))
        ));
        assert!(engine.store().get(KEY).unwrap().is_none());

        engine.store.failing = false;
        engine.commit_session(Category::Study, 20, Some("second"));
        assert!(engine.take_persist_error().is_none());

        let stored = engine.store().get(KEY).unwrap().unwrap();
        let reloaded = parse_ledger(&stored).unwrap().unwrap();
        assert_eq!(reloaded.today.sessions().len(), 2);
        assert_eq!(reloaded.today.total_study_seconds(), 50);
    }

    #[test]
    fn same_day_load_does_not_rewrite() {
        let mut first = HistoryEngine::load_for_date(FlakyStore::default(), KEY, date("2024-01-02"));
        first.commit_session(Category::Coding, 5, None);
        let store = first.store;
        let writes = store.writes;

        let second = HistoryEngine::load_for_date(store, KEY, date("2024-01-02"));
        assert_eq!(second.store().writes, writes);
        assert_eq!(second.today().total_coding_seconds(), 5);
    }

    proptest! {
        #[test]
        fn totals_match_sessions_for_any_interleaving(
            runs in prop::collection::vec((any::<bool>(), 0u64..10_000), 0..60)
        ) {
            let mut engine = HistoryEngine::load_for_date(MemoryStore::new(), KEY, date("2024-01-02"));
            for (is_study, secs) in runs {
                let category = if is_study { Category::Study } else { Category::Coding };
                engine.commit_session(category, secs, None);

                let today = engine.today();
                for c in Category::ALL {
                    let sum: u64 = today
                        .sessions()
                        .iter()
                        .filter(|s| s.category() == c)
                        .map(|s| s.duration_seconds())
                        .sum();
                    prop_assert_eq!(today.total_seconds(c), sum);
                }
                prop_assert!(today.sessions().iter().all(|s| s.duration_seconds() > 0));
            }
        }
    }
}
