//! Tracker: the one stateful object a host wires per process.
//!
//! It owns the timer board, the history engine and the tick source, and it
//! keeps the tick subscription in step with the board: a subscription exists
//! exactly while some category is running. Hosts feed it user actions and
//! ticks one at a time, e.g.
//!
//! ```ignore
//! let (mut tracker, mut ticks) = Tracker::open(&Config::load_or_default())?;
//! tracker.start(Category::Study);
//! while let Some(tick) = ticks.recv().await {
//!     tracker.tick(tick);
//! }
//! ```

use chrono::Utc;
use tokio::sync::mpsc;

use crate::clock::{IntervalClock, Tick, TickSource, TickSubscription};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::history::{HistoryEngine, HistoryLedger};
use crate::storage::{Config, Database, KeyValueStore};
use crate::timer::{Category, ResetRequest, TimerBoard, TimerRuntimeState};

pub struct Tracker<S, C> {
    board: TimerBoard,
    history: HistoryEngine<S>,
    clock: C,
    subscription: Option<TickSubscription>,
}

impl Tracker<Database, IntervalClock> {
    /// Open the on-disk store named by `config` and an interval clock.
    ///
    /// Must be called inside a tokio runtime; ticks arrive on the returned
    /// receiver and should be passed to [`Tracker::tick`].
    pub fn open(config: &Config) -> Result<(Self, mpsc::UnboundedReceiver<Tick>)> {
        let db = Database::open(&config.database_file)?;
        Ok(Self::with_database(db, config))
    }

    /// Like [`Tracker::open`] on an already opened database. The ledger is
    /// read under `config.storage_key` and ticks come every
    /// `config.tick_period()`.
    pub fn with_database(db: Database, config: &Config) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let history = HistoryEngine::load(db, config.storage_key.clone());
        let (clock, ticks) = IntervalClock::new(config.tick_period());
        (Self::new(history, clock), ticks)
    }
}

impl<S: KeyValueStore, C: TickSource> Tracker<S, C> {
    pub fn new(history: HistoryEngine<S>, clock: C) -> Self {
        Self {
            board: TimerBoard::new(),
            history,
            clock,
            subscription: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn board(&self) -> &TimerBoard {
        &self.board
    }

    pub fn runtime(&self, category: Category) -> TimerRuntimeState {
        self.board.runtime(category)
    }

    pub fn history(&self) -> &HistoryEngine<S> {
        &self.history
    }

    /// The most recent ledger persist failure since the last call, if any.
    pub fn take_persist_error(&mut self) -> Option<CoreError> {
        self.history.take_persist_error()
    }

    pub fn ledger(&self) -> &HistoryLedger {
        self.history.ledger()
    }

    /// Whether a tick subscription is live.
    pub fn is_ticking(&self) -> bool {
        self.subscription.is_some()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, category: Category) -> Option<Event> {
        let event = self.board.start(category)?;
        self.sync_ticks();
        Some(event)
    }

    pub fn pause(&mut self, category: Category) -> Option<Event> {
        let event = self.board.pause(category)?;
        self.sync_ticks();
        Some(event)
    }

    /// Apply a tick from the clock. Ticks from released subscriptions are
    /// dropped. Returns the new elapsed value for the ticked category.
    pub fn tick(&mut self, tick: Tick) -> Option<u64> {
        match &self.subscription {
            Some(sub) if sub.owns(&tick) => self.board.tick(tick.category),
            _ => {
                tracing::debug!(category = %tick.category, "ignoring stale tick");
                None
            }
        }
    }

    /// Freeze `category` and wait for [`commit`](Self::commit) or
    /// [`discard`](Self::discard). A timer with no elapsed time is reset on
    /// the spot and `TimerReset` is returned instead of `ResetRequested`.
    pub fn request_reset(&mut self, category: Category) -> Event {
        let request = self.board.request_reset(category);
        self.sync_ticks();
        match request {
            ResetRequest::AwaitingDecision {
                category,
                elapsed_seconds,
            } => Event::ResetRequested {
                category,
                elapsed_seconds,
                at: Utc::now(),
            },
            ResetRequest::Empty { category } => Event::TimerReset {
                category,
                at: Utc::now(),
            },
        }
    }

    /// Record the pending run in today's history, then reset its timer.
    ///
    /// The timer is reset whether or not the ledger could be persisted.
    /// Returns `None` when no reset is pending.
    pub fn commit(&mut self, description: Option<&str>) -> Option<Event> {
        let category = self.board.pending_reset()?;
        let duration_seconds = self.board.elapsed_seconds(category);
        let session =
            self.history
                .commit_session_at(category, duration_seconds, description, Utc::now());
        self.finalize_reset(category);
        session.map(|s| Event::SessionCommitted {
            category,
            session_id: s.id(),
            duration_seconds: s.duration_seconds(),
            description: s.description().to_string(),
            at: s.created_at(),
        })
    }

    /// Drop the pending run without recording it, then reset its timer.
    pub fn discard(&mut self) -> Option<Event> {
        let category = self.board.pending_reset()?;
        let elapsed_seconds = self.board.elapsed_seconds(category);
        self.finalize_reset(category);
        tracing::debug!(%category, elapsed_seconds, "session discarded");
        Some(Event::SessionDiscarded {
            category,
            elapsed_seconds,
            at: Utc::now(),
        })
    }

    /// Return `category` to stopped with zero elapsed time. Idempotent.
    pub fn finalize_reset(&mut self, category: Category) -> Event {
        let event = self.board.finalize_reset(category);
        self.sync_ticks();
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Hold a subscription for the running category and nothing else.
    fn sync_ticks(&mut self) {
        let running = self.board.running();
        if self.subscription.as_ref().map(TickSubscription::category) != running {
            self.subscription = running.map(|category| self.clock.subscribe(category));
        }
    }
}
