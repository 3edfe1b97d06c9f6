//! # Focus Flow Core Library
//!
//! Session and history state machine behind the Focus Flow study/coding
//! timer widget. Rendering, dragging and image export live in the host; this
//! crate owns the state they read.
//!
//! ## Architecture
//!
//! - **Timer Board**: two logical 1 Hz counters (Study, Coding), at most one
//!   running, with a three-step reset (freeze, commit or discard, finalize)
//! - **History Engine**: today's sessions and totals plus one day of
//!   back-history, rolled over once at load
//! - **Storage**: a key-value store trait with SQLite and in-memory
//!   implementations, and TOML-based configuration
//! - **Clock**: tick subscriptions that stop when dropped
//!
//! ## Key Components
//!
//! - [`Tracker`]: owned state object wiring the pieces together
//! - [`TimerBoard`]: timer state machine
//! - [`HistoryEngine`]: session commit and persistence
//! - [`KeyValueStore`]: persistence seam

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod history;
pub mod quotes;
pub mod storage;
pub mod timer;
pub mod tracker;

pub use clock::{IntervalClock, ManualClock, Tick, TickSource, TickSubscription};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use history::{
    describe_default, resolve_today_on_load, DailyHistory, HistoryEngine, HistoryLedger, Session,
};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{Category, ResetRequest, TimerBoard, TimerRuntimeState, TimerStatus};
pub use tracker::Tracker;
