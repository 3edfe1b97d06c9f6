//! Timer board: the two category timers and the rule that only one runs.
//!
//! The board is a logical 1 Hz counter. It never reads the wall clock for
//! accrual; each `tick()` adds exactly one second. The caller (usually the
//! [`Tracker`](crate::tracker::Tracker)) delivers ticks while a category runs.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped -> Running -> Paused -> Running -> ... -> Stopped
//!               \                                    ^
//!                `-- request_reset (freeze) -- finalize_reset
//! ```
//!
//! Mutual exclusion is structural: a single `running` field names the
//! category that is accruing, so two running timers cannot be represented.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Stopped,
    Running,
    Paused,
}

/// Read-only view of one category's timer for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRuntimeState {
    pub elapsed_seconds: u64,
    pub status: TimerStatus,
}

/// Outcome of [`TimerBoard::request_reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetRequest {
    /// The timer is frozen with time on it; commit or discard must follow.
    AwaitingDecision {
        category: Category,
        elapsed_seconds: u64,
    },
    /// Nothing to record. The board has already finalized the reset.
    Empty { category: Category },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Track {
    elapsed_seconds: u64,
    /// Started at least once since the last reset. Combined with `running`
    /// this distinguishes paused from stopped.
    held: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TimerBoard {
    study: Track,
    coding: Track,
    running: Option<Category>,
    pending_reset: Option<Category>,
}

impl TimerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The category currently accruing time, if any.
    pub fn running(&self) -> Option<Category> {
        self.running
    }

    /// The category frozen by `request_reset` and awaiting a decision.
    pub fn pending_reset(&self) -> Option<Category> {
        self.pending_reset
    }

    pub fn elapsed_seconds(&self, category: Category) -> u64 {
        self.track(category).elapsed_seconds
    }

    pub fn status(&self, category: Category) -> TimerStatus {
        if self.running == Some(category) {
            TimerStatus::Running
        } else if self.track(category).held {
            TimerStatus::Paused
        } else {
            TimerStatus::Stopped
        }
    }

    pub fn runtime(&self, category: Category) -> TimerRuntimeState {
        TimerRuntimeState {
            elapsed_seconds: self.elapsed_seconds(category),
            status: self.status(category),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start or resume `category`.
    ///
    /// Ignored when the other category is running, when `category` already
    /// runs, or while `category` waits on a commit/discard decision.
    pub fn start(&mut self, category: Category) -> Option<Event> {
        if self.running.is_some() || self.pending_reset == Some(category) {
            return None;
        }
        self.running = Some(category);
        let track = self.track_mut(category);
        track.held = true;
        let elapsed_seconds = track.elapsed_seconds;
        tracing::debug!(%category, elapsed_seconds, "timer started");
        Some(Event::TimerStarted {
            category,
            elapsed_seconds,
            at: Utc::now(),
        })
    }

    /// Add one second to `category` if it is the running timer.
    /// Returns the new elapsed value.
    pub fn tick(&mut self, category: Category) -> Option<u64> {
        if self.running != Some(category) {
            return None;
        }
        let track = self.track_mut(category);
        track.elapsed_seconds = track.elapsed_seconds.saturating_add(1);
        Some(track.elapsed_seconds)
    }

    pub fn pause(&mut self, category: Category) -> Option<Event> {
        if self.running != Some(category) {
            return None;
        }
        self.running = None;
        let elapsed_seconds = self.elapsed_seconds(category);
        tracing::debug!(%category, elapsed_seconds, "timer paused");
        Some(Event::TimerPaused {
            category,
            elapsed_seconds,
            at: Utc::now(),
        })
    }

    /// Freeze `category` ahead of a commit/discard decision.
    ///
    /// With zero elapsed seconds there is nothing to decide: the reset is
    /// finalized on the spot and [`ResetRequest::Empty`] is returned.
    pub fn request_reset(&mut self, category: Category) -> ResetRequest {
        if self.running == Some(category) {
            self.running = None;
        }
        let elapsed_seconds = self.elapsed_seconds(category);
        if elapsed_seconds == 0 {
            self.finalize_reset(category);
            return ResetRequest::Empty { category };
        }
        self.pending_reset = Some(category);
        tracing::debug!(%category, elapsed_seconds, "reset requested");
        ResetRequest::AwaitingDecision {
            category,
            elapsed_seconds,
        }
    }

    /// Return `category` to stopped with zero elapsed time. Idempotent.
    pub fn finalize_reset(&mut self, category: Category) -> Event {
        if self.running == Some(category) {
            self.running = None;
        }
        if self.pending_reset == Some(category) {
            self.pending_reset = None;
        }
        *self.track_mut(category) = Track::default();
        tracing::debug!(%category, "timer reset");
        Event::TimerReset {
            category,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn track(&self, category: Category) -> &Track {
        match category {
            Category::Study => &self.study,
            Category::Coding => &self.coding,
        }
    }

    fn track_mut(&mut self, category: Category) -> &mut Track {
        match category {
            Category::Study => &mut self.study,
            Category::Coding => &mut self.coding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn start_pause_resume() {
        let mut board = TimerBoard::new();
        assert_eq!(board.status(Category::Study), TimerStatus::Stopped);

        assert!(board.start(Category::Study).is_some());
        assert_eq!(board.status(Category::Study), TimerStatus::Running);
        board.tick(Category::Study);
        board.tick(Category::Study);

        assert!(board.pause(Category::Study).is_some());
        assert_eq!(board.status(Category::Study), TimerStatus::Paused);
        assert_eq!(board.tick(Category::Study), None);

        assert!(board.start(Category::Study).is_some());
        assert_eq!(board.tick(Category::Study), Some(3));
    }

    #[test]
    fn start_other_while_running_is_ignored() {
        let mut board = TimerBoard::new();
        board.start(Category::Study);
        assert!(board.start(Category::Coding).is_none());
        assert_eq!(board.status(Category::Study), TimerStatus::Running);
        assert_eq!(board.status(Category::Coding), TimerStatus::Stopped);
        assert_eq!(board.tick(Category::Coding), None);
    }

    #[test]
    fn start_other_while_paused_is_allowed() {
        let mut board = TimerBoard::new();
        board.start(Category::Study);
        board.tick(Category::Study);
        board.pause(Category::Study);
        assert!(board.start(Category::Coding).is_some());
        assert_eq!(board.running(), Some(Category::Coding));
        assert_eq!(board.runtime(Category::Study).status, TimerStatus::Paused);
        assert_eq!(board.elapsed_seconds(Category::Study), 1);
    }

    #[test]
    fn start_twice_is_noop() {
        let mut board = TimerBoard::new();
        assert!(board.start(Category::Coding).is_some());
        assert!(board.start(Category::Coding).is_none());
    }

    #[test]
    fn pause_when_not_running_is_noop() {
        let mut board = TimerBoard::new();
        assert!(board.pause(Category::Study).is_none());
        board.start(Category::Coding);
        assert!(board.pause(Category::Study).is_none());
        assert_eq!(board.running(), Some(Category::Coding));
    }

    #[test]
    fn request_reset_freezes_and_waits() {
        let mut board = TimerBoard::new();
        board.start(Category::Study);
        for _ in 0..5 {
            board.tick(Category::Study);
        }
        let request = board.request_reset(Category::Study);
        assert_eq!(
            request,
            ResetRequest::AwaitingDecision {
                category: Category::Study,
                elapsed_seconds: 5
            }
        );
        assert_eq!(board.running(), None);
        assert_eq!(board.pending_reset(), Some(Category::Study));
        assert_eq!(board.elapsed_seconds(Category::Study), 5);
        // no resuming while the decision is open
        assert!(board.start(Category::Study).is_none());
    }

    #[test]
    fn request_reset_with_zero_elapsed_finalizes_immediately() {
        let mut board = TimerBoard::new();
        board.start(Category::Coding);
        let request = board.request_reset(Category::Coding);
        assert_eq!(request, ResetRequest::Empty { category: Category::Coding });
        assert_eq!(board.status(Category::Coding), TimerStatus::Stopped);
        assert_eq!(board.pending_reset(), None);
    }

    #[test]
    fn finalize_reset_is_idempotent() {
        let mut board = TimerBoard::new();
        board.start(Category::Study);
        board.tick(Category::Study);
        board.request_reset(Category::Study);
        board.finalize_reset(Category::Study);
        board.finalize_reset(Category::Study);
        assert_eq!(
            board.runtime(Category::Study),
            TimerRuntimeState {
                elapsed_seconds: 0,
                status: TimerStatus::Stopped
            }
        );
        assert_eq!(board.pending_reset(), None);
        assert!(board.start(Category::Study).is_some());
    }

    #[test]
    fn finalize_reset_leaves_other_category_alone() {
        let mut board = TimerBoard::new();
        board.start(Category::Coding);
        board.tick(Category::Coding);
        board.finalize_reset(Category::Study);
        assert_eq!(board.running(), Some(Category::Coding));
        assert_eq!(board.elapsed_seconds(Category::Coding), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Start(Category),
        Tick(Category),
        Pause(Category),
        RequestReset(Category),
        Finalize(Category),
    }

    fn category() -> impl Strategy<Value = Category> {
        prop_oneof![Just(Category::Study), Just(Category::Coding)]
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            category().prop_map(Op::Start),
            category().prop_map(Op::Tick),
            category().prop_map(Op::Tick),
            category().prop_map(Op::Pause),
            category().prop_map(Op::RequestReset),
            category().prop_map(Op::Finalize),
        ]
    }

    proptest! {
        #[test]
        fn elapsed_moves_by_one_per_tick_and_only_resets_drop_it(ops in prop::collection::vec(op(), 0..200)) {
            let mut board = TimerBoard::new();
            for op in ops {
                let before = [
                    board.elapsed_seconds(Category::Study),
                    board.elapsed_seconds(Category::Coding),
                ];
                let running_before = board.running();
                let mut reset = None;
                match op {
                    Op::Start(c) => { board.start(c); }
                    Op::Tick(c) => {
                        let result = board.tick(c);
                        if running_before == Some(c) {
                            prop_assert_eq!(result, Some(board.elapsed_seconds(c)));
                            prop_assert_eq!(board.elapsed_seconds(c), board_index(before, c) + 1);
                        } else {
                            prop_assert_eq!(result, None);
                        }
                    }
                    Op::Pause(c) => { board.pause(c); }
                    Op::RequestReset(c) => {
                        if let ResetRequest::Empty { .. } = board.request_reset(c) {
                            reset = Some(c);
                        }
                    }
                    Op::Finalize(c) => {
                        board.finalize_reset(c);
                        reset = Some(c);
                    }
                }
                for c in Category::ALL {
                    let now = board.elapsed_seconds(c);
                    if reset == Some(c) {
                        prop_assert_eq!(now, 0);
                    } else {
                        prop_assert!(now >= board_index(before, c));
                    }
                }
                let running: Vec<_> = Category::ALL
                    .iter()
                    .filter(|c| board.status(**c) == TimerStatus::Running)
                    .collect();
                prop_assert!(running.len() <= 1);
            }
        }
    }

    fn board_index(values: [u64; 2], category: Category) -> u64 {
        match category {
            Category::Study => values[0],
            Category::Coding => values[1],
        }
    }
}
