//! Tick sources.
//!
//! A running timer holds exactly one [`TickSubscription`]. Dropping the
//! subscription stops its ticks, so every exit path (pause, reset, teardown)
//! ends accrual just by releasing the value.
//!
//! Each [`Tick`] carries the id of the subscription that produced it. A tick
//! still queued after its subscription was dropped can be recognised and
//! ignored by the receiver.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::timer::Category;

/// One logical second for `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub category: Category,
    pub subscription: u64,
}

/// Live tick stream for one category. Ticks stop when this is dropped.
pub struct TickSubscription {
    id: u64,
    category: Category,
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TickSubscription {
    pub fn new(id: u64, category: Category, cancel: impl FnOnce() + 'static) -> Self {
        Self {
            id,
            category,
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Whether `tick` came from this subscription.
    pub fn owns(&self, tick: &Tick) -> bool {
        tick.subscription == self.id && tick.category == self.category
    }
}

impl Drop for TickSubscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
        tracing::debug!(category = %self.category, id = self.id, "tick subscription released");
    }
}

impl fmt::Debug for TickSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickSubscription")
            .field("id", &self.id)
            .field("category", &self.category)
            .finish()
    }
}

/// Something that can deliver periodic ticks for a category.
pub trait TickSource {
    fn subscribe(&mut self, category: Category) -> TickSubscription;
}

/// Tokio-driven clock. Each subscription spawns a task that sends a [`Tick`]
/// every `period` until the subscription is dropped.
///
/// Must be subscribed from inside a tokio runtime.
pub struct IntervalClock {
    period: Duration,
    sender: mpsc::UnboundedSender<Tick>,
    next_id: u64,
}

impl IntervalClock {
    /// Create the clock and the receiver the host drains into the tracker.
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let clock = Self {
            period,
            sender,
            next_id: 0,
        };
        (clock, receiver)
    }
}

impl TickSource for IntervalClock {
    fn subscribe(&mut self, category: Category) -> TickSubscription {
        self.next_id += 1;
        let id = self.next_id;
        let period = self.period;
        let sender = self.sender.clone();

        let handle = tokio::spawn(async move {
            // first tick one full period after subscribing
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let tick = Tick {
                    category,
                    subscription: id,
                };
                if sender.send(tick).is_err() {
                    break;
                }
            }
        });

        TickSubscription::new(id, category, move || handle.abort())
    }
}

#[derive(Debug, Default)]
struct ManualState {
    next_id: u64,
    live: Vec<(u64, Category)>,
}

/// Host-driven clock: ticks are produced on demand with [`ManualClock::fire`].
///
/// Clones share state, so a host can hand one clone to the tracker and keep
/// another to drive it (a UI frame timer, a test).
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Rc<RefCell<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tick for the most recent live subscription, if any.
    pub fn fire(&self) -> Option<Tick> {
        let state = self.state.borrow();
        state.live.last().map(|&(id, category)| Tick {
            category,
            subscription: id,
        })
    }

    /// Number of subscriptions not yet dropped.
    pub fn live_subscriptions(&self) -> usize {
        self.state.borrow().live.len()
    }
}

impl TickSource for ManualClock {
    fn subscribe(&mut self, category: Category) -> TickSubscription {
        let id = {
            let mut state = self.state.borrow_mut();
            state.next_id += 1;
            let id = state.next_id;
            state.live.push((id, category));
            id
        };
        let state = Rc::clone(&self.state);
        TickSubscription::new(id, category, move || {
            state.borrow_mut().live.retain(|&(live, _)| live != id);
        })
    }
}
