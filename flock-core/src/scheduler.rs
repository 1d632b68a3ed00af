//! Discrete-event scheduling on a logical clock.
//!
//! Nothing runs on its own: each call to [`EventScheduler::next`] pops the
//! earliest event, moves the clock to its date and executes it. Events that
//! want to keep running schedule a follow-up while executing.

use crate::error::{Error, Result};
use crate::group::GroupHandle;
use crate::presenter::Presenter;
use log::trace;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::rc::Rc;

/// An action fired at a scheduled date.
pub trait Event {
    fn execute(self: Box<Self>, scheduler: &mut EventScheduler);

    fn name(&self) -> &str {
        "event"
    }
}

/// Wraps a closure as an [`Event`].
pub struct FnEvent<F> {
    name: &'static str,
    action: F,
}

impl<F> FnEvent<F>
where
    F: FnOnce(&mut EventScheduler),
{
    pub fn new(name: &'static str, action: F) -> Self {
        Self { name, action }
    }
}

impl<F> Event for FnEvent<F>
where
    F: FnOnce(&mut EventScheduler),
{
    fn execute(self: Box<Self>, scheduler: &mut EventScheduler) {
        let this = *self;
        (this.action)(scheduler)
    }

    fn name(&self) -> &str {
        self.name
    }
}

struct Scheduled {
    date: u64,
    seq: u64,
    event: Box<dyn Event>,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: BinaryHeap is a max-heap, the earliest (date, seq) must pop first.
    fn cmp(&self, other: &Self) -> Ordering {
        (other.date, other.seq).cmp(&(self.date, self.seq))
    }
}

/// Priority queue of pending events ordered by date, then insertion order.
#[derive(Default)]
pub struct EventScheduler {
    current_date: u64,
    next_seq: u64,
    queue: BinaryHeap<Scheduled>,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `event` at `date`. Fails, leaving the queue as it was, if
    /// `date` is before the current date.
    pub fn add_event(&mut self, date: u64, event: Box<dyn Event>) -> Result<()> {
        if date < self.current_date {
            return Err(Error::EventInPast {
                date,
                current: self.current_date,
            });
        }
        self.push(date, event);
        Ok(())
    }

    /// Queues `event` `delay` ticks after the current date.
    pub fn schedule_after(&mut self, delay: u64, event: Box<dyn Event>) {
        let date = self.current_date.saturating_add(delay);
        self.push(date, event);
    }

    /// Runs the earliest pending event. Returns false if there was none.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let Some(Scheduled { date, event, .. }) = self.queue.pop() else {
            return false;
        };
        self.current_date = date;
        trace!("Executing {} at date {}", event.name(), date);
        event.execute(self);
        true
    }

    /// Drops every pending event and rewinds the clock to zero.
    pub fn restart(&mut self) {
        self.queue.clear();
        self.current_date = 0;
        self.next_seq = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn current_date(&self) -> u64 {
        self.current_date
    }

    /// Date of the event `next` would run.
    pub fn peek_date(&self) -> Option<u64> {
        self.queue.peek().map(|scheduled| scheduled.date)
    }

    fn push(&mut self, date: u64, event: Box<dyn Event>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Scheduled { date, seq, event });
    }
}

impl fmt::Debug for EventScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventScheduler")
            .field("current_date", &self.current_date)
            .field("pending", &self.queue.len())
            .finish()
    }
}

/// Steps one group and reschedules itself `delay` ticks later.
///
/// Before stepping, the group adopts the presenter's viewport as its
/// bounds; afterwards the presenter is told a redraw is due.
pub struct AgentGroupUpdateEvent {
    group: GroupHandle,
    presenter: Rc<dyn Presenter>,
    delay: u64,
}

impl AgentGroupUpdateEvent {
    pub fn new(group: GroupHandle, presenter: Rc<dyn Presenter>, delay: u64) -> Result<Self> {
        if delay == 0 {
            return Err(Error::InvalidDelay);
        }
        Ok(Self {
            group,
            presenter,
            delay,
        })
    }

    pub fn delay(&self) -> u64 {
        self.delay
    }
}

impl Event for AgentGroupUpdateEvent {
    fn execute(self: Box<Self>, scheduler: &mut EventScheduler) {
        {
            let mut group = self.group.borrow_mut();
            group.set_bounds(self.presenter.viewport());
            group.step();
        }
        self.presenter.request_redraw();
        let delay = self.delay;
        scheduler.schedule_after(delay, self);
    }

    fn name(&self) -> &str {
        "group update"
    }
}
