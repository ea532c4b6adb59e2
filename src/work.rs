//! A delayed work item for a cooperative, single-threaded queue.
//!
//! The host owns the clock and hands `now` in; nothing here sleeps or spawns.

/// Point in time on the millisecond timebase used for scheduling.
pub type Instant = fugit::TimerInstantU64<1000>;

/// Span of time on the millisecond timebase used for scheduling.
pub type Duration = fugit::MillisDurationU64;

/// One slot of work which is either idle or due at a single deadline.
///
/// Queueing while already pending moves the deadline rather than adding a second entry, so a
/// slot can never hold more than one outstanding run.
#[derive(Debug, Default)]
pub struct Work {
    due: Option<Instant>,
}

impl Work {
    pub const fn new() -> Self {
        Self { due: None }
    }

    /// Schedule the work to run `delay` after `now`.
    pub fn queue(&mut self, now: Instant, delay: Duration) {
        self.due = Some(now + delay);
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Deadline of the pending run.
    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Claim the pending run if its deadline has passed.
    ///
    /// Returns `true` at most once per [`Work::queue`].
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
