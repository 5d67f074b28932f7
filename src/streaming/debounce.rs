use std::time::Duration;
use tokio::time::Instant;

/// Idle-interval scheduler for re-parsing the buffer.
///
/// Every [`touch`](Debouncer::touch) pushes the deadline out to `now + delay`,
/// so a parse only runs once the buffer has been quiet for `delay`.
/// [`flush`](Debouncer::flush) forces the pending run when the stream closes.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// The buffer changed at `now`: cancel any scheduled run and reschedule
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// When the next run is due, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true (once) if the scheduled run is due at `now`
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Returns true if a run was pending, regardless of the deadline
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drop any scheduled run
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
