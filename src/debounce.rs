use std::time::{Duration, Instant};

/// Pending-timer token for coalescing recompute triggers. Scheduling arms
/// (or re-arms) a single deadline; a burst of triggers inside the window
/// collapses into one firing against whatever state is current when the
/// deadline elapses.
///
/// The token is plain data parameterized on `Instant` so coalescing is
/// testable without sleeping; the event loop supplies real time and turns
/// `deadline` into a `recv_timeout` bound.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Arms the deadline `window` past `now`, superseding any outstanding
    /// deadline. Deferred, never lost: only the latest schedule survives.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Consumes the deadline if it has elapsed. Returns whether the caller
    /// should run the debounced action now.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Outstanding deadline, if any; the event loop waits no longer than
    /// this before checking in.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(200);

    #[test]
    fn unarmed_token_never_fires() {
        let mut d = Debouncer::new(WINDOW);
        assert!(!d.is_pending());
        assert!(!d.fire_if_due(Instant::now()));
    }

    #[test]
    fn fires_once_after_the_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule(t0);
        assert!(d.is_pending());
        assert!(!d.fire_if_due(t0 + Duration::from_millis(199)));
        assert!(d.fire_if_due(t0 + WINDOW));
        // Consumed: a second check does not fire again.
        assert!(!d.fire_if_due(t0 + Duration::from_secs(1)));
        assert!(!d.is_pending());
    }

    #[test]
    fn rescheduling_supersedes_the_outstanding_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(150));
        // The original deadline has passed but was superseded.
        assert!(!d.fire_if_due(t0 + Duration::from_millis(200)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(350)));
    }

    #[test]
    fn burst_of_schedules_collapses_to_one_firing() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..10 {
            d.schedule(t0 + Duration::from_millis(i * 10));
        }
        let mut fired = 0;
        for i in 0..1000 {
            if d.fire_if_due(t0 + Duration::from_millis(i)) {
                fired += 1;
            }
        }
        assert_eq!(fired, 1);
    }

    #[test]
    fn cancel_disarms() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.schedule(t0);
        d.cancel();
        assert!(!d.is_pending());
        assert!(!d.fire_if_due(t0 + Duration::from_secs(1)));
        assert_eq!(d.deadline(), None);
    }
}
