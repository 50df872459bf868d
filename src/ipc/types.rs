use crate::debounce::Debouncer;
use crate::roster::{recompute_ranks, SortOrder, StudentRecord};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Quiet period between a roster mutation and the automatic rank recompute.
pub const RANK_DEBOUNCE_MS: u64 = 200;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub students: Vec<StudentRecord>,
    pub sort_order: SortOrder,
    pub debounce: Debouncer,
    pub recompute_count: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            students: Vec::new(),
            sort_order: SortOrder::Descending,
            debounce: Debouncer::new(Duration::from_millis(RANK_DEBOUNCE_MS)),
            recompute_count: 0,
        }
    }

    /// Called by every roster mutation. Arms (or re-arms) the recompute
    /// deadline when the mutation leaves a non-empty collection; an
    /// already-armed deadline is left to fire on whatever state is current.
    pub fn schedule_recompute(&mut self) {
        if !self.students.is_empty() {
            self.debounce.schedule(Instant::now());
        }
    }

    /// Runs the debounced recompute if its deadline has elapsed. The event
    /// loop calls this on timer expiry and before dispatching each request,
    /// so no request observes a stale overdue roster.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        if !self.debounce.fire_if_due(now) {
            return false;
        }
        self.run_recompute();
        true
    }

    /// Runs a still-pending recompute immediately, deadline or not. Used at
    /// shutdown so scheduled work is superseded or done, never dropped.
    pub fn flush_pending(&mut self) {
        if self.debounce.is_pending() {
            self.debounce.cancel();
            self.run_recompute();
        }
    }

    fn run_recompute(&mut self) {
        self.students = recompute_ranks(std::mem::take(&mut self.students), self.sort_order);
        self.recompute_count += 1;
    }
}
