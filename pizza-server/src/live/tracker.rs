//! Idempotent status consumer
//!
//! Status events can arrive twice (push plus poll). The tracker keeps
//! the last applied stage per order and accepts an event only when it moves
//! that order forward, or cancels it while still open.
//!
//! Open orders are kept until they finish. Finished orders are remembered
//! in a bounded FIFO so a long-lived dashboard session does not grow
//! without limit; once evicted, a late duplicate of a final event may be
//! delivered again.

use shared::OrderStatusEvent;
use shared::models::Stage;
use std::collections::{HashMap, VecDeque};

/// Finished orders remembered per tracker
pub const DEFAULT_FINISHED_CAPACITY: usize = 1024;

#[derive(Debug)]
pub struct StageTracker {
    applied: HashMap<String, Stage>,
    finished: VecDeque<String>,
    finished_capacity: usize,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::with_finished_capacity(DEFAULT_FINISHED_CAPACITY)
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finished_capacity(finished_capacity: usize) -> Self {
        Self {
            applied: HashMap::new(),
            finished: VecDeque::new(),
            finished_capacity,
        }
    }

    /// Record `event`; returns `true` if it is new for its order
    pub fn apply(&mut self, event: &OrderStatusEvent) -> bool {
        let next = event.current_stage;
        match self.applied.get(&event.order_id) {
            None => {}
            Some(&seen) if seen.is_terminal() => return false,
            Some(_) if next == Stage::Cancelled => {}
            Some(&seen) if next > seen => {}
            Some(_) => return false,
        }
        self.applied.insert(event.order_id.clone(), next);
        if next.is_terminal() {
            self.remember_finished(&event.order_id);
        }
        true
    }

    fn remember_finished(&mut self, order_id: &str) {
        self.finished.push_back(order_id.to_string());
        while self.finished.len() > self.finished_capacity {
            if let Some(evicted) = self.finished.pop_front() {
                self.applied.remove(&evicted);
            }
        }
    }

    pub fn stage_of(&self, order_id: &str) -> Option<Stage> {
        self.applied.get(order_id).copied()
    }

    /// Number of orders currently tracked
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}
