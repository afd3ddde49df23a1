//! Strictly increasing creation timestamps.

use crate::types::Timestamp;
use chrono::{Duration, Utc};
use parking_lot::Mutex;

/// Hands out `created_at` values that never repeat or go backwards, so
/// sibling order matches insertion order even within one clock tick.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: Mutex<Option<Timestamp>>,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clock seeded with the newest timestamp already persisted.
    pub fn starting_after(last: Option<Timestamp>) -> Self {
        Self {
            last: Mutex::new(last),
        }
    }

    pub fn next(&self) -> Timestamp {
        let mut last = self.last.lock();
        let now = Utc::now();
        let next = match *last {
            Some(prev) if now <= prev => prev + Duration::nanoseconds(1),
            _ => now,
        };
        *last = Some(next);
        next
    }
}
