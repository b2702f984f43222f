//! Minimum-interval gate for throttled plugin bindings.

use std::sync::{Mutex, PoisonError};

/// Remembers when the last event was accepted.
#[derive(Debug, Default)]
pub struct Throttle {
    last_accepted: Mutex<Option<u64>>,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the event when nothing was accepted yet or at least
    /// `interval_ms` have passed since the last acceptance. Accepting
    /// records `now_ms`.
    pub fn admit(&self, now_ms: u64, interval_ms: u64) -> bool {
        let mut last = self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match *last {
            Some(prev) if now_ms.saturating_sub(prev) < interval_ms => false,
            _ => {
                *last = Some(now_ms);
                true
            }
        }
    }
}
