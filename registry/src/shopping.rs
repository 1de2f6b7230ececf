//! Witness-shopping detection.
//!
//! An entity that keeps asking new witnesses about the same event until one
//! says what it wants is shopping for an attestation. The tracker counts
//! attempts per `(entity, event_hash)` and refuses once a limit is reached.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct AttemptTracker {
    attempts: Mutex<HashMap<(String, String), usize>>,
}

impl AttemptTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an attempt unless `max_attempts` has already been reached.
    ///
    /// Returns `Ok(count)` with the new attempt count, or `Err(count)` with the
    /// existing count when the limit is hit. Check and record happen under one
    /// lock.
    pub fn try_record(
        &self,
        entity: &str,
        event_hash: &str,
        max_attempts: usize,
    ) -> Result<usize, usize> {
        let mut attempts = self.attempts.lock().expect("attempt tracker lock poisoned");
        let count = attempts
            .entry((entity.to_string(), event_hash.to_string()))
            .or_default();
        if *count >= max_attempts {
            return Err(*count);
        }
        *count += 1;
        Ok(*count)
    }

    /// Number of attempts recorded for `(entity, event_hash)`.
    pub fn count(&self, entity: &str, event_hash: &str) -> usize {
        self.attempts
            .lock()
            .expect("attempt tracker lock poisoned")
            .get(&(entity.to_string(), event_hash.to_string()))
            .copied()
            .unwrap_or(0)
    }
}
