//! Nullable clock: deterministic time for testing.

use std::sync::atomic::{AtomicI64, Ordering};
use witness_types::{Clock, Timestamp};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Shareable across threads, so one
/// clock can drive the factory, the registry and the verifier together.
#[derive(Debug)]
pub struct NullClock {
    micros: AtomicI64,
}

impl NullClock {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            micros: AtomicI64::new(initial.as_unix_micros()),
        }
    }

    /// Clock starting at `secs` seconds after the Unix epoch.
    pub fn at_secs(secs: i64) -> Self {
        Self {
            micros: AtomicI64::new(secs.saturating_mul(1_000_000)),
        }
    }

    /// Advance (or, with a negative value, rewind) by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        self.micros
            .fetch_add(secs.saturating_mul(1_000_000), Ordering::SeqCst);
    }

    /// Set the time to a specific instant.
    pub fn set(&self, at: Timestamp) {
        self.micros.store(at.as_unix_micros(), Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        let micros = self.micros.load(Ordering::SeqCst);
        Timestamp::from_unix_micros(micros).expect("null clock moved outside the representable range")
    }
}
