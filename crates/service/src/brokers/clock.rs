use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// DateTime broker: the single source of "now" for temporal validation.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock for tests and doc examples.
///
/// Counts `now()` reads so callers can assert how often a service consulted
/// the clock.
pub struct FixedClock {
    current: RwLock<DateTime<Utc>>,
    reads: AtomicUsize,
}

impl FixedClock {
    pub fn at(current: DateTime<Utc>) -> Self {
        Self { current: RwLock::new(current), reads: AtomicUsize::new(0) }
    }

    pub fn set(&self, current: DateTime<Utc>) {
        *self.current.write().unwrap() = current;
    }

    /// Number of times `now()` has been read.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        *self.current.read().unwrap()
    }
}
