//! Tick sources for edit timestamps.
//!
//! [`SystemClock`] reads wall time and never goes backwards, so edits from
//! one source stay ordered even across small clock adjustments.
//! [`ManualClock`] is driven explicitly and is what tests use.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::constants::TICKS_PER_SECOND;
use crate::types::Tick;

/// Source of edit timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> Tick;
}

/// Wall clock in 100 ns ticks since the Unix epoch, strictly increasing.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicU64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a wall-clock instant to ticks. Instants before the epoch map to 0.
    pub fn tick_at(time: SystemTime) -> Tick {
        let since_epoch = time.duration_since(UNIX_EPOCH).unwrap_or_default();
        let ticks = since_epoch.as_secs() * TICKS_PER_SECOND
            + u64::from(since_epoch.subsec_nanos()) / 100;
        Tick(ticks)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Tick {
        let wall = Self::tick_at(SystemTime::now()).0;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let next = wall.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, next, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return Tick(next),
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, tick: u64) {
        self.now.store(tick, Ordering::SeqCst);
    }

    pub fn advance(&self, ticks: u64) {
        self.now.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        Tick(self.now.load(Ordering::SeqCst))
    }
}
