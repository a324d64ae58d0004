//! Recording Environment implementation for deterministic testing.

use std::time::Duration;

use itls_core::Environment;

use crate::journal::{Event, Journal};

/// Simulation environment that never blocks.
///
/// Delays and barriers are appended to a [`Journal`] instead of being
/// executed, so tests can assert exactly where they happened relative to
/// hardware operations. Attach it to the same journal as the
/// [`SimQueue`](crate::SimQueue) under test.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    journal: Journal,
}

impl SimEnv {
    /// Environment with its own journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment recording into `journal`
    pub fn with_journal(journal: Journal) -> Self {
        Self { journal }
    }

    /// Journal this environment records into
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Total time requested through `delay`
    pub fn total_delay(&self) -> Duration {
        self.journal
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::Delay(d) => Some(*d),
                _ => None,
            })
            .sum()
    }
}

impl Environment for SimEnv {
    fn delay(&self, duration: Duration) {
        self.journal.record(Event::Delay(duration));
    }

    fn full_barrier(&self) {
        std::sync::atomic::fence(std::sync::atomic::Ordering::SeqCst);
        self.journal.record(Event::Barrier);
    }
}
