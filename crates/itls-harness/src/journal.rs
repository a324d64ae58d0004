//! Ordered record of everything the simulated device and environment saw.
//!
//! [`SimQueue`](crate::SimQueue) and [`SimEnv`](crate::SimEnv) share one
//! [`Journal`], so barriers and delays interleave with hardware operations
//! in the order they happened.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use itls_core::FlushMode;

/// One observable operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// DMA allocation request
    Alloc {
        /// Requested bytes
        len: usize,
        /// False if the allocation was refused
        granted: bool,
    },
    /// DMA buffer dropped
    Release {
        /// Buffer size
        len: usize,
    },
    /// `Environment::full_barrier`
    Barrier,
    /// `Environment::delay`
    Delay(Duration),
    /// `context_write`
    Write {
        /// Bytes requested
        len: usize,
        /// Header word of the staged image
        staged_header: u64,
        /// Header word already in the live context when the write arrived
        live_header: u64,
        /// Device status, `None` on success
        fault: Option<i32>,
    },
    /// `context_flush`
    Flush {
        /// Requested mode
        mode: FlushMode,
        /// Device status, `None` on success
        fault: Option<i32>,
    },
    /// `context_reload`
    Reload {
        /// Device status, `None` on success
        fault: Option<i32>,
    },
}

/// Shared, clonable event log
#[derive(Debug, Clone, Default)]
pub struct Journal {
    events: Arc<Mutex<Vec<Event>>>,
}

impl Journal {
    /// Empty journal
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event`
    pub fn record(&self, event: Event) {
        self.lock().push(event);
    }

    /// Copy of every event so far
    pub fn events(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Remove and return every event so far
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        self.events.lock().unwrap_or_else(|e| {
            // Only a panicking test thread can poison the lock.
            unreachable!("journal mutex poisoned: {}", e)
        })
    }
}
