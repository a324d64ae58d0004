//! Environment abstraction for side effects outside the accelerator.
//!
//! Session logic never sleeps or issues memory fences directly. Both go
//! through [`Environment`] so a simulation can record them and assert on
//! their order relative to hardware operations.
//!
//! # Implementations
//!
//! 1. [`SystemEnv`]: real `thread::sleep` and a sequentially consistent
//!    fence
//! 2. `SimEnv` (itls-harness): records every call, never blocks

use std::{
    sync::atomic::{Ordering, fence},
    time::Duration,
};

/// Side effects required by the session lifecycle.
///
/// # Invariants
///
/// - `full_barrier` orders every prior memory access (including the header
///   pre-write of a live context) before every later one, as seen by a DMA
///   reader
/// - `delay` returns only after at least `duration` has elapsed in the
///   environment's notion of time
pub trait Environment {
    /// Block the calling thread for `duration`.
    fn delay(&self, duration: Duration);

    /// Full memory barrier between CPU stores and device DMA reads.
    fn full_barrier(&self) {
        fence(Ordering::SeqCst);
    }
}

/// Production environment backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn system_delay_blocks() {
        let start = Instant::now();
        SystemEnv.delay(Duration::from_millis(2));
        assert!(start.elapsed() >= Duration::from_millis(2));
    }
}
