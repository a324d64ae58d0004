//! Simulated accelerator queue with fault injection.
//!
//! Behaves like a device whose microcode copies staged images into live
//! context memory. Every operation can be failed on demand, either from a
//! scripted [`FaultPlan`] or from a seeded random source.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use itls_core::{
    ContextQueue, ContextRegion, DmaBuffer, FlushMode, HeapBuffer, HwError, HwOp,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::journal::{Event, Journal};

/// Status reported for injected device faults (`-EIO`)
pub const FAULT_STATUS: i32 = -5;

/// Operation a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// `alloc_dma` returns `None`
    Alloc,
    /// `context_write` fails and leaves the live context untouched
    Write,
    /// `context_flush` fails
    Flush,
    /// `context_reload` fails
    Reload,
}

/// Scripted faults, consumed in order per fault point.
///
/// Each entry says whether the next call at that point fails. Calls beyond
/// the script succeed unless random faults are enabled.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    alloc: VecDeque<bool>,
    write: VecDeque<bool>,
    flush: VecDeque<bool>,
    reload: VecDeque<bool>,
}

impl FaultPlan {
    /// No scripted faults
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `skip` calls at `point` succeed, then fail the next one
    pub fn fail_after(mut self, point: FaultPoint, skip: usize) -> Self {
        let script = self.script_mut(point);
        script.extend(std::iter::repeat_n(false, skip));
        script.push_back(true);
        self
    }

    /// Fail the next call at `point`
    pub fn fail_next(self, point: FaultPoint) -> Self {
        self.fail_after(point, 0)
    }

    fn script_mut(&mut self, point: FaultPoint) -> &mut VecDeque<bool> {
        match point {
            FaultPoint::Alloc => &mut self.alloc,
            FaultPoint::Write => &mut self.write,
            FaultPoint::Flush => &mut self.flush,
            FaultPoint::Reload => &mut self.reload,
        }
    }
}

struct QueueState {
    plan: FaultPlan,
    rng: Option<(ChaCha20Rng, f64)>,
    live_buffers: usize,
}

impl QueueState {
    fn should_fail(&mut self, point: FaultPoint) -> bool {
        if let Some(scripted) = self.plan.script_mut(point).pop_front() {
            return scripted;
        }
        match &mut self.rng {
            Some((rng, rate)) => rng.gen_bool(*rate),
            None => false,
        }
    }
}

/// DMA buffer handed out by [`SimQueue`]; tracked until dropped
pub struct SimBuffer {
    inner: HeapBuffer,
    state: Arc<Mutex<QueueState>>,
    journal: Journal,
}

impl DmaBuffer for SimBuffer {
    fn as_bytes(&self) -> &[u8] {
        self.inner.as_bytes()
    }

    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.inner.as_bytes_mut()
    }
}

impl Drop for SimBuffer {
    fn drop(&mut self) {
        let len = self.inner.as_bytes().len();
        lock(&self.state).live_buffers -= 1;
        self.journal.record(Event::Release { len });
    }
}

/// Simulated context queue
#[derive(Clone)]
pub struct SimQueue {
    id: u16,
    state: Arc<Mutex<QueueState>>,
    journal: Journal,
}

impl SimQueue {
    /// Fault-free queue with its own journal
    pub fn new(id: u16) -> Self {
        Self::with_journal(id, Journal::new())
    }

    /// Fault-free queue recording into `journal`
    pub fn with_journal(id: u16, journal: Journal) -> Self {
        let state = QueueState { plan: FaultPlan::new(), rng: None, live_buffers: 0 };
        Self { id, state: Arc::new(Mutex::new(state)), journal }
    }

    /// Replace the scripted faults
    pub fn set_plan(&self, plan: FaultPlan) {
        lock(&self.state).plan = plan;
    }

    /// Fail each unscripted operation with probability `rate`, drawn from a
    /// ChaCha20 stream seeded with `seed`
    pub fn set_random_faults(&self, seed: u64, rate: f64) {
        debug_assert!((0.0..=1.0).contains(&rate));
        lock(&self.state).rng = Some((ChaCha20Rng::seed_from_u64(seed), rate));
    }

    /// Journal this queue records into
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// DMA buffers allocated and not yet dropped
    pub fn live_buffers(&self) -> usize {
        lock(&self.state).live_buffers
    }

    fn fault(&self, point: FaultPoint) -> Option<i32> {
        lock(&self.state).should_fail(point).then_some(FAULT_STATUS)
    }
}

impl ContextQueue for SimQueue {
    type Buffer = SimBuffer;

    fn queue_id(&self) -> u16 {
        self.id
    }

    fn alloc_dma(&self, len: usize) -> Option<SimBuffer> {
        let granted = self.fault(FaultPoint::Alloc).is_none();
        self.journal.record(Event::Alloc { len, granted });
        if !granted {
            return None;
        }

        let inner = HeapBuffer::try_zeroed(len)?;
        lock(&self.state).live_buffers += 1;
        Some(SimBuffer { inner, state: Arc::clone(&self.state), journal: self.journal.clone() })
    }

    fn context_write(
        &self,
        staging: &SimBuffer,
        target: &mut ContextRegion,
        len: usize,
    ) -> Result<(), HwError> {
        let src = staging.as_bytes();
        let staged_header = src.get(..8).map_or(0, |w| {
            let mut word = [0u8; 8];
            word.copy_from_slice(w);
            u64::from_le_bytes(word)
        });
        let live_header = target.header().to_u64();

        let fault = self.fault(FaultPoint::Write);
        self.journal.record(Event::Write { len, staged_header, live_header, fault });
        if let Some(status) = fault {
            return Err(HwError::new(HwOp::ContextWrite, status));
        }

        let len = len.min(src.len()).min(ContextRegion::SIZE);
        target.as_bytes_mut()[..len].copy_from_slice(&src[..len]);
        Ok(())
    }

    fn context_flush(&self, _target: &ContextRegion, mode: FlushMode) -> Result<(), HwError> {
        let fault = self.fault(FaultPoint::Flush);
        self.journal.record(Event::Flush { mode, fault });
        match fault {
            Some(status) => Err(HwError::new(HwOp::ContextFlush, status)),
            None => Ok(()),
        }
    }

    fn context_reload(&self, _target: &ContextRegion) -> Result<(), HwError> {
        let fault = self.fault(FaultPoint::Reload);
        self.journal.record(Event::Reload { fault });
        match fault {
            Some(status) => Err(HwError::new(HwOp::ContextReload, status)),
            None => Ok(()),
        }
    }
}

fn lock(state: &Mutex<QueueState>) -> MutexGuard<'_, QueueState> {
    state.lock().unwrap_or_else(|e| unreachable!("queue state mutex poisoned: {}", e))
}
