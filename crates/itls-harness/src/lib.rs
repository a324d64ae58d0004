//! Deterministic simulation harness for itls session management.
//!
//! Provides a simulated accelerator queue ([`SimQueue`]) and a recording
//! environment ([`SimEnv`]) that plug into `itls_core::SessionManager`.
//! Both write to a shared [`Journal`], and [`oracle`] functions check the
//! recorded sequence against the lifecycle's ordering rules.
//!
//! Faults are injected either from a scripted [`FaultPlan`] or from a
//! seeded ChaCha20 stream, so every failing run can be replayed.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod journal;
pub mod oracle;
pub mod sim_env;
pub mod sim_queue;
pub mod tracing_config;

pub use journal::{Event, Journal};
pub use sim_env::SimEnv;
pub use sim_queue::{FAULT_STATUS, FaultPlan, FaultPoint, SimBuffer, SimQueue};
pub use tracing_config::init_test_tracing;

use itls_core::{AcceleratorConfig, SessionManager};

/// Session manager over a fresh simulated queue and environment sharing
/// one journal
///
/// # Panics
///
/// If `config` is out of range.
pub fn sim_manager(queue_id: u16, config: AcceleratorConfig) -> SessionManager<SimQueue, SimEnv> {
    let journal = Journal::new();
    let queue = SimQueue::with_journal(queue_id, journal.clone());
    let env = SimEnv::with_journal(journal);
    SessionManager::new(queue, env, config).unwrap_or_else(|e| panic!("invalid config: {e}"))
}
