//! Fault injection tests for the session lifecycle.
//!
//! Every device operation can fail. These tests check that:
//! - create/update failures leave the session in the state it started in
//! - staging and scratch buffers are released on every path
//! - destroy always completes and always stages the disabled header
//! - seeded random faults replay identically

mod common;

use itls_core::{
    AcceleratorConfig, DestroyFailure, DestroyOutcome, Direction, FlushMode, HwError, HwOp,
    Session, SessionError, SessionManager, SessionParams, SessionState, TlsVersion,
};
use itls_harness::{
    Event, FAULT_STATUS, FaultPlan, FaultPoint, SimEnv, SimQueue, init_test_tracing, oracle,
    sim_manager,
};
use proptest::prelude::*;

const DISABLED_HEADER: u64 = 0x151A_0000_0000_3400;
const TLS12_WRITE_HEADER: u64 = 0x151A_0000_0000_3400;

fn active_write(mgr: &SessionManager<SimQueue, SimEnv>) -> Session {
    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    mgr.create(&mut session, &params, &common::gcm(Direction::Write, 16)).unwrap();
    mgr.queue().journal().drain();
    session
}

#[test]
fn staging_exhausted() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Alloc));

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    let err = mgr.create(&mut session, &params, &common::gcm(Direction::Write, 16)).unwrap_err();

    assert_eq!(err, SessionError::ResourceExhausted { len: 224 });
    assert!(!err.is_caller_error());
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert_eq!(mgr.queue().journal().events(), [Event::Alloc { len: 224, granted: false }]);
}

#[test]
fn create_write_fault() {
    init_test_tracing();
    let mgr = sim_manager(0, AcceleratorConfig::default());
    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Write));

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Read);
    let err = mgr.create(&mut session, &params, &common::gcm(Direction::Read, 16)).unwrap_err();

    assert_eq!(err, SessionError::HardwareFault(HwError::new(HwOp::ContextWrite, FAULT_STATUS)));
    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(session.record_opts().is_none());
    assert!(session.context().is_zeroed());
    assert_eq!(mgr.queue().live_buffers(), 0);
    oracle::standard()(&mgr.queue().journal().events()).unwrap();

    // The same session can be installed once the device recovers
    mgr.create(&mut session, &params, &common::gcm(Direction::Read, 16)).unwrap();
    assert_eq!(session.state(), SessionState::Active);
}

#[test]
fn create_flush_fault() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Flush));

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls13, Direction::Write);
    let err = mgr.create(&mut session, &params, &common::chacha(Direction::Write)).unwrap_err();

    assert_eq!(err, SessionError::HardwareFault(HwError::new(HwOp::ContextFlush, FAULT_STATUS)));
    assert_eq!(session.state(), SessionState::Uninitialized);

    let events = mgr.queue().journal().events();
    assert_eq!(
        events.last(),
        Some(&Event::Release { len: 224 }),
        "staging released after the failed flush"
    );
    assert_eq!(
        events[events.len() - 2],
        Event::Flush { mode: FlushMode::Writeback, fault: Some(FAULT_STATUS) }
    );
    oracle::standard()(&events).unwrap();
}

#[test]
fn update_fault_keeps_previous_install() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let mut session = active_write(&mgr);
    let opts = *session.record_opts().unwrap();
    let inst = session.instruction_template();

    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Write));
    let mut params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    params.seq_no = 77;
    let err = mgr.update(&mut session, &params, &common::gcm(Direction::Write, 32)).unwrap_err();

    assert!(matches!(err, SessionError::HardwareFault(_)));
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.record_opts(), Some(&opts));
    assert_eq!(session.instruction_template(), inst);
    assert_eq!(mgr.queue().live_buffers(), 0);

    // Primed header only; the old keys are gone
    assert_eq!(session.context().header().to_u64(), TLS12_WRITE_HEADER);
    assert!(session.context().as_bytes()[8..].iter().all(|b| *b == 0));
    assert_eq!(mgr.destroy(session), DestroyOutcome::Invalidated);
}

#[test]
fn destroy_write_fault_recovers() {
    init_test_tracing();
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let session = active_write(&mgr);

    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Write));
    let outcome = mgr.destroy(session);

    assert_eq!(
        outcome,
        DestroyOutcome::Recovered {
            reason: DestroyFailure::Write(HwError::new(HwOp::ContextWrite, FAULT_STATUS)),
            reload: Ok(()),
        }
    );
    assert_eq!(
        mgr.queue().journal().events(),
        [
            Event::Flush { mode: FlushMode::Writeback, fault: None },
            Event::Alloc { len: 224, granted: true },
            Event::Write {
                len: 224,
                staged_header: DISABLED_HEADER,
                live_header: TLS12_WRITE_HEADER,
                fault: Some(FAULT_STATUS),
            },
            Event::Release { len: 224 },
            Event::Delay(std::time::Duration::from_millis(1)),
            Event::Barrier,
            Event::Reload { fault: None },
        ]
    );
}

#[test]
fn destroy_scratch_exhausted_and_reload_fault() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Dtls12, Direction::Read);
    mgr.create(&mut session, &params, &common::gcm(Direction::Read, 16)).unwrap();

    mgr.queue().set_plan(
        FaultPlan::new().fail_next(FaultPoint::Alloc).fail_next(FaultPoint::Reload),
    );
    let outcome = mgr.destroy(session);

    assert_eq!(
        outcome,
        DestroyOutcome::Recovered {
            reason: DestroyFailure::ScratchExhausted { len: 768 },
            reload: Err(HwError::new(HwOp::ContextReload, FAULT_STATUS)),
        }
    );
    assert_eq!(mgr.queue().live_buffers(), 0);
}

#[test]
fn destroy_ignores_flush_fault() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let session = active_write(&mgr);

    mgr.queue().set_plan(FaultPlan::new().fail_next(FaultPoint::Flush));
    assert_eq!(mgr.destroy(session), DestroyOutcome::Invalidated);
    oracle::teardown_headers()(&mgr.queue().journal().events()).unwrap();
}

/// Drive `sessions` full lifecycles with random faults and return the journal
fn random_run(seed: u64, rate: f64, sessions: usize) -> Vec<Event> {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    mgr.queue().set_random_faults(seed, rate);

    for i in 0..sessions {
        let direction = if i % 2 == 0 { Direction::Write } else { Direction::Read };
        let mut session = Session::new();
        let mut params = SessionParams::new(TlsVersion::Tls12, direction);
        let _ = mgr.create(&mut session, &params, &common::gcm(direction, 16));
        if direction == Direction::Write {
            params.seq_no = i as u64;
            let _ = mgr.update(&mut session, &params, &common::gcm(direction, 32));
        }
        let _ = mgr.destroy(session);
    }
    mgr.queue().journal().events()
}

#[test]
fn random_faults_replay() {
    let first = random_run(42, 0.3, 20);
    assert_eq!(first, random_run(42, 0.3, 20));
    assert!(first.iter().any(|e| matches!(
        e,
        Event::Alloc { granted: false, .. }
            | Event::Write { fault: Some(_), .. }
            | Event::Flush { fault: Some(_), .. }
    )));
    oracle::standard()(&first).unwrap();
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_faults_keep_lifecycle_consistent(
        seed in any::<u64>(),
        rate in 0.0f64..0.6,
        updates in 0usize..4,
        direction in prop::sample::select(vec![Direction::Read, Direction::Write]),
        version in prop::sample::select(vec![TlsVersion::Tls12, TlsVersion::Dtls12, TlsVersion::Tls13]),
    ) {
        let mgr = sim_manager(0, AcceleratorConfig::default());
        mgr.queue().set_random_faults(seed, rate);

        let mut session = Session::new();
        let mut params = SessionParams::new(version, direction);
        match mgr.create(&mut session, &params, &common::gcm(direction, 16)) {
            Ok(()) => prop_assert_eq!(session.state(), SessionState::Active),
            Err(e) => {
                prop_assert!(!e.is_caller_error());
                prop_assert_eq!(session.state(), SessionState::Uninitialized);
                prop_assert!(session.context().is_zeroed());
            },
        }
        prop_assert_eq!(mgr.queue().live_buffers(), 0);

        let installed = session.state() == SessionState::Active;
        for n in 0..updates {
            params.seq_no = n as u64 + 1;
            let result = mgr.update(&mut session, &params, &common::gcm(direction, 16));
            let expected =
                if installed { SessionState::Active } else { SessionState::Uninitialized };
            prop_assert_eq!(session.state(), expected);
            if direction == Direction::Read && installed {
                prop_assert!(result.is_err());
            }
            prop_assert_eq!(mgr.queue().live_buffers(), 0);
        }

        let _ = mgr.destroy(session);
        prop_assert_eq!(mgr.queue().live_buffers(), 0);
        prop_assert_eq!(oracle::standard()(&mgr.queue().journal().events()), Ok(()));
    }
}
