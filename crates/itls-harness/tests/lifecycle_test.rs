//! Session lifecycle against the simulated queue.
//!
//! Create, update and destroy across every version and direction, checking
//! the live context, record options and instruction template the caller
//! gets back, and the journal oracles after each run.

mod common;

use insta::assert_snapshot;
use itls_core::{
    AcceleratorConfig, AuthAlgo, CipherAlgo, DestroyOutcome, Direction, IvParams, Session,
    SessionError, SessionParams, SessionState, TlsVersion, UnsupportedFeature,
};
use itls_harness::{Event, init_test_tracing, oracle, sim_manager};
use itls_proto::{MajorOp, WriteSa};

#[test]
fn create_and_destroy_every_version_and_direction() {
    init_test_tracing();
    let mgr = sim_manager(7, AcceleratorConfig::default());

    for version in [TlsVersion::Tls12, TlsVersion::Dtls12, TlsVersion::Tls13] {
        for direction in [Direction::Read, Direction::Write] {
            let mut session = Session::new();
            let params = SessionParams::new(version, direction);
            mgr.create(&mut session, &params, &common::gcm(direction, 16)).unwrap();

            assert_eq!(session.state(), SessionState::Active);
            assert_eq!(session.queue_id(), Some(7));
            assert_eq!(session.direction(), Some(direction));
            assert!(session.context().header().ctx_size() > 0);

            let inst = session.instruction_template();
            let op = MajorOp::for_record(version.hw(), direction == Direction::Write);
            assert_eq!(inst.w4.opcode_major(), op.inplace());
            assert_eq!(inst.w7.cptr(), session.context().address());
            assert!(inst.w7.ctx_val());
            assert_eq!(inst.w7.engine_group(), 0);

            assert_eq!(mgr.destroy(session), DestroyOutcome::Invalidated);
        }
    }

    assert_eq!(mgr.queue().live_buffers(), 0);
    oracle::standard()(&mgr.queue().journal().events()).unwrap();
}

#[test]
fn instruction_words() {
    let config = AcceleratorConfig { engine_group: 5, ..Default::default() };
    let mgr = sim_manager(0, config);
    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    mgr.create(&mut session, &params, &common::gcm(Direction::Write, 32)).unwrap();

    let inst = session.instruction_template();
    assert_snapshot!(format!("{:#018x}", inst.w4.to_u64()), @"0x5600000000000000");
    assert_eq!(inst.w7.engine_group(), 5);
    assert_eq!(inst.w7.to_u64() >> 60, 0b1011);
}

#[test]
fn read_record_options() {
    let mgr = sim_manager(0, AcceleratorConfig::default());

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Read);
    let chain =
        common::cbc_hmac(Direction::Read, CipherAlgo::AesCbc, 16, AuthAlgo::Sha256Hmac, 32);
    mgr.create(&mut session, &params, &chain).unwrap();

    let opts = session.record_opts().unwrap();
    assert_eq!(opts.mac_len, 32);
    assert_eq!(opts.tail_fetch_len, 2);
    assert_eq!(opts.iv, Some(IvParams { offset: 8, length: 16 }));
    assert_eq!(opts.max_expansion, 0);

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Dtls12, Direction::Read);
    mgr.create(&mut session, &params, &common::hmac_only(Direction::Read, AuthAlgo::Md5Hmac, 16))
        .unwrap();

    let opts = session.record_opts().unwrap();
    assert_eq!(opts.mac_len, 16);
    assert_eq!(opts.tail_fetch_len, 0);
    assert_eq!(opts.iv, None);
}

#[test]
fn write_record_options() {
    let mgr = sim_manager(0, AcceleratorConfig::default());

    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Dtls12, Direction::Write);
    let chain =
        common::cbc_hmac(Direction::Write, CipherAlgo::TripleDesCbc, 24, AuthAlgo::Sha1Hmac, 20);
    mgr.create(&mut session, &params, &chain).unwrap();

    let opts = session.record_opts().unwrap();
    assert_eq!(opts.pad_shift, 3);
    assert_eq!(opts.max_expansion, 13 + 8 + 20 + 8);
    assert_eq!(opts.mac_len, 0);

    let mut session = Session::new();
    let mut params = SessionParams::new(TlsVersion::Tls13, Direction::Write);
    params.padding_enabled = true;
    mgr.create(&mut session, &params, &common::chacha(Direction::Write)).unwrap();

    let opts = session.record_opts().unwrap();
    assert_eq!(opts.pad_shift, 0);
    assert!(opts.padding_enabled);
    assert_eq!(opts.max_expansion, 5 + 16 + 16);
}

#[test]
fn update_rekeys_write_session_in_place() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let mut session = Session::new();
    let mut params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    params.seq_no = 1;
    mgr.create(&mut session, &params, &common::gcm(Direction::Write, 16)).unwrap();
    let inst = session.instruction_template();

    let seq =
        |s: &Session| WriteSa::from_bytes(s.context().as_bytes()).unwrap().seq_num().unwrap();
    assert_eq!(seq(&session), 0);

    params.seq_no = 1000;
    let chain =
        common::cbc_hmac(Direction::Write, CipherAlgo::AesCbc, 32, AuthAlgo::Sha384Hmac, 48);
    mgr.update(&mut session, &params, &chain).unwrap();

    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.instruction_template(), inst);
    assert_eq!(seq(&session), 999);
    assert_eq!(session.record_opts().unwrap().max_expansion, 5 + 16 + 32 + 16);

    assert_eq!(mgr.destroy(session), DestroyOutcome::Invalidated);
    oracle::standard()(&mgr.queue().journal().events()).unwrap();
}

#[test]
fn update_read_session_touches_nothing() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let mut session = Session::new();
    let params = SessionParams::new(TlsVersion::Tls13, Direction::Read);
    mgr.create(&mut session, &params, &common::gcm(Direction::Read, 32)).unwrap();

    let before = session.context().as_bytes().to_vec();
    mgr.queue().journal().drain();

    let write = SessionParams::new(TlsVersion::Tls13, Direction::Write);
    let err = mgr.update(&mut session, &write, &common::gcm(Direction::Write, 32)).unwrap_err();

    assert_eq!(err, SessionError::Unsupported(UnsupportedFeature::ReadSessionUpdate));
    assert!(err.is_caller_error());
    assert_eq!(session.context().as_bytes(), &before[..]);
    assert_eq!(session.state(), SessionState::Active);
    assert!(mgr.queue().journal().events().is_empty());
}

#[test]
fn lifecycle_misuse() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
    let chain = common::gcm(Direction::Write, 16);

    let mut session = Session::new();
    assert_eq!(
        mgr.update(&mut session, &params, &chain),
        Err(SessionError::InvalidState { state: SessionState::Uninitialized, operation: "update" })
    );

    mgr.create(&mut session, &params, &chain).unwrap();
    assert_eq!(
        mgr.create(&mut session, &params, &chain),
        Err(SessionError::InvalidState { state: SessionState::Active, operation: "create" })
    );

    // Never-installed sessions are freed without touching the device
    mgr.queue().journal().drain();
    assert_eq!(mgr.destroy(Session::new()), DestroyOutcome::Invalidated);
    assert!(mgr.queue().journal().events().is_empty());
}

#[test]
fn invalid_parameters_leave_context_untouched() {
    let mgr = sim_manager(0, AcceleratorConfig::default());
    let mut session = Session::new();

    let mut params = SessionParams::new(TlsVersion::Dtls12, Direction::Read);
    params.anti_replay_window = 100;
    let err = mgr.create(&mut session, &params, &common::gcm(Direction::Read, 16)).unwrap_err();
    assert_eq!(err, SessionError::Unsupported(UnsupportedFeature::AntiReplayWindow(100)));

    let params = SessionParams::new(TlsVersion::Tls13, Direction::Write);
    let chain = common::hmac_only(Direction::Write, AuthAlgo::Sha256Hmac, 32);
    assert!(matches!(
        mgr.create(&mut session, &params, &chain),
        Err(SessionError::InvalidConfig(_))
    ));

    assert_eq!(session.state(), SessionState::Uninitialized);
    assert!(session.context().is_zeroed());
    let events = mgr.queue().journal().events();
    assert!(events.iter().all(|e| matches!(e, Event::Alloc { .. } | Event::Release { .. })));
}
