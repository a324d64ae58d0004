//! Session lifecycle: install, re-key and tear down SAs on the accelerator.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────────┐ create ┌────────┐ fence ┌──────────────────────┐ flush ok ┌────────┐
//! │ Uninitialized │───────>│ Staged │──────>│ HardwareWritePending │─────────>│ Active │
//! └───────────────┘        └────────┘       └──────────────────────┘          └────────┘
//!                               ^                                                │  │
//!                               └──────────────── update (write only) ───────────┘  │
//!                                                                                   │ destroy
//! ┌───────┐        ┌───────────────────────────┐        ┌───────────────┐           │
//! │ Freed │<───────│ HardwareInvalidatePending │<───────│ DestroyStaged │<──────────┘
//! └───────┘        └───────────────────────────┘        └───────────────┘
//! ```
//!
//! Any failure during create or update puts the session back in the state it
//! started from; the previous metadata and instruction template stay in
//! place.
//!
//! # Ordering
//!
//! The accelerator may read the live context at any time, so installation
//! follows a fixed order:
//!
//! 1. Zero the live context and write only the header word
//! 2. `full_barrier`
//! 3. `context_write` of the full staged image
//! 4. `context_flush` (invalidate for read, writeback for write)
//! 5. `full_barrier`

use itls_proto::{
    HwCipher, HwMac, InstWord4, InstWord7, InstructionTemplate, MajorOp, ReadSa, SaWord0, SaWord2,
    WriteSa,
};

use crate::{
    builder::{build_disabled_read, build_disabled_write, build_read_into, build_write_into},
    config::AcceleratorConfig,
    env::Environment,
    error::{ConfigError, HwError, Result, SessionError, UnsupportedFeature},
    queue::{ContextQueue, ContextRegion, DmaBuffer, FlushMode},
    rlen::max_expansion,
    validator::validate,
    xform::{Direction, IvParams, SessionParams, TlsVersion, TransformChain},
};

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No SA installed
    Uninitialized,
    /// SA image built in a staging buffer
    Staged,
    /// Header primed, bulk write and flush in flight
    HardwareWritePending,
    /// SA installed and usable by the datapath
    Active,
    /// Teardown started, cached context flushed
    DestroyStaged,
    /// Disabled SA being written over the live context
    HardwareInvalidatePending,
    /// Live context wiped
    Freed,
}

/// Per-record options the datapath needs alongside the instruction template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOpts {
    /// Record version
    pub version: TlsVersion,
    /// Read or write
    pub direction: Direction,
    /// MAC bytes stripped per record (read, non-AEAD)
    pub mac_len: u8,
    /// IV placement in the crypto operation, if the chain carries one
    pub iv: Option<IvParams>,
    /// Trailing cipher blocks fetched to recover padding (read)
    pub tail_fetch_len: u8,
    /// log2 of the padding block size (write)
    pub pad_shift: u8,
    /// Extra record padding enabled
    pub padding_enabled: bool,
    /// Worst-case bytes added per record (write)
    pub max_expansion: usize,
}

impl RecordOpts {
    fn derive(params: &SessionParams, chain: &TransformChain<'_>, w2: SaWord2) -> Self {
        let tls12_layout = params.version.hw().uses_tls12_layout();
        let (mac_len, tail_fetch_len, pad_shift, max_expansion) = match params.direction {
            Direction::Read => {
                let mac_len = match w2.mac() {
                    Some(HwMac::Md5) => 16,
                    Some(HwMac::Sha1) => 20,
                    Some(HwMac::Sha2_256) => 32,
                    Some(HwMac::Sha2_384) => 48,
                    _ => 0,
                };
                let tail = match w2.cipher() {
                    Some(HwCipher::TripleDes) if tls12_layout => 1,
                    Some(HwCipher::AesCbc) if tls12_layout => 2,
                    _ => 0,
                };
                (mac_len, tail, 0, 0)
            },
            Direction::Write => {
                let shift = match w2.cipher() {
                    _ if !tls12_layout => 0,
                    Some(HwCipher::TripleDes) => 3,
                    _ => 4,
                };
                (0, 0, shift, max_expansion(params.version, chain))
            },
        };

        Self {
            version: params.version,
            direction: params.direction,
            mac_len,
            iv: chain.iv(),
            tail_fetch_len,
            pad_shift,
            padding_enabled: params.padding_enabled,
            max_expansion,
        }
    }
}

/// One direction of an offloaded record connection.
///
/// Owns its live context region; the region's address never changes for
/// the life of the session, so instruction templates stay valid across
/// updates.
pub struct Session {
    state: SessionState,
    ctx: Box<ContextRegion>,
    opts: Option<RecordOpts>,
    inst: InstructionTemplate,
    queue_id: Option<u16>,
}

impl Session {
    /// Fresh session with a zeroed live context
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SessionState::Uninitialized,
            ctx: ContextRegion::new(),
            opts: None,
            inst: InstructionTemplate::default(),
            queue_id: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Record options of the installed SA
    #[must_use]
    pub fn record_opts(&self) -> Option<&RecordOpts> {
        self.opts.as_ref()
    }

    /// Direction of the installed SA
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        self.opts.map(|o| o.direction)
    }

    /// Instruction words 4 and 7 for records on this session
    #[must_use]
    pub fn instruction_template(&self) -> InstructionTemplate {
        self.inst
    }

    /// Queue the SA was installed through
    #[must_use]
    pub fn queue_id(&self) -> Option<u16> {
        self.queue_id
    }

    /// Live context memory
    #[must_use]
    pub fn context(&self) -> &ContextRegion {
        &self.ctx
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("ctx_addr", &format_args!("{:#x}", self.ctx.address()))
            .field("opts", &self.opts)
            .field("inst", &self.inst)
            .field("queue_id", &self.queue_id)
            .finish()
    }
}

/// Why destroy could not overwrite the live context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyFailure {
    /// Scratch buffer for the disabled SA could not be allocated
    ScratchExhausted {
        /// Requested size in bytes
        len: usize,
    },
    /// Accelerator rejected the disabled SA
    Write(HwError),
}

impl std::fmt::Display for DestroyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ScratchExhausted { len } => write!(f, "could not allocate {len}-byte scratch"),
            Self::Write(e) => write!(f, "{e}"),
        }
    }
}

/// Result of tearing down a session. Destroy never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    /// Disabled SA written over the live context
    Invalidated,
    /// Disabled SA could not be written; the device was asked to reload the
    /// context instead
    Recovered {
        /// What went wrong
        reason: DestroyFailure,
        /// Result of the forced reload
        reload: std::result::Result<(), HwError>,
    },
}

/// Installs and tears down sessions on one accelerator queue.
pub struct SessionManager<Q, E> {
    queue: Q,
    env: E,
    config: AcceleratorConfig,
}

impl<Q: ContextQueue, E: Environment> SessionManager<Q, E> {
    /// Manager for `queue`.
    ///
    /// # Errors
    ///
    /// `ConfigError` if `config` is out of range.
    pub fn new(
        queue: Q,
        env: E,
        config: AcceleratorConfig,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { queue, env, config })
    }

    /// Underlying queue
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    /// Environment used for barriers and delays
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Active configuration
    pub fn config(&self) -> &AcceleratorConfig {
        &self.config
    }

    /// Install an SA for `params` on an uninitialized session.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the session is not `Uninitialized`
    /// - `InvalidConfig` / `Unsupported` for rejected parameters, before any
    ///   memory is touched
    /// - `ResourceExhausted` if no staging buffer is available
    /// - `HardwareFault` if the device rejected the write or flush
    pub fn create(
        &self,
        session: &mut Session,
        params: &SessionParams,
        chain: &TransformChain<'_>,
    ) -> Result<()> {
        if session.state != SessionState::Uninitialized {
            return Err(SessionError::InvalidState { state: session.state, operation: "create" });
        }

        let result = self.install(session, params, chain);
        if result.is_err() {
            // Nothing usable was installed; drop any partial image.
            session.ctx.clear();
        }
        result
    }

    /// Re-key an active write session in place.
    ///
    /// The live context keeps its address, so the instruction template's
    /// context pointer is unchanged.
    ///
    /// # Errors
    ///
    /// - `Unsupported` for a read session, before anything is touched
    /// - `InvalidState` if the session is not `Active`
    /// - `InvalidConfig` if `params` is not for the write direction
    /// - otherwise as [`SessionManager::create`]
    ///
    /// A `HardwareFault` from the write or flush leaves the session `Active`
    /// with its previous record options and template, but the live context
    /// has already been primed for the new SA: it holds only the new header
    /// word and no key material. Treat the session as unusable and destroy
    /// it.
    pub fn update(
        &self,
        session: &mut Session,
        params: &SessionParams,
        chain: &TransformChain<'_>,
    ) -> Result<()> {
        if session.direction() == Some(Direction::Read) {
            return Err(UnsupportedFeature::ReadSessionUpdate.into());
        }
        if session.state != SessionState::Active {
            return Err(SessionError::InvalidState { state: session.state, operation: "update" });
        }
        if params.direction != Direction::Write {
            return Err(ConfigError::UpdateDirection(params.direction).into());
        }

        self.install(session, params, chain)
    }

    /// Tear down `session`, overwriting its live context with a disabled SA.
    ///
    /// Always completes: if the disabled SA cannot be written the device is
    /// asked to reload the context, and the outcome reports what happened.
    /// The live context is wiped before the session is dropped.
    pub fn destroy(&self, session: Session) -> DestroyOutcome {
        let mut session = session;
        self.teardown(&mut session)
    }

    fn install(
        &self,
        session: &mut Session,
        params: &SessionParams,
        chain: &TransformChain<'_>,
    ) -> Result<()> {
        let prior = session.state;

        validate(params.version, params.direction, params.padding_enabled, chain).map_err(|e| {
            tracing::error!(
                version = ?params.version,
                direction = ?params.direction,
                error = %e,
                "Rejected session parameters"
            );
            e
        })?;

        let len = image_len(params.direction);
        let Some(mut staging) = self.queue.alloc_dma(len) else {
            tracing::error!(queue_id = self.queue.queue_id(), len, "Staging allocation failed");
            return Err(SessionError::ResourceExhausted { len });
        };

        session.state = SessionState::Staged;
        let result = self.commit(session, &mut staging, params, chain);
        drop(staging);

        if let Err(e) = &result {
            tracing::error!(
                queue_id = self.queue.queue_id(),
                direction = ?params.direction,
                prior_state = ?prior,
                error = %e,
                "Session install failed"
            );
            session.state = prior;
        }
        result
    }

    fn commit(
        &self,
        session: &mut Session,
        staging: &mut Q::Buffer,
        params: &SessionParams,
        chain: &TransformChain<'_>,
    ) -> Result<()> {
        let len = image_len(params.direction);
        let bytes = staging.as_bytes_mut();

        let (w0, w2) = match params.direction {
            Direction::Read => {
                let sa = ReadSa::from_bytes_mut(bytes)
                    .map_err(|_| SessionError::ResourceExhausted { len })?;
                build_read_into(sa, params, chain, &self.config)?;
                (sa.word0(), sa.word2())
            },
            Direction::Write => {
                let sa = WriteSa::from_bytes_mut(bytes)
                    .map_err(|_| SessionError::ResourceExhausted { len })?;
                build_write_into(sa, params, chain, &self.config)?;
                (sa.word0(), sa.word2())
            },
        };

        let opts = RecordOpts::derive(params, chain, w2);
        let op = MajorOp::for_record(params.version.hw(), params.direction == Direction::Write);
        let inst = InstructionTemplate {
            w4: InstWord4::for_op(op),
            w7: InstWord7::new(session.ctx.address(), self.config.engine_group),
        };

        self.prime(&mut session.ctx, w0);
        self.env.full_barrier();
        session.state = SessionState::HardwareWritePending;

        self.queue.context_write(staging, &mut session.ctx, len)?;

        let mode = match params.direction {
            Direction::Read => FlushMode::Invalidate,
            Direction::Write => FlushMode::Writeback,
        };
        self.queue.context_flush(&session.ctx, mode)?;
        self.env.full_barrier();

        debug_assert_eq!(session.ctx.header(), w0);

        session.opts = Some(opts);
        session.inst = inst;
        session.queue_id = Some(self.queue.queue_id());
        session.state = SessionState::Active;

        tracing::debug!(
            queue_id = self.queue.queue_id(),
            version = ?params.version,
            direction = ?params.direction,
            ctx_size = w0.ctx_size(),
            opcode = %op,
            "Session active"
        );
        Ok(())
    }

    /// Zero the live context and write only its header word
    fn prime(&self, ctx: &mut ContextRegion, w0: SaWord0) {
        ctx.clear();
        ctx.prime_header(w0);
    }

    fn teardown(&self, session: &mut Session) -> DestroyOutcome {
        let Some(direction) = session.direction() else {
            // Never installed; the device has not seen this context.
            session.ctx.clear();
            session.state = SessionState::Freed;
            return DestroyOutcome::Invalidated;
        };

        session.state = SessionState::DestroyStaged;
        if let Err(e) = self.queue.context_flush(&session.ctx, FlushMode::Writeback) {
            tracing::debug!(error = %e, "Flush before teardown failed, continuing");
        }

        let write = self.write_disabled(session, direction);

        let outcome = match write {
            Ok(()) => DestroyOutcome::Invalidated,
            Err(reason) => {
                tracing::warn!(
                    queue_id = self.queue.queue_id(),
                    direction = ?direction,
                    reason = %reason,
                    "Disabled SA not written, forcing context reload"
                );
                self.env.delay(self.config.destroy_settle_delay);
                self.env.full_barrier();

                let reload = self.queue.context_reload(&session.ctx);
                if let Err(e) = &reload {
                    tracing::warn!(error = %e, "Context reload failed");
                }
                DestroyOutcome::Recovered { reason, reload }
            },
        };

        session.ctx.clear();
        session.opts = None;
        session.state = SessionState::Freed;

        tracing::debug!(queue_id = self.queue.queue_id(), outcome = ?outcome, "Session freed");
        outcome
    }

    fn write_disabled(
        &self,
        session: &mut Session,
        direction: Direction,
    ) -> std::result::Result<(), DestroyFailure> {
        let len = image_len(direction);
        let Some(mut scratch) = self.queue.alloc_dma(len) else {
            return Err(DestroyFailure::ScratchExhausted { len });
        };

        let bytes = scratch.as_bytes_mut();
        let built = match direction {
            Direction::Read => ReadSa::from_bytes_mut(bytes).map(build_disabled_read),
            Direction::Write => WriteSa::from_bytes_mut(bytes).map(build_disabled_write),
        };
        if built.is_err() {
            return Err(DestroyFailure::ScratchExhausted { len });
        }

        session.state = SessionState::HardwareInvalidatePending;
        self.queue.context_write(&scratch, &mut session.ctx, len).map_err(DestroyFailure::Write)
    }
}

/// Full image size for `direction`
const fn image_len(direction: Direction) -> usize {
    match direction {
        Direction::Read => ReadSa::SIZE,
        Direction::Write => WriteSa::SIZE,
    }
}
