//! Error types for session management.
//!
//! Rejections are split by who can fix them:
//! - [`ConfigError`]: the caller asked for something illegal
//! - [`UnsupportedFeature`]: legal in the protocol, not offered by the device
//! - [`HwError`]: the accelerator refused a context operation
//!
//! [`SessionError`] wraps all three plus allocation and lifecycle misuse.

use std::fmt;

use thiserror::Error;

use crate::{
    session::SessionState,
    xform::{AeadAlgo, AuthAlgo, AuthOp, CipherAlgo, CipherOp, Direction, TlsVersion},
};

/// Caller-side configuration errors. Never worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Raw version value is not TLS 1.2, DTLS 1.2 or TLS 1.3
    #[error("unknown record version {0:#06x}")]
    UnknownVersion(u16),

    /// Raw direction value is neither read nor write
    #[error("unknown session direction {0}")]
    UnknownDirection(u8),

    /// Extra padding requested with AEAD below TLS 1.3
    #[error("extra padding with AEAD requires TLS 1.3, got {version:?}")]
    AeadPaddingRequiresTls13 {
        /// Requested version
        version: TlsVersion,
    },

    /// AEAD operation does not match the session direction
    #[error("{direction:?} session cannot use AEAD operation {op:?}")]
    AeadOperation {
        /// Session direction
        direction: Direction,
        /// Operation in the transform
        op: CipherOp,
    },

    /// AEAD algorithm or key length not accepted by the device
    #[error("unsupported AEAD {algo:?} with {key_len}-byte key")]
    AeadKey {
        /// Algorithm in the transform
        algo: AeadAlgo,
        /// Key length in bytes
        key_len: usize,
    },

    /// TLS 1.3 sessions accept AEAD transforms only
    #[error("TLS 1.3 requires an AEAD transform")]
    Tls13RequiresAead,

    /// Transform chain has the wrong shape for the direction
    #[error("{direction:?} session cannot use chain {shape}")]
    ChainShape {
        /// Session direction
        direction: Direction,
        /// Transform kinds in chain order, e.g. `"cipher->auth"`
        shape: &'static str,
    },

    /// Cipher operation does not match the session direction
    #[error("{direction:?} session cannot use cipher operation {op:?}")]
    CipherOperation {
        /// Session direction
        direction: Direction,
        /// Operation in the transform
        op: CipherOp,
    },

    /// Authentication operation does not match the session direction
    #[error("{direction:?} session cannot use auth operation {op:?}")]
    AuthOperation {
        /// Session direction
        direction: Direction,
        /// Operation in the transform
        op: AuthOp,
    },

    /// Cipher algorithm or key length not accepted by the device
    #[error("unsupported cipher {algo:?} with {key_len}-byte key")]
    CipherKey {
        /// Algorithm in the transform
        algo: CipherAlgo,
        /// Key length in bytes
        key_len: usize,
    },

    /// Authentication algorithm or key length not accepted by the device
    #[error("unsupported auth {algo:?} with {key_len}-byte key")]
    AuthKey {
        /// Algorithm in the transform
        algo: AuthAlgo,
        /// Key length in bytes
        key_len: usize,
    },

    /// Cipher and authentication algorithms cannot be combined
    #[error("cipher {cipher:?} cannot be paired with auth {auth:?}")]
    Pairing {
        /// Cipher algorithm
        cipher: CipherAlgo,
        /// Authentication algorithm
        auth: AuthAlgo,
    },

    /// Update supplied parameters for the wrong direction
    #[error("update requires write parameters, got {0:?}")]
    UpdateDirection(Direction),

    /// Minimum context size does not fit the 4-bit field
    #[error("min_context_size {0} exceeds 15")]
    MinContextSize(u8),

    /// Engine group does not fit the 3-bit field
    #[error("engine_group {0} exceeds 7")]
    EngineGroup(u8),
}

/// Features the protocol permits but the device does not offer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedFeature {
    /// Anti-replay window is not a power of two in 32..=4096
    #[error("anti-replay window {0} has no encoding")]
    AntiReplayWindow(u32),

    /// Read sessions cannot be updated in place
    #[error("read sessions cannot be updated")]
    ReadSessionUpdate,

    /// SA-sourced IV requested without the debug capability
    #[error("SA-sourced IV is not enabled")]
    SaIvSource,
}

/// Context operation that the accelerator rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwOp {
    /// Bulk copy of a staged image into the live context
    ContextWrite,
    /// Write back or invalidate the cached context
    ContextFlush,
    /// Force the accelerator to re-read the context
    ContextReload,
}

impl fmt::Display for HwOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ContextWrite => "context_write",
            Self::ContextFlush => "context_flush",
            Self::ContextReload => "context_reload",
        };
        f.write_str(name)
    }
}

/// Failure status reported by the accelerator
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{op} failed with status {status}")]
pub struct HwError {
    /// Operation that failed
    pub op: HwOp,
    /// Device status code
    pub status: i32,
}

impl HwError {
    /// Failure of `op` with device status `status`
    #[must_use]
    pub const fn new(op: HwOp, status: i32) -> Self {
        Self { op, status }
    }
}

/// Errors from session create, update and build.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Feature not offered by the device
    #[error("unsupported: {0}")]
    Unsupported(#[from] UnsupportedFeature),

    /// Staging or scratch allocation failed
    #[error("could not allocate {len}-byte staging buffer")]
    ResourceExhausted {
        /// Requested size in bytes
        len: usize,
    },

    /// Accelerator rejected a context operation
    #[error("hardware fault: {0}")]
    HardwareFault(#[from] HwError),

    /// Operation not valid in the session's current state
    #[error("cannot {operation} session in state {state:?}")]
    InvalidState {
        /// State when the operation was attempted
        state: SessionState,
        /// Operation that was attempted
        operation: &'static str,
    },
}

impl SessionError {
    /// Returns true if the caller can fix this error by changing its input
    /// or call sequence. Device faults and allocation failures are not
    /// caller errors.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::Unsupported(_) | Self::InvalidState { .. })
    }
}

/// Convenient Result type alias for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
