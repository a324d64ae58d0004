//! itls session management core
//!
//! Builds security associations for inline TLS/DTLS record offload and
//! drives their lifecycle on a packet-processing crypto accelerator. The
//! crate performs no I/O of its own: device access goes through
//! [`ContextQueue`] and side effects (barriers, sleeps) through
//! [`Environment`].
//!
//! # Architecture
//!
//! ```text
//!   caller ──> validator ──> builder ──> SessionManager ──> ContextQueue
//!   (params,   (reject       (SA image    (prime, fence,    (device or
//!    chain)     early)        in staging)  write, flush)     simulation)
//! ```
//!
//! # Modules
//!
//! - [`xform`]: transform chain and session parameter model
//! - [`validator`]: legality of a chain for a version and direction
//! - [`builder`]: SA image construction, including the disabled image
//! - [`hmac_pad`]: HMAC inner/outer pad precompute
//! - [`byte_order`]: 64-bit word byte swaps for key material
//! - [`rlen`]: worst-case record expansion on the write path
//! - [`session`]: create, update and destroy
//! - [`queue`], [`env`]: hardware and environment seams
//! - [`config`], [`error`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
pub mod byte_order;
pub mod config;
pub mod env;
pub mod error;
pub mod hmac_pad;
pub mod queue;
pub mod rlen;
pub mod session;
pub mod validator;
pub mod xform;

pub use builder::{StagedSa, build, disabled_header, encode_ar_window};
pub use config::AcceleratorConfig;
pub use env::{Environment, SystemEnv};
pub use error::{ConfigError, HwError, HwOp, Result, SessionError, UnsupportedFeature};
pub use queue::{ContextQueue, ContextRegion, DmaBuffer, FlushMode, HeapBuffer};
pub use rlen::max_expansion;
pub use session::{
    DestroyFailure, DestroyOutcome, RecordOpts, Session, SessionManager, SessionState,
};
pub use validator::validate;
pub use xform::{
    AeadAlgo, AeadXform, AuthAlgo, AuthOp, AuthXform, CipherAlgo, CipherOp, CipherXform,
    Direction, IvParams, IvSource, SessionParams, TlsVersion, TransformChain, Xform,
};
