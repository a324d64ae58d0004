//! Session parameters and the crypto transform chain.
//!
//! A transform chain is the caller's description of the record protection:
//! either a single AEAD transform, or an authentication transform paired
//! with an optional cipher. Key material is borrowed for the duration of a
//! create/update call and never retained by a session.

use std::fmt;

use itls_proto::HwVersion;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Record protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TlsVersion {
    /// TLS 1.2
    Tls12,
    /// DTLS 1.2
    Dtls12,
    /// TLS 1.3
    Tls13,
}

impl TlsVersion {
    /// Record-layer wire value
    #[must_use]
    pub const fn wire(self) -> u16 {
        match self {
            Self::Tls12 => 0x0303,
            Self::Dtls12 => 0xFEFD,
            Self::Tls13 => 0x0304,
        }
    }

    /// Hardware version selector
    #[must_use]
    pub const fn hw(self) -> HwVersion {
        match self {
            Self::Tls12 => HwVersion::Tls12,
            Self::Dtls12 => HwVersion::Dtls12,
            Self::Tls13 => HwVersion::Tls13,
        }
    }

    /// Record header length on the wire
    #[must_use]
    pub const fn record_header_len(self) -> usize {
        match self {
            Self::Dtls12 => 13,
            Self::Tls12 | Self::Tls13 => 5,
        }
    }
}

impl TryFrom<u16> for TlsVersion {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0x0303 => Ok(Self::Tls12),
            0xFEFD => Ok(Self::Dtls12),
            0x0304 => Ok(Self::Tls13),
            other => Err(ConfigError::UnknownVersion(other)),
        }
    }
}

/// Session direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// Inbound records: decrypt and verify
    Read = 0,
    /// Outbound records: generate MAC and encrypt
    Write = 1,
}

impl TryFrom<u8> for Direction {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Read),
            1 => Ok(Self::Write),
            other => Err(ConfigError::UnknownDirection(other)),
        }
    }
}

/// Source of the explicit IV on the write path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IvSource {
    /// Generated by the accelerator
    #[default]
    Default,
    /// Taken from the SA (debug only)
    FromAssociation,
}

/// Cipher algorithms a transform may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherAlgo {
    /// NULL encryption (MAC only)
    Null,
    /// Triple DES in CBC mode
    TripleDesCbc,
    /// AES in CBC mode
    AesCbc,
    /// AES in counter mode
    AesCtr,
    /// AES in ECB mode
    AesEcb,
    /// Single DES in CBC mode
    DesCbc,
}

/// Authentication algorithms a transform may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthAlgo {
    /// No authentication
    Null,
    /// HMAC-MD5
    Md5Hmac,
    /// HMAC-SHA1
    Sha1Hmac,
    /// HMAC-SHA224
    Sha224Hmac,
    /// HMAC-SHA256
    Sha256Hmac,
    /// HMAC-SHA384
    Sha384Hmac,
    /// HMAC-SHA512
    Sha512Hmac,
    /// AES-XCBC-MAC
    AesXcbcMac,
}

/// AEAD algorithms a transform may name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AeadAlgo {
    /// AES-GCM
    AesGcm,
    /// AES-CCM
    AesCcm,
    /// ChaCha20-Poly1305
    ChaCha20Poly1305,
}

/// Cipher and AEAD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherOp {
    /// Protect
    Encrypt,
    /// Unprotect
    Decrypt,
}

/// Authentication operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthOp {
    /// Compute the MAC
    Generate,
    /// Check the MAC
    Verify,
}

/// Where the per-operation IV sits in the crypto operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IvParams {
    /// Byte offset inside the operation
    pub offset: u16,
    /// IV length in bytes
    pub length: u16,
}

/// Cipher transform
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CipherXform<'a> {
    /// Algorithm
    pub algo: CipherAlgo,
    /// Operation
    pub op: CipherOp,
    /// Key bytes
    pub key: &'a [u8],
    /// IV placement
    pub iv: IvParams,
}

/// Authentication transform
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AuthXform<'a> {
    /// Algorithm
    pub algo: AuthAlgo,
    /// Operation
    pub op: AuthOp,
    /// Key bytes
    pub key: &'a [u8],
}

/// AEAD transform
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AeadXform<'a> {
    /// Algorithm
    pub algo: AeadAlgo,
    /// Operation
    pub op: CipherOp,
    /// Key bytes
    pub key: &'a [u8],
    /// IV placement
    pub iv: IvParams,
}

impl fmt::Debug for CipherXform<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherXform")
            .field("algo", &self.algo)
            .field("op", &self.op)
            .field("key_len", &self.key.len())
            .field("iv", &self.iv)
            .finish()
    }
}

impl fmt::Debug for AuthXform<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthXform")
            .field("algo", &self.algo)
            .field("op", &self.op)
            .field("key_len", &self.key.len())
            .finish()
    }
}

impl fmt::Debug for AeadXform<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AeadXform")
            .field("algo", &self.algo)
            .field("op", &self.op)
            .field("key_len", &self.key.len())
            .field("iv", &self.iv)
            .finish()
    }
}

/// One element of a transform chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Xform<'a> {
    /// Cipher transform
    Cipher(CipherXform<'a>),
    /// Authentication transform
    Auth(AuthXform<'a>),
    /// AEAD transform
    Aead(AeadXform<'a>),
}

impl Xform<'_> {
    /// Short name of the transform kind, for diagnostics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cipher(_) => "cipher",
            Self::Auth(_) => "auth",
            Self::Aead(_) => "aead",
        }
    }

    /// IV placement carried by this transform, if any
    #[must_use]
    pub const fn iv(&self) -> Option<IvParams> {
        match self {
            Self::Cipher(c) => Some(c.iv),
            Self::Aead(a) => Some(a.iv),
            Self::Auth(_) => None,
        }
    }
}

/// Ordered chain of one or two transforms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformChain<'a> {
    first: Xform<'a>,
    next: Option<Xform<'a>>,
}

impl<'a> TransformChain<'a> {
    /// Chain with a single transform
    #[must_use]
    pub const fn single(first: Xform<'a>) -> Self {
        Self { first, next: None }
    }

    /// Chain of two transforms, applied in order
    #[must_use]
    pub const fn pair(first: Xform<'a>, next: Xform<'a>) -> Self {
        Self { first, next: Some(next) }
    }

    /// First transform
    #[must_use]
    pub const fn first(&self) -> &Xform<'a> {
        &self.first
    }

    /// Second transform, if any
    #[must_use]
    pub const fn next(&self) -> Option<&Xform<'a>> {
        self.next.as_ref()
    }

    /// Number of transforms (1 or 2)
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.next.is_some() { 2 } else { 1 }
    }

    /// Always false: a chain holds at least one transform
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Transforms in chain order
    pub fn iter(&self) -> impl Iterator<Item = &Xform<'a>> {
        std::iter::once(&self.first).chain(self.next.as_ref())
    }

    /// The AEAD transform, when the chain leads with one
    #[must_use]
    pub fn aead(&self) -> Option<&AeadXform<'a>> {
        match &self.first {
            Xform::Aead(aead) => Some(aead),
            _ => None,
        }
    }

    /// First cipher transform in the chain
    #[must_use]
    pub fn cipher(&self) -> Option<&CipherXform<'a>> {
        self.iter().find_map(|x| match x {
            Xform::Cipher(c) => Some(c),
            _ => None,
        })
    }

    /// First authentication transform in the chain
    #[must_use]
    pub fn auth(&self) -> Option<&AuthXform<'a>> {
        self.iter().find_map(|x| match x {
            Xform::Auth(a) => Some(a),
            _ => None,
        })
    }

    /// IV placement of the first transform that carries one
    #[must_use]
    pub fn iv(&self) -> Option<IvParams> {
        self.iter().find_map(Xform::iv)
    }
}

/// Parameters negotiated for one direction of a record connection
#[derive(Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Record version
    pub version: TlsVersion,
    /// Read or write
    pub direction: Direction,
    /// Next sequence number to process
    pub seq_no: u64,
    /// DTLS epoch
    pub epoch: u16,
    /// DTLS anti-replay window in records; 0 disables it (read only)
    pub anti_replay_window: u32,
    /// Implicit nonce: 4 bytes used for TLS 1.2 / DTLS 1.2, 12 for TLS 1.3
    pub implicit_nonce: [u8; 12],
    /// Extra record padding (TLS 1.3 only with AEAD)
    pub padding_enabled: bool,
    /// Write-path IV source
    pub iv_source: IvSource,
}

impl SessionParams {
    /// Parameters with zeroed counters and defaults for every option
    #[must_use]
    pub const fn new(version: TlsVersion, direction: Direction) -> Self {
        Self {
            version,
            direction,
            seq_no: 0,
            epoch: 0,
            anti_replay_window: 0,
            implicit_nonce: [0; 12],
            padding_enabled: false,
            iv_source: IvSource::Default,
        }
    }

    /// Number of implicit nonce bytes copied into the SA
    #[must_use]
    pub const fn nonce_len(&self) -> usize {
        match self.version {
            TlsVersion::Tls13 => 12,
            TlsVersion::Tls12 | TlsVersion::Dtls12 => 4,
        }
    }
}

impl fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionParams")
            .field("version", &self.version)
            .field("direction", &self.direction)
            .field("seq_no", &self.seq_no)
            .field("epoch", &self.epoch)
            .field("anti_replay_window", &self.anti_replay_window)
            .field("padding_enabled", &self.padding_enabled)
            .field("iv_source", &self.iv_source)
            .finish_non_exhaustive()
    }
}
