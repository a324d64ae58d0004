//! Major operation codes for record-processing instructions.
//!
//! The opcode lands in bits 56..64 of instruction word 4. TLS 1.2 and DTLS
//! 1.2 share one pair of codes; TLS 1.3 has its own. The in-place bit tells
//! the engine to write the result over the input buffer and is always set by
//! this crate.

use crate::select::HwVersion;

/// Set on every opcode: output overwrites input
pub const INPLACE_BIT: u8 = 0x40;

/// Record-processing major opcode (without the in-place bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MajorOp {
    /// Protect a TLS 1.2 / DTLS 1.2 record
    RecordEnc = 0x16,
    /// Verify and decrypt a TLS 1.2 / DTLS 1.2 record
    RecordDec = 0x17,
    /// Protect a TLS 1.3 record
    Tls13RecordEnc = 0x18,
    /// Verify and decrypt a TLS 1.3 record
    Tls13RecordDec = 0x19,
}

impl MajorOp {
    /// Opcode for the given version and direction (`encrypt` = write path)
    #[must_use]
    pub const fn for_record(version: HwVersion, encrypt: bool) -> Self {
        match (version, encrypt) {
            (HwVersion::Tls13, true) => Self::Tls13RecordEnc,
            (HwVersion::Tls13, false) => Self::Tls13RecordDec,
            (HwVersion::Tls12 | HwVersion::Dtls12, true) => Self::RecordEnc,
            (HwVersion::Tls12 | HwVersion::Dtls12, false) => Self::RecordDec,
        }
    }

    /// Raw opcode value
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Decode an opcode, ignoring the in-place bit
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value & !INPLACE_BIT {
            0x16 => Some(Self::RecordEnc),
            0x17 => Some(Self::RecordDec),
            0x18 => Some(Self::Tls13RecordEnc),
            0x19 => Some(Self::Tls13RecordDec),
            _ => None,
        }
    }

    /// Opcode with the in-place bit set, as written to word 4
    #[must_use]
    pub const fn inplace(self) -> u8 {
        self.to_u8() | INPLACE_BIT
    }

    /// True for the write-path opcodes
    #[must_use]
    pub const fn is_encrypt(self) -> bool {
        matches!(self, Self::RecordEnc | Self::Tls13RecordEnc)
    }
}

impl std::fmt::Display for MajorOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RecordEnc => "RecordEnc",
            Self::RecordDec => "RecordDec",
            Self::Tls13RecordEnc => "Tls13RecordEnc",
            Self::Tls13RecordDec => "Tls13RecordDec",
        };
        write!(f, "{name}(0x{:02x})", self.to_u8())
    }
}
