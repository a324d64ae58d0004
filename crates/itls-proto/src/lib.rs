//! # itls Protocol: SA Context Layout
//!
//! Byte-exact model of the security association (SA) contexts a
//! packet-processing crypto accelerator reads when it protects or verifies
//! TLS 1.2, DTLS 1.2 and TLS 1.3 records inline.
//!
//! ## Layout Model
//!
//! - **Bit-packed words**: header (word 0) and selector (word 2) fields are
//!   explicit shift/width accessors over `u64` ([`SaWord0`], [`SaWord2`]).
//!   Nothing depends on compiler bit-field ordering.
//!
//! - **Images**: [`ReadSa`] (768 bytes) and [`WriteSa`] (224 bytes) are
//!   `zerocopy` structs of little-endian words. They can be cast to and from
//!   raw context memory without copying.
//!
//! - **Tagged regions**: the protocol region after the key field differs
//!   between TLS 1.2/DTLS 1.2 and TLS 1.3. It is only reachable through a
//!   version-tagged view ([`ReadRegion`], [`WriteRegion`]) chosen by the
//!   version selector, so the two layouts cannot be mixed up.
//!
//! - **Instructions**: the opcode word and context pointer word a session
//!   pins for the datapath ([`InstructionTemplate`]).
//!
//! Images never print key material through `Debug`.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod errors;
pub mod flags;
pub mod inst;
pub mod opcodes;
pub mod read_sa;
pub mod select;
pub mod word;
pub mod write_sa;

pub use errors::{LayoutError, Result};
pub use flags::SaCounterFlags;
pub use inst::{InstWord4, InstWord7, InstructionTemplate};
pub use opcodes::{INPLACE_BIT, MajorOp};
pub use read_sa::{ReadRegion, ReadRegionMut, ReadSa};
pub use select::{AesKeyLen, HwCipher, HwIvSource, HwMac, HwVersion};
pub use word::{BitField, SaWord0, SaWord2};
pub use write_sa::{WriteRegion, WriteRegionMut, WriteSa};
