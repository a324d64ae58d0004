//! Pre-computed instruction words handed to the datapath.
//!
//! A session fixes two words of every instruction it submits: word 4 carries
//! the opcode, word 7 the context pointer and engine group. The datapath
//! copies them into each instruction unchanged.

use crate::{opcodes::MajorOp, word::BitField};

/// Instruction word 4 (opcode and parameters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstWord4(u64);

impl InstWord4 {
    /// Major opcode including the in-place bit
    pub const OPCODE_MAJOR: BitField = BitField::new(56, 8);
    /// Minor opcode
    pub const OPCODE_MINOR: BitField = BitField::new(48, 8);

    /// Word 4 for a record operation, in-place bit set
    #[must_use]
    pub const fn for_op(op: MajorOp) -> Self {
        Self(Self::OPCODE_MAJOR.set(0, op.inplace() as u64))
    }

    /// Raw word value
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Major opcode byte
    #[must_use]
    pub const fn opcode_major(self) -> u8 {
        Self::OPCODE_MAJOR.get(self.0) as u8
    }

    /// Decoded major opcode
    #[must_use]
    pub const fn op(self) -> Option<MajorOp> {
        MajorOp::from_u8(self.opcode_major())
    }
}

/// Instruction word 7 (context pointer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstWord7(u64);

impl InstWord7 {
    /// Context address
    pub const CPTR: BitField = BitField::new(0, 60);
    /// Context pointer valid
    pub const CTX_VAL: BitField = BitField::new(60, 1);
    /// Engine group
    pub const EGRP: BitField = BitField::new(61, 3);

    /// Word 7 pointing at the context at `address`, served by `engine_group`
    #[must_use]
    pub const fn new(address: u64, engine_group: u8) -> Self {
        let word = Self::CPTR.set(0, address);
        let word = Self::CTX_VAL.set(word, 1);
        Self(Self::EGRP.set(word, engine_group as u64))
    }

    /// Raw word value
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Context address
    #[must_use]
    pub const fn cptr(self) -> u64 {
        Self::CPTR.get(self.0)
    }

    /// Context pointer valid bit
    #[must_use]
    pub const fn ctx_val(self) -> bool {
        Self::CTX_VAL.get(self.0) == 1
    }

    /// Engine group
    #[must_use]
    pub const fn engine_group(self) -> u8 {
        Self::EGRP.get(self.0) as u8
    }
}

/// Instruction words fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InstructionTemplate {
    /// Opcode word
    pub w4: InstWord4,
    /// Context pointer word
    pub w7: InstWord7,
}
