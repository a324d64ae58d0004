//! Lifetime and statistics enables in SA word 0.
//!
//! These single-bit fields sit at bits 3..=8 of word 0 in both read and write
//! contexts. The flags are kept at their word-0 bit positions so they can be
//! masked in and out of the header word directly.

use bitflags::bitflags;

bitflags! {
    /// Counter enables (word 0, bits 3..=8)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SaCounterFlags: u64 {
        /// Decrement the hard lifetime counter per record
        const HARD_LIFE_DEC = 1 << 3;

        /// Decrement the soft lifetime counter per record
        const SOFT_LIFE_DEC = 1 << 4;

        /// Count octets in the global counter
        const COUNT_GLB_OCTETS = 1 << 5;

        /// Count packets in the global counter
        const COUNT_GLB_PKTS = 1 << 6;

        /// Count octets in the per-SA MIB
        const COUNT_MIB_BYTES = 1 << 7;

        /// Count packets in the per-SA MIB
        const COUNT_MIB_PKTS = 1 << 8;
    }
}

impl SaCounterFlags {
    /// Extract the counter enables from a raw word 0, ignoring other fields
    #[must_use]
    pub const fn from_word(word: u64) -> Self {
        Self::from_bits_truncate(word)
    }
}

impl Default for SaCounterFlags {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_live_in_bits_3_to_8() {
        assert_eq!(SaCounterFlags::all().bits(), 0b1_1111_1000);
    }

    #[test]
    fn from_word_drops_neighbouring_fields() {
        // ar_win (bits 0-2) and hw_ctx_off (bits 9-15) must not leak in
        let word = 0b111 | (0x7F << 9) | SaCounterFlags::COUNT_MIB_PKTS.bits();
        assert_eq!(SaCounterFlags::from_word(word), SaCounterFlags::COUNT_MIB_PKTS);
    }

    #[test]
    fn flags_empty_by_default() {
        assert!(SaCounterFlags::default().is_empty());
    }
}
