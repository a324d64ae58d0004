//! Bit-packed SA control words.
//!
//! The context format packs its header (word 0) and algorithm selectors
//! (word 2) into 64-bit words. Rather than relying on any compiler's bit-field
//! layout, every field is described by an explicit [`BitField`] (shift and
//! width) and read or written through masking accessors.
//!
//! # Word 0 (header)
//!
//! ```text
//!  63   60 59 58 57 56 55 54        48 47 ... 16 15        9 8     3 2   0
//! +-------+--+--+-----+--+------------+----------+-----------+-------+-----+
//! |ctx_sz |r |av|hdr  |r | push_size  | rx only  | hw_ctx_off|counter|ar_w |
//! +-------+--+--+-----+--+------------+----------+-----------+-------+-----+
//! ```
//!
//! Fields marked "rx only" (`ctx_id`, `pkind`, output controls) and `ar_win`
//! are defined for read contexts; write contexts keep them zero.
//!
//! # Word 2 (selectors)
//!
//! ```text
//!  63          15 14 13    10 9      6 5   4 3      0
//! +--------------+--+--------+--------+-----+--------+
//! |   reserved   |iv|  mac   | cipher |aes_k| version|
//! +--------------+--+--------+--------+-----+--------+
//! ```

use std::fmt;

use crate::{
    flags::SaCounterFlags,
    select::{AesKeyLen, HwCipher, HwIvSource, HwMac, HwVersion},
};

/// Position and width of one field inside a 64-bit word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    shift: u32,
    width: u32,
}

impl BitField {
    /// Describe a field of `width` bits starting at bit `shift`
    #[must_use]
    pub const fn new(shift: u32, width: u32) -> Self {
        assert!(width > 0 && width < 64 && shift + width <= 64);
        Self { shift, width }
    }

    /// Largest value the field can hold
    #[must_use]
    pub const fn max(self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Mask of the field in word position
    #[must_use]
    pub const fn mask(self) -> u64 {
        self.max() << self.shift
    }

    /// Extract the field from `word`
    #[must_use]
    pub const fn get(self, word: u64) -> u64 {
        (word & self.mask()) >> self.shift
    }

    /// Return `word` with the field replaced by `value`
    ///
    /// Bits of `value` above the field width are discarded.
    #[must_use]
    pub const fn set(self, word: u64, value: u64) -> u64 {
        (word & !self.mask()) | ((value << self.shift) & self.mask())
    }
}

/// SA word 0: context sizing, hardware offsets and counter enables
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct SaWord0(u64);

impl SaWord0 {
    /// Encoded anti-replay window size (read only)
    pub const AR_WIN: BitField = BitField::new(0, 3);
    /// Word offset of the hardware-managed context region
    pub const HW_CTX_OFF: BitField = BitField::new(9, 7);
    /// Context identifier (read only)
    pub const CTX_ID: BitField = BitField::new(16, 16);
    /// Original packet follows the "free after processing" rule (read only)
    pub const ORIG_PKT_FABS: BitField = BitField::new(32, 1);
    /// Free the original packet (read only)
    pub const ORIG_PKT_FREE: BitField = BitField::new(33, 1);
    /// Port kind for metadata parsing (read only)
    pub const PKIND: BitField = BitField::new(34, 6);
    /// Event-type overwrite (read only)
    pub const ET_OVRWR: BitField = BitField::new(41, 1);
    /// Packet output mode (read only)
    pub const PKT_OUTPUT: BitField = BitField::new(42, 2);
    /// Packet format (read only)
    pub const PKT_FORMAT: BitField = BitField::new(44, 1);
    /// Defragmentation option (read only)
    pub const DEFRAG_OPT: BitField = BitField::new(45, 2);
    /// X2P destination (read only)
    pub const X2P_DST: BitField = BitField::new(47, 1);
    /// Number of words the hardware pushes back on flush
    pub const CTX_PUSH_SIZE: BitField = BitField::new(48, 7);
    /// Context header size code
    pub const CTX_HDR_SIZE: BitField = BitField::new(56, 2);
    /// Operation valid bit
    pub const AOP_VALID: BitField = BitField::new(58, 1);
    /// Context size in 128-byte units minus one
    pub const CTX_SIZE: BitField = BitField::new(60, 4);

    /// Bits that must always be zero
    pub const RESERVED_MASK: u64 = (1 << 40) | (1 << 55) | (1 << 59);

    /// Wrap a raw word
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw word value
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Encoded anti-replay window (`log2(window) - 5`, 0 = disabled)
    #[must_use]
    pub const fn ar_win(self) -> u8 {
        Self::AR_WIN.get(self.0) as u8
    }

    /// Set the encoded anti-replay window
    pub fn set_ar_win(&mut self, value: u8) {
        debug_assert!(u64::from(value) <= Self::AR_WIN.max());
        self.0 = Self::AR_WIN.set(self.0, u64::from(value));
    }

    /// Counter enables
    #[must_use]
    pub const fn counters(self) -> SaCounterFlags {
        SaCounterFlags::from_word(self.0)
    }

    /// Word offset of the hardware-managed region
    #[must_use]
    pub const fn hw_ctx_off(self) -> u8 {
        Self::HW_CTX_OFF.get(self.0) as u8
    }

    /// Set the word offset of the hardware-managed region
    pub fn set_hw_ctx_off(&mut self, words: u8) {
        debug_assert!(u64::from(words) <= Self::HW_CTX_OFF.max());
        self.0 = Self::HW_CTX_OFF.set(self.0, u64::from(words));
    }

    /// Context identifier
    #[must_use]
    pub const fn ctx_id(self) -> u16 {
        Self::CTX_ID.get(self.0) as u16
    }

    /// Port kind
    #[must_use]
    pub const fn pkind(self) -> u8 {
        Self::PKIND.get(self.0) as u8
    }

    /// Push size in words
    #[must_use]
    pub const fn ctx_push_size(self) -> u8 {
        Self::CTX_PUSH_SIZE.get(self.0) as u8
    }

    /// Set the push size in words
    pub fn set_ctx_push_size(&mut self, words: u8) {
        debug_assert!(u64::from(words) <= Self::CTX_PUSH_SIZE.max());
        self.0 = Self::CTX_PUSH_SIZE.set(self.0, u64::from(words));
    }

    /// Context header size code
    #[must_use]
    pub const fn ctx_hdr_size(self) -> u8 {
        Self::CTX_HDR_SIZE.get(self.0) as u8
    }

    /// Set the context header size code
    pub fn set_ctx_hdr_size(&mut self, value: u8) {
        debug_assert!(u64::from(value) <= Self::CTX_HDR_SIZE.max());
        self.0 = Self::CTX_HDR_SIZE.set(self.0, u64::from(value));
    }

    /// Operation valid bit
    #[must_use]
    pub const fn aop_valid(self) -> bool {
        Self::AOP_VALID.get(self.0) == 1
    }

    /// Set the operation valid bit
    pub fn set_aop_valid(&mut self, valid: bool) {
        self.0 = Self::AOP_VALID.set(self.0, u64::from(valid));
    }

    /// Context size in 128-byte units minus one
    #[must_use]
    pub const fn ctx_size(self) -> u8 {
        Self::CTX_SIZE.get(self.0) as u8
    }

    /// Set the context size field
    pub fn set_ctx_size(&mut self, units: u8) {
        debug_assert!(u64::from(units) <= Self::CTX_SIZE.max());
        self.0 = Self::CTX_SIZE.set(self.0, u64::from(units));
    }

    /// True if any reserved bit is set
    #[must_use]
    pub const fn has_reserved_bits(self) -> bool {
        self.0 & Self::RESERVED_MASK != 0
    }
}

impl fmt::Debug for SaWord0 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaWord0")
            .field("raw", &format_args!("{:#018x}", self.0))
            .field("ctx_size", &self.ctx_size())
            .field("hw_ctx_off", &self.hw_ctx_off())
            .field("ctx_push_size", &self.ctx_push_size())
            .field("ar_win", &self.ar_win())
            .field("counters", &self.counters())
            .finish_non_exhaustive()
    }
}

/// SA word 2: protocol and algorithm selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SaWord2(u64);

impl SaWord2 {
    /// Record version selector
    pub const VERSION_SELECT: BitField = BitField::new(0, 4);
    /// AES key length selector
    pub const AES_KEY_LEN: BitField = BitField::new(4, 2);
    /// Cipher selector
    pub const CIPHER_SELECT: BitField = BitField::new(6, 4);
    /// MAC selector
    pub const MAC_SELECT: BitField = BitField::new(10, 4);
    /// IV source for the write path
    pub const IV_AT_CPTR: BitField = BitField::new(14, 1);

    /// Wrap a raw word
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw word value
    #[must_use]
    pub const fn to_u64(self) -> u64 {
        self.0
    }

    /// Raw version selector
    #[must_use]
    pub const fn version_bits(self) -> u8 {
        Self::VERSION_SELECT.get(self.0) as u8
    }

    /// Decoded version selector
    #[must_use]
    pub const fn version(self) -> Option<HwVersion> {
        HwVersion::from_bits(self.version_bits())
    }

    /// Select the record version
    pub fn set_version(&mut self, version: HwVersion) {
        self.0 = Self::VERSION_SELECT.set(self.0, u64::from(version.to_bits()));
    }

    /// Decoded AES key length
    #[must_use]
    pub const fn aes_key_len(self) -> Option<AesKeyLen> {
        AesKeyLen::from_bits(Self::AES_KEY_LEN.get(self.0) as u8)
    }

    /// Select the AES key length
    pub fn set_aes_key_len(&mut self, len: AesKeyLen) {
        self.0 = Self::AES_KEY_LEN.set(self.0, u64::from(len.to_bits()));
    }

    /// Decoded cipher, `None` for NULL encryption
    #[must_use]
    pub const fn cipher(self) -> Option<HwCipher> {
        HwCipher::from_bits(Self::CIPHER_SELECT.get(self.0) as u8)
    }

    /// Select the cipher
    pub fn set_cipher(&mut self, cipher: HwCipher) {
        self.0 = Self::CIPHER_SELECT.set(self.0, u64::from(cipher.to_bits()));
    }

    /// Decoded MAC, `None` when no HMAC is configured
    #[must_use]
    pub const fn mac(self) -> Option<HwMac> {
        HwMac::from_bits(Self::MAC_SELECT.get(self.0) as u8)
    }

    /// Select the MAC
    pub fn set_mac(&mut self, mac: HwMac) {
        self.0 = Self::MAC_SELECT.set(self.0, u64::from(mac.to_bits()));
    }

    /// Write-path IV source
    #[must_use]
    pub const fn iv_source(self) -> HwIvSource {
        if Self::IV_AT_CPTR.get(self.0) == 1 { HwIvSource::FromSa } else { HwIvSource::Default }
    }

    /// Set the write-path IV source
    pub fn set_iv_source(&mut self, source: HwIvSource) {
        self.0 = Self::IV_AT_CPTR.set(self.0, source as u64);
    }
}
