//! Fixed sizes and units of the accelerator context format.

/// Granularity of hardware word offsets (`hw_ctx_off`, `ctx_push_size`)
pub const CTX_UNIT_8B: usize = 8;

/// Granularity of the `ctx_size` header field
pub const CTX_UNIT_128B: usize = 128;

/// Size of the key/IV field shared by every layout (words 4-9)
pub const MAX_KEY_IV_LEN: usize = 48;

/// Byte offset of the IV segment inside the key/IV field
///
/// Cipher keys occupy at most the first 32 bytes; AEAD implicit nonces start
/// here.
pub const KEY_SLOT_LEN: usize = 32;

/// Size of the precomputed HMAC opad/ipad field
pub const MAX_OPAD_IPAD_LEN: usize = 128;

/// Byte offset of the inner-pad state inside the opad/ipad field
pub const IPAD_OFFSET: usize = 64;

/// Context header size code written to every SA
pub const CTX_HDR_SIZE: u8 = 1;

/// Context size written to an SA that is being invalidated
pub const CTX_ILEN: u8 = 1;

/// Largest anti-replay window the context can track
pub const AR_WIN_SIZE_MAX: u32 = 4096;

/// Smallest non-zero anti-replay window that has an encoding
pub const AR_WIN_SIZE_MIN: u32 = 32;

/// `log2(AR_WIN_SIZE_MIN)`, subtracted when encoding a window size
pub const LOG_MIN_AR_WIN_SIZE: u32 = 5;

/// Number of 64-bit words in the anti-replay bitmap
pub const AR_WINBITS_WORDS: usize = AR_WIN_SIZE_MAX as usize / 64;

/// Converts a context length in bytes into the `ctx_size` field encoding:
/// number of 128-byte units minus one.
#[must_use]
pub const fn ctx_units(len: usize) -> u8 {
    let units = len.div_ceil(CTX_UNIT_128B);
    if units == 0 { 0 } else { (units - 1) as u8 }
}

/// Converts a byte offset into 8-byte hardware words.
#[must_use]
pub const fn hw_words(offset: usize) -> u8 {
    (offset / CTX_UNIT_8B) as u8
}
