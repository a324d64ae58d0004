//! Key material byte order.
//!
//! The accelerator fetches key and pad fields as 64-bit words and expects
//! the bytes of each word in big-endian order, while the image itself is
//! little-endian. Reversing every 8-byte unit converts between the two.

use itls_proto::constants::CTX_UNIT_8B;

/// Reverse the byte order of every 8-byte unit of `buf` in place.
///
/// `buf.len()` must be a multiple of 8; a trailing partial unit is left
/// untouched.
pub fn swap_words(buf: &mut [u8]) {
    debug_assert_eq!(buf.len() % CTX_UNIT_8B, 0);

    for unit in buf.chunks_exact_mut(CTX_UNIT_8B) {
        unit.reverse();
    }
}
