//! Worst-case record growth on the write path.
//!
//! The datapath reserves this many bytes of tailroom/headroom per record so
//! the accelerator never runs out of buffer while adding the record header,
//! explicit IV, MAC and padding.

use crate::xform::{AuthAlgo, CipherAlgo, TlsVersion, TransformChain};

/// AEAD explicit nonce / IV allowance
const AEAD_IV_LEN: usize = 16;
/// AEAD tag allowance
const AEAD_TAG_LEN: usize = 16;

/// Explicit IV length and padding round-up for a block cipher
const fn cipher_growth(algo: CipherAlgo) -> (usize, usize) {
    match algo {
        CipherAlgo::TripleDesCbc => (8, 8),
        CipherAlgo::AesCbc => (16, 16),
        _ => (0, 4),
    }
}

/// MAC bytes appended per record
///
/// SHA-384 is budgeted at 32 bytes, matching the device's record-length
/// accounting.
const fn mac_growth(algo: AuthAlgo) -> usize {
    match algo {
        AuthAlgo::Md5Hmac => 16,
        AuthAlgo::Sha1Hmac => 20,
        AuthAlgo::Sha256Hmac | AuthAlgo::Sha384Hmac => 32,
        _ => 0,
    }
}

/// Maximum number of bytes a write session adds to one record.
///
/// Meaningful for chains that passed validation; anything unrecognized
/// contributes nothing beyond the header.
#[must_use]
pub fn max_expansion(version: TlsVersion, chain: &TransformChain<'_>) -> usize {
    let header = version.record_header_len();

    if chain.aead().is_some() {
        return header + AEAD_IV_LEN + AEAD_TAG_LEN;
    }

    let (iv, roundup) = cipher_growth(chain.cipher().map_or(CipherAlgo::Null, |c| c.algo));
    let mac = chain.auth().map_or(0, |a| mac_growth(a.algo));

    header + iv + mac + roundup
}
