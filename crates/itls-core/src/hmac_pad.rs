//! HMAC inner/outer state precompute.
//!
//! Instead of the raw HMAC key the accelerator takes the hash state after
//! absorbing one block of `K ^ opad` and one block of `K ^ ipad`. Each state
//! is produced by a single compression from the algorithm's initial value:
//!
//! ```text
//! pad field (128 bytes, before word swap)
//! +--------------------------+--------------------------+
//! | opad state (0..64)       | ipad state (64..128)     |
//! +--------------------------+--------------------------+
//! MD5: 16 bytes LE    SHA-1: 20 bytes BE    SHA-256: 32 bytes BE
//! SHA-384/512: 64 bytes BE (all eight words)
//! ```

use itls_proto::{
    HwMac,
    constants::{IPAD_OFFSET, MAX_OPAD_IPAD_LEN},
};
use sha2::digest::generic_array::GenericArray;
use zeroize::Zeroize;

const IPAD_BYTE: u8 = 0x36;
const OPAD_BYTE: u8 = 0x5c;

const MD5_IV: [u32; 4] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476];

const SHA1_IV: [u32; 5] = [0x6745_2301, 0xefcd_ab89, 0x98ba_dcfe, 0x1032_5476, 0xc3d2_e1f0];

const SHA256_IV: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a, 0x510e_527f, 0x9b05_688c, 0x1f83_d9ab,
    0x5be0_cd19,
];

const SHA384_IV: [u64; 8] = [
    0xcbbb_9d5d_c105_9ed8,
    0x629a_292a_367c_d507,
    0x9159_015a_3070_dd17,
    0x152f_ecd8_f70e_5939,
    0x6733_2667_ffc0_0b31,
    0x8eb4_4a87_6858_1511,
    0xdb0c_2e0d_64f9_8fa7,
    0x47b5_481d_befa_4fa4,
];

const SHA512_IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

/// Per-round left rotations
const MD5_S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

/// `floor(|sin(i + 1)| * 2^32)`
const MD5_K: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, 0xf57c_0faf, 0x4787_c62a, 0xa830_4613,
    0xfd46_9501, 0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, 0x6b90_1122, 0xfd98_7193,
    0xa679_438e, 0x49b4_0821, 0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, 0xd62f_105d,
    0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, 0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed,
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, 0xfffa_3942, 0x8771_f681, 0x6d9d_6122,
    0xfde5_380c, 0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, 0x289b_7ec6, 0xeaa1_27fa,
    0xd4ef_3085, 0x0488_1d05, 0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, 0xf429_2244,
    0x432a_ff97, 0xab94_23a7, 0xfc93_a039, 0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1,
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, 0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb,
    0xeb86_d391,
];

/// One MD5 compression over a 64-byte block
fn md5_compress(state: &mut [u32; 4], block: &[u8]) {
    debug_assert_eq!(block.len(), 64);

    let mut m = [0u32; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;
    for i in 0..64 {
        let (f, g) = match i / 16 {
            0 => ((b & c) | (!b & d), i),
            1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };
        let f = f.wrapping_add(a).wrapping_add(MD5_K[i]).wrapping_add(m[g]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(f.rotate_left(MD5_S[i]));
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    m.zeroize();
}

/// Intermediate hash state of one of the supported HMAC digests
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HashState {
    Md5([u32; 4]),
    Sha1([u32; 5]),
    Sha256([u32; 8]),
    Sha512([u64; 8]),
}

impl HashState {
    /// Initial value for `mac`
    pub(crate) const fn initial(mac: HwMac) -> Self {
        match mac {
            HwMac::Md5 => Self::Md5(MD5_IV),
            HwMac::Sha1 => Self::Sha1(SHA1_IV),
            HwMac::Sha2_256 => Self::Sha256(SHA256_IV),
            HwMac::Sha2_384 => Self::Sha512(SHA384_IV),
            HwMac::Sha2_512 => Self::Sha512(SHA512_IV),
        }
    }

    /// Compression block size in bytes
    pub(crate) const fn block_len(&self) -> usize {
        match self {
            Self::Md5(_) | Self::Sha1(_) | Self::Sha256(_) => 64,
            Self::Sha512(_) => 128,
        }
    }

    /// Absorb exactly one block
    pub(crate) fn compress(&mut self, block: &[u8]) {
        debug_assert_eq!(block.len(), self.block_len());

        match self {
            Self::Md5(state) => md5_compress(state, block),
            Self::Sha1(state) => {
                sha1::compress(state, core::slice::from_ref(GenericArray::from_slice(block)));
            },
            Self::Sha256(state) => {
                sha2::compress256(state, core::slice::from_ref(GenericArray::from_slice(block)));
            },
            Self::Sha512(state) => {
                sha2::compress512(state, core::slice::from_ref(GenericArray::from_slice(block)));
            },
        }
    }

    /// Serialize the state as the accelerator expects it; returns the
    /// number of bytes written
    pub(crate) fn write_to(&self, out: &mut [u8]) -> usize {
        match self {
            Self::Md5(state) => write_words(out, state, u32::to_le_bytes),
            Self::Sha1(state) => write_words(out, state, u32::to_be_bytes),
            Self::Sha256(state) => write_words(out, state, u32::to_be_bytes),
            Self::Sha512(state) => write_words(out, state, u64::to_be_bytes),
        }
    }
}

impl Zeroize for HashState {
    fn zeroize(&mut self) {
        match self {
            Self::Md5(state) => state.zeroize(),
            Self::Sha1(state) => state.zeroize(),
            Self::Sha256(state) => state.zeroize(),
            Self::Sha512(state) => state.zeroize(),
        }
    }
}

fn write_words<W: Copy, const N: usize>(
    out: &mut [u8],
    words: &[W],
    to_bytes: impl Fn(W) -> [u8; N],
) -> usize {
    let mut written = 0;
    for (chunk, word) in out.chunks_exact_mut(N).zip(words) {
        chunk.copy_from_slice(&to_bytes(*word));
        written += N;
    }
    written
}

/// Precomputed opad/ipad states for one HMAC key
///
/// Holds key-equivalent material and is wiped on drop.
pub struct HmacPads([u8; MAX_OPAD_IPAD_LEN]);

impl HmacPads {
    /// Precompute the outer and inner states of `mac` keyed with `key`.
    ///
    /// `key` must not exceed the digest's block size; validated HMAC keys
    /// are at most 48 bytes.
    #[must_use]
    pub fn compute(mac: HwMac, key: &[u8]) -> Self {
        let mut pads = [0u8; MAX_OPAD_IPAD_LEN];
        let mut block = [0u8; 128];

        for (pad_byte, offset) in [(OPAD_BYTE, 0), (IPAD_BYTE, IPAD_OFFSET)] {
            let mut state = HashState::initial(mac);
            let block_len = state.block_len();
            debug_assert!(key.len() <= block_len);

            let block = &mut block[..block_len];
            block.fill(pad_byte);
            for (b, k) in block.iter_mut().zip(key) {
                *b ^= k;
            }

            state.compress(block);
            state.write_to(&mut pads[offset..offset + IPAD_OFFSET]);
            state.zeroize();
        }

        block.zeroize();
        Self(pads)
    }

    /// The full 128-byte pad field, opad state first
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; MAX_OPAD_IPAD_LEN] {
        &self.0
    }

    /// Outer (opad) state bytes
    #[must_use]
    pub fn opad_state(&self) -> &[u8] {
        &self.0[..IPAD_OFFSET]
    }

    /// Inner (ipad) state bytes
    #[must_use]
    pub fn ipad_state(&self) -> &[u8] {
        &self.0[IPAD_OFFSET..]
    }
}

impl Drop for HmacPads {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
