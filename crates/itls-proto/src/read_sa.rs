//! Read-direction (decrypt/verify) SA image.
//!
//! The image is a fixed 768-byte structure of little-endian 64-bit words
//! that the accelerator fetches by DMA. Words 0-9 are common to every record
//! version; the remaining 688 bytes are interpreted according to the version
//! selector in word 2:
//!
//! ```text
//! byte   0  w0   header (ctx size, hw offsets, ar_win, counters)
//! byte   8  w1   reserved
//! byte  16  w2   selectors (version, cipher, mac, aes key length)
//! byte  24  w3   reserved
//! byte  32       cipher key / IV (48 bytes)
//! byte  80       region:
//!                  TLS 1.2 / DTLS 1.2: opad/ipad (128), update ctx at 208
//!                  TLS 1.3:            update ctx at 80 (56 bytes)
//! ```

use core::{fmt, mem::offset_of};

use zerocopy::{
    FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, byteorder::little_endian::U64,
};

use crate::{
    constants::{AR_WINBITS_WORDS, MAX_KEY_IV_LEN, MAX_OPAD_IPAD_LEN},
    errors::{LayoutError, Result},
    select::HwVersion,
    word::{SaWord0, SaWord2},
};

const READ_REGION_LEN: usize = 688;

/// Hardware-updated state of a TLS 1.2 / DTLS 1.2 read context
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls12ReadCtx {
    /// Highest sequence number accepted by the anti-replay window
    pub ar_base: U64,
    /// Next expected sequence number minus one
    pub ar_valid_mask: U64,
    /// Hard lifetime counter
    pub hard_life: U64,
    /// Soft lifetime counter
    pub soft_life: U64,
    /// Octets processed
    pub mib_octs: U64,
    /// Records processed
    pub mib_pkts: U64,
    /// Anti-replay bitmap
    pub ar_winbits: [U64; AR_WINBITS_WORDS],
}

/// Protocol region of a TLS 1.2 / DTLS 1.2 read SA
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls12ReadRegion {
    /// Precomputed HMAC outer/inner states
    pub opad_ipad: [u8; MAX_OPAD_IPAD_LEN],
    /// Hardware-managed update region
    pub ctx: Tls12ReadCtx,
}

/// Hardware-updated state of a TLS 1.3 read context
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls13ReadCtx {
    rsvd0: U64,
    /// Next expected sequence number minus one
    pub ar_valid_mask: U64,
    /// Hard lifetime counter
    pub hard_life: U64,
    /// Soft lifetime counter
    pub soft_life: U64,
    /// Octets processed
    pub mib_octs: U64,
    /// Records processed
    pub mib_pkts: U64,
    rsvd1: U64,
}

/// Protocol region of a TLS 1.3 read SA
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls13ReadRegion {
    /// Hardware-managed update region
    pub ctx: Tls13ReadCtx,
    rsvd: [u8; READ_REGION_LEN - size_of::<Tls13ReadCtx>()],
}

/// Version-tagged view of the read protocol region
pub enum ReadRegion<'a> {
    /// TLS 1.2 and DTLS 1.2 layout
    Tls12(&'a Tls12ReadRegion),
    /// TLS 1.3 layout
    Tls13(&'a Tls13ReadRegion),
}

/// Mutable version-tagged view of the read protocol region
pub enum ReadRegionMut<'a> {
    /// TLS 1.2 and DTLS 1.2 layout
    Tls12(&'a mut Tls12ReadRegion),
    /// TLS 1.3 layout
    Tls13(&'a mut Tls13ReadRegion),
}

/// Read SA image, exactly as the accelerator consumes it
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct ReadSa {
    w0: U64,
    w1: U64,
    w2: U64,
    w3: U64,
    cipher_key: [u8; MAX_KEY_IV_LEN],
    region: [u8; READ_REGION_LEN],
}

const _: () = assert!(size_of::<Tls12ReadRegion>() == READ_REGION_LEN);
const _: () = assert!(size_of::<Tls13ReadRegion>() == READ_REGION_LEN);
const _: () = assert!(size_of::<ReadSa>() == ReadSa::SIZE);

impl ReadSa {
    /// Size of the image in bytes
    pub const SIZE: usize = 768;

    /// Byte offset of the TLS 1.2 / DTLS 1.2 update region
    pub const TLS12_CTX_OFFSET: usize =
        offset_of!(ReadSa, region) + offset_of!(Tls12ReadRegion, ctx);

    /// Byte offset of the TLS 1.3 update region
    pub const TLS13_CTX_OFFSET: usize =
        offset_of!(ReadSa, region) + offset_of!(Tls13ReadRegion, ctx);

    /// Byte offset of the key/IV field
    pub const KEY_OFFSET: usize = offset_of!(ReadSa, cipher_key);

    /// Fresh all-zero image
    #[must_use]
    pub fn zeroed() -> Self {
        <Self as FromZeros>::new_zeroed()
    }

    /// View raw context memory as a read SA (zero-copy)
    ///
    /// # Errors
    ///
    /// `LayoutError::ImageTooShort` if `bytes` holds fewer than
    /// [`ReadSa::SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(sa, _)| sa)
            .map_err(|_| LayoutError::ImageTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Mutable view of raw context memory as a read SA (zero-copy)
    ///
    /// # Errors
    ///
    /// `LayoutError::ImageTooShort` if `bytes` holds fewer than
    /// [`ReadSa::SIZE`] bytes.
    pub fn from_bytes_mut(bytes: &mut [u8]) -> Result<&mut Self> {
        let actual = bytes.len();
        Self::mut_from_prefix(bytes)
            .map(|(sa, _)| sa)
            .map_err(|_| LayoutError::ImageTooShort { expected: Self::SIZE, actual })
    }

    /// Reset every byte of the image to zero
    pub fn clear(&mut self) {
        self.as_mut_bytes().fill(0);
    }

    /// Header word
    #[must_use]
    pub fn word0(&self) -> SaWord0 {
        SaWord0::from_u64(self.w0.get())
    }

    /// Replace the header word
    pub fn set_word0(&mut self, word: SaWord0) {
        self.w0.set(word.to_u64());
    }

    /// Selector word
    #[must_use]
    pub fn word2(&self) -> SaWord2 {
        SaWord2::from_u64(self.w2.get())
    }

    /// Replace the selector word
    pub fn set_word2(&mut self, word: SaWord2) {
        self.w2.set(word.to_u64());
    }

    /// Key/IV field
    #[must_use]
    pub fn cipher_key(&self) -> &[u8; MAX_KEY_IV_LEN] {
        &self.cipher_key
    }

    /// Mutable key/IV field
    pub fn cipher_key_mut(&mut self) -> &mut [u8; MAX_KEY_IV_LEN] {
        &mut self.cipher_key
    }

    /// Tagged view of the protocol region
    ///
    /// # Errors
    ///
    /// `LayoutError::UnknownVersion` if the selector word does not name a
    /// known record version.
    pub fn region(&self) -> Result<ReadRegion<'_>> {
        let bits = self.word2().version_bits();
        match HwVersion::from_bits(bits) {
            Some(HwVersion::Tls13) => Ok(ReadRegion::Tls13(
                Tls13ReadRegion::ref_from_bytes(&self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            Some(_) => Ok(ReadRegion::Tls12(
                Tls12ReadRegion::ref_from_bytes(&self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            None => Err(LayoutError::UnknownVersion(bits)),
        }
    }

    /// Mutable tagged view of the protocol region
    ///
    /// # Errors
    ///
    /// `LayoutError::UnknownVersion` if the selector word does not name a
    /// known record version.
    pub fn region_mut(&mut self) -> Result<ReadRegionMut<'_>> {
        let bits = self.word2().version_bits();
        match HwVersion::from_bits(bits) {
            Some(HwVersion::Tls13) => Ok(ReadRegionMut::Tls13(
                Tls13ReadRegion::mut_from_bytes(&mut self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            Some(_) => Ok(ReadRegionMut::Tls12(
                Tls12ReadRegion::mut_from_bytes(&mut self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            None => Err(LayoutError::UnknownVersion(bits)),
        }
    }

    /// Byte offset of the hardware-managed update region for `version`
    #[must_use]
    pub const fn hw_ctx_offset(version: HwVersion) -> usize {
        match version {
            HwVersion::Tls13 => Self::TLS13_CTX_OFFSET,
            HwVersion::Tls12 | HwVersion::Dtls12 => Self::TLS12_CTX_OFFSET,
        }
    }

    /// Number of bytes the hardware treats as live context
    ///
    /// TLS 1.2 / DTLS 1.2 contexts grow with the anti-replay bitmap in use;
    /// `ar_win` is the encoded window from word 0.
    #[must_use]
    pub const fn ctx_len(version: HwVersion, ar_win: u8) -> usize {
        let base = match version {
            HwVersion::Tls13 => Self::TLS13_CTX_OFFSET + size_of::<Tls13ReadCtx>(),
            HwVersion::Tls12 | HwVersion::Dtls12 => {
                Self::TLS12_CTX_OFFSET + offset_of!(Tls12ReadCtx, ar_winbits)
            },
        };
        if ar_win == 0 { base } else { base + (1usize << (ar_win - 1)) * size_of::<u64>() }
    }
}

impl fmt::Debug for ReadSa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSa")
            .field("word0", &self.word0())
            .field("word2", &self.word2())
            .field("cipher_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
