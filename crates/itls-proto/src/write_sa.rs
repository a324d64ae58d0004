//! Write-direction (encrypt/generate) SA image.
//!
//! 224 bytes. The header, selector and key/IV words match the read image;
//! the protocol region holds the HMAC pads (TLS 1.2 / DTLS 1.2 only) and the
//! running sequence number the hardware increments per record.

use core::{fmt, mem::offset_of};

use zerocopy::{
    FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout, byteorder::little_endian::U64,
};

use crate::{
    constants::{MAX_KEY_IV_LEN, MAX_OPAD_IPAD_LEN},
    errors::{LayoutError, Result},
    select::HwVersion,
    word::{SaWord0, SaWord2},
};

const WRITE_REGION_LEN: usize = 144;

/// Protocol region of a TLS 1.2 / DTLS 1.2 write SA
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls12WriteRegion {
    /// Precomputed HMAC outer/inner states
    pub opad_ipad: [u8; MAX_OPAD_IPAD_LEN],
    hw_ctx: U64,
    /// Sequence number of the last record sent
    pub seq_num: U64,
}

/// Protocol region of a TLS 1.3 write SA
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct Tls13WriteRegion {
    hw_ctx: U64,
    /// Sequence number of the last record sent
    pub seq_num: U64,
    rsvd: [u8; WRITE_REGION_LEN - 16],
}

/// Version-tagged view of the write protocol region
pub enum WriteRegion<'a> {
    /// TLS 1.2 and DTLS 1.2 layout
    Tls12(&'a Tls12WriteRegion),
    /// TLS 1.3 layout
    Tls13(&'a Tls13WriteRegion),
}

/// Mutable version-tagged view of the write protocol region
pub enum WriteRegionMut<'a> {
    /// TLS 1.2 and DTLS 1.2 layout
    Tls12(&'a mut Tls12WriteRegion),
    /// TLS 1.3 layout
    Tls13(&'a mut Tls13WriteRegion),
}

/// Write SA image, exactly as the accelerator consumes it
#[repr(C)]
#[derive(Clone, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct WriteSa {
    w0: U64,
    w1: U64,
    w2: U64,
    w3: U64,
    cipher_key: [u8; MAX_KEY_IV_LEN],
    region: [u8; WRITE_REGION_LEN],
}

const _: () = assert!(size_of::<Tls12WriteRegion>() == WRITE_REGION_LEN);
const _: () = assert!(size_of::<Tls13WriteRegion>() == WRITE_REGION_LEN);
const _: () = assert!(size_of::<WriteSa>() == WriteSa::SIZE);

impl WriteSa {
    /// Size of the image in bytes
    pub const SIZE: usize = 224;

    /// Byte offset of the TLS 1.2 / DTLS 1.2 hardware-managed region
    pub const TLS12_CTX_OFFSET: usize =
        offset_of!(WriteSa, region) + offset_of!(Tls12WriteRegion, hw_ctx);

    /// Byte offset of the TLS 1.3 hardware-managed region
    pub const TLS13_CTX_OFFSET: usize =
        offset_of!(WriteSa, region) + offset_of!(Tls13WriteRegion, hw_ctx);

    /// Byte offset of the key/IV field
    pub const KEY_OFFSET: usize = offset_of!(WriteSa, cipher_key);

    /// Fresh all-zero image
    #[must_use]
    pub fn zeroed() -> Self {
        <Self as FromZeros>::new_zeroed()
    }

    /// View raw context memory as a write SA (zero-copy)
    ///
    /// # Errors
    ///
    /// `LayoutError::ImageTooShort` if `bytes` holds fewer than
    /// [`WriteSa::SIZE`] bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        Self::ref_from_prefix(bytes)
            .map(|(sa, _)| sa)
            .map_err(|_| LayoutError::ImageTooShort { expected: Self::SIZE, actual: bytes.len() })
    }

    /// Mutable view of raw context memory as a write SA (zero-copy)
    ///
    /// # Errors
    ///
    /// `LayoutError::ImageTooShort` if `bytes` holds fewer than
    /// [`WriteSa::SIZE`] bytes.
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
    pub fn region(&self) -> Result<WriteRegion<'_>> {
        let bits = self.word2().version_bits();
        match HwVersion::from_bits(bits) {
            Some(HwVersion::Tls13) => Ok(WriteRegion::Tls13(
                Tls13WriteRegion::ref_from_bytes(&self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            Some(_) => Ok(WriteRegion::Tls12(
                Tls12WriteRegion::ref_from_bytes(&self.region)
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
    pub fn region_mut(&mut self) -> Result<WriteRegionMut<'_>> {
        let bits = self.word2().version_bits();
        match HwVersion::from_bits(bits) {
            Some(HwVersion::Tls13) => Ok(WriteRegionMut::Tls13(
                Tls13WriteRegion::mut_from_bytes(&mut self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            Some(_) => Ok(WriteRegionMut::Tls12(
                Tls12WriteRegion::mut_from_bytes(&mut self.region)
                    .ok()
                    .unwrap_or_else(|| unreachable!("region size asserted at compile time")),
            )),
            None => Err(LayoutError::UnknownVersion(bits)),
        }
    }

    /// Sequence number word, wherever the version places it
    ///
    /// # Errors
    ///
    /// `LayoutError::UnknownVersion` if the selector word does not name a
    /// known record version.
    pub fn seq_num(&self) -> Result<u64> {
        Ok(match self.region()? {
            WriteRegion::Tls12(region) => region.seq_num.get(),
            WriteRegion::Tls13(region) => region.seq_num.get(),
        })
    }

    /// Byte offset of the hardware-managed region for `version`
    #[must_use]
    pub const fn hw_ctx_offset(version: HwVersion) -> usize {
        match version {
            HwVersion::Tls13 => Self::TLS13_CTX_OFFSET,
            HwVersion::Tls12 | HwVersion::Dtls12 => Self::TLS12_CTX_OFFSET,
        }
    }

    /// Number of bytes the hardware treats as live context
    ///
    /// The TLS 1.3 context ends with the sequence number; the TLS 1.2 /
    /// DTLS 1.2 context spans the whole image.
    #[must_use]
    pub const fn ctx_len(version: HwVersion) -> usize {
        match version {
            HwVersion::Tls13 => {
                offset_of!(WriteSa, region) + offset_of!(Tls13WriteRegion, seq_num) + 8
            },
            HwVersion::Tls12 | HwVersion::Dtls12 => Self::SIZE,
        }
    }
}

impl fmt::Debug for WriteSa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteSa")
            .field("word0", &self.word0())
            .field("word2", &self.word2())
            .field("seq_num", &self.seq_num().ok())
            .field("cipher_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}
