//! Selector values carried in SA word 2.
//!
//! The accelerator identifies the record version, cipher, MAC and AES key
//! size through small numeric codes. Each enum here is `#[repr(u8)]` with the
//! exact code the hardware expects, and `from_bits` is total over the field
//! width so a decoded image never panics on unknown codes.

/// Record protocol version (`version_select`, 4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HwVersion {
    /// TLS 1.2
    Tls12 = 1,
    /// DTLS 1.2
    Dtls12 = 2,
    /// TLS 1.3
    Tls13 = 3,
}

impl HwVersion {
    /// Raw selector value
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Decode a selector value, `None` for unknown codes
    #[must_use]
    pub const fn from_bits(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Tls12),
            2 => Some(Self::Dtls12),
            3 => Some(Self::Tls13),
            _ => None,
        }
    }

    /// TLS 1.2 and DTLS 1.2 share one context layout
    #[must_use]
    pub const fn uses_tls12_layout(self) -> bool {
        matches!(self, Self::Tls12 | Self::Dtls12)
    }
}

/// Cipher selector (`cipher_select`, 4 bits)
///
/// Zero means "no cipher" (NULL encryption with an HMAC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HwCipher {
    /// Triple DES in CBC mode
    TripleDes = 1,
    /// AES in CBC mode
    AesCbc = 3,
    /// AES-GCM
    AesGcm = 7,
    /// ChaCha20-Poly1305
    ChachaPoly = 9,
    /// AES-CCM (defined by the context format, never selected here)
    AesCcm = 10,
}

impl HwCipher {
    /// Raw selector value
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Decode a selector value, `None` for zero or unknown codes
    #[must_use]
    pub const fn from_bits(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::TripleDes),
            3 => Some(Self::AesCbc),
            7 => Some(Self::AesGcm),
            9 => Some(Self::ChachaPoly),
            10 => Some(Self::AesCcm),
            _ => None,
        }
    }

    /// AEAD ciphers carry no HMAC pads
    #[must_use]
    pub const fn is_aead(self) -> bool {
        matches!(self, Self::AesGcm | Self::ChachaPoly | Self::AesCcm)
    }
}

/// HMAC selector (`mac_select`, 4 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HwMac {
    /// HMAC-MD5
    Md5 = 1,
    /// HMAC-SHA1
    Sha1 = 2,
    /// HMAC-SHA2-256
    Sha2_256 = 4,
    /// HMAC-SHA2-384
    Sha2_384 = 5,
    /// HMAC-SHA2-512 (defined by the context format, never selected here)
    Sha2_512 = 6,
}

impl HwMac {
    /// Raw selector value
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Decode a selector value, `None` for zero or unknown codes
    #[must_use]
    pub const fn from_bits(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Md5),
            2 => Some(Self::Sha1),
            4 => Some(Self::Sha2_256),
            5 => Some(Self::Sha2_384),
            6 => Some(Self::Sha2_512),
            _ => None,
        }
    }
}

/// AES key size selector (`aes_key_len`, 2 bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AesKeyLen {
    /// 128-bit key
    Aes128 = 1,
    /// 256-bit key (also used for ChaCha20)
    Aes256 = 3,
}

impl AesKeyLen {
    /// Raw selector value
    #[must_use]
    pub const fn to_bits(self) -> u8 {
        self as u8
    }

    /// Decode a selector value
    #[must_use]
    pub const fn from_bits(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Aes128),
            3 => Some(Self::Aes256),
            _ => None,
        }
    }
}

/// Where the write path takes its explicit IV from (`iv_at_cptr`, 1 bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HwIvSource {
    /// Hardware generates the IV
    #[default]
    Default = 0,
    /// IV is read from the SA (debug only)
    FromSa = 1,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectors_round_trip() {
        for v in [HwVersion::Tls12, HwVersion::Dtls12, HwVersion::Tls13] {
            assert_eq!(HwVersion::from_bits(v.to_bits()), Some(v));
        }
        for c in [
            HwCipher::TripleDes,
            HwCipher::AesCbc,
            HwCipher::AesGcm,
            HwCipher::ChachaPoly,
            HwCipher::AesCcm,
        ] {
            assert_eq!(HwCipher::from_bits(c.to_bits()), Some(c));
        }
        for m in [HwMac::Md5, HwMac::Sha1, HwMac::Sha2_256, HwMac::Sha2_384, HwMac::Sha2_512] {
            assert_eq!(HwMac::from_bits(m.to_bits()), Some(m));
        }
    }

    #[test]
    fn zero_selectors_decode_to_none() {
        assert_eq!(HwVersion::from_bits(0), None);
        assert_eq!(HwCipher::from_bits(0), None);
        assert_eq!(HwMac::from_bits(0), None);
        assert_eq!(AesKeyLen::from_bits(0), None);
    }

    #[test]
    fn hardware_codes_are_stable() {
        assert_eq!(HwCipher::AesGcm.to_bits(), 7);
        assert_eq!(HwCipher::ChachaPoly.to_bits(), 9);
        assert_eq!(HwMac::Sha2_384.to_bits(), 5);
        assert_eq!(AesKeyLen::Aes256.to_bits(), 3);
    }
}
