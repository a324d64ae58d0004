//! SA image construction.
//!
//! Turns validated session parameters and a transform chain into the exact
//! byte image the accelerator expects. Builders write into a caller-provided
//! image (usually a DMA staging buffer viewed through `zerocopy`) and always
//! start by zeroing it, so no stale bytes from a previous session survive.
//!
//! # Steps
//!
//! 1. Zero the image, set the version selector
//! 2. Sequence state (`ar_valid_mask` on read, `seq_num` on write)
//! 3. Cipher/AEAD selectors and key/nonce copy
//! 4. HMAC selector and precomputed pads (non-AEAD)
//! 5. Byte-order swap of the key field and pads
//! 6. Anti-replay window (DTLS read)
//! 7. Header: context size, hardware offsets, valid bits
//!
//! The builders repeat the algorithm/key checks of the validator, so an
//! unvalidated chain can never produce a half-encoded selector.

use itls_proto::{
    AesKeyLen, HwCipher, HwIvSource, HwMac, HwVersion, ReadRegionMut, ReadSa, SaWord0, SaWord2,
    WriteRegionMut, WriteSa,
    constants::{
        AR_WIN_SIZE_MAX, AR_WIN_SIZE_MIN, CTX_HDR_SIZE, CTX_ILEN, KEY_SLOT_LEN,
        LOG_MIN_AR_WIN_SIZE, MAX_KEY_IV_LEN, ctx_units, hw_words,
    },
};
use zerocopy::IntoBytes;
use zeroize::Zeroize;

use crate::{
    byte_order::swap_words,
    config::AcceleratorConfig,
    error::{ConfigError, Result, UnsupportedFeature},
    hmac_pad::HmacPads,
    validator::auth_supported,
    xform::{
        AeadAlgo, AuthAlgo, CipherAlgo, Direction, IvSource, SessionParams, TlsVersion,
        TransformChain,
    },
};

/// DTLS sequence numbers carry the epoch in the top 16 bits
const DTLS_SEQ_MASK: u64 = 0xFFFF_FFFF_FFFF;

/// Encode an anti-replay window size for word 0.
///
/// `0` disables anti-replay. Other sizes must be a power of two between 32
/// and 4096 records and encode as `log2(window) - 5`.
///
/// # Errors
///
/// `UnsupportedFeature::AntiReplayWindow` for any other size.
pub fn encode_ar_window(window: u32) -> std::result::Result<u8, UnsupportedFeature> {
    if window == 0 {
        return Ok(0);
    }
    if !window.is_power_of_two() || !(AR_WIN_SIZE_MIN..=AR_WIN_SIZE_MAX).contains(&window) {
        return Err(UnsupportedFeature::AntiReplayWindow(window));
    }
    Ok((window.trailing_zeros() - LOG_MIN_AR_WIN_SIZE) as u8)
}

/// Header word with the context size and hardware-region offset filled in
fn header_word(ctx_size: u8, hw_ctx_offset: usize) -> SaWord0 {
    let mut w0 = SaWord0::default();
    w0.set_ctx_size(ctx_size);
    w0.set_hw_ctx_off(hw_words(hw_ctx_offset));
    w0.set_ctx_push_size(hw_words(hw_ctx_offset));
    w0.set_ctx_hdr_size(CTX_HDR_SIZE);
    w0.set_aop_valid(true);
    w0
}

/// Header word of an SA that is being torn down
///
/// Both directions use the TLS 1.2 region offset, which is the same word
/// for the read and write layouts.
#[must_use]
pub fn disabled_header() -> SaWord0 {
    debug_assert_eq!(ReadSa::TLS12_CTX_OFFSET, WriteSa::TLS12_CTX_OFFSET);
    header_word(CTX_ILEN, ReadSa::TLS12_CTX_OFFSET)
}

/// Reset `sa` to the disabled read image
pub fn build_disabled_read(sa: &mut ReadSa) {
    sa.clear();
    sa.set_word0(disabled_header());
}

/// Reset `sa` to the disabled write image
pub fn build_disabled_write(sa: &mut WriteSa) {
    sa.clear();
    sa.set_word0(disabled_header());
}

/// Fill selectors and the key/IV field; returns the HMAC pads to place in
/// the TLS 1.2 region, if the chain uses HMAC.
fn fill_key_material(
    key_field: &mut [u8; MAX_KEY_IV_LEN],
    w2: &mut SaWord2,
    params: &SessionParams,
    chain: &TransformChain<'_>,
) -> Result<Option<HmacPads>> {
    if let Some(aead) = chain.aead() {
        let key_len = aead.key.len();
        let (cipher, aes_len) = match (aead.algo, key_len) {
            (AeadAlgo::AesGcm, 16) => (HwCipher::AesGcm, AesKeyLen::Aes128),
            (AeadAlgo::AesGcm, 32) => (HwCipher::AesGcm, AesKeyLen::Aes256),
            (AeadAlgo::ChaCha20Poly1305, 32) => (HwCipher::ChachaPoly, AesKeyLen::Aes256),
            (algo, key_len) => return Err(ConfigError::AeadKey { algo, key_len }.into()),
        };
        w2.set_cipher(cipher);
        w2.set_aes_key_len(aes_len);

        let nonce_len = params.nonce_len();
        key_field[..key_len].copy_from_slice(aead.key);
        key_field[KEY_SLOT_LEN..KEY_SLOT_LEN + nonce_len]
            .copy_from_slice(&params.implicit_nonce[..nonce_len]);
        swap_words(key_field);
        return Ok(None);
    }

    if params.version == TlsVersion::Tls13 {
        return Err(ConfigError::Tls13RequiresAead.into());
    }

    if let Some(cipher) = chain.cipher() {
        let key_len = cipher.key.len();
        let selected = match (cipher.algo, key_len) {
            (CipherAlgo::Null, 0) => None,
            (CipherAlgo::TripleDesCbc, 24) => Some((HwCipher::TripleDes, None)),
            (CipherAlgo::AesCbc, 16) => Some((HwCipher::AesCbc, Some(AesKeyLen::Aes128))),
            (CipherAlgo::AesCbc, 32) => Some((HwCipher::AesCbc, Some(AesKeyLen::Aes256))),
            (algo, key_len) => return Err(ConfigError::CipherKey { algo, key_len }.into()),
        };
        if let Some((hw, aes_len)) = selected {
            w2.set_cipher(hw);
            if let Some(aes_len) = aes_len {
                w2.set_aes_key_len(aes_len);
            }
            key_field[..key_len].copy_from_slice(cipher.key);
        }
    }

    let Some(auth) = chain.auth() else {
        return Err(ConfigError::ChainShape { direction: params.direction, shape: "cipher" }.into());
    };
    let key_len = auth.key.len();
    let mac = match auth.algo {
        AuthAlgo::Md5Hmac => HwMac::Md5,
        AuthAlgo::Sha1Hmac => HwMac::Sha1,
        AuthAlgo::Sha256Hmac => HwMac::Sha2_256,
        AuthAlgo::Sha384Hmac => HwMac::Sha2_384,
        algo => return Err(ConfigError::AuthKey { algo, key_len }.into()),
    };
    if !auth_supported(auth.algo, key_len) {
        return Err(ConfigError::AuthKey { algo: auth.algo, key_len }.into());
    }
    w2.set_mac(mac);

    swap_words(key_field);
    Ok(Some(HmacPads::compute(mac, auth.key)))
}

/// Build a read (decrypt/verify) SA into `sa`.
///
/// # Errors
///
/// - `InvalidConfig` for algorithms or key lengths the device cannot encode,
///   or an out-of-range `config`
/// - `Unsupported` for a DTLS anti-replay window without an encoding
///
/// On error the contents of `sa` are unspecified but contain no key
/// material.
pub fn build_read_into(
    sa: &mut ReadSa,
    params: &SessionParams,
    chain: &TransformChain<'_>,
    config: &AcceleratorConfig,
) -> Result<()> {
    config.validate()?;
    let version = params.version.hw();

    let ar_win = if version == HwVersion::Dtls12 {
        encode_ar_window(params.anti_replay_window)?
    } else {
        0
    };

    sa.clear();
    let mut w2 = SaWord2::default();
    w2.set_version(version);

    let pads = match fill_key_material(sa.cipher_key_mut(), &mut w2, params, chain) {
        Ok(pads) => pads,
        Err(e) => {
            sa.clear();
            return Err(e);
        },
    };
    sa.set_word2(w2);

    match sa.region_mut() {
        Ok(ReadRegionMut::Tls12(region)) => {
            if let Some(pads) = &pads {
                region.opad_ipad.copy_from_slice(pads.as_bytes());
                swap_words(&mut region.opad_ipad);
            }
            if version == HwVersion::Tls12 {
                region.ctx.ar_valid_mask.set(params.seq_no.wrapping_sub(1));
            }
        },
        Ok(ReadRegionMut::Tls13(region)) => {
            region.ctx.ar_valid_mask.set(params.seq_no.wrapping_sub(1));
        },
        Err(_) => unreachable!("version selector written above"),
    }

    let ctx_size = ctx_units(ReadSa::ctx_len(version, ar_win)).max(config.min_context_size);
    let mut w0 = header_word(ctx_size, ReadSa::hw_ctx_offset(version));
    w0.set_ar_win(ar_win);
    sa.set_word0(w0);

    debug_assert!(!sa.word0().has_reserved_bits());
    debug_assert_eq!(sa.word0().hw_ctx_off(), sa.word0().ctx_push_size());
    Ok(())
}

/// Build a write (encrypt/generate) SA into `sa`.
///
/// # Errors
///
/// - `InvalidConfig` for algorithms or key lengths the device cannot encode,
///   or an out-of-range `config`
/// - `Unsupported` for an SA-sourced IV on TLS 1.2 / DTLS 1.2 when
///   `config.allow_sa_iv_source` is off
///
/// On error the contents of `sa` are unspecified but contain no key
/// material.
pub fn build_write_into(
    sa: &mut WriteSa,
    params: &SessionParams,
    chain: &TransformChain<'_>,
    config: &AcceleratorConfig,
) -> Result<()> {
    config.validate()?;
    let version = params.version.hw();

    let iv_source = match params.iv_source {
        IvSource::FromAssociation if version.uses_tls12_layout() => {
            if !config.allow_sa_iv_source {
                return Err(UnsupportedFeature::SaIvSource.into());
            }
            HwIvSource::FromSa
        },
        _ => HwIvSource::Default,
    };

    sa.clear();
    let mut w2 = SaWord2::default();
    w2.set_version(version);
    w2.set_iv_source(iv_source);

    let pads = match fill_key_material(sa.cipher_key_mut(), &mut w2, params, chain) {
        Ok(pads) => pads,
        Err(e) => {
            sa.clear();
            return Err(e);
        },
    };
    sa.set_word2(w2);

    let seq_num = match version {
        HwVersion::Dtls12 => {
            ((u64::from(params.epoch) << 48) | (params.seq_no & DTLS_SEQ_MASK)).wrapping_sub(1)
        },
        HwVersion::Tls12 | HwVersion::Tls13 => params.seq_no.wrapping_sub(1),
    };

    match sa.region_mut() {
        Ok(WriteRegionMut::Tls12(region)) => {
            if let Some(pads) = &pads {
                region.opad_ipad.copy_from_slice(pads.as_bytes());
                swap_words(&mut region.opad_ipad);
            }
            region.seq_num.set(seq_num);
        },
        Ok(WriteRegionMut::Tls13(region)) => region.seq_num.set(seq_num),
        Err(_) => unreachable!("version selector written above"),
    }

    let ctx_size = ctx_units(WriteSa::ctx_len(version)).max(config.min_context_size);
    sa.set_word0(header_word(ctx_size, WriteSa::hw_ctx_offset(version)));

    debug_assert!(!sa.word0().has_reserved_bits());
    Ok(())
}

/// A fully built SA image waiting to be written to the device
///
/// Boxed so it can be handed around without copying; wiped on drop.
pub enum StagedSa {
    /// Read-direction image
    Read(Box<ReadSa>),
    /// Write-direction image
    Write(Box<WriteSa>),
}

impl StagedSa {
    /// Direction of the staged image
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Read(_) => Direction::Read,
            Self::Write(_) => Direction::Write,
        }
    }

    /// Raw image bytes
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Read(sa) => sa.as_bytes(),
            Self::Write(sa) => sa.as_bytes(),
        }
    }

    /// Header word
    #[must_use]
    pub fn word0(&self) -> SaWord0 {
        match self {
            Self::Read(sa) => sa.word0(),
            Self::Write(sa) => sa.word0(),
        }
    }

    /// Selector word
    #[must_use]
    pub fn word2(&self) -> SaWord2 {
        match self {
            Self::Read(sa) => sa.word2(),
            Self::Write(sa) => sa.word2(),
        }
    }
}

impl Drop for StagedSa {
    fn drop(&mut self) {
        match self {
            Self::Read(sa) => sa.as_mut_bytes().zeroize(),
            Self::Write(sa) => sa.as_mut_bytes().zeroize(),
        }
    }
}

/// Build the SA for `params.direction` into a fresh heap image.
///
/// # Errors
///
/// Same as [`build_read_into`] / [`build_write_into`].
pub fn build(
    params: &SessionParams,
    chain: &TransformChain<'_>,
    config: &AcceleratorConfig,
) -> Result<StagedSa> {
    match params.direction {
        Direction::Read => {
            let mut sa = Box::new(ReadSa::zeroed());
            build_read_into(&mut sa, params, chain, config)?;
            Ok(StagedSa::Read(sa))
        },
        Direction::Write => {
            let mut sa = Box::new(WriteSa::zeroed());
            build_write_into(&mut sa, params, chain, config)?;
            Ok(StagedSa::Write(sa))
        },
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use itls_proto::{ReadRegion, WriteRegion};

    use super::*;
    use crate::xform::{AeadXform, AuthOp, AuthXform, CipherOp, CipherXform, IvParams, Xform};

    fn gcm_chain(op: CipherOp, key: &[u8]) -> TransformChain<'_> {
        TransformChain::single(Xform::Aead(AeadXform {
            algo: AeadAlgo::AesGcm,
            op,
            key,
            iv: IvParams { offset: 0, length: 12 },
        }))
    }

    fn cbc_sha384<'a>(
        direction: Direction,
        cipher_key: &'a [u8],
        auth_key: &'a [u8],
    ) -> TransformChain<'a> {
        let (cipher_op, auth_op) = match direction {
            Direction::Read => (CipherOp::Decrypt, AuthOp::Verify),
            Direction::Write => (CipherOp::Encrypt, AuthOp::Generate),
        };
        let cipher = Xform::Cipher(CipherXform {
            algo: CipherAlgo::AesCbc,
            op: cipher_op,
            key: cipher_key,
            iv: IvParams::default(),
        });
        let auth =
            Xform::Auth(AuthXform { algo: AuthAlgo::Sha384Hmac, op: auth_op, key: auth_key });
        match direction {
            Direction::Read => TransformChain::pair(cipher, auth),
            Direction::Write => TransformChain::pair(auth, cipher),
        }
    }

    /// Device layout of `bytes`: each 8-byte unit reversed
    fn word_swapped(bytes: &[u8]) -> Vec<u8> {
        bytes.chunks_exact(8).flat_map(|unit| unit.iter().rev().copied()).collect()
    }

    #[test]
    fn ar_window_encoding() {
        assert_eq!(encode_ar_window(0), Ok(0));
        assert_eq!(encode_ar_window(32), Ok(0));
        assert_eq!(encode_ar_window(64), Ok(1));
        assert_eq!(encode_ar_window(1024), Ok(5));
        assert_eq!(encode_ar_window(4096), Ok(7));
        assert_eq!(encode_ar_window(100), Err(UnsupportedFeature::AntiReplayWindow(100)));
        assert_eq!(encode_ar_window(16), Err(UnsupportedFeature::AntiReplayWindow(16)));
        assert_eq!(encode_ar_window(8192), Err(UnsupportedFeature::AntiReplayWindow(8192)));
    }

    #[test]
    fn disabled_header_image() {
        let mut sa = WriteSa::zeroed();
        sa.cipher_key_mut().fill(0xFF);
        build_disabled_write(&mut sa);
        assert_snapshot!(hex::encode(&sa.as_bytes()[..8]), @"0034000000001a15");
        assert!(sa.as_bytes()[8..].iter().all(|b| *b == 0));

        let mut sa = ReadSa::zeroed();
        build_disabled_read(&mut sa);
        assert_eq!(sa.word0(), disabled_header());
    }

    #[test]
    fn tls13_gcm_write_image() {
        let key: Vec<u8> = (1..=16).collect();
        let mut params = SessionParams::new(TlsVersion::Tls13, Direction::Write);
        params.seq_no = 1;
        params.implicit_nonce = [0xAA; 12];

        let mut sa = WriteSa::zeroed();
        build_write_into(
            &mut sa,
            &params,
            &gcm_chain(CipherOp::Encrypt, &key),
            &AcceleratorConfig::default(),
        )
        .unwrap();

        let w0 = sa.word0();
        assert_eq!(w0.ctx_size(), 1);
        assert_eq!(w0.hw_ctx_off(), 10);
        assert_eq!(w0.ctx_push_size(), 10);
        assert_eq!(sa.word2().cipher(), Some(HwCipher::AesGcm));
        assert_eq!(sa.word2().aes_key_len(), Some(AesKeyLen::Aes128));
        assert_eq!(sa.seq_num(), Ok(0));

        // First key word is stored byte-reversed
        assert_eq!(&sa.cipher_key()[..8], &[8, 7, 6, 5, 4, 3, 2, 1]);
        // 12-byte nonce lands in the IV segment, swapped with the rest
        assert_eq!(&sa.cipher_key()[KEY_SLOT_LEN..KEY_SLOT_LEN + 8], &[0xAA; 8]);
        assert_eq!(&sa.cipher_key()[KEY_SLOT_LEN + 8..], &[0, 0, 0, 0, 0xAA, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn dtls_write_packs_epoch() {
        let key = [0u8; 32];
        let mut params = SessionParams::new(TlsVersion::Dtls12, Direction::Write);
        params.epoch = 2;
        params.seq_no = 0x0001_0000_0000_0005;

        let mut sa = WriteSa::zeroed();
        build_write_into(
            &mut sa,
            &params,
            &gcm_chain(CipherOp::Encrypt, &key),
            &AcceleratorConfig::default(),
        )
        .unwrap();
        assert_eq!(sa.seq_num(), Ok(0x0002_0000_0000_0004));
        assert_eq!(sa.word0().ctx_size(), 1);
        assert_eq!(sa.word0().hw_ctx_off(), 26);
    }

    #[test]
    fn seq_no_zero_wraps() {
        let key = [0u8; 16];
        let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
        let mut sa = WriteSa::zeroed();
        build_write_into(
            &mut sa,
            &params,
            &gcm_chain(CipherOp::Encrypt, &key),
            &AcceleratorConfig::default(),
        )
        .unwrap();
        assert_eq!(sa.seq_num(), Ok(u64::MAX));
    }

    #[test]
    fn dtls_read_window_grows_context() {
        let auth_key = [0x22u8; 20];
        let cipher_key = [0x33u8; 16];
        let chain = TransformChain::pair(
            Xform::Cipher(CipherXform {
                algo: CipherAlgo::AesCbc,
                op: CipherOp::Decrypt,
                key: &cipher_key,
                iv: IvParams::default(),
            }),
            Xform::Auth(AuthXform { algo: AuthAlgo::Sha1Hmac, op: AuthOp::Verify, key: &auth_key }),
        );
        let mut params = SessionParams::new(TlsVersion::Dtls12, Direction::Read);
        params.anti_replay_window = 4096;

        let mut sa = ReadSa::zeroed();
        build_read_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();

        let w0 = sa.word0();
        assert_eq!(w0.ar_win(), 7);
        assert_eq!(w0.ctx_size(), 5);
        assert_eq!(w0.hw_ctx_off(), 26);
        assert_eq!(sa.word2().mac(), Some(HwMac::Sha1));
        assert_eq!(sa.word2().cipher(), Some(HwCipher::AesCbc));

        let Ok(ReadRegion::Tls12(region)) = sa.region() else {
            panic!("expected TLS 1.2 region");
        };
        // DTLS leaves the valid mask to the hardware
        assert_eq!(region.ctx.ar_valid_mask.get(), 0);
        assert!(region.opad_ipad.iter().any(|b| *b != 0));
    }

    #[test]
    fn unencodable_window_rejected_before_touching_image() {
        let key = [0u8; 16];
        let mut params = SessionParams::new(TlsVersion::Dtls12, Direction::Read);
        params.anti_replay_window = 100;

        let mut sa = ReadSa::zeroed();
        sa.cipher_key_mut()[0] = 0x77;
        let err = build_read_into(
            &mut sa,
            &params,
            &gcm_chain(CipherOp::Decrypt, &key),
            &AcceleratorConfig::default(),
        );
        assert_eq!(err, Err(UnsupportedFeature::AntiReplayWindow(100).into()));
        assert_eq!(sa.cipher_key()[0], 0x77);
    }

    #[test]
    fn sa_iv_source_gated_by_config() {
        let key = [0u8; 16];
        let mut params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
        params.iv_source = IvSource::FromAssociation;
        let chain = gcm_chain(CipherOp::Encrypt, &key);

        let mut sa = WriteSa::zeroed();
        assert_eq!(
            build_write_into(&mut sa, &params, &chain, &AcceleratorConfig::default()),
            Err(UnsupportedFeature::SaIvSource.into())
        );

        let config = AcceleratorConfig { allow_sa_iv_source: true, ..Default::default() };
        build_write_into(&mut sa, &params, &chain, &config).unwrap();
        assert_eq!(sa.word2().iv_source(), HwIvSource::FromSa);

        // TLS 1.3 ignores the request
        params.version = TlsVersion::Tls13;
        build_write_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();
        assert_eq!(sa.word2().iv_source(), HwIvSource::Default);
    }

    #[test]
    fn null_cipher_leaves_selector_zero() {
        let auth_key = [0x44u8; 32];
        let chain = TransformChain::pair(
            Xform::Auth(AuthXform {
                algo: AuthAlgo::Sha256Hmac,
                op: AuthOp::Generate,
                key: &auth_key,
            }),
            Xform::Cipher(CipherXform {
                algo: CipherAlgo::Null,
                op: CipherOp::Encrypt,
                key: &[],
                iv: IvParams::default(),
            }),
        );
        let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);

        let staged = build(&params, &chain, &AcceleratorConfig::default()).unwrap();
        assert_eq!(staged.direction(), Direction::Write);
        assert_eq!(staged.word2().cipher(), None);
        assert_eq!(staged.word2().mac(), Some(HwMac::Sha2_256));
        assert!(staged.as_bytes()[32..80].iter().all(|b| *b == 0));
    }

    #[test]
    fn min_context_size_clamps_up() {
        let key = [0u8; 32];
        let params = SessionParams::new(TlsVersion::Tls13, Direction::Read);
        let config = AcceleratorConfig { min_context_size: 3, ..Default::default() };

        let staged = build(&params, &gcm_chain(CipherOp::Decrypt, &key), &config).unwrap();
        assert_eq!(staged.word0().ctx_size(), 3);
    }

    #[test]
    fn sha384_pads_swapped_across_whole_field() {
        let cipher_key = [0x11u8; 32];
        let auth_key: Vec<u8> = (0..48).collect();
        let expected = word_swapped(HmacPads::compute(HwMac::Sha2_384, &auth_key).as_bytes());
        assert_eq!(expected.len(), 128);
        // SHA-384 states fill both halves, so every unit carries state
        assert!(expected.chunks_exact(8).all(|unit| unit.iter().any(|b| *b != 0)));

        let params = SessionParams::new(TlsVersion::Tls12, Direction::Read);
        let chain = cbc_sha384(Direction::Read, &cipher_key, &auth_key);
        let mut sa = ReadSa::zeroed();
        build_read_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();
        let Ok(ReadRegion::Tls12(region)) = sa.region() else {
            panic!("expected TLS 1.2 region");
        };
        assert_eq!(&region.opad_ipad[..], &expected[..]);

        let params = SessionParams::new(TlsVersion::Dtls12, Direction::Write);
        let chain = cbc_sha384(Direction::Write, &cipher_key, &auth_key);
        let mut sa = WriteSa::zeroed();
        build_write_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();
        let Ok(WriteRegion::Tls12(region)) = sa.region() else {
            panic!("expected TLS 1.2 region");
        };
        assert_eq!(&region.opad_ipad[..], &expected[..]);
    }

    #[test]
    fn cbc_keys_swapped_per_word() {
        let des_key: Vec<u8> = (1..=24).collect();
        let sha1_key = [0x22u8; 20];
        let chain = TransformChain::pair(
            Xform::Cipher(CipherXform {
                algo: CipherAlgo::TripleDesCbc,
                op: CipherOp::Decrypt,
                key: &des_key,
                iv: IvParams::default(),
            }),
            Xform::Auth(AuthXform { algo: AuthAlgo::Sha1Hmac, op: AuthOp::Verify, key: &sha1_key }),
        );
        let params = SessionParams::new(TlsVersion::Tls12, Direction::Read);
        let mut sa = ReadSa::zeroed();
        build_read_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();

        assert_eq!(&sa.cipher_key()[..24], &word_swapped(&des_key)[..]);
        assert_eq!(&sa.cipher_key()[16..24], &[24, 23, 22, 21, 20, 19, 18, 17]);
        assert!(sa.cipher_key()[24..].iter().all(|b| *b == 0));

        let aes_key: Vec<u8> = (0x41..=0x60).collect();
        let auth_key = [0x33u8; 48];
        let params = SessionParams::new(TlsVersion::Tls12, Direction::Write);
        let chain = cbc_sha384(Direction::Write, &aes_key, &auth_key);
        let mut sa = WriteSa::zeroed();
        build_write_into(&mut sa, &params, &chain, &AcceleratorConfig::default()).unwrap();

        assert_eq!(sa.word2().aes_key_len(), Some(AesKeyLen::Aes256));
        assert_eq!(&sa.cipher_key()[..32], &word_swapped(&aes_key)[..]);
        assert_eq!(&sa.cipher_key()[24..32], &[0x60, 0x5F, 0x5E, 0x5D, 0x5C, 0x5B, 0x5A, 0x59]);
        assert!(sa.cipher_key()[32..].iter().all(|b| *b == 0));
    }
}
