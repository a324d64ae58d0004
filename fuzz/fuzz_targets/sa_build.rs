//! SA build fuzzer
//!
//! Decodes arbitrary bytes into session parameters and a transform chain,
//! then checks that the builder never accepts what the validator rejects
//! and that every image it produces has a well-formed header.

#![no_main]

use itls_core::{
    AcceleratorConfig, AeadAlgo, AeadXform, AuthAlgo, AuthOp, AuthXform, CipherAlgo, CipherOp,
    CipherXform, Direction, IvParams, SessionParams, TlsVersion, TransformChain, Xform, build,
    validate,
};
use libfuzzer_sys::fuzz_target;

const CIPHERS: &[CipherAlgo] = &[
    CipherAlgo::Null,
    CipherAlgo::TripleDesCbc,
    CipherAlgo::AesCbc,
    CipherAlgo::AesCtr,
    CipherAlgo::AesEcb,
    CipherAlgo::DesCbc,
];

const AUTHS: &[AuthAlgo] = &[
    AuthAlgo::Null,
    AuthAlgo::Md5Hmac,
    AuthAlgo::Sha1Hmac,
    AuthAlgo::Sha224Hmac,
    AuthAlgo::Sha256Hmac,
    AuthAlgo::Sha384Hmac,
    AuthAlgo::Sha512Hmac,
    AuthAlgo::AesXcbcMac,
];

const AEADS: &[AeadAlgo] = &[AeadAlgo::AesGcm, AeadAlgo::AesCcm, AeadAlgo::ChaCha20Poly1305];

// Long enough for the largest HMAC key
static KEY: [u8; 128] = [0xA5; 128];

struct Input<'a>(&'a [u8]);

impl Input<'_> {
    fn byte(&mut self) -> u8 {
        match self.0.split_first() {
            Some((b, rest)) => {
                self.0 = rest;
                *b
            },
            None => 0,
        }
    }

    fn pick<T: Copy>(&mut self, from: &[T]) -> T {
        from[usize::from(self.byte()) % from.len()]
    }

    fn key(&mut self) -> &'static [u8] {
        &KEY[..usize::from(self.byte()) % (KEY.len() + 1)]
    }

    fn u64(&mut self) -> u64 {
        (0..8).fold(0, |acc, _| (acc << 8) | u64::from(self.byte()))
    }
}

fn xform(input: &mut Input<'_>) -> Xform<'static> {
    let iv = IvParams { offset: u16::from(input.byte()), length: u16::from(input.byte() % 17) };
    let encrypt = input.byte() & 1 == 0;
    let cipher_op = if encrypt { CipherOp::Encrypt } else { CipherOp::Decrypt };
    let auth_op = if encrypt { AuthOp::Generate } else { AuthOp::Verify };
    match input.byte() % 3 {
        0 => Xform::Cipher(CipherXform {
            algo: input.pick(CIPHERS),
            op: cipher_op,
            key: input.key(),
            iv,
        }),
        1 => Xform::Auth(AuthXform { algo: input.pick(AUTHS), op: auth_op, key: input.key() }),
        _ => Xform::Aead(AeadXform { algo: input.pick(AEADS), op: cipher_op, key: input.key(), iv }),
    }
}

fuzz_target!(|data: &[u8]| {
    let mut input = Input(data);

    let version = input.pick(&[TlsVersion::Tls12, TlsVersion::Dtls12, TlsVersion::Tls13]);
    let direction = input.pick(&[Direction::Read, Direction::Write]);
    let mut params = SessionParams::new(version, direction);
    params.seq_no = input.u64();
    params.epoch = u16::from(input.byte()) << 8 | u16::from(input.byte());
    params.anti_replay_window = input.pick(&[0, 1, 32, 64, 100, 128, 1024, 4096, 8192]);
    params.padding_enabled = input.byte() & 1 == 1;

    let first = xform(&mut input);
    let chain = if input.byte() & 1 == 0 {
        TransformChain::single(first)
    } else {
        TransformChain::pair(first, xform(&mut input))
    };

    let verdict = validate(version, direction, params.padding_enabled, &chain);
    let Ok(staged) = build(&params, &chain, &AcceleratorConfig::default()) else {
        return;
    };

    assert!(verdict.is_ok(), "built an SA the validator rejects: {verdict:?}");
    assert_eq!(staged.direction(), direction);

    let w0 = staged.word0();
    assert!(!w0.has_reserved_bits());
    assert!(w0.ctx_size() > 0);
    assert_eq!(staged.word2().version(), Some(version.hw()));
    assert_eq!(&staged.as_bytes()[..8], &w0.to_u64().to_le_bytes());
});
