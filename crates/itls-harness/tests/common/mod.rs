//! Transform chains shared by the lifecycle tests.

#![allow(dead_code)]

use itls_core::{
    AeadAlgo, AeadXform, AuthAlgo, AuthOp, AuthXform, CipherAlgo, CipherOp, CipherXform,
    Direction, IvParams, TransformChain, Xform,
};

static KEY: [u8; 48] = [0x5A; 48];

fn ops(direction: Direction) -> (CipherOp, AuthOp) {
    match direction {
        Direction::Write => (CipherOp::Encrypt, AuthOp::Generate),
        Direction::Read => (CipherOp::Decrypt, AuthOp::Verify),
    }
}

/// AES-GCM with a `key_len`-byte key
pub fn gcm(direction: Direction, key_len: usize) -> TransformChain<'static> {
    TransformChain::single(Xform::Aead(AeadXform {
        algo: AeadAlgo::AesGcm,
        op: ops(direction).0,
        key: &KEY[..key_len],
        iv: IvParams { offset: 0, length: 12 },
    }))
}

/// ChaCha20-Poly1305
pub fn chacha(direction: Direction) -> TransformChain<'static> {
    TransformChain::single(Xform::Aead(AeadXform {
        algo: AeadAlgo::ChaCha20Poly1305,
        op: ops(direction).0,
        key: &KEY[..32],
        iv: IvParams { offset: 0, length: 12 },
    }))
}

/// CBC cipher plus HMAC in the order the direction requires
pub fn cbc_hmac(
    direction: Direction,
    cipher: CipherAlgo,
    cipher_len: usize,
    auth: AuthAlgo,
    auth_len: usize,
) -> TransformChain<'static> {
    let (cipher_op, auth_op) = ops(direction);
    let c = Xform::Cipher(CipherXform {
        algo: cipher,
        op: cipher_op,
        key: &KEY[..cipher_len],
        iv: IvParams { offset: 8, length: 16 },
    });
    let a = Xform::Auth(AuthXform { algo: auth, op: auth_op, key: &KEY[..auth_len] });
    match direction {
        Direction::Write => TransformChain::pair(a, c),
        Direction::Read => TransformChain::pair(c, a),
    }
}

/// HMAC only
pub fn hmac_only(direction: Direction, auth: AuthAlgo, auth_len: usize) -> TransformChain<'static> {
    TransformChain::single(Xform::Auth(AuthXform {
        algo: auth,
        op: ops(direction).1,
        key: &KEY[..auth_len],
    }))
}
