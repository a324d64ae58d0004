//! Transform legality checks.
//!
//! [`validate`] is pure: it looks only at caller data and runs before any
//! allocation or hardware access. Everything the device accepts is listed in
//! the static tables below; anything not listed is rejected.

use crate::{
    error::ConfigError,
    xform::{
        AeadAlgo, AeadXform, AuthAlgo, AuthOp, AuthXform, CipherAlgo, CipherOp, CipherXform,
        Direction, TlsVersion, TransformChain, Xform,
    },
};

/// Cipher algorithms and their accepted key lengths
static CIPHER_KEY_LENS: &[(CipherAlgo, &[usize])] = &[
    (CipherAlgo::Null, &[0]),
    (CipherAlgo::TripleDesCbc, &[24]),
    (CipherAlgo::AesCbc, &[16, 32]),
];

/// HMAC algorithms and their required key length
static AUTH_KEY_LENS: &[(AuthAlgo, usize)] = &[
    (AuthAlgo::Md5Hmac, 16),
    (AuthAlgo::Sha1Hmac, 20),
    (AuthAlgo::Sha256Hmac, 32),
    (AuthAlgo::Sha384Hmac, 48),
];

/// AEAD algorithms and their accepted key lengths
static AEAD_KEY_LENS: &[(AeadAlgo, &[usize])] =
    &[(AeadAlgo::AesGcm, &[16, 32]), (AeadAlgo::ChaCha20Poly1305, &[32])];

/// HMAC algorithms each cipher may be combined with
static PAIRINGS: &[(CipherAlgo, &[AuthAlgo])] = &[
    (CipherAlgo::Null, &[AuthAlgo::Sha1Hmac, AuthAlgo::Sha256Hmac, AuthAlgo::Sha384Hmac]),
    (CipherAlgo::TripleDesCbc, &[AuthAlgo::Sha1Hmac]),
    (CipherAlgo::AesCbc, &[AuthAlgo::Sha1Hmac, AuthAlgo::Sha256Hmac, AuthAlgo::Sha384Hmac]),
];

fn lookup<A: PartialEq + Copy, V: Copy>(table: &[(A, V)], algo: A) -> Option<V> {
    table.iter().find(|(a, _)| *a == algo).map(|(_, v)| *v)
}

/// True if the device accepts `algo` with a `key_len`-byte key
#[must_use]
pub fn cipher_supported(algo: CipherAlgo, key_len: usize) -> bool {
    lookup(CIPHER_KEY_LENS, algo).is_some_and(|lens| lens.contains(&key_len))
}

/// True if the device accepts HMAC `algo` with a `key_len`-byte key
#[must_use]
pub fn auth_supported(algo: AuthAlgo, key_len: usize) -> bool {
    lookup(AUTH_KEY_LENS, algo) == Some(key_len)
}

/// True if the device accepts AEAD `algo` with a `key_len`-byte key
#[must_use]
pub fn aead_supported(algo: AeadAlgo, key_len: usize) -> bool {
    lookup(AEAD_KEY_LENS, algo).is_some_and(|lens| lens.contains(&key_len))
}

/// True if `cipher` may be combined with `auth`
#[must_use]
pub fn pairing_supported(cipher: CipherAlgo, auth: AuthAlgo) -> bool {
    lookup(PAIRINGS, cipher).is_some_and(|auths| auths.contains(&auth))
}

/// Check that a transform chain is legal for the given session.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found, in this order: AEAD rules (when
/// the chain leads with AEAD), TLS 1.3 AEAD-only rule, chain shape for the
/// direction, operations, cipher key, auth key, cipher/auth pairing.
pub fn validate(
    version: TlsVersion,
    direction: Direction,
    padding_enabled: bool,
    chain: &TransformChain<'_>,
) -> Result<(), ConfigError> {
    if let Some(aead) = chain.aead() {
        if chain.next().is_some() {
            return Err(ConfigError::ChainShape { direction, shape: chain_shape(chain) });
        }
        return validate_aead(version, direction, padding_enabled, aead);
    }

    if version == TlsVersion::Tls13 {
        return Err(ConfigError::Tls13RequiresAead);
    }

    let (cipher, auth) = split_chain(direction, chain)?;

    let (cipher_op, auth_op) = match direction {
        Direction::Write => (CipherOp::Encrypt, AuthOp::Generate),
        Direction::Read => (CipherOp::Decrypt, AuthOp::Verify),
    };
    if let Some(cipher) = cipher {
        if cipher.op != cipher_op {
            return Err(ConfigError::CipherOperation { direction, op: cipher.op });
        }
    }
    if auth.op != auth_op {
        return Err(ConfigError::AuthOperation { direction, op: auth.op });
    }

    if let Some(cipher) = cipher {
        if !cipher_supported(cipher.algo, cipher.key.len()) {
            return Err(ConfigError::CipherKey { algo: cipher.algo, key_len: cipher.key.len() });
        }
    }
    if !auth_supported(auth.algo, auth.key.len()) {
        return Err(ConfigError::AuthKey { algo: auth.algo, key_len: auth.key.len() });
    }

    if let Some(cipher) = cipher {
        if !pairing_supported(cipher.algo, auth.algo) {
            return Err(ConfigError::Pairing { cipher: cipher.algo, auth: auth.algo });
        }
    }

    Ok(())
}

fn validate_aead(
    version: TlsVersion,
    direction: Direction,
    padding_enabled: bool,
    aead: &AeadXform<'_>,
) -> Result<(), ConfigError> {
    if padding_enabled && version != TlsVersion::Tls13 {
        return Err(ConfigError::AeadPaddingRequiresTls13 { version });
    }

    let expected = match direction {
        Direction::Write => CipherOp::Encrypt,
        Direction::Read => CipherOp::Decrypt,
    };
    if aead.op != expected {
        return Err(ConfigError::AeadOperation { direction, op: aead.op });
    }

    if !aead_supported(aead.algo, aead.key.len()) {
        return Err(ConfigError::AeadKey { algo: aead.algo, key_len: aead.key.len() });
    }

    Ok(())
}

/// Picks the cipher and auth transforms out of a non-AEAD chain.
///
/// Write chains are `auth` or `auth->cipher`; read chains are `auth` or
/// `cipher->auth`.
fn split_chain<'c, 'a>(
    direction: Direction,
    chain: &'c TransformChain<'a>,
) -> Result<(Option<&'c CipherXform<'a>>, &'c AuthXform<'a>), ConfigError> {
    match (direction, chain.first(), chain.next()) {
        (_, Xform::Auth(auth), None) => Ok((None, auth)),
        (Direction::Write, Xform::Auth(auth), Some(Xform::Cipher(cipher)))
        | (Direction::Read, Xform::Cipher(cipher), Some(Xform::Auth(auth))) => {
            Ok((Some(cipher), auth))
        },
        _ => Err(ConfigError::ChainShape { direction, shape: chain_shape(chain) }),
    }
}

fn chain_shape(chain: &TransformChain<'_>) -> &'static str {
    use Xform::{Aead, Auth, Cipher};

    match (chain.first(), chain.next()) {
        (Cipher(_), None) => "cipher",
        (Auth(_), None) => "auth",
        (Aead(_), None) => "aead",
        (Cipher(_), Some(Cipher(_))) => "cipher->cipher",
        (Cipher(_), Some(Auth(_))) => "cipher->auth",
        (Cipher(_), Some(Aead(_))) => "cipher->aead",
        (Auth(_), Some(Cipher(_))) => "auth->cipher",
        (Auth(_), Some(Auth(_))) => "auth->auth",
        (Auth(_), Some(Aead(_))) => "auth->aead",
        (Aead(_), Some(Cipher(_))) => "aead->cipher",
        (Aead(_), Some(Auth(_))) => "aead->auth",
        (Aead(_), Some(Aead(_))) => "aead->aead",
    }
}
