//! Conversions between EdDSA and X25519 keys.
//!
//! A single key pair can then both sign and exchange keys. Using
//! one key for two protocols is safe here, but it is usually
//! cleaner to keep separate keys.
//!
//! ```rust
//! use pocket_crypto::{convert, eddsa, x25519, Seed};
//!
//! let (sk, pk) = eddsa::key_pair(Seed::from([7; 32]));
//! let x_sk = convert::from_eddsa_private(&sk);
//! let x_pk = convert::from_eddsa_public(&pk);
//! assert_eq!(x25519::public_key(&x_sk), x_pk);
//! ```

#![forbid(unsafe_code)]

use zeroize::Zeroize;

use crate::{blake2b::blake2b, eddsa, field::Fe, x25519};

/// Converts an EdDSA secret key into an X25519 secret key.
///
/// The result is the first half of the BLAKE2b hash of the seed,
/// which is the scalar EdDSA signs with, before clamping.
pub fn from_eddsa_private(sk: &eddsa::SecretKey) -> x25519::SecretKey {
    let mut seed = sk.seed();
    let mut hash = blake2b(&seed);
    seed.zeroize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash[..32]);
    hash.zeroize();
    let key = x25519::SecretKey::from(out);
    out.zeroize();
    key
}

/// Converts an EdDSA public key into an X25519 public key,
/// `u = (1 + y) / (1 - y)`.
///
/// The key is not validated. An invalid EdDSA key yields an
/// unspecified (but deterministic) X25519 key.
pub fn from_eddsa_public(pk: &eddsa::PublicKey) -> x25519::PublicKey {
    let y = Fe::from_bytes(pk.as_bytes());
    let u = Fe::ONE.add(&y).mul(&Fe::ONE.sub(&y).invert());
    x25519::PublicKey::from(u.to_bytes())
}

/// Converts an X25519 public key into an EdDSA public key,
/// `y = (u - 1) / (u + 1)`.
///
/// The u-coordinate does not determine the sign of `x`, so the
/// result always has the sign bit cleared. Only one of the two
/// EdDSA keys that map to `u` is recovered.
pub fn to_eddsa_public(pk: &x25519::PublicKey) -> eddsa::PublicKey {
    let u = Fe::from_bytes(pk.as_bytes());
    let y = u.sub(&Fe::ONE).mul(&u.add(&Fe::ONE).invert());
    eddsa::PublicKey::from(y.to_bytes())
}
