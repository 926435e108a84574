//! Elligator 2 over Curve25519.
//!
//! Elligator maps X25519 public keys to "hidden" 32-byte
//! representatives that are indistinguishable from random bytes,
//! and back. Only about half of all public keys have a
//! representative; [`hidden_key_pair`] keeps trying until it
//! finds one.
//!
//! The public key must come from `dirty_fast` or `dirty_small`
//! (see the `hazmat` feature). Regular X25519 public keys are
//! multiples of the prime-order base point only, which an
//! attacker can detect.
//!
//! ```rust
//! use pocket_crypto::{elligator, x25519, Seed};
//!
//! let (hidden, sk) = elligator::hidden_key_pair(Seed::from([3; 32]));
//! let pk = elligator::hidden_to_curve(&hidden);
//!
//! // The hidden key works for regular key exchange.
//! let peer = x25519::SecretKey::from([4; 32]);
//! let a = x25519::x25519(&sk, &x25519::public_key(&peer));
//! let b = x25519::x25519(&peer, &pk);
//! assert_eq!(a.as_bytes(), b.as_bytes());
//! ```

#![forbid(unsafe_code)]

use subtle::{Choice, ConditionallyNegatable, ConditionallySelectable};
use zeroize::Zeroize;

use crate::{
    chacha20::chacha20,
    field::{A, Fe},
    keys::public_bytes,
    x25519, Seed,
};

public_bytes! {
    /// A representative of an X25519 public key.
    pub Hidden(32),
}

/// The public key has no representative.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("public key has no Elligator representative")]
pub struct Unrepresentable;

/// Maps a representative to its X25519 public key.
///
/// Every 32-byte string is a valid input. The top two bits are
/// ignored, so four representatives map to each point.
pub fn hidden_to_curve(hidden: &Hidden) -> x25519::PublicKey {
    let mut bytes = hidden.to_bytes();
    bytes[31] &= 0x3f;
    let r = Fe::from_bytes(&bytes);

    // w = 1 + 2r^2 is never zero because 2 is not a square.
    let w = Fe::ONE.add(&r.square().mul(&Fe::small(2)));
    let u1 = A.neg().mul(&w.invert());
    let u2 = A.neg().sub(&u1);

    // g(u) = u^3 + A u^2 + u. Exactly one of g(u1) and g(u2) is
    // a square.
    let g = u1.square().mul(&u1.add(&A)).add(&u1);
    let (is_square, _) = Fe::sqrt_ratio_i(&g, &Fe::ONE);
    let u = Fe::conditional_select(&u2, &u1, is_square);
    x25519::PublicKey::from(u.to_bytes())
}

/// Maps a public key to a representative.
///
/// The low bit of `tweak` picks one of the two representatives
/// of the point and its top two bits fill the padding bits of the
/// output. The tweak should be random.
///
/// Fails for about half of all points, including `u = 0` and
/// `u = -A`. Whether a point is representable does not depend
/// on `tweak`.
pub fn curve_to_hidden(pk: &x25519::PublicKey, tweak: u8) -> Result<Hidden, Unrepresentable> {
    let u = Fe::from_bytes(pk.as_bytes());
    let t2 = u.add(&A);
    let t3 = u.mul(&t2).mul(&Fe::small(2)).neg();

    // s = 1 / sqrt(-2 u (u + A))
    let (is_square, s) = Fe::sqrt_ratio_i(&Fe::ONE, &t3);
    if !bool::from(is_square) {
        // Leaks how many tries a key pair took, which is harmless
        // when candidates are random.
        tracing::debug!("public key is not representable");
        return Err(Unrepresentable);
    }

    let t1 = Fe::conditional_select(&u, &t2, Choice::from(tweak & 1));
    let mut r = t1.mul(&s);
    let odd = r.add(&r).is_negative();
    r.conditional_negate(odd);

    let mut out = r.to_bytes();
    out[31] |= tweak & 0xc0;
    Ok(Hidden::from(out))
}

/// Generates an X25519 key pair whose public key has a
/// representative.
///
/// Returns the representative and the secret key. The public
/// key is `hidden_to_curve(&hidden)`. The seed is consumed and
/// wiped.
pub fn hidden_key_pair(seed: Seed) -> (Hidden, x25519::SecretKey) {
    let mut buf = [0u8; 64];
    buf[32..].copy_from_slice(seed.as_bytes());
    drop(seed);

    loop {
        let mut key = [0u8; 32];
        key.copy_from_slice(&buf[32..]);
        buf.fill(0);
        chacha20(&mut buf, &key, &[0; 8]);
        key.zeroize();

        let mut sk = [0u8; 32];
        sk.copy_from_slice(&buf[..32]);
        let pk = x25519::PublicKey::from(x25519::dirty_fast(&sk));
        if let Ok(hidden) = curve_to_hidden(&pk, buf[32]) {
            buf.zeroize();
            let out = x25519::SecretKey::from(sk);
            sk.zeroize();
            return (hidden, out);
        }
        sk.zeroize();
    }
}
