//! X25519 key exchange, as specified in RFC 7748.
//!
//! ```rust
//! use pocket_crypto::x25519::{self, SecretKey};
//!
//! let alice_sk = SecretKey::from([0x11; 32]);
//! let bob_sk = SecretKey::from([0x22; 32]);
//! let alice_pk = x25519::public_key(&alice_sk);
//! let bob_pk = x25519::public_key(&bob_sk);
//!
//! let a = x25519::key_exchange(&alice_sk, &bob_pk);
//! let b = x25519::key_exchange(&bob_sk, &alice_pk);
//! assert_eq!(a.as_bytes(), b.as_bytes());
//! ```
//!
//! The raw [`SharedSecret`] is not uniformly random and must be
//! hashed before it is used as a key. [`key_exchange`] does that
//! with HChaCha20; hashing the secret together with both public
//! keys is better still.

#![forbid(unsafe_code)]

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};
use zeroize::Zeroize;

use crate::{
    aead,
    chacha20::hchacha20,
    csprng::{Csprng, Random},
    edwards::Point,
    field::{A24, Fe},
    keys::{public_bytes, secret_bytes},
    scalar,
};

secret_bytes! {
    /// An X25519 private key.
    ///
    /// Any 32 bytes make a valid key; they are clamped when
    /// used.
    pub SecretKey(32),
    /// The raw output of [`x25519`].
    pub SharedSecret(32),
}

public_bytes! {
    /// An X25519 public key, the u-coordinate of a point.
    pub PublicKey(32),
}

impl Random for SecretKey {
    fn random<R: Csprng>(rng: &mut R) -> Self {
        Self::from_bytes(Random::random(rng))
    }
}

/// The u-coordinate of the base point.
const BASE_U: [u8; 32] = {
    let mut u = [0u8; 32];
    u[0] = 9;
    u
};

/// Computes the public key of `sk`.
pub fn public_key(sk: &SecretKey) -> PublicKey {
    PublicKey::from(scalarmult(sk.as_bytes(), &BASE_U))
}

/// Computes the raw shared secret of `sk` and `pk`.
///
/// A low-order `pk` yields an all-zero secret. Callers that
/// care (most do not) can check for it with
/// [`ct::verify32`][crate::ct::verify32].
pub fn x25519(sk: &SecretKey, pk: &PublicKey) -> SharedSecret {
    SharedSecret::from(scalarmult(sk.as_bytes(), pk.as_bytes()))
}

/// Computes the shared secret of `sk` and `pk` and hashes it
/// into a symmetric key.
///
/// The key is HChaCha20 of the raw secret with an all-zero
/// input.
pub fn key_exchange(sk: &SecretKey, pk: &PublicKey) -> aead::Key {
    let shared = x25519(sk, pk);
    aead::Key::from(hchacha20(shared.as_bytes(), &[0; 16]))
}

/// Clamps `sk` and multiplies the point `u` by it.
pub(crate) fn scalarmult(sk: &[u8; 32], u: &[u8; 32]) -> [u8; 32] {
    let mut e = scalar::trim(sk);
    let out = ladder(&e, &Fe::from_bytes(u), 255);
    e.zeroize();
    out.to_bytes()
}

/// The Montgomery ladder over the low `bits` bits of `scalar`.
pub(crate) fn ladder(scalar: &[u8; 32], u: &Fe, bits: usize) -> Fe {
    let x1 = *u;
    let mut x2 = Fe::ONE;
    let mut z2 = Fe::ZERO;
    let mut x3 = *u;
    let mut z3 = Fe::ONE;
    let mut swap = Choice::from(0);

    for t in (0..bits).rev() {
        let bit = Choice::from((scalar[t / 8] >> (t % 8)) & 1);
        swap ^= bit;
        Fe::conditional_swap(&mut x2, &mut x3, swap);
        Fe::conditional_swap(&mut z2, &mut z3, swap);
        swap = bit;

        let a = x2.add(&z2);
        let aa = a.square();
        let b = x2.sub(&z2);
        let bb = b.square();
        let e = aa.sub(&bb);
        let c = x3.add(&z3);
        let d = x3.sub(&z3);
        let da = d.mul(&a);
        let cb = c.mul(&b);
        x3 = da.add(&cb).square();
        z3 = x1.mul(&da.sub(&cb).square());
        x2 = aa.mul(&bb);
        z2 = e.mul(&aa.add(&A24.mul(&e)));
    }
    Fe::conditional_swap(&mut x2, &mut x3, swap);
    Fe::conditional_swap(&mut z2, &mut z3, swap);

    let out = x2.mul(&z2.invert());
    x2.zeroize();
    x3.zeroize();
    z2.zeroize();
    z3.zeroize();
    out
}

/// Computes a public key that is a multiple of the base point
/// plus `sk[0] & 7` times a point of order 8, using the
/// Montgomery ladder.
#[cfg_attr(not(feature = "hazmat"), allow(dead_code))]
pub(crate) fn dirty_small(sk: &[u8; 32]) -> [u8; 32] {
    // trim(sk) + k*L with k*L = sk[0] mod 8, so that the scalar
    // is the right multiple of both the base point and the
    // low-order point. 1/L = 5 mod 8.
    let cofactor = sk[0] & 7;
    let mut e = scalar::add_multiple_of_l(&scalar::trim(sk), cofactor.wrapping_mul(5));

    let generator = Point::BASE.add(&Point::LOW_ORDER).to_montgomery();
    let out = ladder(&e, &generator, 256);
    e.zeroize();
    out.to_bytes()
}

/// Same output as [`dirty_small`], computed on the Edwards
/// curve.
pub(crate) fn dirty_fast(sk: &[u8; 32]) -> [u8; 32] {
    let mut e = scalar::trim(sk);
    let main = Point::mul_base(&e);
    e.zeroize();

    // Constant-time lookup of (sk[0] & 7) * T8.
    let cofactor = sk[0] & 7;
    let mut low = Point::IDENTITY;
    let mut multiple = Point::IDENTITY;
    for i in 0..8u8 {
        low.conditional_assign(&multiple, i.ct_eq(&cofactor));
        multiple = multiple.add(&Point::LOW_ORDER);
    }
    main.add(&low).to_montgomery().to_bytes()
}

/// Computes `(1/trim(sk) mod L) * point` with the low-order
/// component of `point` cleared.
#[cfg_attr(not(feature = "hazmat"), allow(dead_code))]
pub(crate) fn inverse(sk: &[u8; 32], point: &[u8; 32]) -> [u8; 32] {
    let mut t = scalar::trim(sk);
    let mut inv = scalar::invert(&t);
    t.zeroize();

    // Add the multiple of L that makes the scalar divisible by
    // 8. -1/L = 3 mod 8.
    let mut e = scalar::add_multiple_of_l(&inv, inv[0].wrapping_mul(3));
    inv.zeroize();

    let out = ladder(&e, &Fe::from_bytes(point), 256);
    e.zeroize();
    out.to_bytes()
}
