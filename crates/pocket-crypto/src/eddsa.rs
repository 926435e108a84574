//! EdDSA signatures over Curve25519, with BLAKE2b as the hash.
//!
//! This is Ed25519 with BLAKE2b-512 in place of SHA-512, so the
//! signatures are not compatible with RFC 8032 Ed25519.
//!
//! ```rust
//! use pocket_crypto::{eddsa, Seed};
//!
//! let (sk, pk) = eddsa::key_pair(Seed::from([0x42; 32]));
//! let sig = eddsa::sign(&sk, b"hello");
//! assert!(eddsa::check(&sig, &pk, b"hello").is_ok());
//! assert!(eddsa::check(&sig, &pk, b"Hello").is_err());
//! ```

#![forbid(unsafe_code)]

use zeroize::Zeroize;

use crate::{
    blake2b::{blake2b, blake2b_parts},
    ct::verify32,
    edwards::Point,
    keys::{public_bytes, secret_bytes},
    scalar,
    util::split64,
    Seed,
};

secret_bytes! {
    /// An EdDSA secret key: the 32-byte seed followed by the
    /// public key.
    pub SecretKey(64),
}

public_bytes! {
    /// An EdDSA public key, an encoded curve point.
    pub PublicKey(32),
    /// A signature, `R ‖ s`.
    pub Signature(64),
}

impl SecretKey {
    /// Returns the seed half of the key.
    pub(crate) fn seed(&self) -> [u8; 32] {
        split64(self.as_bytes()).0
    }

    /// Returns the public key stored in the secret key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(split64(self.as_bytes()).1)
    }
}

/// An error from [`check`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SignatureError {
    /// The public key is not a valid point encoding.
    #[error("invalid public key")]
    InvalidPublicKey,
    /// The `s` half of the signature is not below the group
    /// order.
    #[error("signature scalar out of range")]
    InvalidScalar,
    /// The signature does not match the message and key.
    #[error("signature verification failed")]
    Verification,
}

/// Derives a key pair from `seed`, which is consumed and wiped.
pub fn key_pair(seed: Seed) -> (SecretKey, PublicKey) {
    let mut a = expand(seed.as_bytes());
    let pk = scalarbase(&a.0);
    a.0.zeroize();
    a.1.zeroize();

    let mut sk = [0u8; 64];
    sk[..32].copy_from_slice(seed.as_bytes());
    sk[32..].copy_from_slice(&pk);
    drop(seed);
    let out = SecretKey::from(sk);
    sk.zeroize();
    (out, PublicKey::from(pk))
}

/// Signs `msg`.
///
/// The signature is deterministic: signing the same message
/// twice yields the same signature.
pub fn sign(sk: &SecretKey, msg: &[u8]) -> Signature {
    let mut seed = sk.seed();
    let (mut a, mut prefix) = expand(&seed);
    seed.zeroize();
    let pk = sk.public_key();

    let mut r = scalar::reduce(&blake2b_parts(&[&prefix, msg]));
    let big_r = scalarbase(&r);
    let h = scalar::reduce(&blake2b_parts(&[&big_r, pk.as_bytes(), msg]));
    let s = scalar::mul_add(&h, &a, &r);
    a.zeroize();
    prefix.zeroize();
    r.zeroize();

    let mut sig = [0u8; 64];
    sig[..32].copy_from_slice(&big_r);
    sig[32..].copy_from_slice(&s);
    Signature::from(sig)
}

/// Checks the signature of `msg`.
///
/// Runs in variable time: every input is public.
pub fn check(sig: &Signature, pk: &PublicKey, msg: &[u8]) -> Result<(), SignatureError> {
    let (big_r, _) = split64(sig.as_bytes());
    let h = scalar::reduce(&blake2b_parts(&[&big_r, pk.as_bytes(), msg]));
    check_equation(sig.as_bytes(), pk.as_bytes(), &h)
}

/// Hashes a seed into the trimmed secret scalar and the nonce
/// prefix.
fn expand(seed: &[u8; 32]) -> ([u8; 32], [u8; 32]) {
    let mut hash = blake2b(seed);
    let (a, prefix) = split64(&hash);
    hash.zeroize();
    (scalar::trim(&a), prefix)
}

/// Encodes `scalar * B`.
pub(crate) fn scalarbase(scalar: &[u8; 32]) -> [u8; 32] {
    Point::mul_base(scalar).encode()
}

/// Checks `R == s*B - h*A` for `sig = R ‖ s` and `A = pk`.
pub(crate) fn check_equation(
    sig: &[u8; 64],
    pk: &[u8; 32],
    h: &[u8; 32],
) -> Result<(), SignatureError> {
    let Some(a) = Point::decode(pk) else {
        tracing::debug!("invalid public key");
        return Err(SignatureError::InvalidPublicKey);
    };
    let (big_r, s) = split64(sig);
    if !scalar::is_canonical(&s) {
        tracing::debug!("signature scalar out of range");
        return Err(SignatureError::InvalidScalar);
    }
    let r_check = Point::mul_base(&s).sub(&a.mul(h)).encode();
    if !bool::from(verify32(&r_check, &big_r)) {
        tracing::debug!("signature verification failed");
        return Err(SignatureError::Verification);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::{scalar::L, util::hex_arr};

    fn pair(b: u8) -> (SecretKey, PublicKey) {
        key_pair(Seed::from([b; 32]))
    }

    #[test]
    fn test_sign_check() {
        let (sk, pk) = pair(1);
        assert_eq!(sk.public_key(), pk);
        for msg in [&b""[..], &b"a"[..], &[0x5a; 300][..]] {
            let sig = sign(&sk, msg);
            assert_eq!(check(&sig, &pk, msg), Ok(()));
            assert_eq!(sign(&sk, msg), sig);
        }
    }

    #[test]
    fn test_known_answer() {
        let (sk, pk) = key_pair(Seed::from([0x42; 32]));
        let want_pk: [u8; 32] =
            hex_arr("e7127d55a0e273501ff02dd29c7cdbbf5bea15ed0b2fd45b1ef238abecab38e5");
        assert_eq!(pk.to_bytes(), want_pk);

        let want_sig: [u8; 64] = hex_arr(
            "75cbc50da21b9231dd6927c3da7783a950fecab66a5d0882b76e45d6cc41edbe\
             4b67faa4ec26e7e63b5282509617ff276669021ad9fe21f2c465a7e4fa8cf707",
        );
        let sig = sign(&sk, b"hello");
        assert_eq!(sig.to_bytes(), want_sig);
        assert_eq!(check(&sig, &pk, b"hello"), Ok(()));
    }

    #[test]
    fn test_every_public_key_bit_flip_rejected() {
        let (sk, pk) = pair(6);
        let sig = sign(&sk, b"key");
        for i in 0..32 * 8 {
            let mut bad = pk.to_bytes();
            bad[i / 8] ^= 1 << (i % 8);
            assert!(check(&sig, &PublicKey::from(bad), b"key").is_err(), "bit {i}");
        }
    }

    #[test]
    fn test_wrong_key_or_message() {
        let (sk, pk) = pair(1);
        let (_, other) = pair(2);
        let sig = sign(&sk, b"msg");
        assert_eq!(check(&sig, &other, b"msg"), Err(SignatureError::Verification));
        assert_eq!(check(&sig, &pk, b"msh"), Err(SignatureError::Verification));
    }

    #[test]
    fn test_every_bit_flip_rejected() {
        let (sk, pk) = pair(3);
        let sig = sign(&sk, b"flip");
        for i in 0..64 * 8 {
            let mut bad = sig.to_bytes();
            bad[i / 8] ^= 1 << (i % 8);
            assert!(check(&Signature::from(bad), &pk, b"flip").is_err(), "bit {i}");
        }
    }

    #[test]
    fn test_non_canonical_s_rejected() {
        // s + L verifies the same equation, so it must be
        // rejected explicitly.
        let (sk, pk) = pair(4);
        let sig = sign(&sk, b"malleable").to_bytes();
        let mut s = [0u8; 32];
        s.copy_from_slice(&sig[32..]);
        let mut carry = 0u16;
        for (v, l) in s.iter_mut().zip(L) {
            let t = u16::from(*v) + u16::from(l) + carry;
            *v = t as u8;
            carry = t >> 8;
        }
        let mut bad = sig;
        bad[32..].copy_from_slice(&s);
        assert_eq!(
            check(&Signature::from(bad), &pk, b"malleable"),
            Err(SignatureError::InvalidScalar)
        );
    }

    #[test]
    fn test_invalid_public_key() {
        let (sk, _) = pair(5);
        let sig = sign(&sk, b"m");
        // y = p - 1 + 2 = p + 1: not canonical.
        let mut pk = [0xffu8; 32];
        pk[0] = 0xee;
        pk[31] = 0x7f;
        assert_eq!(
            check(&sig, &PublicKey::from(pk), b"m"),
            Err(SignatureError::InvalidPublicKey)
        );
    }

    #[test]
    fn test_public_key_is_scalarbase_of_trimmed_hash() {
        let seed = [9u8; 32];
        let (_, pk) = key_pair(Seed::from(seed));
        let (a, _) = expand(&seed);
        assert_eq!(pk.to_bytes(), scalarbase(&a));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(8))]

        #[test]
        fn proptest_sign_check(
            seed in any::<[u8; 32]>(),
            msg in proptest::collection::vec(any::<u8>(), 0..200),
            flip in 0usize..(64 * 8),
        ) {
            let (sk, pk) = key_pair(Seed::from(seed));
            let sig = sign(&sk, &msg);
            prop_assert_eq!(check(&sig, &pk, &msg), Ok(()));

            let mut bad = sig.to_bytes();
            bad[flip / 8] ^= 1 << (flip % 8);
            prop_assert!(check(&Signature::from(bad), &pk, &msg).is_err());
        }
    }
}
