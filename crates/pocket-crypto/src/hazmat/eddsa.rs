//! EdDSA internals on raw arrays.
//!
//! Scalars are 32 little-endian bytes modulo the group order `L`
//! and points are 32-byte encodings.
//!
//! ```rust
//! use pocket_crypto::{blake2b::blake2b, hazmat::eddsa};
//!
//! // A Schnorr signature built by hand.
//! let a = eddsa::trim_scalar(&[1; 32]);
//! let pk = eddsa::scalarbase(&a);
//! let r = eddsa::reduce(&blake2b(b"nonce"));
//! let big_r = eddsa::scalarbase(&r);
//!
//! let mut input = [0u8; 64];
//! input[..32].copy_from_slice(&big_r);
//! input[32..].copy_from_slice(&pk);
//! let h = eddsa::reduce(&blake2b(&input));
//! let s = eddsa::mul_add(&h, &a, &r);
//!
//! let mut sig = [0u8; 64];
//! sig[..32].copy_from_slice(&big_r);
//! sig[32..].copy_from_slice(&s);
//! assert!(eddsa::check_equation(&sig, &pk, &h).is_ok());
//! ```

use crate::{eddsa as safe, scalar};

pub use crate::eddsa::SignatureError;

/// Clears the three low bits and the top bit of `s` and sets
/// bit 254.
pub fn trim_scalar(s: &[u8; 32]) -> [u8; 32] {
    scalar::trim(s)
}

/// Reduces a 512-bit little-endian number modulo `L`.
pub fn reduce(wide: &[u8; 64]) -> [u8; 32] {
    scalar::reduce(wide)
}

/// Computes `a * b + c mod L`.
pub fn mul_add(a: &[u8; 32], b: &[u8; 32], c: &[u8; 32]) -> [u8; 32] {
    scalar::mul_add(a, b, c)
}

/// Encodes `s * B`, where `B` is the base point.
///
/// Runs in constant time. `s` need not be reduced.
pub fn scalarbase(s: &[u8; 32]) -> [u8; 32] {
    safe::scalarbase(s)
}

/// Checks `R == s*B - h*A` for `sig = R ‖ s` and the public key
/// `A`.
///
/// `h` is the challenge the signer used, usually the reduced
/// hash of `R`, the public key and the message. Variable time.
pub fn check_equation(sig: &[u8; 64], pk: &[u8; 32], h: &[u8; 32]) -> Result<(), SignatureError> {
    safe::check_equation(sig, pk, h)
}
