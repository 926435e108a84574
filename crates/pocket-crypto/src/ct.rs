//! Constant-time comparisons and secure erasure.
//!
//! Every tag and signature comparison in this crate goes through
//! these functions.

#![forbid(unsafe_code)]

use subtle::{Choice, ConstantTimeEq};
use zeroize::Zeroize;

/// Compares two 16-byte buffers in constant time.
///
/// The running time does not depend on the contents of `a` or
/// `b`, nor on the position of the first difference.
#[inline]
pub fn verify16(a: &[u8; 16], b: &[u8; 16]) -> Choice {
    a[..].ct_eq(&b[..])
}

/// Compares two 32-byte buffers in constant time.
///
/// See [`verify16`].
#[inline]
pub fn verify32(a: &[u8; 32], b: &[u8; 32]) -> Choice {
    a[..].ct_eq(&b[..])
}

/// Compares two 64-byte buffers in constant time.
///
/// See [`verify16`].
#[inline]
pub fn verify64(a: &[u8; 64], b: &[u8; 64]) -> Choice {
    a[..].ct_eq(&b[..])
}

/// Overwrites `secret` with zeros.
///
/// The writes are not elided by the optimizer, even if `secret`
/// is never read again.
#[inline]
pub fn wipe<Z: Zeroize + ?Sized>(secret: &mut Z) {
    secret.zeroize();
}
