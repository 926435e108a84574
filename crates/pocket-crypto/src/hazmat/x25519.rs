//! Dirty X25519 key generation and scalar inversion.
//!
//! Regular X25519 public keys are multiples of the base point,
//! which lies in the prime-order subgroup. That is detectable
//! even through Elligator. Dirty public keys add a random
//! low-order component taken from the secret key so that they
//! cover the whole curve. Key exchange results are unchanged
//! because X25519 clears the low-order component.

use crate::x25519 as safe;

/// Computes a dirty public key with the Montgomery ladder.
///
/// Slower than [`dirty_fast`] but with less code involved.
/// Both return the same bytes.
pub fn dirty_small(sk: &[u8; 32]) -> [u8; 32] {
    safe::dirty_small(sk)
}

/// Computes a dirty public key on the Edwards curve.
pub fn dirty_fast(sk: &[u8; 32]) -> [u8; 32] {
    safe::dirty_fast(sk)
}

/// Multiplies `point` by the inverse of the clamped `sk`, modulo
/// the group order, and clears its low-order component.
///
/// For `P` in the prime-order subgroup,
/// `x25519(sk, inverse(sk, P)) == P`. This enables exponential
/// blinding (oblivious PRFs and the like).
///
/// # ⚠️ Warning
/// <div class="warning">
/// Unlike plain X25519, the result depends on the whole secret
/// scalar and not only on its clamped bits. It is a weaker
/// primitive than key exchange and should only be used by
/// protocols built around it.
/// </div>
pub fn inverse(sk: &[u8; 32], point: &[u8; 32]) -> [u8; 32] {
    safe::inverse(sk, point)
}
