//! Arithmetic modulo the prime group order
//! `L = 2^252 + 27742317777372353535851937790883648493`.
//!
//! Scalars are 32 little-endian bytes. Reduction works on 64
//! signed limbs of 8 bits each, which leaves plenty of headroom
//! for schoolbook products.

#![forbid(unsafe_code)]
#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::indexing_slicing
)]

use zeroize::Zeroize;

/// `L`, little-endian.
pub(crate) const L: [u8; 32] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// Reduces the 64 limbs of `x` modulo `L`.
///
/// Each limb may hold any value a sum of 32 byte products can
/// reach. `x` is clobbered.
fn mod_l(x: &mut [i64; 64]) -> [u8; 32] {
    // Fold the top 32 limbs down, one at a time, using
    // 2^252 = -(L - 2^252) mod L.
    for i in (32..64).rev() {
        let mut carry = 0;
        for j in (i - 32)..(i - 12) {
            x[j] += carry - 16 * x[i] * i64::from(L[j - (i - 32)]);
            carry = (x[j] + 128) >> 8;
            x[j] -= carry << 8;
        }
        x[i - 12] += carry;
        x[i] = 0;
    }
    let mut carry = 0;
    for j in 0..32 {
        x[j] += carry - (x[31] >> 4) * i64::from(L[j]);
        carry = x[j] >> 8;
        x[j] &= 0xff;
    }
    for j in 0..32 {
        x[j] -= carry * i64::from(L[j]);
    }
    let mut out = [0u8; 32];
    for i in 0..32 {
        x[i + 1] += x[i] >> 8;
        out[i] = (x[i] & 0xff) as u8;
    }
    x.zeroize();
    out
}

/// Reduces a 512-bit little-endian number modulo `L`.
pub(crate) fn reduce(wide: &[u8; 64]) -> [u8; 32] {
    let mut x = [0i64; 64];
    for (l, b) in x.iter_mut().zip(wide) {
        *l = i64::from(*b);
    }
    mod_l(&mut x)
}

/// Computes `a * b + c mod L`.
pub(crate) fn mul_add(a: &[u8; 32], b: &[u8; 32], c: &[u8; 32]) -> [u8; 32] {
    let mut x = [0i64; 64];
    for (l, v) in x.iter_mut().zip(c) {
        *l = i64::from(*v);
    }
    for (i, ai) in a.iter().enumerate() {
        for (j, bj) in b.iter().enumerate() {
            x[i + j] += i64::from(*ai) * i64::from(*bj);
        }
    }
    mod_l(&mut x)
}

/// Computes `a * b mod L`.
pub(crate) fn mul(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    mul_add(a, b, &[0; 32])
}

/// Computes `1 / a mod L` as `a^(L - 2)`. Zero maps to zero.
///
/// Constant time in `a`: the exponent is public.
pub(crate) fn invert(a: &[u8; 32]) -> [u8; 32] {
    let mut e = L;
    e[0] -= 2;

    let mut one = [0u8; 32];
    one[0] = 1;
    let mut acc = one;
    for i in (0..253).rev() {
        acc = mul(&acc, &acc);
        if (e[i / 8] >> (i % 8)) & 1 == 1 {
            acc = mul(&acc, a);
        }
    }
    acc
}

/// Clamps a scalar the way X25519 and EdDSA expect: clears the
/// three low bits and the top bit, sets bit 254.
pub(crate) fn trim(s: &[u8; 32]) -> [u8; 32] {
    let mut t = *s;
    t[0] &= 248;
    t[31] &= 127;
    t[31] |= 64;
    t
}

/// Computes `s + (k mod 8) * L` without reducing.
///
/// `s` must be below 2^255. Runs in constant time in both `s`
/// and `k`.
pub(crate) fn add_multiple_of_l(s: &[u8; 32], k: u8) -> [u8; 32] {
    let k = u16::from(k & 7);
    let mut out = [0u8; 32];
    let mut carry = 0u16;
    for (i, o) in out.iter_mut().enumerate() {
        let v = u16::from(s[i]) + k * u16::from(L[i]) + carry;
        *o = v as u8;
        carry = v >> 8;
    }
    out
}

/// Reports whether `s < L`. The input is public.
pub(crate) fn is_canonical(s: &[u8; 32]) -> bool {
    // Compute s - L and keep the final borrow.
    let mut borrow = 0i16;
    for (a, b) in s.iter().zip(L) {
        let d = i16::from(*a) - i16::from(b) - borrow;
        borrow = (d >> 8) & 1;
    }
    borrow == 1
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn small(n: u64) -> [u8; 32] {
        let mut s = [0u8; 32];
        s[..8].copy_from_slice(&n.to_le_bytes());
        s
    }

    #[test]
    fn test_reduce_l_is_zero() {
        let mut wide = [0u8; 64];
        wide[..32].copy_from_slice(&L);
        assert_eq!(reduce(&wide), [0; 32]);

        let mut l1 = L;
        l1[0] += 1;
        wide[..32].copy_from_slice(&l1);
        assert_eq!(reduce(&wide), small(1));
    }

    #[test]
    fn test_reduce_max() {
        // 2^512 - 1 reduces to something canonical.
        let r = reduce(&[0xff; 64]);
        assert!(is_canonical(&r));
    }

    #[test]
    fn test_mul_add_small() {
        assert_eq!(mul_add(&small(6), &small(7), &small(8)), small(50));
        assert_eq!(mul(&small(1 << 32), &small(1 << 31)), {
            let mut s = [0u8; 32];
            s[7] = 0x80;
            s
        });
    }

    #[test]
    fn test_l_minus_one_squared() {
        // (L - 1)^2 = 1 mod L
        let mut lm1 = L;
        lm1[0] -= 1;
        assert_eq!(mul(&lm1, &lm1), small(1));
    }

    #[test]
    fn test_invert() {
        assert_eq!(invert(&[0; 32]), [0; 32]);
        for n in [1u64, 2, 3, 8, 0xdead_beef] {
            let s = small(n);
            assert_eq!(mul(&s, &invert(&s)), small(1), "{n}");
        }
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical(&[0; 32]));
        let mut lm1 = L;
        lm1[0] -= 1;
        assert!(is_canonical(&lm1));
        assert!(!is_canonical(&L));
        assert!(!is_canonical(&[0xff; 32]));
    }

    #[test]
    fn test_trim() {
        let t = trim(&[0xff; 32]);
        assert_eq!(t[0], 0xf8);
        assert_eq!(t[31], 0x7f);
        let t = trim(&[0; 32]);
        assert_eq!(t[31], 0x40);
    }

    #[test]
    fn test_add_multiple_of_l() {
        let s = small(5);
        assert_eq!(add_multiple_of_l(&s, 0), s);
        let mut wide = [0u8; 64];
        for k in 0..16u8 {
            let v = add_multiple_of_l(&s, k);
            wide[..32].copy_from_slice(&v);
            assert_eq!(reduce(&wide), s, "k = {k}");
        }
        assert_eq!(add_multiple_of_l(&[0; 32], 1), L);
    }

    proptest! {
        #[test]
        fn proptest_mul_add(
            a in any::<[u8; 32]>(),
            b in any::<[u8; 32]>(),
            c in any::<[u8; 32]>(),
        ) {
            let mut w = [0u8; 64];
            w[..32].copy_from_slice(&a);
            let a = reduce(&w);
            w[..32].copy_from_slice(&b);
            let b = reduce(&w);
            w[..32].copy_from_slice(&c);
            let c = reduce(&w);

            let r = mul_add(&a, &b, &c);
            prop_assert!(is_canonical(&r));
            // a*b + c == b*a + c
            prop_assert_eq!(r, mul_add(&b, &a, &c));
            // (a*b + c) - c == a*b, using c + (L - c) = 0.
            let mut neg_one = L;
            neg_one[0] -= 1;
            let back = mul_add(&c, &neg_one, &r);
            prop_assert_eq!(back, mul(&a, &b));
        }
    }
}
