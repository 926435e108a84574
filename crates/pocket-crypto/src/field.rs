//! Arithmetic in GF(2^255 - 19).
//!
//! Elements are five 51-bit limbs in radix 2^51. Every public
//! operation leaves the limbs below 2^52, which keeps products
//! within `u128` and lets results feed straight into the next
//! multiplication.
//!
//! The core operations are `const fn` so that curve constants
//! are derived at compile time instead of being transcribed.

#![forbid(unsafe_code)]
#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::should_implement_trait
)]

use subtle::{Choice, ConditionallyNegatable, ConditionallySelectable, ConstantTimeEq};
use zeroize::DefaultIsZeroes;

use crate::util::load64_le;

const MASK: u64 = (1 << 51) - 1;

/// A field element.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct Fe(pub(crate) [u64; 5]);

impl DefaultIsZeroes for Fe {}

impl Fe {
    pub(crate) const ZERO: Self = Self([0; 5]);
    pub(crate) const ONE: Self = Self::small(1);

    /// `n` must be below 2^51.
    pub(crate) const fn small(n: u64) -> Self {
        Self([n, 0, 0, 0, 0])
    }

    /// Decodes 32 little-endian bytes, ignoring the top bit.
    ///
    /// Non-canonical encodings (values in `[p, 2^255)`) are
    /// accepted and reduced.
    pub(crate) const fn from_bytes(b: &[u8; 32]) -> Self {
        Self([
            load64_le(b, 0) & MASK,
            (load64_le(b, 6) >> 3) & MASK,
            (load64_le(b, 12) >> 6) & MASK,
            (load64_le(b, 19) >> 1) & MASK,
            (load64_le(b, 24) >> 12) & MASK,
        ])
    }

    /// Encodes the canonical value as 32 little-endian bytes.
    pub(crate) const fn to_bytes(&self) -> [u8; 32] {
        let mut l = Self::weak_reduce(self.0).0;

        // l < 2p here. q is 1 iff l >= p.
        let mut q = (l[0] + 19) >> 51;
        q = (l[1] + q) >> 51;
        q = (l[2] + q) >> 51;
        q = (l[3] + q) >> 51;
        q = (l[4] + q) >> 51;

        l[0] += 19 * q;
        l[1] += l[0] >> 51;
        l[0] &= MASK;
        l[2] += l[1] >> 51;
        l[1] &= MASK;
        l[3] += l[2] >> 51;
        l[2] &= MASK;
        l[4] += l[3] >> 51;
        l[3] &= MASK;
        l[4] &= MASK;

        let words = [
            l[0] | (l[1] << 51),
            (l[1] >> 13) | (l[2] << 38),
            (l[2] >> 26) | (l[3] << 25),
            (l[3] >> 39) | (l[4] << 12),
        ];
        let mut out = [0u8; 32];
        let mut i = 0;
        while i < 4 {
            let le = words[i].to_le_bytes();
            let mut j = 0;
            while j < 8 {
                out[i * 8 + j] = le[j];
                j += 1;
            }
            i += 1;
        }
        out
    }

    /// Carries every limb into the next, folding the top carry
    /// back in times 19.
    const fn weak_reduce(mut l: [u64; 5]) -> Self {
        let c0 = l[0] >> 51;
        let c1 = l[1] >> 51;
        let c2 = l[2] >> 51;
        let c3 = l[3] >> 51;
        let c4 = l[4] >> 51;
        l[0] &= MASK;
        l[1] &= MASK;
        l[2] &= MASK;
        l[3] &= MASK;
        l[4] &= MASK;
        l[0] += c4 * 19;
        l[1] += c0;
        l[2] += c1;
        l[3] += c2;
        l[4] += c3;
        Self(l)
    }

    pub(crate) const fn add(&self, rhs: &Self) -> Self {
        let (a, b) = (&self.0, &rhs.0);
        Self::weak_reduce([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3], a[4] + b[4]])
    }

    pub(crate) const fn sub(&self, rhs: &Self) -> Self {
        // Add 16p first so that no limb goes negative.
        let (a, b) = (&self.0, &rhs.0);
        Self::weak_reduce([
            (a[0] + 0x007f_ffff_ffff_fed0) - b[0],
            (a[1] + 0x007f_ffff_ffff_fff0) - b[1],
            (a[2] + 0x007f_ffff_ffff_fff0) - b[2],
            (a[3] + 0x007f_ffff_ffff_fff0) - b[3],
            (a[4] + 0x007f_ffff_ffff_fff0) - b[4],
        ])
    }

    pub(crate) const fn neg(&self) -> Self {
        Self::ZERO.sub(self)
    }

    pub(crate) const fn mul(&self, rhs: &Self) -> Self {
        #[inline(always)]
        const fn m(x: u64, y: u64) -> u128 {
            (x as u128) * (y as u128)
        }

        let (a, b) = (&self.0, &rhs.0);
        let b1_19 = b[1] * 19;
        let b2_19 = b[2] * 19;
        let b3_19 = b[3] * 19;
        let b4_19 = b[4] * 19;

        let c0 = m(a[0], b[0])
            + m(a[4], b1_19)
            + m(a[3], b2_19)
            + m(a[2], b3_19)
            + m(a[1], b4_19);
        let mut c1 = m(a[1], b[0])
            + m(a[0], b[1])
            + m(a[4], b2_19)
            + m(a[3], b3_19)
            + m(a[2], b4_19);
        let mut c2 = m(a[2], b[0])
            + m(a[1], b[1])
            + m(a[0], b[2])
            + m(a[4], b3_19)
            + m(a[3], b4_19);
        let mut c3 = m(a[3], b[0])
            + m(a[2], b[1])
            + m(a[1], b[2])
            + m(a[0], b[3])
            + m(a[4], b4_19);
        let mut c4 = m(a[4], b[0])
            + m(a[3], b[1])
            + m(a[2], b[2])
            + m(a[1], b[3])
            + m(a[0], b[4]);

        c1 += c0 >> 51;
        let mut l0 = (c0 as u64) & MASK;
        c2 += c1 >> 51;
        let l1 = (c1 as u64) & MASK;
        c3 += c2 >> 51;
        let l2 = (c2 as u64) & MASK;
        c4 += c3 >> 51;
        let l3 = (c3 as u64) & MASK;
        let carry = (c4 >> 51) as u64;
        let l4 = (c4 as u64) & MASK;

        l0 += carry * 19;
        let l1 = l1 + (l0 >> 51);
        l0 &= MASK;
        Self([l0, l1, l2, l3, l4])
    }

    pub(crate) const fn square(&self) -> Self {
        self.mul(self)
    }

    /// Squares `k` times.
    pub(crate) const fn pow2k(&self, mut k: u32) -> Self {
        let mut x = *self;
        while k > 0 {
            x = x.square();
            k -= 1;
        }
        x
    }

    /// Returns `(x^(2^250 - 1), x^11)`.
    const fn pow22501(&self) -> (Self, Self) {
        let t0 = self.square();
        let t1 = t0.pow2k(2);
        let t2 = self.mul(&t1);
        let t3 = t0.mul(&t2);
        let t4 = t3.square();
        let t5 = t2.mul(&t4);
        let t6 = t5.pow2k(5);
        let t7 = t6.mul(&t5);
        let t8 = t7.pow2k(10);
        let t9 = t8.mul(&t7);
        let t10 = t9.pow2k(20);
        let t11 = t10.mul(&t9);
        let t12 = t11.pow2k(10);
        let t13 = t12.mul(&t7);
        let t14 = t13.pow2k(50);
        let t15 = t14.mul(&t13);
        let t16 = t15.pow2k(100);
        let t17 = t16.mul(&t15);
        let t18 = t17.pow2k(50);
        let t19 = t18.mul(&t13);
        (t19, t3)
    }

    /// Returns `1/x`, or zero if `x` is zero.
    pub(crate) const fn invert(&self) -> Self {
        // x^(p - 2)
        let (t19, t3) = self.pow22501();
        t19.pow2k(5).mul(&t3)
    }

    /// Returns `x^((p - 5) / 8)`.
    const fn pow_p58(&self) -> Self {
        let (t19, _) = self.pow22501();
        t19.pow2k(2).mul(self)
    }

    /// Reports whether the canonical encoding is odd.
    pub(crate) fn is_negative(&self) -> Choice {
        Choice::from(self.to_bytes()[0] & 1)
    }

    pub(crate) fn is_zero(&self) -> Choice {
        self.ct_eq(&Self::ZERO)
    }

    /// Returns `|x|`, the one of `x` and `-x` that is even.
    pub(crate) fn abs(&self) -> Self {
        let mut x = *self;
        x.conditional_negate(self.is_negative());
        x
    }

    /// Returns `(true, sqrt(u/v))` if `u/v` is a square and
    /// `(false, sqrt(i*u/v))` otherwise.
    ///
    /// The root is the nonnegative one. `u = 0` gives
    /// `(true, 0)`; `v = 0` with `u != 0` gives `(false, 0)`.
    pub(crate) fn sqrt_ratio_i(u: &Self, v: &Self) -> (Choice, Self) {
        let v3 = v.square().mul(v);
        let v7 = v3.square().mul(v);
        let mut r = u.mul(&v3).mul(&u.mul(&v7).pow_p58());
        let check = v.mul(&r.square());

        let neg_u = u.neg();
        let correct_sign = check.ct_eq(u);
        let flipped_sign = check.ct_eq(&neg_u);
        let flipped_sign_i = check.ct_eq(&neg_u.mul(&SQRT_M1));

        let r_prime = r.mul(&SQRT_M1);
        r.conditional_assign(&r_prime, flipped_sign | flipped_sign_i);
        (correct_sign | flipped_sign, r.abs())
    }

    /// Returns `sqrt(u/v)` for a `u/v` known to be square.
    ///
    /// Variable time, for compile-time constants only.
    const fn sqrt_ratio_vartime(u: &Self, v: &Self) -> (bool, Self) {
        let v3 = v.square().mul(v);
        let v7 = v3.square().mul(v);
        let mut r = u.mul(&v3).mul(&u.mul(&v7).pow_p58());
        let check = v.mul(&r.square());
        let ok = if eq_vartime(&check, u) {
            true
        } else if eq_vartime(&check, &u.neg()) {
            r = r.mul(&SQRT_M1);
            true
        } else {
            false
        };
        if r.to_bytes()[0] & 1 == 1 {
            r = r.neg();
        }
        (ok, r)
    }
}

const fn eq_vartime(a: &Fe, b: &Fe) -> bool {
    let (a, b) = (a.to_bytes(), b.to_bytes());
    let mut i = 0;
    while i < 32 {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

impl ConstantTimeEq for Fe {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.to_bytes()[..].ct_eq(&other.to_bytes()[..])
    }
}

impl ConditionallySelectable for Fe {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        let mut out = [0u64; 5];
        for (i, o) in out.iter_mut().enumerate() {
            *o = u64::conditional_select(&a.0[i], &b.0[i], choice);
        }
        Self(out)
    }
}

impl<'a> core::ops::Neg for &'a Fe {
    type Output = Fe;

    fn neg(self) -> Fe {
        Fe::neg(self)
    }
}

/// `sqrt(-1)`, computed as `2^((p - 1) / 4)`.
pub(crate) const SQRT_M1: Fe = {
    let two = Fe::small(2);
    let (t19, _) = two.pow22501();
    // 2^(2^253 - 8) * 2^3
    t19.pow2k(3).mul(&Fe::small(8))
};

/// The twisted Edwards constant `d = -121665 / 121666`.
pub(crate) const D: Fe = Fe::small(121_665).neg().mul(&Fe::small(121_666).invert());

/// `2d`.
pub(crate) const D2: Fe = D.add(&D);

/// The Montgomery constant `A = 486662`.
pub(crate) const A: Fe = Fe::small(486_662);

/// `(A - 2) / 4`.
pub(crate) const A24: Fe = Fe::small(121_665);

/// The affine coordinates of the Ed25519 base point: `y = 4/5`
/// and `x` even.
pub(crate) const BASE_XY: (Fe, Fe) = {
    let y = Fe::small(4).mul(&Fe::small(5).invert());
    let y2 = y.square();
    let (_, x) = Fe::sqrt_ratio_vartime(&y2.sub(&Fe::ONE), &D.mul(&y2).add(&Fe::ONE));
    (x, y)
};

/// The affine coordinates of a point of order 8.
///
/// Such a point doubles to `(±sqrt(-1), 0)`, which forces
/// `y = ±sqrt(-1) x` and `d x^4 - 2 x^2 - 1 = 0`.
pub(crate) const LOW_ORDER_XY: (Fe, Fe) = {
    let (_, s) = Fe::sqrt_ratio_vartime(&D.add(&Fe::ONE), &Fe::ONE);
    let (ok, x) = Fe::sqrt_ratio_vartime(&Fe::ONE.add(&s), &D);
    let x = if ok {
        x
    } else {
        let (_, x) = Fe::sqrt_ratio_vartime(&Fe::ONE.sub(&s), &D);
        x
    };
    (x, x.mul(&SQRT_M1))
};

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn fe(n: u64) -> Fe {
        Fe::small(n)
    }

    fn arb_fe() -> impl Strategy<Value = Fe> {
        any::<[u8; 32]>().prop_map(|b| Fe::from_bytes(&b))
    }

    #[test]
    fn test_p_is_zero() {
        // p = 2^255 - 19
        let mut p = [0xffu8; 32];
        p[0] = 0xed;
        p[31] = 0x7f;
        assert_eq!(Fe::from_bytes(&p).to_bytes(), [0; 32]);

        let mut p1 = p;
        p1[0] = 0xee;
        assert_eq!(Fe::from_bytes(&p1).to_bytes(), Fe::ONE.to_bytes());
    }

    #[test]
    fn test_top_bit_ignored() {
        let mut b = [0u8; 32];
        b[0] = 9;
        let mut c = b;
        c[31] = 0x80;
        assert!(bool::from(Fe::from_bytes(&b).ct_eq(&Fe::from_bytes(&c))));
    }

    #[test]
    fn test_sqrt_m1() {
        assert!(bool::from(SQRT_M1.square().ct_eq(&Fe::ONE.neg())));
        assert!(!bool::from(SQRT_M1.is_negative()));
    }

    #[test]
    fn test_d() {
        assert!(bool::from(D.mul(&fe(121_666)).ct_eq(&fe(121_665).neg())));
        assert!(bool::from(D2.ct_eq(&D.mul(&fe(2)))));
    }

    #[test]
    fn test_invert() {
        assert_eq!(Fe::ZERO.invert().to_bytes(), [0; 32]);
        for n in [1, 2, 3, 19, 121_666, (1 << 51) - 1] {
            let x = fe(n);
            assert!(bool::from(x.mul(&x.invert()).ct_eq(&Fe::ONE)), "{n}");
        }
    }

    #[test]
    fn test_sqrt_ratio_edges() {
        let (ok, r) = Fe::sqrt_ratio_i(&Fe::ZERO, &fe(5));
        assert!(bool::from(ok));
        assert!(bool::from(r.is_zero()));

        let (ok, r) = Fe::sqrt_ratio_i(&fe(5), &Fe::ZERO);
        assert!(!bool::from(ok));
        assert!(bool::from(r.is_zero()));

        // 2 is not a square mod p.
        let (ok, _) = Fe::sqrt_ratio_i(&fe(2), &Fe::ONE);
        assert!(!bool::from(ok));

        let (ok, r) = Fe::sqrt_ratio_i(&fe(4), &Fe::ONE);
        assert!(bool::from(ok));
        assert_eq!(r.to_bytes(), fe(2).to_bytes());
    }

    #[test]
    fn test_base_point() {
        let (x, y) = BASE_XY;
        // -x^2 + y^2 = 1 + d x^2 y^2
        let (x2, y2) = (x.square(), y.square());
        let lhs = y2.sub(&x2);
        let rhs = Fe::ONE.add(&D.mul(&x2).mul(&y2));
        assert!(bool::from(lhs.ct_eq(&rhs)));
        assert!(!bool::from(x.is_negative()));
    }

    #[test]
    fn test_low_order_point_on_curve() {
        let (x, y) = LOW_ORDER_XY;
        let (x2, y2) = (x.square(), y.square());
        let lhs = y2.sub(&x2);
        let rhs = Fe::ONE.add(&D.mul(&x2).mul(&y2));
        assert!(bool::from(lhs.ct_eq(&rhs)));
        assert!(!bool::from(x.is_zero()));
    }

    proptest! {
        #[test]
        fn proptest_field_laws(a in arb_fe(), b in arb_fe(), c in arb_fe()) {
            let eq = |x: &Fe, y: &Fe| x.to_bytes() == y.to_bytes();
            prop_assert!(eq(&a.add(&b), &b.add(&a)));
            prop_assert!(eq(&a.mul(&b), &b.mul(&a)));
            prop_assert!(eq(&a.mul(&b.add(&c)), &a.mul(&b).add(&a.mul(&c))));
            prop_assert!(eq(&a.sub(&b).add(&b), &a));
            prop_assert!(eq(&a.add(&a.neg()), &Fe::ZERO));
            prop_assert!(eq(&Fe::from_bytes(&a.to_bytes()), &a));
            if !bool::from(a.is_zero()) {
                prop_assert!(eq(&a.mul(&a.invert()), &Fe::ONE));
            }
        }

        #[test]
        fn proptest_sqrt(a in arb_fe()) {
            let sq = a.square();
            let (ok, r) = Fe::sqrt_ratio_i(&sq, &Fe::ONE);
            prop_assert!(bool::from(ok));
            prop_assert!(!bool::from(r.is_negative()));
            prop_assert_eq!(r.to_bytes(), a.abs().to_bytes());
        }

        #[test]
        fn proptest_canonical_encoding(b in any::<[u8; 32]>()) {
            let x = Fe::from_bytes(&b);
            let enc = x.to_bytes();
            prop_assert_eq!(enc[31] & 0x80, 0);
            prop_assert_eq!(Fe::from_bytes(&enc).to_bytes(), enc);
        }
    }
}
