//! Points on the twisted Edwards curve
//! `-x^2 + y^2 = 1 + d x^2 y^2`, birationally equivalent to
//! Curve25519.

#![forbid(unsafe_code)]

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

use crate::field::{BASE_XY, D, D2, Fe, LOW_ORDER_XY};

/// A point in extended coordinates `(X : Y : Z : T)` with
/// `x = X/Z`, `y = Y/Z` and `xy = T/Z`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Point {
    x: Fe,
    y: Fe,
    z: Fe,
    t: Fe,
}

impl Point {
    pub(crate) const IDENTITY: Self = Self {
        x: Fe::ZERO,
        y: Fe::ONE,
        z: Fe::ONE,
        t: Fe::ZERO,
    };

    /// The Ed25519 base point, of prime order `L`.
    pub(crate) const BASE: Self = Self::from_affine(BASE_XY.0, BASE_XY.1);

    /// A point of order 8.
    pub(crate) const LOW_ORDER: Self = Self::from_affine(LOW_ORDER_XY.0, LOW_ORDER_XY.1);

    const fn from_affine(x: Fe, y: Fe) -> Self {
        Self {
            x,
            y,
            z: Fe::ONE,
            t: x.mul(&y),
        }
    }

    /// Complete addition (add-2008-hwcd-3). Also used for
    /// doubling.
    pub(crate) fn add(&self, rhs: &Self) -> Self {
        let a = self.y.sub(&self.x).mul(&rhs.y.sub(&rhs.x));
        let b = self.y.add(&self.x).mul(&rhs.y.add(&rhs.x));
        let c = self.t.mul(&D2).mul(&rhs.t);
        let d = self.z.add(&self.z).mul(&rhs.z);
        let e = b.sub(&a);
        let f = d.sub(&c);
        let g = d.add(&c);
        let h = b.add(&a);
        Self {
            x: e.mul(&f),
            y: g.mul(&h),
            z: f.mul(&g),
            t: e.mul(&h),
        }
    }

    pub(crate) fn double(&self) -> Self {
        self.add(self)
    }

    pub(crate) fn neg(&self) -> Self {
        Self {
            x: self.x.neg(),
            y: self.y,
            z: self.z,
            t: self.t.neg(),
        }
    }

    pub(crate) fn sub(&self, rhs: &Self) -> Self {
        self.add(&rhs.neg())
    }

    /// Computes `scalar * self` for a little-endian 256-bit
    /// scalar, in constant time.
    pub(crate) fn mul(&self, scalar: &[u8; 32]) -> Self {
        let mut acc = Self::IDENTITY;
        for i in (0..256).rev() {
            acc = acc.double();
            let sum = acc.add(self);
            let bit = Choice::from((scalar[i / 8] >> (i % 8)) & 1);
            acc.conditional_assign(&sum, bit);
        }
        acc
    }

    /// Computes `scalar * B`.
    pub(crate) fn mul_base(scalar: &[u8; 32]) -> Self {
        Self::BASE.mul(scalar)
    }

    /// Encodes `y` with the sign of `x` in the top bit.
    pub(crate) fn encode(&self) -> [u8; 32] {
        let zinv = self.z.invert();
        let x = self.x.mul(&zinv);
        let y = self.y.mul(&zinv);
        let mut out = y.to_bytes();
        out[31] |= x.is_negative().unwrap_u8() << 7;
        out
    }

    /// Decodes a point.
    ///
    /// Rejects non-canonical `y`, points off the curve and the
    /// negative encoding of `x = 0`. The input is public.
    pub(crate) fn decode(bytes: &[u8; 32]) -> Option<Self> {
        let y = Fe::from_bytes(bytes);
        let sign = Choice::from(bytes[31] >> 7);

        let mut canonical = y.to_bytes();
        canonical[31] |= bytes[31] & 0x80;
        if &canonical != bytes {
            return None;
        }

        let y2 = y.square();
        let u = y2.sub(&Fe::ONE);
        let v = D.mul(&y2).add(&Fe::ONE);
        let (is_square, mut x) = Fe::sqrt_ratio_i(&u, &v);
        if !bool::from(is_square) {
            return None;
        }
        if bool::from(x.is_zero() & sign) {
            return None;
        }
        // x is nonnegative here.
        let neg = x.neg();
        x.conditional_assign(&neg, sign);

        Some(Self {
            x,
            y,
            z: Fe::ONE,
            t: x.mul(&y),
        })
    }

    /// Returns the Montgomery u-coordinate `(1 + y) / (1 - y)`.
    ///
    /// The identity maps to 0.
    pub(crate) fn to_montgomery(&self) -> Fe {
        let num = self.z.add(&self.y);
        let den = self.z.sub(&self.y);
        num.mul(&den.invert())
    }
}

impl ConditionallySelectable for Point {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: Fe::conditional_select(&a.x, &b.x, choice),
            y: Fe::conditional_select(&a.y, &b.y, choice),
            z: Fe::conditional_select(&a.z, &b.z, choice),
            t: Fe::conditional_select(&a.t, &b.t, choice),
        }
    }
}

impl ConstantTimeEq for Point {
    fn ct_eq(&self, other: &Self) -> Choice {
        let x = self.x.mul(&other.z).ct_eq(&other.x.mul(&self.z));
        let y = self.y.mul(&other.z).ct_eq(&other.y.mul(&self.z));
        x & y
    }
}
