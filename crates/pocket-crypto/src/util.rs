#![forbid(unsafe_code)]
#![allow(clippy::arithmetic_side_effects)]

/// Like [`assert!`], but forces a compile-time error.
macro_rules! const_assert {
    ($($tt:tt)*) => {
        const _: () = assert!($($tt)*);
    }
}

/// Reads a little-endian `u32` from `b[i..i + 4]`.
#[inline(always)]
pub(crate) const fn load32_le(b: &[u8], i: usize) -> u32 {
    u32::from_le_bytes([b[i], b[i + 1], b[i + 2], b[i + 3]])
}

/// Reads a little-endian `u64` from `b[i..i + 8]`.
#[inline(always)]
pub(crate) const fn load64_le(b: &[u8], i: usize) -> u64 {
    u64::from_le_bytes([
        b[i],
        b[i + 1],
        b[i + 2],
        b[i + 3],
        b[i + 4],
        b[i + 5],
        b[i + 6],
        b[i + 7],
    ])
}

/// Splits a 64-byte value into two 32-byte arrays.
#[inline(always)]
pub(crate) fn split64(b: &[u8; 64]) -> ([u8; 32], [u8; 32]) {
    let mut lo = [0u8; 32];
    let mut hi = [0u8; 32];
    lo.copy_from_slice(&b[..32]);
    hi.copy_from_slice(&b[32..]);
    (lo, hi)
}

/// Decodes a hex string into a fixed-size array.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn hex_arr<const N: usize>(s: &str) -> [u8; N] {
    let v = hex::decode(s).unwrap();
    v.try_into().unwrap()
}
