//! BLAKE2b hashing, as specified in RFC 7693.
//!
//! BLAKE2b produces digests of 1 to 64 bytes and doubles as a
//! MAC when given a key of up to 64 bytes. The keyed mode is a
//! proper PRF; there is no need for HMAC.
//!
//! ```rust
//! use pocket_crypto::blake2b::{blake2b, Blake2b};
//!
//! let mut h = Blake2b::new();
//! h.update(b"a");
//! h.update(b"bc");
//! assert_eq!(h.finalize().as_bytes(), &blake2b(b"abc")[..]);
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]

use core::fmt;

use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::util::load64_le;

/// The largest digest size, in bytes.
pub const MAX_HASH_SIZE: usize = 64;

/// The largest key size, in bytes.
pub const MAX_KEY_SIZE: usize = 64;

const BLOCK_SIZE: usize = 128;

const IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

const SIGMA: [[usize; 16]; 12] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
    [11, 8, 12, 0, 5, 2, 15, 13, 10, 14, 3, 6, 7, 1, 9, 4],
    [7, 9, 3, 1, 13, 12, 11, 14, 2, 6, 5, 10, 4, 0, 15, 8],
    [9, 0, 5, 7, 2, 4, 10, 15, 14, 1, 11, 12, 6, 8, 3, 13],
    [2, 12, 6, 10, 0, 11, 8, 3, 4, 13, 7, 5, 15, 14, 1, 9],
    [12, 5, 1, 15, 14, 13, 4, 10, 0, 7, 6, 3, 9, 2, 8, 11],
    [13, 11, 7, 14, 12, 1, 3, 9, 5, 0, 15, 4, 8, 6, 2, 10],
    [6, 15, 14, 9, 11, 3, 0, 8, 12, 2, 13, 7, 1, 4, 10, 5],
    [10, 2, 8, 4, 7, 6, 1, 5, 15, 11, 9, 14, 3, 12, 13, 0],
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
    [14, 10, 4, 8, 9, 15, 13, 6, 1, 12, 0, 2, 11, 7, 5, 3],
];

/// An error from [`Blake2b::with_params`] or
/// [`blake2b_general`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Blake2bError {
    /// The digest size is not in `1..=64`.
    #[error("invalid hash size: {0}")]
    InvalidHashSize(usize),
    /// The key is longer than 64 bytes.
    #[error("invalid key size: {0}")]
    InvalidKeySize(usize),
}

/// A BLAKE2b digest of 1 to 64 bytes.
///
/// Comparisons with [`ConstantTimeEq`] run in constant time.
/// `PartialEq` is deliberately not implemented.
#[derive(Clone)]
pub struct Digest {
    buf: [u8; MAX_HASH_SIZE],
    len: usize,
}

impl Digest {
    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Returns the digest size in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for Digest {
    fn ct_eq(&self, other: &Self) -> Choice {
        // The lengths are public.
        if self.len != other.len {
            return Choice::from(0);
        }
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest(")?;
        for b in self.as_bytes() {
            write!(f, "{b:02x}")?;
        }
        write!(f, ")")
    }
}

/// An incremental BLAKE2b computation.
///
/// The state is erased when the hasher is dropped or finalized.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Blake2b {
    h: [u64; 8],
    t: [u64; 2],
    buf: [u8; BLOCK_SIZE],
    idx: usize,
    hash_size: usize,
}

impl Default for Blake2b {
    fn default() -> Self {
        Self::new()
    }
}

impl Blake2b {
    /// Starts an unkeyed computation with a 64-byte digest.
    pub fn new() -> Self {
        Self::init(MAX_HASH_SIZE, &[])
    }

    /// Starts a computation with a custom digest size and an
    /// optional key.
    ///
    /// An empty `key` means unkeyed hashing.
    pub fn with_params(hash_size: usize, key: &[u8]) -> Result<Self, Blake2bError> {
        if !(1..=MAX_HASH_SIZE).contains(&hash_size) {
            return Err(Blake2bError::InvalidHashSize(hash_size));
        }
        if key.len() > MAX_KEY_SIZE {
            return Err(Blake2bError::InvalidKeySize(key.len()));
        }
        Ok(Self::init(hash_size, key))
    }

    /// `hash_size` must be in `1..=64` and `key` at most 64
    /// bytes long.
    pub(crate) fn init(hash_size: usize, key: &[u8]) -> Self {
        let mut h = IV;
        h[0] ^= 0x0101_0000 ^ ((key.len() as u64) << 8) ^ hash_size as u64;
        let mut ctx = Self {
            h,
            t: [0; 2],
            buf: [0; BLOCK_SIZE],
            idx: 0,
            hash_size,
        };
        if !key.is_empty() {
            // The key is padded to a full block which is absorbed
            // like any other input.
            ctx.buf[..key.len()].copy_from_slice(key);
            ctx.idx = BLOCK_SIZE;
        }
        ctx
    }

    /// Returns the configured digest size.
    pub fn hash_size(&self) -> usize {
        self.hash_size
    }

    /// Absorbs `msg`.
    pub fn update(&mut self, mut msg: &[u8]) {
        while !msg.is_empty() {
            // Only compress a full buffer once more input shows
            // up: the last block needs the final flag.
            if self.idx == BLOCK_SIZE {
                self.increment(BLOCK_SIZE as u64);
                self.compress(false);
                self.idx = 0;
            }
            let n = (BLOCK_SIZE - self.idx).min(msg.len());
            self.buf[self.idx..self.idx + n].copy_from_slice(&msg[..n]);
            self.idx += n;
            msg = &msg[n..];
        }
    }

    /// Returns the digest and erases the state.
    pub fn finalize(mut self) -> Digest {
        self.increment(self.idx as u64);
        self.buf[self.idx..].fill(0);
        self.compress(true);

        let mut buf = [0u8; MAX_HASH_SIZE];
        for (chunk, w) in buf.chunks_exact_mut(8).zip(self.h) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
        buf[self.hash_size..].fill(0);
        Digest {
            buf,
            len: self.hash_size,
        }
    }

    fn increment(&mut self, n: u64) {
        self.t[0] = self.t[0].wrapping_add(n);
        if self.t[0] < n {
            self.t[1] = self.t[1].wrapping_add(1);
        }
    }

    fn compress(&mut self, last: bool) {
        let mut m = [0u64; 16];
        for (i, w) in m.iter_mut().enumerate() {
            *w = load64_le(&self.buf, i * 8);
        }

        let mut v = [0u64; 16];
        v[..8].copy_from_slice(&self.h);
        v[8..].copy_from_slice(&IV);
        v[12] ^= self.t[0];
        v[13] ^= self.t[1];
        if last {
            v[14] = !v[14];
        }

        for s in &SIGMA {
            g(&mut v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
            g(&mut v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
            g(&mut v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
            g(&mut v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
            g(&mut v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
            g(&mut v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
            g(&mut v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
            g(&mut v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
        }

        for (i, h) in self.h.iter_mut().enumerate() {
            *h ^= v[i] ^ v[i + 8];
        }
        m.zeroize();
        v.zeroize();
    }
}

#[inline(always)]
fn g(v: &mut [u64; 16], a: usize, b: usize, c: usize, d: usize, x: u64, y: u64) {
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(x);
    v[d] = (v[d] ^ v[a]).rotate_right(32);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(24);
    v[a] = v[a].wrapping_add(v[b]).wrapping_add(y);
    v[d] = (v[d] ^ v[a]).rotate_right(16);
    v[c] = v[c].wrapping_add(v[d]);
    v[b] = (v[b] ^ v[c]).rotate_right(63);
}

/// Computes the unkeyed 64-byte BLAKE2b digest of `msg`.
pub fn blake2b(msg: &[u8]) -> [u8; 64] {
    let mut h = Blake2b::new();
    h.update(msg);
    h.finalize().buf
}

/// Computes a BLAKE2b digest of `hash_size` bytes, keyed with
/// `key` unless it is empty.
pub fn blake2b_general(hash_size: usize, key: &[u8], msg: &[u8]) -> Result<Digest, Blake2bError> {
    let mut h = Blake2b::with_params(hash_size, key)?;
    h.update(msg);
    Ok(h.finalize())
}

/// Hashes the concatenation of `parts` into 64 bytes.
pub(crate) fn blake2b_parts(parts: &[&[u8]]) -> [u8; 64] {
    let mut h = Blake2b::new();
    for p in parts {
        h.update(p);
    }
    h.finalize().buf
}
