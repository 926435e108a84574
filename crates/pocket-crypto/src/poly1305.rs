//! The Poly1305 one-time authenticator.
//!
//! A Poly1305 key must authenticate exactly one message. Reusing
//! it lets an attacker forge tags. [`aead`][crate::aead] derives
//! a fresh key for every message; prefer it.

#![forbid(unsafe_code)]
#![allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::util::load32_le;

/// The size in bytes of a Poly1305 key.
pub const KEY_SIZE: usize = 32;

/// The size in bytes of a Poly1305 tag.
pub const TAG_SIZE: usize = 16;

const BLOCK_SIZE: usize = 16;

/// An incremental Poly1305 computation.
///
/// ```rust
/// use pocket_crypto::poly1305::{poly1305, Poly1305};
///
/// let key = [0x42; 32];
/// let mut mac = Poly1305::new(&key);
/// mac.update(b"hello, ");
/// mac.update(b"world");
/// assert_eq!(mac.finalize(), poly1305(b"hello, world", &key));
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Poly1305 {
    r: [u32; 5],
    h: [u32; 5],
    pad: [u32; 4],
    buf: [u8; BLOCK_SIZE],
    idx: usize,
}

impl Poly1305 {
    /// Starts a computation with a one-time key.
    pub fn new(key: &[u8; KEY_SIZE]) -> Self {
        // Clamped r, split into 26-bit limbs.
        let r = [
            load32_le(key, 0) & 0x3ff_ffff,
            (load32_le(key, 3) >> 2) & 0x3ff_ff03,
            (load32_le(key, 6) >> 4) & 0x3ff_c0ff,
            (load32_le(key, 9) >> 6) & 0x3f0_3fff,
            (load32_le(key, 12) >> 8) & 0x00f_ffff,
        ];
        let pad = [
            load32_le(key, 16),
            load32_le(key, 20),
            load32_le(key, 24),
            load32_le(key, 28),
        ];
        Self {
            r,
            h: [0; 5],
            pad,
            buf: [0; BLOCK_SIZE],
            idx: 0,
        }
    }

    /// Absorbs `msg`.
    pub fn update(&mut self, mut msg: &[u8]) {
        if self.idx > 0 {
            let n = (BLOCK_SIZE - self.idx).min(msg.len());
            self.buf[self.idx..self.idx + n].copy_from_slice(&msg[..n]);
            self.idx += n;
            msg = &msg[n..];
            if self.idx < BLOCK_SIZE {
                return;
            }
            let block = self.buf;
            self.block(&block, 1 << 24);
            self.idx = 0;
        }

        let mut chunks = msg.chunks_exact(BLOCK_SIZE);
        for chunk in &mut chunks {
            self.block(chunk, 1 << 24);
        }
        let rest = chunks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.idx = rest.len();
    }

    /// Returns the tag and erases the state.
    pub fn finalize(mut self) -> [u8; TAG_SIZE] {
        if self.idx > 0 {
            // Pad the last block with a single 1 and zeros; the
            // 2^128 bit is then already set.
            self.buf[self.idx] = 1;
            self.buf[self.idx + 1..].fill(0);
            let block = self.buf;
            self.block(&block, 0);
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        // Full carry.
        let mut c;
        c = h1 >> 26;
        h1 &= 0x3ff_ffff;
        h2 += c;
        c = h2 >> 26;
        h2 &= 0x3ff_ffff;
        h3 += c;
        c = h3 >> 26;
        h3 &= 0x3ff_ffff;
        h4 += c;
        c = h4 >> 26;
        h4 &= 0x3ff_ffff;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= 0x3ff_ffff;
        h1 += c;

        // g = h + -p
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= 0x3ff_ffff;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= 0x3ff_ffff;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= 0x3ff_ffff;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= 0x3ff_ffff;
        let mut g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        // Select h if h < p, g otherwise.
        let mut mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        mask = !mask;
        h0 = (h0 & mask) | g0;
        h1 = (h1 & mask) | g1;
        h2 = (h2 & mask) | g2;
        h3 = (h3 & mask) | g3;
        h4 = (h4 & mask) | g4;

        // h mod 2^128
        let w0 = h0 | (h1 << 26);
        let w1 = (h1 >> 6) | (h2 << 20);
        let w2 = (h2 >> 12) | (h3 << 14);
        let w3 = (h3 >> 18) | (h4 << 8);

        // tag = (h + pad) mod 2^128
        let mut f: u64;
        let mut tag = [0u8; TAG_SIZE];
        f = u64::from(w0) + u64::from(self.pad[0]);
        tag[0..4].copy_from_slice(&(f as u32).to_le_bytes());
        f = u64::from(w1) + u64::from(self.pad[1]) + (f >> 32);
        tag[4..8].copy_from_slice(&(f as u32).to_le_bytes());
        f = u64::from(w2) + u64::from(self.pad[2]) + (f >> 32);
        tag[8..12].copy_from_slice(&(f as u32).to_le_bytes());
        f = u64::from(w3) + u64::from(self.pad[3]) + (f >> 32);
        tag[12..16].copy_from_slice(&(f as u32).to_le_bytes());
        tag
    }

    /// h = (h + block) * r mod 2^130 - 5.
    ///
    /// `hibit` is the 2^128 bit, which is absent for a padded
    /// final block.
    fn block(&mut self, m: &[u8], hibit: u32) {
        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let s1 = r1 * 5;
        let s2 = r2 * 5;
        let s3 = r3 * 5;
        let s4 = r4 * 5;

        let h0 = u64::from(self.h[0] + (load32_le(m, 0) & 0x3ff_ffff));
        let h1 = u64::from(self.h[1] + ((load32_le(m, 3) >> 2) & 0x3ff_ffff));
        let h2 = u64::from(self.h[2] + ((load32_le(m, 6) >> 4) & 0x3ff_ffff));
        let h3 = u64::from(self.h[3] + ((load32_le(m, 9) >> 6) & 0x3ff_ffff));
        let h4 = u64::from(self.h[4] + ((load32_le(m, 12) >> 8) | hibit));

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        // Partial reduction.
        let mut c = d0 >> 26;
        let mut h0 = (d0 as u32) & 0x3ff_ffff;
        d1 += c;
        c = d1 >> 26;
        let h1 = (d1 as u32) & 0x3ff_ffff;
        d2 += c;
        c = d2 >> 26;
        let h2 = (d2 as u32) & 0x3ff_ffff;
        d3 += c;
        c = d3 >> 26;
        let h3 = (d3 as u32) & 0x3ff_ffff;
        d4 += c;
        c = d4 >> 26;
        let h4 = (d4 as u32) & 0x3ff_ffff;
        h0 += (c as u32) * 5;
        let c = h0 >> 26;
        h0 &= 0x3ff_ffff;
        let h1 = h1 + c;

        self.h = [h0, h1, h2, h3, h4];
    }
}

/// Computes the Poly1305 tag of `msg` under a one-time `key`.
pub fn poly1305(msg: &[u8], key: &[u8; KEY_SIZE]) -> [u8; TAG_SIZE] {
    let mut mac = Poly1305::new(key);
    mac.update(msg);
    mac.finalize()
}
