//! The ChaCha20 stream cipher family.
//!
//! - [`chacha20`]: the original construction, 64-bit nonce and
//!   64-bit block counter.
//! - [`ietf_chacha20`]: RFC 8439, 96-bit nonce and 32-bit block
//!   counter.
//! - [`xchacha20`]: 192-bit nonce, safe to pick at random.
//! - [`hchacha20`]: the key derivation step behind XChaCha20.
//!
//! Encryption and decryption are the same operation: the
//! keystream is XORed into the buffer in place. Running any of
//! these over a zeroed buffer yields the raw keystream.
//!
//! None of these functions authenticate anything. Use [`aead`]
//! unless you are building a protocol of your own.
//!
//! [`aead`]: crate::aead

#![forbid(unsafe_code)]
#![allow(clippy::arithmetic_side_effects)]

use zeroize::Zeroize;

use crate::util::load32_le;

/// The size in bytes of a ChaCha20 key.
pub const KEY_SIZE: usize = 32;

/// The size in bytes of one keystream block.
pub const BLOCK_SIZE: usize = 64;

/// "expand 32-byte k"
const SIGMA: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline(always)]
fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

/// Twenty rounds, without the feed-forward.
fn permute(x: &mut [u32; 16]) {
    for _ in 0..10 {
        quarter_round(x, 0, 4, 8, 12);
        quarter_round(x, 1, 5, 9, 13);
        quarter_round(x, 2, 6, 10, 14);
        quarter_round(x, 3, 7, 11, 15);
        quarter_round(x, 0, 5, 10, 15);
        quarter_round(x, 1, 6, 11, 12);
        quarter_round(x, 2, 7, 8, 13);
        quarter_round(x, 3, 4, 9, 14);
    }
}

/// Returns the first eight words of the state: the constants
/// and the key.
fn init_key(key: &[u8; KEY_SIZE]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&SIGMA);
    for (i, w) in state[4..12].iter_mut().enumerate() {
        *w = load32_le(key, i * 4);
    }
    state
}

/// XORs the keystream produced from `input` into `data`.
///
/// `advance` moves the counter words of `input` to the next
/// block.
fn xor_keystream(data: &mut [u8], input: &mut [u32; 16], advance: impl Fn(&mut [u32; 16])) {
    let mut pool = [0u32; 16];
    for chunk in data.chunks_mut(BLOCK_SIZE) {
        pool.copy_from_slice(input);
        permute(&mut pool);
        for (i, (w, x)) in pool.iter_mut().zip(input.iter()).enumerate() {
            let ks = w.wrapping_add(*x).to_le_bytes();
            for (d, k) in chunk.iter_mut().skip(i * 4).zip(ks) {
                *d ^= k;
            }
        }
        advance(input);
    }
    pool.zeroize();
}

/// Returns the number of keystream blocks `len` bytes touch.
#[inline]
fn blocks(len: usize) -> u64 {
    len.div_ceil(BLOCK_SIZE) as u64
}

/// Derives a 32-byte subkey from `key` and a 16-byte input.
///
/// This is the first step of XChaCha20. The output is
/// indistinguishable from random as long as `key` is secret.
pub fn hchacha20(key: &[u8; KEY_SIZE], input: &[u8; 16]) -> [u8; 32] {
    let mut state = init_key(key);
    for (i, w) in state[12..].iter_mut().enumerate() {
        *w = load32_le(input, i * 4);
    }
    permute(&mut state);

    let mut out = [0u8; 32];
    for (i, w) in state[..4].iter().chain(&state[12..]).enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
    }
    state.zeroize();
    out
}

/// Encrypts or decrypts `data` with the original ChaCha20,
/// starting at block 0.
///
/// A `(key, nonce)` pair must never be reused.
pub fn chacha20(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 8]) {
    chacha20_ctr(data, key, nonce, 0);
}

/// Like [`chacha20`], but starts at block `ctr`.
///
/// Returns the counter of the next unused block. A trailing
/// partial block counts as used, so feeding the result into
/// another call continues the keystream only when `data` was a
/// whole number of blocks.
pub fn chacha20_ctr(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 8], ctr: u64) -> u64 {
    let mut input = init_key(key);
    input[12] = ctr as u32;
    input[13] = (ctr >> 32) as u32;
    input[14] = load32_le(nonce, 0);
    input[15] = load32_le(nonce, 4);
    xor_keystream(data, &mut input, |s| {
        s[12] = s[12].wrapping_add(1);
        if s[12] == 0 {
            s[13] = s[13].wrapping_add(1);
        }
    });
    input.zeroize();
    ctr.wrapping_add(blocks(data.len()))
}

/// Encrypts or decrypts `data` with the RFC 8439 ChaCha20,
/// starting at block 0.
///
/// The block counter is 32 bits wide, which limits a single
/// `(key, nonce)` pair to 256 GiB of keystream.
pub fn ietf_chacha20(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 12]) {
    ietf_chacha20_ctr(data, key, nonce, 0);
}

/// Like [`ietf_chacha20`], but starts at block `ctr`.
///
/// Returns the counter of the next unused block. The counter
/// wraps around at 2^32.
pub fn ietf_chacha20_ctr(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 12], ctr: u32) -> u32 {
    let mut input = init_key(key);
    input[12] = ctr;
    input[13] = load32_le(nonce, 0);
    input[14] = load32_le(nonce, 4);
    input[15] = load32_le(nonce, 8);
    xor_keystream(data, &mut input, |s| s[12] = s[12].wrapping_add(1));
    input.zeroize();
    ctr.wrapping_add(blocks(data.len()) as u32)
}

/// Encrypts or decrypts `data` with XChaCha20, starting at block
/// 0.
///
/// The nonce is large enough to be chosen at random.
pub fn xchacha20(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 24]) {
    xchacha20_ctr(data, key, nonce, 0);
}

/// Like [`xchacha20`], but starts at block `ctr`.
///
/// Returns the counter of the next unused block.
pub fn xchacha20_ctr(data: &mut [u8], key: &[u8; KEY_SIZE], nonce: &[u8; 24], ctr: u64) -> u64 {
    let (head, tail) = split_nonce(nonce);
    let mut subkey = hchacha20(key, &head);
    let next = chacha20_ctr(data, &subkey, &tail, ctr);
    subkey.zeroize();
    next
}

/// Splits an XChaCha20 nonce into the HChaCha20 input and the
/// ChaCha20 nonce.
pub(crate) fn split_nonce(nonce: &[u8; 24]) -> ([u8; 16], [u8; 8]) {
    let mut head = [0u8; 16];
    let mut tail = [0u8; 8];
    head.copy_from_slice(&nonce[..16]);
    tail.copy_from_slice(&nonce[16..]);
    (head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hex_arr as arr;

    fn key_0_to_31() -> [u8; 32] {
        let mut key = [0u8; 32];
        for (i, b) in key.iter_mut().enumerate() {
            *b = i as u8;
        }
        key
    }

    #[test]
    fn test_zero_key_keystream() {
        let mut buf = [0u8; 64];
        chacha20(&mut buf, &[0; 32], &[0; 8]);
        let want: [u8; 64] = arr(
            "76b8e0ada0f13d90405d6ae55386bd28bdd219b8a08ded1aa836efcc8b770dc7\
             da41597c5157488d7724e03fb8d84a376a43b8f41518a11cc387b669b2ee6586",
        );
        assert_eq!(buf, want);
    }

    #[test]
    fn test_hchacha20() {
        let input: [u8; 16] = arr("000000090000004a0000000031415927");
        let got = hchacha20(&key_0_to_31(), &input);
        let want: [u8; 32] =
            arr("82413b4227b27bfed30e42508a877d73a0f9e4d58a74a853c12ec41326d3ecdc");
        assert_eq!(got, want);
    }

    #[test]
    fn test_ietf_sunscreen() {
        let mut msg = *b"Ladies and Gentlemen of the class of '99: \
            If I could offer you only one tip for the future, \
            sunscreen would be it.";
        let nonce: [u8; 12] = arr("000000000000004a00000000");
        let next = ietf_chacha20_ctr(&mut msg, &key_0_to_31(), &nonce, 1);
        let want = hex::decode(
            "6e2e359a2568f98041ba0728dd0d6981e97e7aec1d4360c20a27afccfd9fae0b\
             f91b65c5524733ab8f593dabcd62b3571639d624e65152ab8f530c359f0861d8\
             07ca0dbf500d6a6156a38e088a22b65e52bc514d16ccf806818ce91ab7793736\
             5af90bbf74a35be6b40b8eedf2785e42874d",
        )
        .unwrap();
        assert_eq!(&msg[..], &want[..]);
        assert_eq!(next, 1 + 2);
    }

    #[test]
    fn test_ctr_continues_keystream() {
        let key = [7u8; 32];
        let nonce = [9u8; 8];

        let mut whole = [0u8; 64 * 5];
        chacha20(&mut whole, &key, &nonce);

        let mut parts = [0u8; 64 * 5];
        let (a, b) = parts.split_at_mut(64 * 2);
        let next = chacha20_ctr(a, &key, &nonce, 0);
        assert_eq!(next, 2);
        let next = chacha20_ctr(b, &key, &nonce, next);
        assert_eq!(next, 5);
        assert_eq!(whole, parts);
    }

    #[test]
    fn test_partial_block_counts() {
        let mut buf = [0u8; 65];
        assert_eq!(chacha20_ctr(&mut buf, &[0; 32], &[0; 8], 10), 12);
        assert_eq!(chacha20_ctr(&mut [], &[0; 32], &[0; 8], 10), 10);
        assert_eq!(ietf_chacha20_ctr(&mut buf[..1], &[0; 32], &[0; 12], 3), 4);
    }

    #[test]
    fn test_64_bit_counter_carries() {
        // Block 2^32 - 1 followed by block 2^32.
        let key = [3u8; 32];
        let nonce = [4u8; 8];
        let mut two = [0u8; 128];
        chacha20_ctr(&mut two, &key, &nonce, u64::from(u32::MAX));
        let mut second = [0u8; 64];
        chacha20_ctr(&mut second, &key, &nonce, 1 << 32);
        assert_eq!(&two[64..], &second[..]);
    }

    #[test]
    fn test_ietf_counter_wraps() {
        let key = [5u8; 32];
        let nonce = [6u8; 12];
        let mut two = [0u8; 128];
        let next = ietf_chacha20_ctr(&mut two, &key, &nonce, u32::MAX);
        assert_eq!(next, 1);
        let mut first = [0u8; 64];
        ietf_chacha20_ctr(&mut first, &key, &nonce, 0);
        assert_eq!(&two[64..], &first[..]);
    }

    #[test]
    fn test_ietf_matches_original_layout() {
        // The IETF nonce's first word takes the place of the
        // high half of the original 64-bit counter.
        let key = [1u8; 32];
        let nonce: [u8; 12] = arr("010000000203040506070809");
        let mut tail = [0u8; 8];
        tail.copy_from_slice(&nonce[4..]);

        let mut a = [0u8; 100];
        let mut b = [0u8; 100];
        ietf_chacha20_ctr(&mut a, &key, &nonce, 42);
        chacha20_ctr(&mut b, &key, &tail, (1 << 32) | 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_xchacha20_is_hchacha_then_chacha() {
        let key = [0x42u8; 32];
        let mut nonce = [0u8; 24];
        for (i, b) in nonce.iter_mut().enumerate() {
            *b = i as u8;
        }
        let mut a = [0u8; 200];
        xchacha20(&mut a, &key, &nonce);

        let (head, tail) = split_nonce(&nonce);
        let subkey = hchacha20(&key, &head);
        let mut b = [0u8; 200];
        chacha20(&mut b, &subkey, &tail);
        assert_eq!(a, b);
    }

    #[test]
    fn test_round_trip() {
        let key = [0x11u8; 32];
        let nonce = [0x22u8; 24];
        let msg = *b"attack at dawn, or maybe a bit later";
        let mut buf = msg;
        xchacha20(&mut buf, &key, &nonce);
        assert_ne!(buf, msg);
        xchacha20(&mut buf, &key, &nonce);
        assert_eq!(buf, msg);
    }
}
