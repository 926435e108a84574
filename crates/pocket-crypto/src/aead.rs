//! XChaCha20-Poly1305 authenticated encryption with associated
//! data.
//!
//! The construction matches libsodium's
//! `crypto_aead_xchacha20poly1305_ietf`: keystream block 0 of the
//! derived XChaCha20 stream keys Poly1305, the text is encrypted
//! with blocks 1 and onward, and the tag covers
//! `ad ‖ pad16 ‖ ciphertext ‖ pad16 ‖ le64(|ad|) ‖ le64(|ciphertext|)`.
//!
//! Nonces are 24 bytes, large enough to be picked at random for
//! every message. A `(key, nonce)` pair must still never be
//! reused.
//!
//! ```rust
//! use pocket_crypto::aead::{self, Key, Nonce};
//!
//! let key = Key::from([0x2a; 32]);
//! let nonce = Nonce::from([0x07; 24]);
//!
//! let mut text = *b"a secret";
//! let tag = aead::lock(&key, &nonce, b"header", &mut text);
//! aead::unlock(&key, &nonce, &tag, b"header", &mut text)?;
//! assert_eq!(&text, b"a secret");
//! # Ok::<(), aead::OpenError>(())
//! ```

#![forbid(unsafe_code)]

use zeroize::Zeroize;

use crate::{
    chacha20::{chacha20, chacha20_ctr, hchacha20, split_nonce},
    csprng::{Csprng, Random},
    ct::verify16,
    keys::{public_bytes, secret_bytes},
    poly1305::Poly1305,
};

/// The size in bytes of a key.
pub const KEY_SIZE: usize = 32;

/// The size in bytes of a nonce.
pub const NONCE_SIZE: usize = 24;

/// The size in bytes of a tag.
pub const TAG_SIZE: usize = 16;

secret_bytes! {
    /// An XChaCha20-Poly1305 key.
    pub Key(KEY_SIZE),
}

public_bytes! {
    /// An XChaCha20-Poly1305 nonce.
    pub Nonce(NONCE_SIZE),
    /// An authentication tag.
    pub Tag(TAG_SIZE),
}

impl Random for Key {
    fn random<R: Csprng>(rng: &mut R) -> Self {
        Self::from_bytes(Random::random(rng))
    }
}

impl Random for Nonce {
    fn random<R: Csprng>(rng: &mut R) -> Self {
        Self::from_bytes(Random::random(rng))
    }
}

/// The output buffer is too small.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("dest buffer too small (need {0})")]
pub struct BufferTooSmallError(pub usize);

/// An error from [`XChaCha20Poly1305::seal`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SealError {
    /// The output buffer is too small.
    #[error(transparent)]
    BufferTooSmall(#[from] BufferTooSmallError),
}

/// An error from [`unlock`] or [`XChaCha20Poly1305::open`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum OpenError {
    /// The ciphertext could not be authenticated.
    #[error("authentication error")]
    Authentication,
    /// The output buffer is too small.
    #[error(transparent)]
    BufferTooSmall(#[from] BufferTooSmallError),
}

/// Encrypts `text` in place and returns its tag.
///
/// `ad` is authenticated but not encrypted. Pass `&[]` if there
/// is none.
pub fn lock(key: &Key, nonce: &Nonce, ad: &[u8], text: &mut [u8]) -> Tag {
    let stream = Stream::new(key, nonce);
    stream.apply(text);
    stream.authenticate(ad, text)
}

/// Authenticates and then decrypts `text` in place.
///
/// The tag is checked before anything is decrypted. If it does
/// not match, `text` is left untouched and
/// [`OpenError::Authentication`] is returned.
pub fn unlock(
    key: &Key,
    nonce: &Nonce,
    tag: &Tag,
    ad: &[u8],
    text: &mut [u8],
) -> Result<(), OpenError> {
    let stream = Stream::new(key, nonce);
    let want = stream.authenticate(ad, text);
    if !bool::from(verify16(want.as_bytes(), tag.as_bytes())) {
        tracing::debug!("authentication failed");
        return Err(OpenError::Authentication);
    }
    stream.apply(text);
    Ok(())
}

/// XChaCha20-Poly1305 with a fixed key.
///
/// The buffered methods follow the usual `ciphertext ‖ tag`
/// layout.
#[derive(Clone)]
pub struct XChaCha20Poly1305 {
    key: Key,
}

impl XChaCha20Poly1305 {
    /// The size in bytes of the tag appended by
    /// [`seal`][Self::seal].
    pub const OVERHEAD: usize = TAG_SIZE;

    /// Creates an instance keyed with `key`.
    pub fn new(key: &Key) -> Self {
        Self { key: key.clone() }
    }

    /// Encrypts and authenticates `plaintext`, writing
    /// `ciphertext ‖ tag` to `dst`.
    ///
    /// `dst` must be at least `plaintext.len() + OVERHEAD`
    /// bytes long. Only that many bytes are written.
    pub fn seal(
        &self,
        dst: &mut [u8],
        nonce: &Nonce,
        plaintext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), SealError> {
        let need = plaintext
            .len()
            .checked_add(Self::OVERHEAD)
            .ok_or(BufferTooSmallError(usize::MAX))?;
        if dst.len() < need {
            return Err(BufferTooSmallError(need).into());
        }
        let (out, rest) = dst.split_at_mut(plaintext.len());
        out.copy_from_slice(plaintext);
        let tag = self.seal_in_place(nonce, out, additional_data);
        rest[..TAG_SIZE].copy_from_slice(tag.as_bytes());
        Ok(())
    }

    /// Encrypts `data` in place and returns its tag.
    pub fn seal_in_place(&self, nonce: &Nonce, data: &mut [u8], additional_data: &[u8]) -> Tag {
        lock(&self.key, nonce, additional_data, data)
    }

    /// Authenticates and decrypts `ciphertext ‖ tag`, writing
    /// the plaintext to `dst`.
    ///
    /// `dst` must be at least `ciphertext.len() - OVERHEAD`
    /// bytes long. On failure the written part of `dst` is
    /// zeroed.
    pub fn open(
        &self,
        dst: &mut [u8],
        nonce: &Nonce,
        ciphertext: &[u8],
        additional_data: &[u8],
    ) -> Result<(), OpenError> {
        let Some(n) = ciphertext.len().checked_sub(Self::OVERHEAD) else {
            tracing::debug!("ciphertext shorter than a tag");
            return Err(OpenError::Authentication);
        };
        if dst.len() < n {
            return Err(BufferTooSmallError(n).into());
        }
        let (ciphertext, tag) = ciphertext.split_at(n);
        let mut t = [0u8; TAG_SIZE];
        t.copy_from_slice(tag);

        let out = &mut dst[..n];
        out.copy_from_slice(ciphertext);
        self.open_in_place(nonce, out, &Tag::from(t), additional_data)
            .inspect_err(|_| out.zeroize())
    }

    /// Authenticates and then decrypts `data` in place.
    pub fn open_in_place(
        &self,
        nonce: &Nonce,
        data: &mut [u8],
        tag: &Tag,
        additional_data: &[u8],
    ) -> Result<(), OpenError> {
        unlock(&self.key, nonce, tag, additional_data, data)
    }
}

impl core::fmt::Debug for XChaCha20Poly1305 {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("XChaCha20Poly1305").finish_non_exhaustive()
    }
}

/// The per-message XChaCha20 stream: the HChaCha20 subkey and
/// the trailing 8 nonce bytes.
struct Stream {
    subkey: [u8; 32],
    nonce: [u8; 8],
}

impl Stream {
    fn new(key: &Key, nonce: &Nonce) -> Self {
        let (head, tail) = split_nonce(nonce.as_bytes());
        Self {
            subkey: hchacha20(key.as_bytes(), &head),
            nonce: tail,
        }
    }

    /// XORs keystream blocks 1 and onward into `text`.
    fn apply(&self, text: &mut [u8]) {
        chacha20_ctr(text, &self.subkey, &self.nonce, 1);
    }

    /// Computes the tag over `ad` and the ciphertext.
    fn authenticate(&self, ad: &[u8], ciphertext: &[u8]) -> Tag {
        const ZERO: [u8; 16] = [0; 16];

        let mut auth_key = [0u8; 32];
        chacha20(&mut auth_key, &self.subkey, &self.nonce);

        let mut mac = Poly1305::new(&auth_key);
        mac.update(ad);
        mac.update(&ZERO[..pad16(ad.len())]);
        mac.update(ciphertext);
        mac.update(&ZERO[..pad16(ciphertext.len())]);
        mac.update(&(ad.len() as u64).to_le_bytes());
        mac.update(&(ciphertext.len() as u64).to_le_bytes());
        auth_key.zeroize();
        Tag::from(mac.finalize())
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.subkey.zeroize();
    }
}

/// Returns the number of zeros that pad `n` to a multiple of
/// 16.
#[inline]
const fn pad16(n: usize) -> usize {
    n.wrapping_neg() % 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chacha20::xchacha20_ctr, poly1305::poly1305};

    fn key() -> Key {
        Key::from([0x80; KEY_SIZE])
    }

    fn nonce() -> Nonce {
        let mut n = [0u8; NONCE_SIZE];
        for (i, b) in n.iter_mut().enumerate() {
            *b = 0x40 + i as u8;
        }
        Nonce::from(n)
    }

    #[test]
    fn test_pad16() {
        assert_eq!(pad16(0), 0);
        assert_eq!(pad16(1), 15);
        assert_eq!(pad16(15), 1);
        assert_eq!(pad16(16), 0);
        assert_eq!(pad16(17), 15);
    }

    #[test]
    fn test_round_trip() {
        let msg = *b"Ladies and Gentlemen of the class of '99";
        for ad in [&b""[..], &b"x"[..], &b"some associated data that spans blocks"[..]] {
            let mut text = msg;
            let tag = lock(&key(), &nonce(), ad, &mut text);
            assert_ne!(text, msg);
            unlock(&key(), &nonce(), &tag, ad, &mut text).unwrap();
            assert_eq!(text, msg);
        }
    }

    #[test]
    fn test_empty_text() {
        let tag = lock(&key(), &nonce(), b"ad", &mut []);
        unlock(&key(), &nonce(), &tag, b"ad", &mut []).unwrap();
        assert_eq!(
            unlock(&key(), &nonce(), &tag, b"", &mut []),
            Err(OpenError::Authentication)
        );
    }

    #[test]
    fn test_construction() {
        // Ciphertext is the XChaCha20 stream from block 1 and the
        // Poly1305 key is the start of block 0.
        let ad = [1u8; 3];
        let mut text = [0u8; 70];
        let tag = lock(&key(), &nonce(), &ad, &mut text);

        let mut stream = [0u8; 64 + 70];
        xchacha20_ctr(&mut stream, key().as_bytes(), nonce().as_bytes(), 0);
        assert_eq!(&text[..], &stream[64..]);

        let mut auth_key = [0u8; 32];
        auth_key.copy_from_slice(&stream[..32]);
        let mut mac_data = [0u8; 16 + 80 + 16];
        mac_data[..3].copy_from_slice(&ad);
        mac_data[16..86].copy_from_slice(&text);
        mac_data[96..104].copy_from_slice(&3u64.to_le_bytes());
        mac_data[104..].copy_from_slice(&70u64.to_le_bytes());
        assert_eq!(tag.to_bytes(), poly1305(&mac_data, &auth_key));
    }

    #[test]
    fn test_tamper_rejected() {
        let msg = *b"tamper with me if you dare";
        let ad = *b"ad";
        let mut ct = msg;
        let tag = lock(&key(), &nonce(), &ad, &mut ct);

        for i in 0..ct.len() * 8 {
            let mut bad = ct;
            bad[i / 8] ^= 1 << (i % 8);
            let before = bad;
            let res = unlock(&key(), &nonce(), &tag, &ad, &mut bad);
            assert_eq!(res, Err(OpenError::Authentication), "ct bit {i}");
            assert_eq!(bad, before, "buffer modified on failure");
        }
        for i in 0..TAG_SIZE * 8 {
            let mut bad = tag.to_bytes();
            bad[i / 8] ^= 1 << (i % 8);
            let mut text = ct;
            let res = unlock(&key(), &nonce(), &Tag::from(bad), &ad, &mut text);
            assert_eq!(res, Err(OpenError::Authentication), "tag bit {i}");
        }
        for i in 0..ad.len() * 8 {
            let mut bad = ad;
            bad[i / 8] ^= 1 << (i % 8);
            let mut text = ct;
            let res = unlock(&key(), &nonce(), &tag, &bad, &mut text);
            assert_eq!(res, Err(OpenError::Authentication), "ad bit {i}");
        }

        let mut other = nonce().to_bytes();
        other[23] ^= 1;
        let mut text = ct;
        assert_eq!(
            unlock(&key(), &Nonce::from(other), &tag, &ad, &mut text),
            Err(OpenError::Authentication)
        );
    }

    #[test]
    fn test_seal_open_buffers() {
        let aead = XChaCha20Poly1305::new(&key());
        let msg = b"buffered";

        let mut short = [0u8; 8 + XChaCha20Poly1305::OVERHEAD - 1];
        assert_eq!(
            aead.seal(&mut short, &nonce(), msg, b""),
            Err(SealError::BufferTooSmall(BufferTooSmallError(24)))
        );

        let mut sealed = [0u8; 8 + XChaCha20Poly1305::OVERHEAD];
        aead.seal(&mut sealed, &nonce(), msg, b"").unwrap();

        let mut out = [0u8; 7];
        assert_eq!(
            aead.open(&mut out, &nonce(), &sealed, b""),
            Err(OpenError::BufferTooSmall(BufferTooSmallError(8)))
        );
        assert_eq!(
            aead.open(&mut out, &nonce(), &sealed[..15], b""),
            Err(OpenError::Authentication)
        );

        let mut out = [0xffu8; 10];
        aead.open(&mut out, &nonce(), &sealed, b"").unwrap();
        assert_eq!(&out[..8], msg);
        assert_eq!(&out[8..], &[0xff; 2]);

        sealed[0] ^= 1;
        let mut out = [0xffu8; 8];
        assert_eq!(
            aead.open(&mut out, &nonce(), &sealed, b""),
            Err(OpenError::Authentication)
        );
        assert_eq!(out, [0; 8]);
    }
}
