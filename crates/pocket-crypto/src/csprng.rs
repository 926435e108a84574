//! Caller-provided randomness.
//!
//! This crate never generates randomness on its own. Functions
//! that need fresh secrets take them as arguments, usually as a
//! [`Seed`][crate::Seed]. [`Csprng`] is a small seam for callers
//! that would rather hand over a generator.

/// A cryptographically secure pseudorandom number generator
/// (CSPRNG).
pub trait Csprng {
    /// Entirely fills `dst` with cryptographically secure
    /// pseudorandom bytes.
    ///
    /// # Error Handling
    ///
    /// If the underlying CSPRNG encounters transient errors (for
    /// example, blocking on startup), it must block until the
    /// error condition subsides.
    ///
    /// If the underlying CSPRNG encounters a fatal error, it
    /// must immediately panic or abort the program.
    fn fill_bytes(&mut self, dst: &mut [u8]);
}

impl<R: Csprng + ?Sized> Csprng for &mut R {
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        (**self).fill_bytes(dst)
    }
}

/// Adapts a [`rand_core`] RNG to [`Csprng`].
///
/// Only RNGs that implement [`rand_core::CryptoRng`] are
/// accepted.
#[cfg(feature = "rand_compat")]
#[cfg_attr(docsrs, doc(cfg(feature = "rand_compat")))]
#[derive(Debug)]
pub struct RandCompat<R>(pub R);

#[cfg(feature = "rand_compat")]
impl<R> Csprng for RandCompat<R>
where
    R: rand_core::CryptoRng + rand_core::RngCore,
{
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst)
    }
}

/// Implemented by types that can generate random instances.
pub trait Random {
    /// Generates a random instance of itself.
    fn random<R: Csprng>(rng: &mut R) -> Self;
}

impl<const N: usize> Random for [u8; N] {
    fn random<R: Csprng>(rng: &mut R) -> Self {
        let mut v = [0u8; N];
        rng.fill_bytes(&mut v);
        v
    }
}
