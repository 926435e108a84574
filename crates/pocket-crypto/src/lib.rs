//! Small, allocation-free cryptographic primitives.
//!
//! # Overview
//!
//! `pocket-crypto` is a compact suite of primitives for embedded
//! and otherwise constrained targets:
//!
//! - [`aead`]: XChaCha20-Poly1305 authenticated encryption.
//! - [`blake2b`]: BLAKE2b hashing and keyed hashing.
//! - [`argon2`]: Argon2d, Argon2i and Argon2id password hashing.
//! - [`x25519`]: X25519 key exchange.
//! - [`eddsa`]: EdDSA signatures over Curve25519 with BLAKE2b.
//! - [`convert`]: conversions between EdDSA and X25519 keys.
//! - [`elligator`]: Elligator 2 mappings that make X25519 public
//!   keys indistinguishable from random.
//!
//! The lower-level [`chacha20`] and [`poly1305`] modules are
//! public as well, and the `hazmat` feature enables
//! [`hazmat`][crate#hazmat], which exposes the building blocks
//! of the higher level constructions.
//!
//! # Design
//!
//! The crate never allocates. Everything lives on the stack
//! except for the Argon2 work area, which the caller provides
//! (and later erases) so that the memory cost stays explicit.
//!
//! Every operation runs in time independent of its secret
//! inputs. Secret-dependent selection uses [`subtle`]; no code
//! branches on secrets or indexes memory with them. The one
//! exception is the data-dependent addressing of Argon2d (and
//! the second half of Argon2id), which is a property of those
//! algorithms.
//!
//! Secret values are zeroized when dropped and internal secret
//! state is wiped before each function returns.
//!
//! The crate does not generate randomness. Callers provide
//! nonces and seeds from a secure source, optionally through the
//! [`Csprng`] trait.
//!
//! # Hazmat
//!
//! The `hazmat` feature exposes `hazmat::eddsa` and
//! `hazmat::x25519`. They make it possible to build custom
//! signature schemes, hidden key exchanges and OPRFs, and they
//! make it equally possible to build broken ones.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(any(test, doctest, feature = "std")), no_std)]

#[macro_use]
mod util;

pub mod aead;
pub mod argon2;
pub mod blake2b;
pub mod chacha20;
pub mod convert;
pub mod csprng;
pub mod ct;
pub mod eddsa;
mod edwards;
pub mod elligator;
mod field;
#[cfg(feature = "hazmat")]
#[cfg_attr(docsrs, doc(cfg(feature = "hazmat")))]
pub mod hazmat;
pub mod keys;
pub mod poly1305;
mod scalar;
pub mod x25519;

pub use csprng::{Csprng, Random};
pub use keys::Seed;
pub use subtle;
pub use zeroize;
