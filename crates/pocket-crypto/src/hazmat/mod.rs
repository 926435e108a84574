//! Low-level building blocks.
//!
//! # ⚠️ Warning
//! <div class="warning">
//! This is a low-level module. You should not be using it
//! unless you understand what you are doing.
//! </div>
//!
//! [`eddsa`] exposes the pieces EdDSA is made of, for building
//! related schemes such as other signature hashes or
//! verifiable random functions. [`x25519`] exposes dirty public
//! key generation (for [Elligator][crate::elligator]) and scalar
//! inversion (for exponential blinding).

pub mod eddsa;
pub mod x25519;
