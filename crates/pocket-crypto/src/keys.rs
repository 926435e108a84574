//! Fixed-size keys, seeds and other byte strings.
//!
//! Secret values zeroize themselves when dropped, compare in
//! constant time and never print their contents. Public values
//! are plain `Copy` byte arrays that print as hex.

#![forbid(unsafe_code)]

use crate::csprng::{Csprng, Random};

/// Creates a secret, fixed-size byte string.
macro_rules! secret_bytes {
    () => {};
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident($size:expr),
        $($tail:tt)*
    ) => {
        $(#[$meta])*
        #[derive(::core::clone::Clone, ::zeroize::Zeroize, ::zeroize::ZeroizeOnDrop)]
        #[repr(transparent)]
        $vis struct $name([u8; $size]);

        impl $name {
            /// The size in bytes.
            pub const SIZE: usize = $size;

            /// Creates the secret from its bytes.
            #[inline]
            pub const fn from_bytes(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Returns the secret bytes.
            #[inline]
            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }
        }

        impl ::core::convert::From<[u8; $size]> for $name {
            #[inline]
            fn from(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }
        }

        impl ::subtle::ConstantTimeEq for $name {
            #[inline]
            fn ct_eq(&self, other: &Self) -> ::subtle::Choice {
                ::subtle::ConstantTimeEq::ct_eq(&self.0[..], &other.0[..])
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.debug_struct(stringify!($name)).finish_non_exhaustive()
            }
        }

        secret_bytes!{ $($tail)* }
    };
}
pub(crate) use secret_bytes;

/// Creates a public, fixed-size byte string.
macro_rules! public_bytes {
    () => {};
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident($size:expr),
        $($tail:tt)*
    ) => {
        $(#[$meta])*
        #[derive(
            ::core::marker::Copy,
            ::core::clone::Clone,
            ::core::cmp::Eq,
            ::core::cmp::PartialEq,
            ::core::hash::Hash,
        )]
        #[repr(transparent)]
        $vis struct $name([u8; $size]);

        impl $name {
            /// The size in bytes.
            pub const SIZE: usize = $size;

            /// Creates the value from its bytes.
            #[inline]
            pub const fn from_bytes(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Returns the bytes.
            #[inline]
            pub const fn as_bytes(&self) -> &[u8; $size] {
                &self.0
            }

            /// Converts the value into its bytes.
            #[inline]
            pub const fn to_bytes(self) -> [u8; $size] {
                self.0
            }
        }

        impl ::core::convert::From<[u8; $size]> for $name {
            #[inline]
            fn from(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }
        }

        impl ::core::convert::From<$name> for [u8; $size] {
            #[inline]
            fn from(v: $name) -> Self {
                v.0
            }
        }

        impl ::core::convert::AsRef<[u8]> for $name {
            #[inline]
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::subtle::ConstantTimeEq for $name {
            #[inline]
            fn ct_eq(&self, other: &Self) -> ::subtle::Choice {
                ::subtle::ConstantTimeEq::ct_eq(&self.0[..], &other.0[..])
            }
        }

        impl ::core::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}(", stringify!($name))?;
                for b in &self.0 {
                    write!(f, "{b:02x}")?;
                }
                write!(f, ")")
            }
        }

        public_bytes!{ $($tail)* }
    };
}
pub(crate) use public_bytes;

secret_bytes! {
    /// 32 bytes of secret randomness used to derive a key pair.
    ///
    /// Key generation functions take a `Seed` by value and the
    /// seed is wiped as soon as they are done with it.
    pub Seed(32),
}

impl Random for Seed {
    fn random<R: Csprng>(rng: &mut R) -> Self {
        Self(Random::random(rng))
    }
}
