//! Argon2 password hashing, as specified in RFC 9106.
//!
//! Argon2 is deliberately slow and memory hungry. The memory is
//! not allocated here: the caller provides a work area of
//! [`Params::work_area_len`] blocks and erases it afterwards if
//! it cares to.
//!
//! ```rust
//! use pocket_crypto::argon2::{self, Algorithm, Block, Extras, Params};
//!
//! let params = Params::new(Algorithm::Argon2id, 64, 3, 1);
//! let mut work_area = vec![Block::default(); params.work_area_len()];
//! let mut hash = [0u8; 32];
//! argon2::argon2(
//!     &mut hash,
//!     &mut work_area,
//!     &params,
//!     b"correct horse battery staple",
//!     b"somesalt",
//!     &Extras::default(),
//! )?;
//! pocket_crypto::ct::wipe(&mut work_area[..]);
//! # Ok::<(), argon2::Argon2Error>(())
//! ```
//!
//! The lanes are computed one after the other. The result is
//! the same as with a multi-threaded implementation, only
//! slower.

#![forbid(unsafe_code)]
#![allow(
    clippy::arithmetic_side_effects,
    clippy::cast_possible_truncation,
    clippy::indexing_slicing
)]

use core::mem::size_of;

use zeroize::{DefaultIsZeroes, Zeroize};

use crate::blake2b::{Blake2b, blake2b};

/// The Argon2 version number, 0x13.
const VERSION: u32 = 0x13;

/// The number of 64-bit words in a [`Block`].
const WORDS: usize = 128;

/// Slices per pass. Synchronization points sit between them.
const SYNC_POINTS: u32 = 4;

/// The Argon2 variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Data-dependent addressing. Fastest and most resistant to
    /// GPU cracking, but leaks memory access patterns.
    Argon2d = 0,
    /// Data-independent addressing.
    Argon2i = 1,
    /// Argon2i for the first half of the first pass, Argon2d for
    /// the rest. The recommended default.
    Argon2id = 2,
}

/// Argon2 cost parameters.
///
/// All of these are public: they are usually stored next to the
/// hash.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Params {
    /// The variant.
    pub algorithm: Algorithm,
    /// The memory cost in KiB blocks. At least `8 * nb_lanes`.
    /// It is rounded down to a multiple of `4 * nb_lanes`.
    pub nb_blocks: u32,
    /// The number of passes over the memory. At least 1.
    pub nb_passes: u32,
    /// The number of lanes. At least 1.
    pub nb_lanes: u32,
}

impl Params {
    /// Argon2id with 64 MiB, 3 passes, 1 lane: for interactive
    /// logins.
    pub const INTERACTIVE: Self = Self::new(Algorithm::Argon2id, 64 * 1024, 3, 1);

    /// Argon2id with 256 MiB, 3 passes, 1 lane.
    pub const MODERATE: Self = Self::new(Algorithm::Argon2id, 256 * 1024, 3, 1);

    /// Creates cost parameters.
    ///
    /// They are checked when used.
    pub const fn new(algorithm: Algorithm, nb_blocks: u32, nb_passes: u32, nb_lanes: u32) -> Self {
        Self {
            algorithm,
            nb_blocks,
            nb_passes,
            nb_lanes,
        }
    }

    /// Returns the number of blocks [`argon2`] needs in its work
    /// area.
    ///
    /// This is `nb_blocks` rounded down to a multiple of
    /// `4 * nb_lanes`, or zero if there are no lanes.
    pub const fn work_area_len(&self) -> usize {
        (self.lane_len() as usize) * (self.nb_lanes as usize)
    }

    const fn segment_len(&self) -> u32 {
        match self.nb_blocks.checked_div(self.nb_lanes) {
            Some(n) => n / SYNC_POINTS,
            None => 0,
        }
    }

    const fn lane_len(&self) -> u32 {
        self.segment_len() * SYNC_POINTS
    }

    fn check(&self, hash_len: usize) -> Result<(), Argon2Error> {
        if self.nb_lanes == 0 {
            return Err(Argon2Error::NoLanes);
        }
        if self.nb_passes == 0 {
            return Err(Argon2Error::NoPasses);
        }
        if self.nb_blocks / 8 < self.nb_lanes {
            return Err(Argon2Error::TooFewBlocks);
        }
        if hash_len == 0 || u32::try_from(hash_len).is_err() {
            return Err(Argon2Error::InvalidHashSize);
        }
        Ok(())
    }
}

/// Optional Argon2 inputs.
#[derive(Copy, Clone, Debug, Default)]
pub struct Extras<'a> {
    /// A secret key, sometimes called a pepper.
    pub key: &'a [u8],
    /// Additional data.
    pub ad: &'a [u8],
}

/// An error from [`argon2`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Argon2Error {
    /// `nb_blocks` is smaller than `8 * nb_lanes`.
    #[error("too few blocks")]
    TooFewBlocks,
    /// `nb_passes` is zero.
    #[error("at least one pass is required")]
    NoPasses,
    /// `nb_lanes` is zero.
    #[error("at least one lane is required")]
    NoLanes,
    /// The output buffer is empty or too large.
    #[error("invalid hash size")]
    InvalidHashSize,
    /// The work area is smaller than
    /// [`Params::work_area_len`].
    #[error("work area too small (need {need} blocks, got {got})")]
    WorkAreaTooSmall {
        /// The required number of blocks.
        need: usize,
        /// The number of blocks provided.
        got: usize,
    },
    /// An input is longer than `u32::MAX` bytes.
    #[error("input too long")]
    InputTooLong,
}

/// One KiB of Argon2 memory.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub struct Block([u64; WORDS]);
const_assert!(size_of::<Block>() == 1024);

impl Block {
    /// A block of zeros.
    pub const ZERO: Self = Self([0; WORDS]);

    fn load(bytes: &[u8; 1024]) -> Self {
        let mut b = Self::ZERO;
        for (w, chunk) in b.0.iter_mut().zip(bytes.chunks_exact(8)) {
            let mut le = [0u8; 8];
            le.copy_from_slice(chunk);
            *w = u64::from_le_bytes(le);
        }
        b
    }

    fn store(&self, bytes: &mut [u8; 1024]) {
        for (w, chunk) in self.0.iter().zip(bytes.chunks_exact_mut(8)) {
            chunk.copy_from_slice(&w.to_le_bytes());
        }
    }

    fn xor_with(&mut self, other: &Self) {
        for (a, b) in self.0.iter_mut().zip(other.0.iter()) {
            *a ^= b;
        }
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::ZERO
    }
}

impl DefaultIsZeroes for Block {}

/// Computes an Argon2 hash of `password` into `hash`.
///
/// `hash` may be any non-zero length; 32 bytes is typical.
/// `work_area` must hold at least [`Params::work_area_len`]
/// blocks. Its contents on entry do not matter and on return are
/// left for the caller to erase.
#[tracing::instrument(skip_all, fields(
    algorithm = ?params.algorithm,
    nb_blocks = params.nb_blocks,
    nb_passes = params.nb_passes,
    nb_lanes = params.nb_lanes,
))]
pub fn argon2(
    hash: &mut [u8],
    work_area: &mut [Block],
    params: &Params,
    password: &[u8],
    salt: &[u8],
    extras: &Extras<'_>,
) -> Result<(), Argon2Error> {
    if let Err(err) = params.check(hash.len()) {
        tracing::debug!(%err, "invalid parameters");
        return Err(err);
    }
    let need = params.work_area_len();
    if work_area.len() < need {
        let err = Argon2Error::WorkAreaTooSmall {
            need,
            got: work_area.len(),
        };
        tracing::debug!(%err, "invalid parameters");
        return Err(err);
    }
    let blocks = &mut work_area[..need];

    let mut h0 = initial_hash(hash.len(), params, password, salt, extras)?;
    init_lanes(blocks, params, &h0);
    h0.zeroize();

    fill_memory(blocks, params);

    let lane_len = params.lane_len() as usize;
    let mut last = blocks[lane_len - 1];
    for lane in blocks.chunks_exact(lane_len).skip(1) {
        last.xor_with(&lane[lane_len - 1]);
    }
    let mut bytes = [0u8; 1024];
    last.store(&mut bytes);
    extended_hash(hash, &[&bytes]);
    bytes.zeroize();
    last.zeroize();
    Ok(())
}

/// H0, the 64-byte digest of every input and parameter.
fn initial_hash(
    hash_len: usize,
    params: &Params,
    password: &[u8],
    salt: &[u8],
    extras: &Extras<'_>,
) -> Result<[u8; 64], Argon2Error> {
    let mut ctx = Blake2b::new();
    for word in [
        params.nb_lanes,
        hash_len as u32,
        params.nb_blocks,
        params.nb_passes,
        VERSION,
        params.algorithm as u32,
    ] {
        ctx.update(&word.to_le_bytes());
    }
    for input in [password, salt, extras.key, extras.ad] {
        let len = u32::try_from(input.len()).map_err(|_| Argon2Error::InputTooLong)?;
        ctx.update(&len.to_le_bytes());
        ctx.update(input);
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(ctx.finalize().as_bytes());
    Ok(out)
}

/// Fills the first two blocks of each lane from H0.
fn init_lanes(blocks: &mut [Block], params: &Params, h0: &[u8; 64]) {
    let lane_len = params.lane_len() as usize;
    let mut bytes = [0u8; 1024];
    for (lane, chunk) in blocks.chunks_exact_mut(lane_len).enumerate() {
        let lane = (lane as u32).to_le_bytes();
        for (col, block) in chunk[..2].iter_mut().enumerate() {
            let col = (col as u32).to_le_bytes();
            extended_hash(&mut bytes, &[h0, &col, &lane]);
            *block = Block::load(&bytes);
        }
    }
    bytes.zeroize();
}

/// H', BLAKE2b stretched to any output length.
fn extended_hash(out: &mut [u8], input: &[&[u8]]) {
    let len = (out.len() as u32).to_le_bytes();
    let mut ctx = Blake2b::init(out.len().min(64), &[]);
    ctx.update(&len);
    for part in input {
        ctx.update(part);
    }
    let digest = ctx.finalize();
    if out.len() <= 64 {
        out.copy_from_slice(digest.as_bytes());
        return;
    }

    let mut v = [0u8; 64];
    v.copy_from_slice(digest.as_bytes());
    out[..32].copy_from_slice(&v[..32]);
    let mut i = 32;
    while out.len() - i > 64 {
        v = blake2b(&v);
        out[i..i + 32].copy_from_slice(&v[..32]);
        i += 32;
    }
    let mut ctx = Blake2b::init(out.len() - i, &[]);
    ctx.update(&v);
    out[i..].copy_from_slice(ctx.finalize().as_bytes());
    v.zeroize();
}

/// The position of the segment being filled.
#[derive(Copy, Clone, Debug)]
struct Position {
    pass: u32,
    slice: u32,
    lane: u32,
}

fn fill_memory(blocks: &mut [Block], params: &Params) {
    for pass in 0..params.nb_passes {
        for slice in 0..SYNC_POINTS {
            for lane in 0..params.nb_lanes {
                fill_segment(blocks, params, Position { pass, slice, lane });
            }
        }
        tracing::trace!(pass, "pass complete");
    }
}

fn fill_segment(blocks: &mut [Block], params: &Params, pos: Position) {
    let seg_len = params.segment_len();
    let lane_len = params.lane_len();
    let nb_lanes = params.nb_lanes;

    let data_independent = match params.algorithm {
        Algorithm::Argon2i => true,
        Algorithm::Argon2id => pos.pass == 0 && pos.slice < SYNC_POINTS / 2,
        Algorithm::Argon2d => false,
    };

    let mut addresses = Block::ZERO;
    let mut input = Block::ZERO;
    if data_independent {
        input.0[0] = u64::from(pos.pass);
        input.0[1] = u64::from(pos.lane);
        input.0[2] = u64::from(pos.slice);
        input.0[3] = u64::from(lane_len * nb_lanes);
        input.0[4] = u64::from(params.nb_passes);
        input.0[5] = params.algorithm as u64;
    }

    let first_segment = pos.pass == 0 && pos.slice == 0;
    let start = if first_segment {
        if data_independent {
            next_addresses(&mut addresses, &mut input);
        }
        2
    } else {
        0
    };

    for index in start..seg_len {
        let curr = pos.lane * lane_len + pos.slice * seg_len + index;
        let prev = if curr % lane_len == 0 {
            curr + lane_len - 1
        } else {
            curr - 1
        };

        let pseudo_rand = if data_independent {
            let i = (index as usize) % WORDS;
            if i == 0 {
                next_addresses(&mut addresses, &mut input);
            }
            addresses.0[i]
        } else {
            blocks[prev as usize].0[0]
        };

        let ref_lane = if first_segment {
            pos.lane
        } else {
            ((pseudo_rand >> 32) % u64::from(nb_lanes)) as u32
        };
        let ref_index = reference_index(
            params,
            pos,
            index,
            pseudo_rand as u32,
            ref_lane == pos.lane,
        );
        let reference = ref_lane * lane_len + ref_index;

        let mut r = blocks[prev as usize];
        r.xor_with(&blocks[reference as usize]);
        compress(&mut blocks[curr as usize], &r, pos.pass > 0);
        r.zeroize();
    }
    addresses.zeroize();
}

/// Maps `j1` onto the reference set of the block at `index`.
fn reference_index(params: &Params, pos: Position, index: u32, j1: u32, same_lane: bool) -> u32 {
    let seg_len = u64::from(params.segment_len());
    let lane_len = u64::from(params.lane_len());
    let index = u64::from(index);

    // Every block is allowed to reference all finished segments.
    // Blocks in the current lane may also reference the finished
    // part of the current segment, except the previous block.
    let finished = if pos.pass == 0 {
        u64::from(pos.slice) * seg_len
    } else {
        lane_len - seg_len
    };
    let area = if same_lane {
        finished + index - 1
    } else if index == 0 {
        finished - 1
    } else {
        finished
    };

    let x = (u64::from(j1) * u64::from(j1)) >> 32;
    let relative = area - 1 - ((area * x) >> 32);

    let start = if pos.pass == 0 || pos.slice == SYNC_POINTS - 1 {
        0
    } else {
        u64::from(pos.slice + 1) * seg_len
    };
    ((start + relative) % lane_len) as u32
}

/// Generates the next block of data-independent addresses.
fn next_addresses(addresses: &mut Block, input: &mut Block) {
    input.0[6] += 1;
    let mut tmp = Block::ZERO;
    compress(&mut tmp, input, false);
    let r = tmp;
    compress(addresses, &r, false);
}

/// Sets `out` to G applied to `r = X ⊕ Y`, or XORs the result
/// into `out` if `xor` is set.
fn compress(out: &mut Block, r: &Block, xor: bool) {
    let mut z = *r;
    for row in 0..8 {
        let base = row * 16;
        let mut idx = [0usize; 16];
        for (k, i) in idx.iter_mut().enumerate() {
            *i = base + k;
        }
        round(&mut z.0, &idx);
    }
    for col in 0..8 {
        let mut idx = [0usize; 16];
        for (k, i) in idx.iter_mut().enumerate() {
            *i = 2 * col + (k / 2) * 16 + (k % 2);
        }
        round(&mut z.0, &idx);
    }
    z.xor_with(r);
    if xor {
        out.xor_with(&z);
    } else {
        *out = z;
    }
    z.zeroize();
}

/// One BLAKE2b round without the message, over the words at
/// `idx`.
#[inline(always)]
fn round(v: &mut [u64; WORDS], idx: &[usize; 16]) {
    let mut g = |a: usize, b: usize, c: usize, d: usize| {
        let (a, b, c, d) = (idx[a], idx[b], idx[c], idx[d]);
        v[a] = fma(v[a], v[b]);
        v[d] = (v[d] ^ v[a]).rotate_right(32);
        v[c] = fma(v[c], v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(24);
        v[a] = fma(v[a], v[b]);
        v[d] = (v[d] ^ v[a]).rotate_right(16);
        v[c] = fma(v[c], v[d]);
        v[b] = (v[b] ^ v[c]).rotate_right(63);
    };
    g(0, 4, 8, 12);
    g(1, 5, 9, 13);
    g(2, 6, 10, 14);
    g(3, 7, 11, 15);
    g(0, 5, 10, 15);
    g(1, 6, 11, 12);
    g(2, 7, 8, 13);
    g(3, 4, 9, 14);
}

/// `a + b + 2 * lo(a) * lo(b)`, all mod 2^64.
#[inline(always)]
fn fma(a: u64, b: u64) -> u64 {
    let m = (a & 0xffff_ffff).wrapping_mul(b & 0xffff_ffff);
    a.wrapping_add(b).wrapping_add(m.wrapping_mul(2))
}
