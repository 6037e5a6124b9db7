//! String signatures.
//!
//! A signature is a 32/64/128-bit hash derived from a byte string. Signatures
//! stand in for keys everywhere in this crate: the dictionary stores and
//! compares signatures, never the original bytes.
//!
//! The hash must be deterministic across runs and platforms. Persisted
//! dictionary files embed signatures, so the algorithm below is pinned
//! byte-for-byte: same multiplier, same shift amounts, same chunking. Do not
//! substitute another hash without migrating every existing file.

use std::fmt;

/// Multiplier for the chunk scramble and accumulator folds.
const M: u32 = 0x5bd1_e995;

/// Shift used when scrambling each input chunk.
const R: u32 = 24;

/// Seed for the second half of a 128-bit signature.
const SEED_ALT: u32 = 37;

/// A 64-bit signature split into its two 32-bit halves.
///
/// Two keys are considered equal iff their `(hi, lo)` pairs are equal. The
/// original bytes are never retained or re-checked, so signature equality is
/// key equality: collisions are accepted, not detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Bits 63-32 of the 64-bit signature.
    pub hi: u32,
    /// Bits 31-0 of the 64-bit signature.
    pub lo: u32,
}

impl Signature {
    /// Compute the signature of a byte string.
    #[inline]
    pub fn of(bytes: &[u8]) -> Self {
        Self::from_u64(sign64(bytes))
    }

    /// Split a packed 64-bit signature into halves.
    #[inline]
    pub const fn from_u64(sign: u64) -> Self {
        Self {
            hi: (sign >> 32) as u32,
            lo: sign as u32,
        }
    }

    /// Pack the halves back into a 64-bit signature.
    #[inline]
    pub const fn to_u64(self) -> u64 {
        ((self.hi as u64) << 32) | self.lo as u64
    }

    /// Bucket index for this signature in a table of `hash_size` buckets.
    ///
    /// This is the one place the formula lives; insertion and lookup both go
    /// through it so the two paths cannot diverge.
    #[inline]
    pub(crate) fn bucket(self, hash_size: u32) -> u32 {
        self.hi.wrapping_add(self.lo) % hash_size
    }
}

impl From<u64> for Signature {
    #[inline]
    fn from(sign: u64) -> Self {
        Self::from_u64(sign)
    }
}

impl From<Signature> for u64 {
    #[inline]
    fn from(sig: Signature) -> Self {
        sig.to_u64()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}{:08x}", self.hi, self.lo)
    }
}

/// Scramble one 32-bit input chunk.
#[inline]
fn scramble(mut k: u32) -> u32 {
    k = k.wrapping_mul(M);
    k ^= k >> R;
    k.wrapping_mul(M)
}

/// Run the accumulator pipeline over `bytes`, returning `(h1, h2)`.
///
/// The input is consumed in 8-byte strides feeding the two accumulators
/// alternately, then one 4-byte chunk into `h1`, then the 0-3 byte tail
/// xor-folded into `h2`. Chunks are read little-endian. The final avalanche
/// mixes the accumulators against each other.
fn mix(bytes: &[u8], seed: u32) -> (u32, u32) {
    let mut h1: u32 = seed ^ bytes.len() as u32;
    let mut h2: u32 = 0;

    let mut rest = bytes;
    while rest.len() >= 8 {
        let k1 = u32::from_le_bytes(rest[0..4].try_into().unwrap());
        h1 = h1.wrapping_mul(M) ^ scramble(k1);
        let k2 = u32::from_le_bytes(rest[4..8].try_into().unwrap());
        h2 = h2.wrapping_mul(M) ^ scramble(k2);
        rest = &rest[8..];
    }

    if rest.len() >= 4 {
        let k1 = u32::from_le_bytes(rest[0..4].try_into().unwrap());
        h1 = h1.wrapping_mul(M) ^ scramble(k1);
        rest = &rest[4..];
    }

    if !rest.is_empty() {
        if rest.len() >= 3 {
            h2 ^= (rest[2] as u32) << 16;
        }
        if rest.len() >= 2 {
            h2 ^= (rest[1] as u32) << 8;
        }
        h2 ^= rest[0] as u32;
        h2 = h2.wrapping_mul(M);
    }

    h1 ^= h2 >> 18;
    h1 = h1.wrapping_mul(M);
    h2 ^= h1 >> 22;
    h2 = h2.wrapping_mul(M);
    h1 ^= h2 >> 17;
    h1 = h1.wrapping_mul(M);
    h2 ^= h1 >> 19;
    h2 = h2.wrapping_mul(M);

    (h1, h2)
}

/// 64-bit signature with an explicit seed.
#[inline]
fn sign64_seeded(bytes: &[u8], seed: u32) -> u64 {
    let (h1, h2) = mix(bytes, seed);
    ((h1 as u64) << 32) | h2 as u64
}

/// Compute a 64-bit signature of a byte string.
///
/// `h1` lands in the high 32 bits, `h2` in the low 32 bits.
#[inline]
pub fn sign64(bytes: &[u8]) -> u64 {
    sign64_seeded(bytes, 0)
}

/// Compute a 32-bit signature of a byte string.
///
/// Same pipeline as [`sign64`], folded by XOR-ing the two halves.
#[inline]
pub fn sign32(bytes: &[u8]) -> u32 {
    let (h1, h2) = mix(bytes, 0);
    h1 ^ h2
}

/// Compute a 128-bit signature of a byte string.
///
/// The second half is the same pipeline run under a different seed. Empty
/// input yields `(0, 0)`.
#[inline]
pub fn sign128(bytes: &[u8]) -> (u64, u64) {
    if bytes.is_empty() {
        return (0, 0);
    }
    (sign64_seeded(bytes, 0), sign64_seeded(bytes, SEED_ALT))
}
