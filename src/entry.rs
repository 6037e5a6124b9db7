//! Arena entries.
//!
//! An entry binds a signature to its `(code, value)` payload and to the next
//! link of its bucket chain. Entries are appended to the arena and never
//! physically removed or relocated; deletion tombstones the payload in place.

use crate::sign::Signature;
use crate::slot::Slot;

/// Reserved `code` marking a tombstoned (logically absent) entry.
pub const TOMBSTONE: i32 = -1;

/// One dictionary entry.
///
/// On disk this is a fixed 20-byte little-endian record:
/// `[u32 hi][u32 lo][i32 code][i32 value][u32 next]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Signature standing in for the key.
    pub sig: Signature,
    /// Caller-defined code; [`TOMBSTONE`] means logically deleted.
    pub code: i32,
    /// Caller-defined value.
    pub value: i32,
    /// Next entry in this bucket's chain, or [`Slot::NIL`] at the tail.
    pub next: Slot,
}

impl Entry {
    /// On-disk record size in bytes.
    pub const SIZE: usize = 20;

    /// Whether this entry has been tombstoned.
    #[inline]
    pub const fn is_tombstone(&self) -> bool {
        self.code == TOMBSTONE
    }

    /// Serialize to the fixed on-disk record (little-endian).
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.sig.hi.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.sig.lo.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.code.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.value.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.next.raw().to_le_bytes());
        bytes
    }

    /// Deserialize from the fixed on-disk record (little-endian).
    pub fn decode(bytes: &[u8; Self::SIZE]) -> Self {
        Self {
            sig: Signature {
                hi: u32::from_le_bytes(bytes[0..4].try_into().unwrap()),
                lo: u32::from_le_bytes(bytes[4..8].try_into().unwrap()),
            },
            code: i32::from_le_bytes(bytes[8..12].try_into().unwrap()),
            value: i32::from_le_bytes(bytes[12..16].try_into().unwrap()),
            next: Slot::from_raw(u32::from_le_bytes(bytes[16..20].try_into().unwrap())),
        }
    }
}
