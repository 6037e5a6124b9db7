//! Arena slot handles.
//!
//! Entries live in a growable arena and refer to each other by index, not by
//! pointer: growth reallocates the backing storage but never renumbers, so a
//! slot is a stable identity for an entry's whole lifetime. Bucket heads and
//! chain links are both slots.

use std::fmt;

/// Index of an entry in the arena, or the nil sentinel.
///
/// The nil value is `0xFFFF_FFFE`, not `u32::MAX`; persisted files carry it
/// verbatim, so the exact bit pattern is part of the wire format.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Slot(u32);

impl Slot {
    /// The "no entry" sentinel, terminating chains and marking empty buckets.
    pub const NIL: Self = Self(0xFFFF_FFFE);

    /// Create a slot for a valid arena index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Reconstruct a slot from its raw wire value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw wire value (a valid index, or the nil bit pattern).
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Arena index of this slot. Meaningless for [`Slot::NIL`].
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this slot is the nil sentinel.
    #[inline]
    pub const fn is_nil(self) -> bool {
        self.0 == Self::NIL.0
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "Slot(NIL)")
        } else {
            write!(f, "Slot({})", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_bit_pattern() {
        // Wire compatibility: nil is 0xFFFF_FFFE exactly.
        assert_eq!(Slot::NIL.raw(), 0xFFFF_FFFE);
        assert!(Slot::NIL.is_nil());
        assert!(!Slot::new(0).is_nil());
        assert!(!Slot::new(u32::MAX).is_nil());
    }

    #[test]
    fn test_raw_roundtrip() {
        for raw in [0u32, 1, 49_999, 0xFFFF_FFFE, u32::MAX] {
            assert_eq!(Slot::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn test_index() {
        assert_eq!(Slot::new(42).index(), 42);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Slot::new(7)), "Slot(7)");
        assert_eq!(format!("{:?}", Slot::NIL), "Slot(NIL)");
    }
}
