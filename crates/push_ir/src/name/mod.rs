//! Interned symbol identifier.
//!
//! A `Name` is a compact 32-bit index into the `NameInterner` of the
//! interpreter that produced it. Two names from the same interner compare
//! equal exactly when their text is equal, so comparison and hashing never
//! touch the string contents.

use std::fmt;
use std::hash::{Hash, Hasher};

/// Interned symbol identifier.
///
/// Only meaningful together with the interner that created it. Moving a name
/// to another interpreter means re-interning its text there.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Name(u32);

impl Name {
    /// Pre-interned empty string.
    pub const EMPTY: Name = Name(0);

    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Name(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the interner's string table.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl Hash for Name {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::EMPTY
    }
}
