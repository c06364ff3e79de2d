//! Monotonic version stamps.
//!
//! Every edit transaction advances the program's clock once. Cached values
//! capture the stamp they were computed at and are discarded wholesale once
//! the clock has moved past it.

use std::fmt;

/// A point in the edit history of a program.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct VersionStamp(u64);

impl VersionStamp {
    pub const INITIAL: Self = Self(0);

    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Whether this stamp was issued strictly later than `other`.
    #[inline]
    pub fn newer_than(self, other: VersionStamp) -> bool {
        self.0 > other.0
    }
}

impl fmt::Display for VersionStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Issues version stamps in strictly increasing order.
#[derive(Debug, Clone, Default)]
pub struct VersionClock {
    current: VersionStamp,
}

impl VersionClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now(&self) -> VersionStamp {
        self.current
    }

    /// Advance the clock and return the new stamp.
    pub fn tick(&mut self) -> VersionStamp {
        self.current = VersionStamp(self.current.0 + 1);
        self.current
    }
}
