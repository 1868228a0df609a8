// SPDX-License-Identifier: Apache-2.0
//! Compilation-instant identifier type.

/// Thin wrapper around the instant a resolver was compiled at.
///
/// The embedding platform issues these when it snapshots its function
/// repository; within this crate the value is opaque. One resolver is bound
/// to exactly one instant: a new instant gets a new resolver, never an
/// in-place update.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompilationInstant(u64);

impl CompilationInstant {
    /// Constructs an instant from a raw `u64` value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the underlying raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for CompilationInstant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
