// SPDX-License-Identifier: Apache-2.0
//! Identifier and hashing utilities.
use blake3::Hasher;

/// Canonical 256-bit hash used throughout the engine for function identity
/// and deterministic tie-break ordering.
pub type Hash = [u8; 32];

/// Strongly typed identifier for a function definition.
///
/// `FunctionId` is an opaque 32-byte identifier (`Hash`). Definitions
/// registered from a function repository use stable, label-derived ids via
/// [`make_function_id`] (`blake3("function:" || name)`), but this is a
/// convention, not a global constraint: a repository may mint
/// content-addressed ids from its own domain-separated hashes.
///
/// Tooling must not assume that every `FunctionId` is reversible back into a
/// human-readable name.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FunctionId(pub Hash);

impl FunctionId {
    /// Returns the canonical byte representation of this id.
    #[must_use]
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }
}

/// Produces a stable, domain-separated function identifier (prefix
/// `b"function:"`) using BLAKE3.
pub fn make_function_id(name: &str) -> FunctionId {
    let mut hasher = Hasher::new();
    hasher.update(b"function:");
    hasher.update(name.as_bytes());
    FunctionId(hasher.finalize().into())
}

/// Renders the first eight bytes of a hash as hex for logs and `Debug` output.
#[must_use]
pub(crate) fn short_hex(h: &Hash) -> String {
    let mut short = [0u8; 8];
    short.copy_from_slice(&h[0..8]);
    hex::encode(short)
}
