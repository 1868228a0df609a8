// SPDX-License-Identifier: Apache-2.0
//! Function model: definitions, parameter bundles, and parameterized
//! function identity.
use std::collections::BTreeMap;
use std::sync::Arc;

use blake3::Hasher;
use thiserror::Error;

use crate::context::FunctionContext;
use crate::ident::{short_hex, FunctionId, Hash};
use crate::target::{ComputationTarget, ComputationTargetType};
use crate::value::{ValueRequirement, ValueSpecification};

/// Soft failure raised by a function callback.
///
/// Faults are caught at the rule layer, logged, and treated as "this function
/// contributes nothing for this call"; they never abort resolution for other
/// rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("function fault: {0}")]
pub struct FunctionFault(pub String);

impl FunctionFault {
    /// Constructs a fault carrying a diagnostic message.
    #[must_use]
    pub fn new<M: Into<String>>(message: M) -> Self {
        Self(message.into())
    }
}

/// Callback deciding whether a function applies to the provided target at
/// all. Cheap; called before result enumeration.
pub type CanApplyFn = fn(&FunctionContext, &ComputationTarget) -> bool;

/// Callback enumerating the maximal outputs a function could produce on a
/// target, before any requirement narrows them.
pub type ResultsFn = fn(
    &FunctionContext,
    &ComputationTarget,
    &FunctionParameters,
) -> Result<Vec<ValueSpecification>, FunctionFault>;

/// Callback enumerating the input requirements a function needs to turn the
/// provided (possibly wildcard) output into something concrete.
pub type RequirementsFn = fn(
    &FunctionContext,
    &ComputationTarget,
    &ValueSpecification,
    &FunctionParameters,
) -> Result<Vec<ValueRequirement>, FunctionFault>;

/// Callback re-enumerating outputs once input requirements have been
/// resolved to concrete specifications. Used by partial resolution to refine
/// wildcard outputs; functions that do not provide it cannot be refined.
pub type RefinedResultsFn = fn(
    &FunctionContext,
    &ComputationTarget,
    &FunctionParameters,
    &[ValueSpecification],
) -> Result<Vec<ValueSpecification>, FunctionFault>;

/// Descriptor for a computation function as registered with the engine.
///
/// Each definition owns:
/// * a stable identifier (`id`)
/// * a human-readable short name (transform actions are keyed by it)
/// * the target type its rules are indexed under
/// * callbacks for applicability, result enumeration, requirement
///   enumeration, and optional refined re-enumeration
pub struct FunctionDefinition {
    /// Stable identifier for the function definition.
    pub id: FunctionId,
    /// Human-readable short name for transforms, logs, and debugging.
    pub name: &'static str,
    /// Target type whose rule buckets this function is indexed under.
    pub target_type: ComputationTargetType,
    /// Callback deciding whether the function applies to a target.
    pub can_apply_to: CanApplyFn,
    /// Callback enumerating maximal outputs on a target.
    pub results: ResultsFn,
    /// Callback enumerating input requirements for an output.
    pub requirements: RequirementsFn,
    /// Optional callback re-enumerating outputs given resolved inputs.
    pub refined_results: Option<RefinedResultsFn>,
}

impl core::fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("target_type", &self.target_type)
            .finish_non_exhaustive()
    }
}

/// Parameter bundle attached to a function definition.
///
/// The canonical byte encoding feeds the parameterized-function identity
/// hash; two bundles encode equal bytes iff they are equal.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionParameters {
    /// No parameters.
    #[default]
    Empty,
    /// Named key → value parameters. Deterministic iteration order.
    Named(BTreeMap<String, String>),
}

impl FunctionParameters {
    /// Builds a named bundle from key/value pairs.
    #[must_use]
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Canonical length-prefixed encoding. All length prefixes are 8-byte
    /// little-endian; changing this scheme changes every parameterized
    /// function identity and is a breaking change.
    fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Empty => b"empty".to_vec(),
            Self::Named(map) => {
                let mut out = Vec::with_capacity(16 + map.len() * 16);
                out.extend_from_slice(&(map.len() as u64).to_le_bytes());
                for (key, value) in map {
                    out.extend_from_slice(&(key.len() as u64).to_le_bytes());
                    out.extend_from_slice(key.as_bytes());
                    out.extend_from_slice(&(value.len() as u64).to_le_bytes());
                    out.extend_from_slice(value.as_bytes());
                }
                out
            }
        }
    }
}

/// A function definition bound to a parameter bundle.
///
/// Immutable identity used for equality, cycle checks, and cache keys. The
/// identity hash (`blake3("parameterized:" || id || params)`) provides the
/// stable total order behind deterministic tie-breaks: byte-lexicographic,
/// independent of registration order, reproducible across processes.
#[derive(Clone)]
pub struct ParameterizedFunction {
    function: Arc<FunctionDefinition>,
    parameters: FunctionParameters,
    identity: Hash,
}

impl ParameterizedFunction {
    /// Binds `parameters` to `function` and precomputes the identity hash.
    #[must_use]
    pub fn new(function: Arc<FunctionDefinition>, parameters: FunctionParameters) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(b"parameterized:");
        hasher.update(function.id.as_bytes());
        hasher.update(&parameters.canonical_bytes());
        let identity = hasher.finalize().into();
        Self {
            function,
            parameters,
            identity,
        }
    }

    /// Returns the underlying function definition.
    #[must_use]
    pub fn definition(&self) -> &Arc<FunctionDefinition> {
        &self.function
    }

    /// Returns the function's short name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.function.name
    }

    /// Returns the bound parameter bundle.
    #[must_use]
    pub fn parameters(&self) -> &FunctionParameters {
        &self.parameters
    }

    /// Returns the precomputed identity hash.
    #[must_use]
    pub fn identity(&self) -> &Hash {
        &self.identity
    }
}

impl PartialEq for ParameterizedFunction {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl Eq for ParameterizedFunction {}

impl core::hash::Hash for ParameterizedFunction {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::hash::Hash::hash(&self.identity, state);
    }
}

impl PartialOrd for ParameterizedFunction {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParameterizedFunction {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.identity.cmp(&other.identity)
    }
}

impl core::fmt::Debug for ParameterizedFunction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ParameterizedFunction")
            .field("name", &self.function.name)
            .field("identity", &short_hex(&self.identity))
            .finish_non_exhaustive()
    }
}
