// SPDX-License-Identifier: Apache-2.0
//! Compilation-context boundary object passed through every query.
use std::sync::Arc;

use crate::interrogator::TargetResultsInterrogator;
use crate::target::{ComputationTarget, ComputationTargetSpecification};

/// Callback resolving a target specification to a concrete target.
///
/// Supplied by the embedding platform (portfolio/security masters live
/// there); `None` means the specification is unresolvable, which surfaces as
/// an empty resolution result rather than an error.
pub type ResolveTargetFn = fn(&ComputationTargetSpecification) -> Option<ComputationTarget>;

/// Snapshot-scoped context handed to function callbacks.
///
/// Carries target resolution plus the optional target-interrogation
/// capability. The engine never mutates a caller's context; recursive
/// interrogation works on private clones with the capability stripped.
#[derive(Clone)]
pub struct FunctionContext {
    resolve_target: ResolveTargetFn,
    target_results: Option<Arc<TargetResultsInterrogator>>,
}

impl FunctionContext {
    /// Constructs a context around the caller's target resolver.
    #[must_use]
    pub fn new(resolve_target: ResolveTargetFn) -> Self {
        Self {
            resolve_target,
            target_results: None,
        }
    }

    /// Constructs a context whose resolver maps every specification to
    /// itself. Suitable when targets carry no detail beyond their
    /// specification (introspection tooling, tests).
    #[must_use]
    pub fn passthrough() -> Self {
        fn identity(spec: &ComputationTargetSpecification) -> Option<ComputationTarget> {
            Some(ComputationTarget::new(spec.clone()))
        }
        Self::new(identity)
    }

    /// Attaches the target-interrogation capability.
    #[must_use]
    pub fn with_target_results(mut self, interrogator: Arc<TargetResultsInterrogator>) -> Self {
        self.target_results = Some(interrogator);
        self
    }

    /// Returns a copy of this context with the interrogation capability
    /// removed. The interrogator itself is built over such a copy so that a
    /// function querying "what can this target produce" from inside an
    /// interrogation cannot recurse through the context indefinitely.
    #[must_use]
    pub fn without_target_results(&self) -> Self {
        Self {
            resolve_target: self.resolve_target,
            target_results: None,
        }
    }

    /// Resolves a target specification via the caller's resolver.
    #[must_use]
    pub fn resolve_target(
        &self,
        specification: &ComputationTargetSpecification,
    ) -> Option<ComputationTarget> {
        (self.resolve_target)(specification)
    }

    /// Returns the interrogation capability, when attached.
    #[must_use]
    pub fn target_results(&self) -> Option<&Arc<TargetResultsInterrogator>> {
        self.target_results.as_ref()
    }
}

impl core::fmt::Debug for FunctionContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FunctionContext")
            .field("target_results", &self.target_results.is_some())
            .finish_non_exhaustive()
    }
}
