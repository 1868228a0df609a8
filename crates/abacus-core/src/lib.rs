// SPDX-License-Identifier: Apache-2.0
//! abacus-core: deterministic function-resolution engine for
//! dependency-graph compilation.
//!
//! Given a value requirement on a target, the engine finds which registered
//! computation functions can produce it, in priority order, with a
//! deterministic tie-break, live cycle detection against the partially-built
//! dependency graph, and a partial-resolution path that refines wildcard
//! outputs into concrete ones. Graph building, function execution, and data
//! sourcing live with the embedding platform.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod context;
mod filter;
mod function;
mod graph;
mod ident;
mod instant;
mod interrogator;
mod properties;
mod repository;
mod resolver;
mod rule;
mod target;
mod transform;
mod value;

#[cfg(test)]
mod fixtures;

// Re-exports for stable public API
/// Compilation-context boundary object and its target-resolution callback.
pub use context::{FunctionContext, ResolveTargetFn};
/// Target filters gating where a rule applies.
pub use filter::{ComputationTargetFilter, FilterPredicateFn};
/// Function model: definitions, parameters, parameterized identity, faults.
pub use function::{
    CanApplyFn, FunctionDefinition, FunctionFault, FunctionParameters, ParameterizedFunction,
    RefinedResultsFn, RequirementsFn, ResultsFn,
};
/// Build-time dependency-node arena.
pub use graph::{Ancestors, DependencyGraph, DependencyNode, GraphError, NodeIndex};
/// Canonical hashes and function identifiers.
pub use ident::{make_function_id, FunctionId, Hash};
/// Compilation-instant identifier.
pub use instant::CompilationInstant;
/// Read-only target interrogation (maximal and partial results).
pub use interrogator::TargetResultsInterrogator;
/// Value-properties constraint algebra.
pub use properties::ValueProperties;
/// Function repository snapshot and resolver factory.
pub use repository::{FunctionRepository, FunctionResolver, DEFAULT_RULE_PRIORITY};
/// Compiled resolver, candidate cursor, and query errors.
pub use resolver::{
    CandidateCursor, CompiledFunctionResolver, ResolveError, TARGET_CACHE_CAPACITY,
};
/// Resolution rules.
pub use rule::ResolutionRule;
/// Computation-target model.
pub use target::{
    ComputationTarget, ComputationTargetSpecification, ComputationTargetType, UniqueId,
};
/// Rule transforms applied before compilation.
pub use transform::{ResolutionRuleTransform, RuleAdjustment, TransformError};
/// Value requirements and specifications.
pub use value::{ValueRequirement, ValueSpecification};
