// SPDX-License-Identifier: Apache-2.0
//! Compiled function resolver with a priority-bucketed rule index.
//!
//! Ordering invariant:
//! - Candidates are yielded per target in descending priority-bucket order.
//! - Within a bucket, candidates sort by (function identity hash, output
//!   list): byte-lexicographic on the identity, element-wise on outputs.
//! - Two same-bucket rules tying on both keys are a configuration error and
//!   fail loudly; silently picking one would make graph construction
//!   non-reproducible across runs.
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::context::FunctionContext;
use crate::function::ParameterizedFunction;
use crate::graph::{DependencyGraph, NodeIndex};
use crate::instant::CompilationInstant;
use crate::rule::ResolutionRule;
use crate::target::{ComputationTargetSpecification, ComputationTargetType};
use crate::value::{ValueRequirement, ValueSpecification};

/// Upper bound on cached targets per resolver.
///
/// Targets are short-lived and plentiful during graph construction; without a
/// bound, a long-lived resolver would accumulate an entry per distinct target
/// it ever saw. At capacity, lookups for new targets compute per-call without
/// publishing; cached entries are never invalidated within a resolver's
/// lifetime.
pub const TARGET_CACHE_CAPACITY: usize = 65_536;

/// Errors emitted by a resolution query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// Two equal-priority rules for the same target type could not be
    /// deterministically ordered. This is a configuration defect; fix the
    /// rule set rather than relying on any implicit ordering.
    #[error("ambiguous resolution rules at priority {priority} for {target_type}: {function}")]
    AmbiguousRules {
        /// Priority bucket the tie occurred in.
        priority: i32,
        /// Target type whose bucket was being ordered.
        target_type: ComputationTargetType,
        /// Short name of the function advertised by the tied rules.
        function: &'static str,
    },
    /// The queried node index is not in the supplied graph.
    #[error("dependency node {0:?} is not in the graph")]
    UnknownNode(NodeIndex),
}

/// One applicable rule with its cached maximal outputs for a target.
#[derive(Debug, Clone)]
struct CandidateEntry {
    rule: Arc<ResolutionRule>,
    outputs: Vec<ValueSpecification>,
}

/// Globally-ordered applicable candidates for one target, shared between the
/// cache and every cursor handed out for that target.
#[derive(Debug, Default)]
pub(crate) struct TargetCandidates {
    entries: Vec<CandidateEntry>,
}

/// Priority bucket: rules of one priority in registration order.
#[derive(Debug)]
struct PriorityBucket {
    priority: i32,
    rules: Vec<Arc<ResolutionRule>>,
}

/// Immutable rule index bound to one compiled snapshot instant.
///
/// Construction is single-threaded and completes before any query; the built
/// buckets are never mutated, so queries read them without locking. Only the
/// lazily-populated per-target candidate cache is guarded, and its
/// publication is first-writer-wins: racing duplicate computations are
/// acceptable (both compute the same value), but exactly one winner is
/// published per target.
pub struct CompiledFunctionResolver {
    instant: CompilationInstant,
    /// Flattened rule set in registration order, for introspection.
    rules: Vec<Arc<ResolutionRule>>,
    index: FxHashMap<ComputationTargetType, Vec<PriorityBucket>>,
    cache: RwLock<FxHashMap<ComputationTargetSpecification, Arc<TargetCandidates>>>,
}

impl core::fmt::Debug for CompiledFunctionResolver {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CompiledFunctionResolver")
            .field("instant", &self.instant)
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl CompiledFunctionResolver {
    /// Builds the rule index for one compiled snapshot instant.
    ///
    /// Rules are bucketed by their function's target type, buckets ordered by
    /// priority descending, registration order preserved within a bucket
    /// (ties are broken at query time, deterministically).
    #[must_use]
    pub fn new(instant: CompilationInstant, rules: Vec<ResolutionRule>) -> Self {
        let rules: Vec<Arc<ResolutionRule>> = rules.into_iter().map(Arc::new).collect();
        let mut index: FxHashMap<ComputationTargetType, Vec<PriorityBucket>> =
            FxHashMap::default();
        for rule in &rules {
            let buckets = index.entry(rule.target_type()).or_default();
            let position = buckets
                .iter()
                .position(|bucket| bucket.priority <= rule.priority());
            match position {
                Some(i) if buckets[i].priority == rule.priority() => {
                    buckets[i].rules.push(Arc::clone(rule));
                }
                Some(i) => buckets.insert(
                    i,
                    PriorityBucket {
                        priority: rule.priority(),
                        rules: vec![Arc::clone(rule)],
                    },
                ),
                None => buckets.push(PriorityBucket {
                    priority: rule.priority(),
                    rules: vec![Arc::clone(rule)],
                }),
            }
        }
        Self {
            instant,
            rules,
            index,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Returns the instant this resolver was compiled at.
    #[must_use]
    pub fn instant(&self) -> CompilationInstant {
        self.instant
    }

    /// Returns the flattened rule set across all types and priorities, in
    /// registration order.
    #[must_use]
    pub fn all_resolution_rules(&self) -> &[Arc<ResolutionRule>] {
        &self.rules
    }

    /// Resolves `requirement` at `at_node`, returning a fresh pull-based
    /// cursor of `(function, specification)` candidates in deterministic
    /// priority order.
    ///
    /// Each call returns a new cursor over the same cached backing array;
    /// cursors share no mutable state, so concurrent callers and repeated
    /// calls observe identical sequences.
    ///
    /// # Errors
    /// - [`ResolveError::UnknownNode`] when `at_node` is not in `graph`.
    /// - [`ResolveError::AmbiguousRules`] when the target's rule set cannot
    ///   be deterministically ordered.
    pub fn resolve<'a>(
        &self,
        requirement: &'a ValueRequirement,
        graph: &'a DependencyGraph,
        at_node: NodeIndex,
        context: &FunctionContext,
    ) -> Result<CandidateCursor<'a>, ResolveError> {
        let Some(node) = graph.node(at_node) else {
            return Err(ResolveError::UnknownNode(at_node));
        };
        let backing = self.candidates_for(node.target(), context)?;
        Ok(CandidateCursor {
            backing,
            next: 0,
            requirement,
            graph,
            at_node,
        })
    }

    /// Returns the cached candidate list for a target, computing and
    /// publishing it on first use.
    fn candidates_for(
        &self,
        target: &ComputationTargetSpecification,
        context: &FunctionContext,
    ) -> Result<Arc<TargetCandidates>, ResolveError> {
        if let Some(hit) = self.read_cache().get(target) {
            return Ok(Arc::clone(hit));
        }

        // Compute outside the lock; rule applicability checks are expensive.
        let computed = Arc::new(self.compute_candidates(target, context)?);

        let mut cache = self.write_cache();
        if let Some(existing) = cache.get(target) {
            // A racing caller published first; its value wins.
            return Ok(Arc::clone(existing));
        }
        if cache.len() < TARGET_CACHE_CAPACITY {
            cache.insert(target.clone(), Arc::clone(&computed));
        } else {
            tracing::debug!(
                target_spec = %target,
                capacity = TARGET_CACHE_CAPACITY,
                "target cache at capacity; computing without publishing"
            );
        }
        Ok(computed)
    }

    fn compute_candidates(
        &self,
        target: &ComputationTargetSpecification,
        context: &FunctionContext,
    ) -> Result<TargetCandidates, ResolveError> {
        let Some(resolved) = context.resolve_target(target) else {
            tracing::debug!(target_spec = %target, "target specification did not resolve; no candidates");
            return Ok(TargetCandidates::default());
        };
        let Some(buckets) = self.index.get(&target.target_type()) else {
            return Ok(TargetCandidates::default());
        };

        let mut entries = Vec::new();
        for bucket in buckets {
            let mut applicable: Vec<CandidateEntry> = bucket
                .rules
                .iter()
                .filter_map(|rule| {
                    rule.resolved_outputs(context, &resolved)
                        .map(|outputs| CandidateEntry {
                            rule: Arc::clone(rule),
                            outputs,
                        })
                })
                .collect();
            if applicable.len() > 1 {
                applicable.sort_by(|a, b| {
                    a.rule
                        .function()
                        .identity()
                        .cmp(b.rule.function().identity())
                        .then_with(|| a.outputs.cmp(&b.outputs))
                });
                for pair in applicable.windows(2) {
                    if pair[0].rule.function() == pair[1].rule.function()
                        && pair[0].outputs == pair[1].outputs
                    {
                        return Err(ResolveError::AmbiguousRules {
                            priority: bucket.priority,
                            target_type: target.target_type(),
                            function: pair[0].rule.function().name(),
                        });
                    }
                }
            }
            entries.append(&mut applicable);
        }
        Ok(TargetCandidates { entries })
    }

    fn read_cache(
        &self,
    ) -> RwLockReadGuard<'_, FxHashMap<ComputationTargetSpecification, Arc<TargetCandidates>>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(
        &self,
    ) -> RwLockWriteGuard<'_, FxHashMap<ComputationTargetSpecification, Arc<TargetCandidates>>>
    {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pull-based candidate sequence for one `(requirement, node)` query.
///
/// Finite and lazily evaluated: each pull applies the rule-resolution checks
/// (last-match scan, cycle check, filter) to successive cached entries and
/// yields the first success. Restartable per call: obtain another cursor
/// from [`CompiledFunctionResolver::resolve`]; this one advances
/// independently.
#[derive(Debug)]
pub struct CandidateCursor<'a> {
    backing: Arc<TargetCandidates>,
    next: usize,
    requirement: &'a ValueRequirement,
    graph: &'a DependencyGraph,
    at_node: NodeIndex,
}

impl Iterator for CandidateCursor<'_> {
    type Item = (ParameterizedFunction, ValueSpecification);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(entry) = self.backing.entries.get(self.next) {
            self.next += 1;
            if let Some(spec) =
                entry
                    .rule
                    .resolve(self.requirement, self.graph, self.at_node, &entry.outputs)
            {
                return Some((entry.rule.function().clone(), spec));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::function::{
        FunctionFault, FunctionParameters, ParameterizedFunction as PFn,
    };
    use crate::properties::ValueProperties;
    use crate::target::ComputationTarget;

    fn requirement_for_x(target: &str) -> ValueRequirement {
        ValueRequirement::new(fixtures::primitive(target), "X", ValueProperties::none())
    }

    fn single_node(
        target: &str,
    ) -> (DependencyGraph, NodeIndex) {
        let mut graph = DependencyGraph::new();
        let node = graph.add_root(fixtures::primitive(target));
        (graph, node)
    }

    #[test]
    fn duplicate_rules_for_one_function_are_an_ambiguous_configuration() {
        let resolver = CompiledFunctionResolver::new(
            CompilationInstant::from_raw(1),
            vec![
                fixtures::rule_producing_x("dup", 5),
                fixtures::rule_producing_x("dup", 5),
            ],
        );
        let (graph, node) = single_node("P");
        let req = requirement_for_x("P");
        let err = resolver
            .resolve(&req, &graph, node, &FunctionContext::passthrough())
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::AmbiguousRules {
                priority: 5,
                target_type: crate::target::ComputationTargetType::Primitive,
                function: "dup",
            }
        );
    }

    #[test]
    fn distinct_functions_with_equal_outputs_order_by_identity() {
        let f1 = fixtures::rule_producing_x("f1", 5);
        let f2 = fixtures::rule_producing_x("f2", 5);
        let expected_first = if f1.function().identity() < f2.function().identity() {
            "f1"
        } else {
            "f2"
        };

        let resolver = CompiledFunctionResolver::new(
            CompilationInstant::from_raw(1),
            vec![f1, f2],
        );
        let (graph, node) = single_node("P");
        let req = requirement_for_x("P");
        let names: Vec<&str> = resolver
            .resolve(&req, &graph, node, &FunctionContext::passthrough())
            .unwrap()
            .map(|(function, _)| function.name())
            .collect();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], expected_first);
    }

    #[test]
    fn unknown_nodes_are_rejected_at_the_api_boundary() {
        let resolver = CompiledFunctionResolver::new(CompilationInstant::from_raw(1), Vec::new());
        let graph = DependencyGraph::new();
        let req = requirement_for_x("P");
        let err = resolver
            .resolve(&req, &graph, NodeIndex::from_raw(0), &FunctionContext::passthrough())
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnknownNode(_)));
    }

    #[test]
    fn target_candidates_are_computed_once_and_served_from_the_cache() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        static ENUMERATIONS: AtomicUsize = AtomicUsize::new(0);

        fn counting_results(
            _: &FunctionContext,
            target: &ComputationTarget,
            _: &FunctionParameters,
        ) -> Result<Vec<ValueSpecification>, FunctionFault> {
            ENUMERATIONS.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ValueSpecification::new(
                target.specification().clone(),
                "X",
                ValueProperties::none(),
            )])
        }

        let rule = crate::rule::ResolutionRule::new(
            PFn::new(
                fixtures::definition_with(
                    "counting",
                    crate::target::ComputationTargetType::Primitive,
                    counting_results,
                ),
                FunctionParameters::Empty,
            ),
            crate::filter::ComputationTargetFilter::All,
            0,
        );
        let resolver =
            CompiledFunctionResolver::new(CompilationInstant::from_raw(1), vec![rule]);
        let (graph, node) = single_node("P");
        let req = requirement_for_x("P");
        let ctx = FunctionContext::passthrough();

        for _ in 0..3 {
            let count = resolver.resolve(&req, &graph, node, &ctx).unwrap().count();
            assert_eq!(count, 1);
        }
        assert_eq!(ENUMERATIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn rules_for_other_target_types_never_appear() {
        // A position-type function is indexed under POSITION and must not
        // surface for a primitive target even though it could satisfy the
        // name.
        let position_rule = crate::rule::ResolutionRule::new(
            PFn::new(
                fixtures::definition_with(
                    "positional",
                    crate::target::ComputationTargetType::Position,
                    fixtures::produce_x,
                ),
                FunctionParameters::Empty,
            ),
            crate::filter::ComputationTargetFilter::All,
            10,
        );
        let resolver = CompiledFunctionResolver::new(
            CompilationInstant::from_raw(1),
            vec![position_rule, fixtures::rule_producing_x("prim", 0)],
        );
        let (graph, node) = single_node("P");
        let req = requirement_for_x("P");
        let names: Vec<&str> = resolver
            .resolve(&req, &graph, node, &FunctionContext::passthrough())
            .unwrap()
            .map(|(function, _)| function.name())
            .collect();
        assert_eq!(names, vec!["prim"]);
    }
}
