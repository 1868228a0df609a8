// SPDX-License-Identifier: Apache-2.0
//! Read-only target interrogation: "what can this target produce", with no
//! specific requirement in hand.
//!
//! Recursion invariant:
//! - `resolve_partial_requirement` guards against requirement cycles with a
//!   per-call-stack `visited` set; a requirement is removed from the set on
//!   every return path so sibling branches are unaffected by one branch's
//!   history. The set is never shared across concurrent calls.
use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::context::FunctionContext;
use crate::rule::ResolutionRule;
use crate::target::ComputationTarget;
use crate::value::{last_satisfying, ValueRequirement, ValueSpecification};

/// Read-only service answering target interrogations over a fixed rule set.
///
/// Operates on the rules sorted by priority descending (no per-target cache;
/// interrogation is a tooling path, not the graph-build hot path). Holds a
/// copy of the compilation context with the interrogation capability
/// stripped, so a function that interrogates targets from inside its own
/// callbacks cannot recurse through the context indefinitely.
pub struct TargetResultsInterrogator {
    rules: Vec<Arc<ResolutionRule>>,
    context: FunctionContext,
}

impl core::fmt::Debug for TargetResultsInterrogator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TargetResultsInterrogator")
            .field("rules", &self.rules.len())
            .finish_non_exhaustive()
    }
}

impl TargetResultsInterrogator {
    /// Builds an interrogator over `rules`, capturing a capability-stripped
    /// copy of `context`.
    #[must_use]
    pub fn new(mut rules: Vec<Arc<ResolutionRule>>, context: &FunctionContext) -> Self {
        rules.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then_with(|| a.function().identity().cmp(b.function().identity()))
        });
        Self {
            rules,
            context: context.without_target_results(),
        }
    }

    /// Returns every output any rule could maximally produce for `target`,
    /// in rule-priority order, de-duplicated with the first occurrence
    /// keeping its position.
    #[must_use]
    pub fn maximal_results(&self, target: &ComputationTarget) -> Vec<ValueSpecification> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for rule in self.type_matching_rules(target) {
            let Some(outputs) = rule.resolved_outputs(&self.context, target) else {
                continue;
            };
            for spec in outputs {
                if seen.insert(spec.clone()) {
                    out.push(spec);
                }
            }
        }
        out
    }

    /// Like [`TargetResultsInterrogator::maximal_results`], but wildcard
    /// outputs are refined into concrete ones by simulating the resolution
    /// of the producing function's own input requirements.
    ///
    /// A fully-wildcard specification is never emitted as-is: the engine
    /// asks the function what requirements would concretise it, resolves
    /// each via [`TargetResultsInterrogator::resolve_partial_requirement`],
    /// feeds the resolved inputs back into the function's refined
    /// enumeration, and emits the now-constrained specifications. When
    /// refinement fails (requirements unresolvable, function fault, or
    /// nothing concrete comes back) the candidate is dropped, not
    /// substituted.
    #[must_use]
    pub fn partial_results(&self, target: &ComputationTarget) -> Vec<ValueSpecification> {
        let mut seen = FxHashSet::default();
        let mut out = Vec::new();
        for rule in self.type_matching_rules(target) {
            let Some(outputs) = rule.resolved_outputs(&self.context, target) else {
                continue;
            };
            for spec in outputs {
                if !spec.properties().is_wildcard() {
                    if seen.insert(spec.clone()) {
                        out.push(spec);
                    }
                    continue;
                }
                match self.refine_candidate(rule, target, &spec) {
                    Some(refined) => {
                        for concrete in refined {
                            if seen.insert(concrete.clone()) {
                                out.push(concrete);
                            }
                        }
                    }
                    None => {
                        tracing::debug!(
                            function = rule.function().name(),
                            candidate = %spec,
                            "wildcard candidate could not be refined; dropped"
                        );
                    }
                }
            }
        }
        out
    }

    /// Resolves one requirement to a concrete specification by scanning
    /// type-matching rules in priority order and recursively refining
    /// wildcard results.
    ///
    /// `visited` guards the recursion: a requirement already on the current
    /// stack returns `None` immediately, and the requirement is removed from
    /// the set on every return path. Callers start with an empty set; the
    /// set must never be shared across concurrent calls.
    #[must_use]
    pub fn resolve_partial_requirement(
        &self,
        requirement: &ValueRequirement,
        visited: &mut FxHashSet<ValueRequirement>,
    ) -> Option<ValueSpecification> {
        if !visited.insert(requirement.clone()) {
            tracing::trace!(%requirement, "requirement already on the resolution stack; unresolvable");
            return None;
        }
        let resolved = self.resolve_partial_inner(requirement, visited);
        visited.remove(requirement);
        resolved
    }

    fn resolve_partial_inner(
        &self,
        requirement: &ValueRequirement,
        visited: &mut FxHashSet<ValueRequirement>,
    ) -> Option<ValueSpecification> {
        let Some(target) = self.context.resolve_target(requirement.target()) else {
            tracing::debug!(target_spec = %requirement.target(), "requirement target did not resolve");
            return None;
        };
        for rule in self.type_matching_rules(&target) {
            let Some(outputs) = rule.resolved_outputs(&self.context, &target) else {
                continue;
            };
            let Some(matched) = last_satisfying(requirement, &outputs) else {
                continue;
            };
            if !matched.properties().is_wildcard() {
                return Some(matched.clone());
            }
            let refined = self.refined_outputs(rule, &target, matched, visited);
            if let Some(spec) = refined.as_deref().and_then(|outputs| {
                last_satisfying(requirement, outputs)
                    .filter(|spec| !spec.properties().is_wildcard())
                    .cloned()
            }) {
                return Some(spec);
            }
        }
        None
    }

    /// Refines one wildcard candidate for `partial_results`, selecting the
    /// concrete refined outputs carrying the candidate's value name.
    fn refine_candidate(
        &self,
        rule: &ResolutionRule,
        target: &ComputationTarget,
        candidate: &ValueSpecification,
    ) -> Option<Vec<ValueSpecification>> {
        let mut visited = FxHashSet::default();
        let refined = self.refined_outputs(rule, target, candidate, &mut visited)?;
        let concrete: Vec<ValueSpecification> = refined
            .into_iter()
            .filter(|spec| {
                spec.value_name() == candidate.value_name() && !spec.properties().is_wildcard()
            })
            .collect();
        if concrete.is_empty() {
            None
        } else {
            Some(concrete)
        }
    }

    /// Runs one simulated resolution step: enumerate the function's
    /// requirements for `candidate`, resolve each, and re-enumerate outputs
    /// with the resolved inputs.
    fn refined_outputs(
        &self,
        rule: &ResolutionRule,
        target: &ComputationTarget,
        candidate: &ValueSpecification,
        visited: &mut FxHashSet<ValueRequirement>,
    ) -> Option<Vec<ValueSpecification>> {
        let definition = rule.function().definition();
        let refine = definition.refined_results?;
        let requirements = match (definition.requirements)(
            &self.context,
            target,
            candidate,
            rule.function().parameters(),
        ) {
            Ok(requirements) => requirements,
            Err(fault) => {
                tracing::debug!(
                    function = definition.name,
                    %fault,
                    "requirement enumeration faulted during refinement"
                );
                return None;
            }
        };
        let mut inputs = Vec::with_capacity(requirements.len());
        for requirement in &requirements {
            inputs.push(self.resolve_partial_requirement(requirement, visited)?);
        }
        match refine(&self.context, target, rule.function().parameters(), &inputs) {
            Ok(outputs) => Some(outputs),
            Err(fault) => {
                tracing::debug!(
                    function = definition.name,
                    %fault,
                    "refined enumeration faulted"
                );
                None
            }
        }
    }

    fn type_matching_rules<'s>(
        &'s self,
        target: &ComputationTarget,
    ) -> impl Iterator<Item = &'s Arc<ResolutionRule>> + 's {
        let target_type = target.target_type();
        self.rules
            .iter()
            .filter(move |rule| rule.target_type() == target_type)
    }
}
