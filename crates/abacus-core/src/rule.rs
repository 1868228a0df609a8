// SPDX-License-Identifier: Apache-2.0
//! Resolution rules: one parameterized function, gated by a target filter
//! and ranked by priority.
//!
//! The contract is two-phase so the expensive half can be cached per target:
//! - [`ResolutionRule::resolved_outputs`] asks the function what it could
//!   maximally produce on a target (cacheable; faults swallowed).
//! - [`ResolutionRule::resolve`] checks a cached output set against one
//!   requirement at one graph node (cheap; run per query).
use crate::context::FunctionContext;
use crate::filter::ComputationTargetFilter;
use crate::function::ParameterizedFunction;
use crate::graph::{DependencyGraph, NodeIndex};
use crate::target::{ComputationTarget, ComputationTargetType};
use crate::value::{last_satisfying, ValueRequirement, ValueSpecification};

/// A function advertised for use, gated by a target filter and ranked by an
/// integer priority. Immutable once constructed.
///
/// Two rules at equal priority producing overlapping outputs for the same
/// target must be distinguishable by the resolver's deterministic comparator;
/// an indistinguishable pair is a configuration error reported loudly at
/// query time, never an arbitrary pick.
#[derive(Clone, Debug)]
pub struct ResolutionRule {
    function: ParameterizedFunction,
    filter: ComputationTargetFilter,
    priority: i32,
}

impl ResolutionRule {
    /// Constructs a rule advertising `function` behind `filter` at
    /// `priority`.
    #[must_use]
    pub fn new(
        function: ParameterizedFunction,
        filter: ComputationTargetFilter,
        priority: i32,
    ) -> Self {
        Self {
            function,
            filter,
            priority,
        }
    }

    /// Returns the advertised parameterized function.
    #[must_use]
    pub fn function(&self) -> &ParameterizedFunction {
        &self.function
    }

    /// Returns the target filter.
    #[must_use]
    pub fn filter(&self) -> &ComputationTargetFilter {
        &self.filter
    }

    /// Returns the rule priority. Higher priorities resolve first.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns the target type this rule is indexed under.
    #[must_use]
    pub fn target_type(&self) -> ComputationTargetType {
        self.function.definition().target_type
    }

    /// Asks the function what it could maximally produce on `target`.
    ///
    /// Returns `None` when the function reports it cannot apply, or when
    /// result enumeration faults. A fault is logged and treated as "this
    /// rule contributes nothing here"; one misbehaving function must not
    /// abort resolution for the others.
    #[must_use]
    pub fn resolved_outputs(
        &self,
        context: &FunctionContext,
        target: &ComputationTarget,
    ) -> Option<Vec<ValueSpecification>> {
        let definition = self.function.definition();
        if !(definition.can_apply_to)(context, target) {
            return None;
        }
        match (definition.results)(context, target, self.function.parameters()) {
            Ok(outputs) => Some(outputs),
            Err(fault) => {
                tracing::debug!(
                    function = definition.name,
                    target_spec = %target.specification(),
                    %fault,
                    "result enumeration faulted; rule contributes nothing here"
                );
                None
            }
        }
    }

    /// Checks the cached `outputs` against `requirement` at `at_node`.
    ///
    /// Ordered checks:
    /// 1. Scan `outputs` for satisfying specifications; the **last** match
    ///    wins (see [`crate::value`]; preserved behavior, regression
    ///    tested).
    /// 2. Cycle check: reject when any ancestor already runs this exact
    ///    parameterized function on the same target.
    /// 3. Target filter, applied last since filters rarely reject.
    ///
    /// The returned specification is still unconstrained; composing it with
    /// the requirement's own constraints is the caller's job.
    #[must_use]
    pub fn resolve(
        &self,
        requirement: &ValueRequirement,
        graph: &DependencyGraph,
        at_node: NodeIndex,
        outputs: &[ValueSpecification],
    ) -> Option<ValueSpecification> {
        let matched = last_satisfying(requirement, outputs)?;
        if let Some(node) = graph.node(at_node) {
            let target = node.target();
            for ancestor in graph.ancestors(at_node) {
                if ancestor.target() == target && ancestor.function() == Some(&self.function) {
                    return None;
                }
            }
        }
        if !self.filter.accept(graph, at_node) {
            return None;
        }
        Some(matched.clone())
    }
}
