// SPDX-License-Identifier: Apache-2.0
//! Target filters gating where a resolution rule may apply.
use crate::graph::{DependencyGraph, NodeIndex};
use crate::target::{ComputationTargetSpecification, ComputationTargetType};

/// Caller-supplied predicate over a graph node, for restrictions the closed
/// variants cannot express.
pub type FilterPredicateFn = fn(&DependencyGraph, NodeIndex) -> bool;

/// Predicate restricting which dependency nodes a rule applies to.
///
/// A closed set of variants with one `accept` operation each; filters are
/// assumed to reject rarely, so rule evaluation applies them last.
#[derive(Clone, Debug)]
pub enum ComputationTargetFilter {
    /// Accepts every node.
    All,
    /// Accepts nodes whose target carries the given type tag.
    TypeIs(ComputationTargetType),
    /// Accepts nodes at or below the named target: the node itself, or any
    /// node whose upward dependent chain passes through it.
    WithinSubtree(ComputationTargetSpecification),
    /// Accepts nodes the caller's predicate accepts.
    Predicate(FilterPredicateFn),
}

impl ComputationTargetFilter {
    /// Applies the filter to `node` within `graph`.
    ///
    /// Nodes missing from the graph are rejected by every variant except
    /// [`ComputationTargetFilter::All`] and caller predicates, which see the
    /// raw index.
    #[must_use]
    pub fn accept(&self, graph: &DependencyGraph, node: NodeIndex) -> bool {
        match self {
            Self::All => true,
            Self::TypeIs(target_type) => graph
                .node(node)
                .is_some_and(|n| n.target().target_type() == *target_type),
            Self::WithinSubtree(root) => {
                let Some(current) = graph.node(node) else {
                    return false;
                };
                current.target() == root
                    || graph.ancestors(node).any(|ancestor| ancestor.target() == root)
            }
            Self::Predicate(predicate) => predicate(graph, node),
        }
    }
}
