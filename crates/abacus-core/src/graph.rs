// SPDX-License-Identifier: Apache-2.0
//! Build-time dependency-node arena.
//!
//! Nodes are created by the external graph builder as it expands
//! requirements; this engine only reads them. The arena is append-only and a
//! node's dependent link always points at an earlier index, so upward chains
//! are finite by construction.
use thiserror::Error;

use crate::function::ParameterizedFunction;
use crate::target::ComputationTargetSpecification;

/// Index of a node within a [`DependencyGraph`] arena.
///
/// Upward links are stored as `Option<NodeIndex>` instead of owned
/// back-references; walking the dependent chain is an index lookup per hop.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeIndex(u32);

impl NodeIndex {
    /// Constructs an index from a raw value.
    ///
    /// Indices are normally minted by [`DependencyGraph::add_root`] and
    /// [`DependencyGraph::add_dependent`]; raw construction exists for
    /// callers that persist or transport indices. An index that is not in
    /// the arena is rejected wherever it is used.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw index value.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Error returned when a caller hands the engine a node index that is not in
/// the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The node index is out of range for this arena.
    #[error("dependency node {0:?} is not in the graph")]
    UnknownNode(NodeIndex),
}

/// One build-time graph vertex: a target, the function assigned to it once
/// resolution succeeds, and the single upward link to the node that depends
/// on it.
#[derive(Clone, Debug)]
pub struct DependencyNode {
    target: ComputationTargetSpecification,
    function: Option<ParameterizedFunction>,
    dependent: Option<NodeIndex>,
}

impl DependencyNode {
    /// Returns the node's target specification.
    #[must_use]
    pub fn target(&self) -> &ComputationTargetSpecification {
        &self.target
    }

    /// Returns the function assigned to this node, once resolved.
    #[must_use]
    pub fn function(&self) -> Option<&ParameterizedFunction> {
        self.function.as_ref()
    }

    /// Returns the upward link to the node that depends on this one.
    #[must_use]
    pub fn dependent(&self) -> Option<NodeIndex> {
        self.dependent
    }
}

/// Append-only arena of dependency nodes under construction.
///
/// Owned by the external graph builder; the resolver walks upward chains for
/// cycle checks and never mutates the arena.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    nodes: Vec<DependencyNode>,
}

impl DependencyGraph {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the arena.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true when the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node with no dependent (a root of the tree under construction).
    pub fn add_root(&mut self, target: ComputationTargetSpecification) -> NodeIndex {
        self.push(target, None)
    }

    /// Adds a node whose output `dependent` consumes.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when `dependent` is not in the
    /// arena.
    pub fn add_dependent(
        &mut self,
        target: ComputationTargetSpecification,
        dependent: NodeIndex,
    ) -> Result<NodeIndex, GraphError> {
        if dependent.index() >= self.nodes.len() {
            return Err(GraphError::UnknownNode(dependent));
        }
        Ok(self.push(target, Some(dependent)))
    }

    /// Records the function the builder wired into `node`.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] when `node` is not in the arena.
    pub fn assign_function(
        &mut self,
        node: NodeIndex,
        function: ParameterizedFunction,
    ) -> Result<(), GraphError> {
        let Some(slot) = self.nodes.get_mut(node.index()) else {
            return Err(GraphError::UnknownNode(node));
        };
        slot.function = Some(function);
        Ok(())
    }

    /// Returns the node at `index`, when present.
    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&DependencyNode> {
        self.nodes.get(index.index())
    }

    /// Walks the dependent chain upward, starting at `node`'s dependent.
    ///
    /// An out-of-range `node` yields an empty chain.
    #[must_use]
    pub fn ancestors(&self, node: NodeIndex) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.node(node).and_then(DependencyNode::dependent),
        }
    }

    fn push(
        &mut self,
        target: ComputationTargetSpecification,
        dependent: Option<NodeIndex>,
    ) -> NodeIndex {
        debug_assert!(
            self.nodes.len() < u32::MAX as usize,
            "dependency arena exhausted the u32 index space"
        );
        #[allow(clippy::cast_possible_truncation)]
        let index = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(DependencyNode {
            target,
            function: None,
            dependent,
        });
        index
    }
}

/// Iterator over a node's upward dependent chain.
#[derive(Debug)]
pub struct Ancestors<'a> {
    graph: &'a DependencyGraph,
    next: Option<NodeIndex>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a DependencyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.graph.node(self.next?)?;
        self.next = node.dependent();
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{ComputationTargetType, UniqueId};

    fn position(id: &str) -> ComputationTargetSpecification {
        ComputationTargetSpecification::new(
            ComputationTargetType::Position,
            UniqueId::of("Test", id),
        )
    }

    #[test]
    fn ancestors_walk_the_dependent_chain_in_order() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_root(position("root"));
        let mid = graph.add_dependent(position("mid"), root).unwrap();
        let leaf = graph.add_dependent(position("leaf"), mid).unwrap();

        let chain: Vec<_> = graph
            .ancestors(leaf)
            .map(|n| n.target().unique_id().value().to_owned())
            .collect();
        assert_eq!(chain, vec!["mid", "root"]);
        assert_eq!(graph.ancestors(root).count(), 0);
    }

    #[test]
    fn dependent_links_must_exist() {
        let mut graph = DependencyGraph::new();
        let err = graph
            .add_dependent(position("orphan"), NodeIndex(7))
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownNode(NodeIndex(7)));
    }

    #[test]
    fn assign_function_rejects_unknown_nodes() {
        let mut graph = DependencyGraph::new();
        let root = graph.add_root(position("root"));
        assert!(graph.node(root).unwrap().function().is_none());
        let err = graph
            .assign_function(NodeIndex(3), crate::fixtures::parameterized("f"))
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownNode(NodeIndex(3)));
    }
}
