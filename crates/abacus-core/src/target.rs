// SPDX-License-Identifier: Apache-2.0
//! Computation-target model: what a requirement or function applies to.

/// The logical kind of an addressable computation target.
///
/// The set is closed: the platform computes over portfolio structure,
/// positions, trades, securities, and type-less primitives (market data
/// points, currencies, surfaces). Rules are indexed per type.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComputationTargetType {
    /// A node in the portfolio aggregation tree.
    PortfolioNode,
    /// A position held under a portfolio node.
    Position,
    /// A security referenced by positions and trades.
    Security,
    /// An individual trade under a position.
    Trade,
    /// A type-less addressable entity (market data point, currency, ...).
    Primitive,
}

impl core::fmt::Display for ComputationTargetType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::PortfolioNode => "PORTFOLIO_NODE",
            Self::Position => "POSITION",
            Self::Security => "SECURITY",
            Self::Trade => "TRADE",
            Self::Primitive => "PRIMITIVE",
        };
        f.write_str(label)
    }
}

/// Scheme-qualified unique identifier of an addressable entity.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UniqueId {
    scheme: String,
    value: String,
}

impl UniqueId {
    /// Constructs an identifier from its scheme and value parts.
    #[must_use]
    pub fn of<S: Into<String>, V: Into<String>>(scheme: S, value: V) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Returns the identifier scheme (namespace).
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns the identifier value within its scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl core::fmt::Display for UniqueId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}~{}", self.scheme, self.value)
    }
}

/// Identification of an abstract addressable entity: target type plus unique
/// identifier. Used as the key half of requirements, specifications, and the
/// resolver's per-target cache.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComputationTargetSpecification {
    target_type: ComputationTargetType,
    unique_id: UniqueId,
}

impl ComputationTargetSpecification {
    /// Constructs a specification from its type tag and unique identifier.
    #[must_use]
    pub fn new(target_type: ComputationTargetType, unique_id: UniqueId) -> Self {
        Self {
            target_type,
            unique_id,
        }
    }

    /// Returns the target type tag.
    #[must_use]
    pub fn target_type(&self) -> ComputationTargetType {
        self.target_type
    }

    /// Returns the unique identifier.
    #[must_use]
    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }
}

impl core::fmt::Display for ComputationTargetSpecification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.target_type, self.unique_id)
    }
}

/// A resolved computation target as handed to function callbacks.
///
/// Resolution of the underlying entity (position contents, security detail)
/// belongs to the caller's context; within this engine a target is its
/// specification.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ComputationTarget {
    specification: ComputationTargetSpecification,
}

impl ComputationTarget {
    /// Wraps a specification as a resolved target.
    #[must_use]
    pub fn new(specification: ComputationTargetSpecification) -> Self {
        Self { specification }
    }

    /// Returns the target's specification.
    #[must_use]
    pub fn specification(&self) -> &ComputationTargetSpecification {
        &self.specification
    }

    /// Returns the target's type tag.
    #[must_use]
    pub fn target_type(&self) -> ComputationTargetType {
        self.specification.target_type()
    }
}
