// SPDX-License-Identifier: Apache-2.0
//! Value-properties constraint algebra.
//!
//! Satisfaction invariant:
//! - `a.is_satisfied_by(b)` treats `a` as the constraint set and `b` as the
//!   offered properties; every key constrained by `a` must be bound by `b`
//!   with at least one admissible value in common.
use std::collections::{BTreeMap, BTreeSet};

/// A set of property constraints attached to a requirement or advertised on a
/// specification.
///
/// Either the distinguished infinite marker ("not yet narrowed": every key
/// bound to every value) or a named map of key-to-allowed-values constraints.
/// Within the named form, an empty value set means "any value" for that key.
/// A concrete (strict) instance binds every key to a non-empty finite set,
/// commonly a singleton.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueProperties {
    /// The wildcard marker: a specification whose properties have not been
    /// narrowed yet. Drives partial resolution.
    Infinite,
    /// Named key → allowed-values constraints. Deterministic iteration order.
    Named(BTreeMap<String, BTreeSet<String>>),
}

impl ValueProperties {
    /// The infinite ("all") properties marker.
    #[must_use]
    pub fn all() -> Self {
        Self::Infinite
    }

    /// The empty constraint set: constrains nothing, satisfied by anything.
    #[must_use]
    pub fn none() -> Self {
        Self::Named(BTreeMap::new())
    }

    /// Adds a finite constraint binding `key` to `values`.
    ///
    /// Adding a constraint to the infinite marker leaves it infinite: every
    /// key is already bound to every value.
    #[must_use]
    pub fn with<K, V, I>(self, key: K, values: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = V>,
    {
        match self {
            Self::Infinite => Self::Infinite,
            Self::Named(mut map) => {
                map.entry(key.into())
                    .or_default()
                    .extend(values.into_iter().map(Into::into));
                Self::Named(map)
            }
        }
    }

    /// Adds a wildcard constraint: `key` must be bound, to any value.
    #[must_use]
    pub fn with_any<K: Into<String>>(self, key: K) -> Self {
        match self {
            Self::Infinite => Self::Infinite,
            Self::Named(mut map) => {
                map.entry(key.into()).or_default();
                Self::Named(map)
            }
        }
    }

    /// Returns true when this is the infinite/wildcard marker.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Infinite)
    }

    /// Returns true when no keys are constrained (and this is not the
    /// infinite marker).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Named(map) if map.is_empty())
    }

    /// Returns true when every key is bound to a non-empty finite value set.
    ///
    /// Strict properties are what partial resolution refines wildcard
    /// specifications into.
    #[must_use]
    pub fn is_strict(&self) -> bool {
        match self {
            Self::Infinite => false,
            Self::Named(map) => map.values().all(|values| !values.is_empty()),
        }
    }

    /// Returns the allowed values bound to `key`, if the key is constrained.
    ///
    /// An empty returned set means "any value". The infinite marker binds
    /// every key and reports `None` here; callers interested in it should
    /// test [`ValueProperties::is_wildcard`] first.
    #[must_use]
    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        match self {
            Self::Infinite => None,
            Self::Named(map) => map.get(key),
        }
    }

    /// Satisfaction test with `self` as the constraint set.
    ///
    /// Every key constrained by `self` must be bound by `other`, and unless
    /// either side is a wildcard for that key, the two value sets must share
    /// at least one admissible value. The infinite constraint admits every
    /// value of every key, so it is satisfied by anything; likewise the
    /// empty constraint, which constrains nothing.
    #[must_use]
    pub fn is_satisfied_by(&self, other: &Self) -> bool {
        match self {
            Self::Infinite => true,
            Self::Named(constraints) => constraints.iter().all(|(key, allowed)| match other {
                Self::Infinite => true,
                Self::Named(props) => props.get(key).is_some_and(|values| {
                    allowed.is_empty()
                        || values.is_empty()
                        || allowed.intersection(values).next().is_some()
                }),
            }),
        }
    }

    /// Composes two property sets by intersection.
    ///
    /// The infinite marker is the identity element. Constrained keys union;
    /// a key constrained on both sides intersects its value sets, with an
    /// empty ("any") set acting as identity. Callers compose requirement
    /// constraints onto specifications that already satisfied them, so a
    /// shared admissible value exists; should both sides nonetheless bind a
    /// key to disjoint finite sets, the left-hand values are kept.
    #[must_use]
    pub fn compose(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Infinite, that) => that.clone(),
            (this, Self::Infinite) => this.clone(),
            (Self::Named(a), Self::Named(b)) => {
                let mut out = a.clone();
                for (key, b_values) in b {
                    match out.entry(key.clone()) {
                        std::collections::btree_map::Entry::Vacant(slot) => {
                            slot.insert(b_values.clone());
                        }
                        std::collections::btree_map::Entry::Occupied(mut slot) => {
                            let a_values = slot.get();
                            if a_values.is_empty() {
                                slot.insert(b_values.clone());
                            } else if !b_values.is_empty() {
                                let both: BTreeSet<String> =
                                    a_values.intersection(b_values).cloned().collect();
                                if !both.is_empty() {
                                    slot.insert(both);
                                }
                            }
                        }
                    }
                }
                Self::Named(out)
            }
        }
    }
}
