// SPDX-License-Identifier: Apache-2.0
//! Value requirements and specifications.
use crate::properties::ValueProperties;
use crate::target::ComputationTargetSpecification;

/// A request for a named output on a target, with property constraints.
///
/// Immutable; hashable and totally ordered so it can key recursion guards
/// and participate in deterministic comparator chains.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRequirement {
    target: ComputationTargetSpecification,
    value_name: String,
    constraints: ValueProperties,
}

impl ValueRequirement {
    /// Constructs a requirement for `value_name` on `target` under
    /// `constraints`.
    #[must_use]
    pub fn new<N: Into<String>>(
        target: ComputationTargetSpecification,
        value_name: N,
        constraints: ValueProperties,
    ) -> Self {
        Self {
            target,
            value_name: value_name.into(),
            constraints,
        }
    }

    /// Returns the target the output is requested on.
    #[must_use]
    pub fn target(&self) -> &ComputationTargetSpecification {
        &self.target
    }

    /// Returns the requested value name.
    #[must_use]
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Returns the property constraints.
    #[must_use]
    pub fn constraints(&self) -> &ValueProperties {
        &self.constraints
    }

    /// Returns true when `spec` would satisfy this requirement: same target,
    /// same value name, and properties satisfying the constraints.
    #[must_use]
    pub fn is_satisfied_by(&self, spec: &ValueSpecification) -> bool {
        self.target == spec.target
            && self.value_name == spec.value_name
            && self.constraints.is_satisfied_by(&spec.properties)
    }
}

impl core::fmt::Display for ValueRequirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}]", self.value_name, self.target)
    }
}

/// An output a function advertises or produces: target, value name, and
/// concrete-or-wildcard properties. Equality is structural.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueSpecification {
    target: ComputationTargetSpecification,
    value_name: String,
    properties: ValueProperties,
}

impl ValueSpecification {
    /// Constructs a specification of `value_name` on `target` with
    /// `properties`.
    #[must_use]
    pub fn new<N: Into<String>>(
        target: ComputationTargetSpecification,
        value_name: N,
        properties: ValueProperties,
    ) -> Self {
        Self {
            target,
            value_name: value_name.into(),
            properties,
        }
    }

    /// Returns the target the output is produced on.
    #[must_use]
    pub fn target(&self) -> &ComputationTargetSpecification {
        &self.target
    }

    /// Returns the produced value name.
    #[must_use]
    pub fn value_name(&self) -> &str {
        &self.value_name
    }

    /// Returns the advertised properties.
    #[must_use]
    pub fn properties(&self) -> &ValueProperties {
        &self.properties
    }
}

impl core::fmt::Display for ValueSpecification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}[{}]", self.value_name, self.target)
    }
}

/// Scans `outputs` for specifications satisfying `requirement` and returns
/// the **last** match.
///
/// Last-wins is load-bearing: callers supply result sets that do not
/// internally conflict, and downstream ordering semantics depend on the final
/// occurrence winning. Covered by a regression test; do not flip to
/// first-wins.
pub(crate) fn last_satisfying<'a>(
    requirement: &ValueRequirement,
    outputs: &'a [ValueSpecification],
) -> Option<&'a ValueSpecification> {
    let mut matched = None;
    for spec in outputs {
        if requirement.is_satisfied_by(spec) {
            matched = Some(spec);
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{ComputationTargetType, UniqueId};

    fn primitive(id: &str) -> ComputationTargetSpecification {
        ComputationTargetSpecification::new(
            ComputationTargetType::Primitive,
            UniqueId::of("Test", id),
        )
    }

    #[test]
    fn satisfaction_requires_matching_target_and_name() {
        let req = ValueRequirement::new(primitive("P"), "X", ValueProperties::none());
        let ok = ValueSpecification::new(primitive("P"), "X", ValueProperties::none());
        let wrong_name = ValueSpecification::new(primitive("P"), "Y", ValueProperties::none());
        let wrong_target = ValueSpecification::new(primitive("Q"), "X", ValueProperties::none());
        assert!(req.is_satisfied_by(&ok));
        assert!(!req.is_satisfied_by(&wrong_name));
        assert!(!req.is_satisfied_by(&wrong_target));
    }

    #[test]
    fn satisfaction_delegates_property_constraints() {
        let req = ValueRequirement::new(
            primitive("P"),
            "X",
            ValueProperties::none().with("Currency", ["USD"]),
        );
        let usd = ValueSpecification::new(
            primitive("P"),
            "X",
            ValueProperties::none().with("Currency", ["USD"]),
        );
        let gbp = ValueSpecification::new(
            primitive("P"),
            "X",
            ValueProperties::none().with("Currency", ["GBP"]),
        );
        assert!(req.is_satisfied_by(&usd));
        assert!(!req.is_satisfied_by(&gbp));
    }

    #[test]
    fn last_satisfying_returns_the_final_match() {
        let req = ValueRequirement::new(primitive("P"), "X", ValueProperties::none());
        let first = ValueSpecification::new(
            primitive("P"),
            "X",
            ValueProperties::none().with("Flavor", ["first"]),
        );
        let skipped = ValueSpecification::new(primitive("P"), "Y", ValueProperties::none());
        let last = ValueSpecification::new(
            primitive("P"),
            "X",
            ValueProperties::none().with("Flavor", ["last"]),
        );
        let outputs = vec![first, skipped, last.clone()];
        assert_eq!(last_satisfying(&req, &outputs), Some(&last));
    }
}
