// SPDX-License-Identifier: Apache-2.0
//! Rule transforms: rewriting a rule set before it is compiled.
//!
//! Actions are registered per function short name and validated at
//! registration time; the transform itself is a pure collection-to-collection
//! mapping applied once, before `CompiledFunctionResolver` construction.
use std::collections::BTreeMap;

use thiserror::Error;

use crate::filter::ComputationTargetFilter;
use crate::function::{FunctionParameters, ParameterizedFunction};
use crate::rule::ResolutionRule;

/// Error raised when transform registrations compose illegally.
///
/// Raised at registration time, never at transform time: a suppressed
/// function cannot be adjusted, and an adjusted function cannot be
/// suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Rules for the function are already suppressed.
    #[error("rules for `{0}` are already suppressed")]
    AlreadySuppressed(&'static str),
    /// Rules for the function already have adjustments registered.
    #[error("rules for `{0}` already have adjustments registered")]
    AlreadyAdjusted(&'static str),
}

/// One replacement for a rule: optional parameter bundle, optional filter,
/// and an optional priority offset added to the original priority. Unset
/// fields default to the original rule's values.
#[derive(Debug, Clone, Default)]
pub struct RuleAdjustment {
    parameters: Option<FunctionParameters>,
    filter: Option<ComputationTargetFilter>,
    priority_offset: Option<i32>,
}

impl RuleAdjustment {
    /// An adjustment that changes nothing (every field defaulted).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the function's parameter bundle.
    #[must_use]
    pub fn with_parameters(mut self, parameters: FunctionParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Replaces the rule's target filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ComputationTargetFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Offsets the rule's priority by `offset` (added to the original).
    #[must_use]
    pub fn with_priority_offset(mut self, offset: i32) -> Self {
        self.priority_offset = Some(offset);
        self
    }

    fn apply_to(&self, rule: &ResolutionRule) -> ResolutionRule {
        let function = match &self.parameters {
            Some(parameters) => ParameterizedFunction::new(
                std::sync::Arc::clone(rule.function().definition()),
                parameters.clone(),
            ),
            None => rule.function().clone(),
        };
        let filter = self
            .filter
            .clone()
            .unwrap_or_else(|| rule.filter().clone());
        let priority = rule.priority() + self.priority_offset.unwrap_or(0);
        ResolutionRule::new(function, filter, priority)
    }
}

/// Registered action for one function, keyed by its short name.
#[derive(Debug, Clone)]
enum TransformAction {
    /// Drop all rules for the function.
    Suppress,
    /// Replace each rule with one output rule per adjustment.
    Adjust(Vec<RuleAdjustment>),
}

/// Maps an input rule collection to an output rule collection.
///
/// The default value carries no actions and is the identity transform.
#[derive(Debug, Clone, Default)]
pub struct ResolutionRuleTransform {
    actions: BTreeMap<&'static str, TransformAction>,
}

impl ResolutionRuleTransform {
    /// The identity transform: returns every input rule unchanged.
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Suppresses every rule for the named function.
    ///
    /// Suppressing twice is idempotent.
    ///
    /// # Errors
    /// Returns [`TransformError::AlreadyAdjusted`] when adjustments are
    /// already registered for the function.
    pub fn suppress_rule(&mut self, function: &'static str) -> Result<(), TransformError> {
        match self.actions.entry(function) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(TransformAction::Suppress);
                Ok(())
            }
            std::collections::btree_map::Entry::Occupied(slot) => match slot.get() {
                TransformAction::Suppress => Ok(()),
                TransformAction::Adjust(_) => Err(TransformError::AlreadyAdjusted(function)),
            },
        }
    }

    /// Registers an adjustment for the named function. Several independent
    /// adjustments for one function re-advertise each of its rules once per
    /// adjustment.
    ///
    /// # Errors
    /// Returns [`TransformError::AlreadySuppressed`] when the function is
    /// already suppressed.
    pub fn adjust_rule(
        &mut self,
        function: &'static str,
        adjustment: RuleAdjustment,
    ) -> Result<(), TransformError> {
        match self.actions.entry(function) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(TransformAction::Adjust(vec![adjustment]));
                Ok(())
            }
            std::collections::btree_map::Entry::Occupied(mut slot) => match slot.get_mut() {
                TransformAction::Suppress => Err(TransformError::AlreadySuppressed(function)),
                TransformAction::Adjust(adjustments) => {
                    adjustments.push(adjustment);
                    Ok(())
                }
            },
        }
    }

    /// Applies the transform to a rule collection.
    ///
    /// Rules for functions with no registered action pass through unchanged,
    /// in their original positions.
    #[must_use]
    pub fn transform(&self, rules: Vec<ResolutionRule>) -> Vec<ResolutionRule> {
        if self.actions.is_empty() {
            return rules;
        }
        let mut out = Vec::with_capacity(rules.len());
        for rule in rules {
            match self.actions.get(rule.function().name()) {
                None => out.push(rule),
                Some(TransformAction::Suppress) => {}
                Some(TransformAction::Adjust(adjustments)) => {
                    out.extend(adjustments.iter().map(|a| a.apply_to(&rule)));
                }
            }
        }
        out
    }
}
