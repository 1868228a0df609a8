// SPDX-License-Identifier: Apache-2.0
//! Shared fixtures for unit tests.
use std::sync::Arc;

use crate::context::FunctionContext;
use crate::filter::ComputationTargetFilter;
use crate::function::{
    FunctionDefinition, FunctionFault, FunctionParameters, ParameterizedFunction, ResultsFn,
};
use crate::ident::make_function_id;
use crate::properties::ValueProperties;
use crate::rule::ResolutionRule;
use crate::target::{
    ComputationTarget, ComputationTargetSpecification, ComputationTargetType, UniqueId,
};
use crate::value::{ValueRequirement, ValueSpecification};

pub(crate) fn primitive(id: &str) -> ComputationTargetSpecification {
    ComputationTargetSpecification::new(ComputationTargetType::Primitive, UniqueId::of("Test", id))
}

pub(crate) fn position(id: &str) -> ComputationTargetSpecification {
    ComputationTargetSpecification::new(ComputationTargetType::Position, UniqueId::of("Test", id))
}

pub(crate) fn always(_: &FunctionContext, _: &ComputationTarget) -> bool {
    true
}

fn never(_: &FunctionContext, _: &ComputationTarget) -> bool {
    false
}

pub(crate) fn no_results(
    _: &FunctionContext,
    _: &ComputationTarget,
    _: &FunctionParameters,
) -> Result<Vec<ValueSpecification>, FunctionFault> {
    Ok(Vec::new())
}

pub(crate) fn no_requirements(
    _: &FunctionContext,
    _: &ComputationTarget,
    _: &ValueSpecification,
    _: &FunctionParameters,
) -> Result<Vec<ValueRequirement>, FunctionFault> {
    Ok(Vec::new())
}

/// Produces value "X" with no properties on whatever target is queried.
pub(crate) fn produce_x(
    _: &FunctionContext,
    target: &ComputationTarget,
    _: &FunctionParameters,
) -> Result<Vec<ValueSpecification>, FunctionFault> {
    Ok(vec![ValueSpecification::new(
        target.specification().clone(),
        "X",
        ValueProperties::none(),
    )])
}

fn faulting_results(
    _: &FunctionContext,
    _: &ComputationTarget,
    _: &FunctionParameters,
) -> Result<Vec<ValueSpecification>, FunctionFault> {
    Err(FunctionFault::new("deliberate test fault"))
}

pub(crate) fn definition(
    name: &'static str,
    target_type: ComputationTargetType,
) -> Arc<FunctionDefinition> {
    definition_with(name, target_type, no_results)
}

pub(crate) fn definition_with(
    name: &'static str,
    target_type: ComputationTargetType,
    results: ResultsFn,
) -> Arc<FunctionDefinition> {
    Arc::new(FunctionDefinition {
        id: make_function_id(name),
        name,
        target_type,
        can_apply_to: always,
        results,
        requirements: no_requirements,
        refined_results: None,
    })
}

pub(crate) fn parameterized(name: &'static str) -> ParameterizedFunction {
    ParameterizedFunction::new(
        definition(name, ComputationTargetType::Position),
        FunctionParameters::Empty,
    )
}

/// A rule advertising an unfiltered primitive-target function that produces
/// "X" with no properties.
pub(crate) fn rule_producing_x(name: &'static str, priority: i32) -> ResolutionRule {
    ResolutionRule::new(
        ParameterizedFunction::new(
            definition_with(name, ComputationTargetType::Primitive, produce_x),
            FunctionParameters::Empty,
        ),
        ComputationTargetFilter::All,
        priority,
    )
}

/// A rule whose result enumeration always faults.
pub(crate) fn faulting_rule(name: &'static str, priority: i32) -> ResolutionRule {
    ResolutionRule::new(
        ParameterizedFunction::new(
            definition_with(name, ComputationTargetType::Primitive, faulting_results),
            FunctionParameters::Empty,
        ),
        ComputationTargetFilter::All,
        priority,
    )
}

/// A rule whose function refuses to apply to any target.
pub(crate) fn inapplicable_rule(name: &'static str, priority: i32) -> ResolutionRule {
    ResolutionRule::new(
        ParameterizedFunction::new(
            Arc::new(FunctionDefinition {
                id: make_function_id(name),
                name,
                target_type: ComputationTargetType::Primitive,
                can_apply_to: never,
                results: produce_x,
                requirements: no_requirements,
                refined_results: None,
            }),
            FunctionParameters::Empty,
        ),
        ComputationTargetFilter::All,
        priority,
    )
}
