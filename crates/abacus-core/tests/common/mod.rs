// SPDX-License-Identifier: Apache-2.0
//! Shared fixtures for the integration tests.
#![allow(missing_docs, dead_code)]

use std::sync::Arc;

use abacus_core::{
    make_function_id, ComputationTarget, ComputationTargetFilter, ComputationTargetSpecification,
    ComputationTargetType, FunctionContext, FunctionDefinition, FunctionFault, FunctionParameters,
    ParameterizedFunction, ResolutionRule, ResultsFn, UniqueId, ValueProperties, ValueRequirement,
    ValueSpecification,
};

pub fn primitive(id: &str) -> ComputationTargetSpecification {
    ComputationTargetSpecification::new(ComputationTargetType::Primitive, UniqueId::of("Test", id))
}

pub fn position(id: &str) -> ComputationTargetSpecification {
    ComputationTargetSpecification::new(ComputationTargetType::Position, UniqueId::of("Test", id))
}

pub fn requirement(target: &ComputationTargetSpecification, name: &str) -> ValueRequirement {
    ValueRequirement::new(target.clone(), name, ValueProperties::none())
}

pub fn always(_: &FunctionContext, _: &ComputationTarget) -> bool {
    true
}

pub fn no_requirements(
    _: &FunctionContext,
    _: &ComputationTarget,
    _: &ValueSpecification,
    _: &FunctionParameters,
) -> Result<Vec<ValueRequirement>, FunctionFault> {
    Ok(Vec::new())
}

/// Produces value "X" with no properties on whatever target is queried.
pub fn produce_x(
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

pub fn definition_with(
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

/// An unfiltered rule advertising a primitive-target function that produces
/// "X" with no properties.
pub fn rule_producing_x(name: &'static str, priority: i32) -> ResolutionRule {
    rule_with(name, produce_x, ComputationTargetFilter::All, priority)
}

pub fn rule_with(
    name: &'static str,
    results: ResultsFn,
    filter: ComputationTargetFilter,
    priority: i32,
) -> ResolutionRule {
    ResolutionRule::new(
        ParameterizedFunction::new(
            definition_with(name, ComputationTargetType::Primitive, results),
            FunctionParameters::Empty,
        ),
        filter,
        priority,
    )
}
