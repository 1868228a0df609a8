// SPDX-License-Identifier: Apache-2.0
#![allow(missing_docs)]
use abacus_core::{
    CompilationInstant, CompiledFunctionResolver, DependencyGraph, FunctionContext,
};

mod common;

#[test]
fn a_function_already_assigned_above_is_excluded_for_the_same_target() {
    let f = common::rule_producing_x("F", 10);
    let g = common::rule_producing_x("G", 5);
    let resolver =
        CompiledFunctionResolver::new(CompilationInstant::from_raw(1), vec![f.clone(), g]);

    let mut graph = DependencyGraph::new();
    let root = graph.add_root(common::primitive("T"));
    graph.assign_function(root, f.function().clone()).unwrap();
    let below = graph.add_dependent(common::primitive("T"), root).unwrap();

    let req = common::requirement(&common::primitive("T"), "X");
    let names: Vec<&str> = resolver
        .resolve(&req, &graph, below, &FunctionContext::passthrough())
        .unwrap()
        .map(|(function, _)| function.name())
        .collect();
    assert_eq!(names, vec!["G"], "F would depend on its own output for T");
}

#[test]
fn the_exclusion_is_transitive_down_the_dependent_chain() {
    let f = common::rule_producing_x("F", 10);
    let resolver =
        CompiledFunctionResolver::new(CompilationInstant::from_raw(1), vec![f.clone()]);

    let mut graph = DependencyGraph::new();
    let root = graph.add_root(common::primitive("T"));
    graph.assign_function(root, f.function().clone()).unwrap();
    let mid = graph.add_dependent(common::primitive("U"), root).unwrap();
    let deep = graph.add_dependent(common::primitive("T"), mid).unwrap();

    let req = common::requirement(&common::primitive("T"), "X");
    let count = resolver
        .resolve(&req, &graph, deep, &FunctionContext::passthrough())
        .unwrap()
        .count();
    assert_eq!(count, 0, "the ancestor two hops up already runs F on T");
}

#[test]
fn the_same_function_on_a_different_target_is_not_a_cycle() {
    let f = common::rule_producing_x("F", 10);
    let resolver =
        CompiledFunctionResolver::new(CompilationInstant::from_raw(1), vec![f.clone()]);

    let mut graph = DependencyGraph::new();
    let root = graph.add_root(common::primitive("T"));
    graph.assign_function(root, f.function().clone()).unwrap();
    let below = graph.add_dependent(common::primitive("U"), root).unwrap();

    let req = common::requirement(&common::primitive("U"), "X");
    let names: Vec<&str> = resolver
        .resolve(&req, &graph, below, &FunctionContext::passthrough())
        .unwrap()
        .map(|(function, _)| function.name())
        .collect();
    assert_eq!(names, vec!["F"]);
}
