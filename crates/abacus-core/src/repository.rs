// SPDX-License-Identifier: Apache-2.0
//! Function repository snapshot and the resolver factory built over it.
use crate::filter::ComputationTargetFilter;
use crate::function::ParameterizedFunction;
use crate::instant::CompilationInstant;
use crate::resolver::CompiledFunctionResolver;
use crate::rule::ResolutionRule;
use crate::transform::ResolutionRuleTransform;

/// Priority assigned to rules derived from repository functions.
///
/// Statically registered rules use explicit priorities around this midpoint
/// to advertise above or below the repository defaults.
pub const DEFAULT_RULE_PRIORITY: i32 = 0;

/// The functions a repository reports as compiled for one snapshot instant.
///
/// This is the boundary representation of the (external) function repository
/// and compilation machinery: just enough to derive default resolution rules
/// from its contents.
#[derive(Debug, Clone, Default)]
pub struct FunctionRepository {
    functions: Vec<ParameterizedFunction>,
}

impl FunctionRepository {
    /// Creates an empty repository snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a parameterized function with the snapshot.
    pub fn register(&mut self, function: ParameterizedFunction) {
        self.functions.push(function);
    }

    /// Returns the registered functions in registration order.
    #[must_use]
    pub fn functions(&self) -> &[ParameterizedFunction] {
        &self.functions
    }

    /// Derives one unfiltered rule per function at
    /// [`DEFAULT_RULE_PRIORITY`].
    #[must_use]
    pub fn default_rules(&self) -> Vec<ResolutionRule> {
        self.functions
            .iter()
            .map(|function| {
                ResolutionRule::new(
                    function.clone(),
                    ComputationTargetFilter::All,
                    DEFAULT_RULE_PRIORITY,
                )
            })
            .collect()
    }
}

/// Factory producing one immutable [`CompiledFunctionResolver`] per snapshot
/// instant from repository contents, statically registered rules, and an
/// optional transform.
///
/// Resolvers are never updated in place; a new instant gets a fresh
/// `compile` call.
#[derive(Debug, Clone, Default)]
pub struct FunctionResolver {
    repository: FunctionRepository,
    rules: Vec<ResolutionRule>,
    transform: ResolutionRuleTransform,
}

impl FunctionResolver {
    /// Constructs a factory over a repository snapshot.
    #[must_use]
    pub fn new(repository: FunctionRepository) -> Self {
        Self {
            repository,
            rules: Vec::new(),
            transform: ResolutionRuleTransform::identity(),
        }
    }

    /// Registers a static rule alongside the repository-derived defaults.
    pub fn add_rule(&mut self, rule: ResolutionRule) {
        self.rules.push(rule);
    }

    /// Registers a collection of static rules.
    pub fn add_rules<I: IntoIterator<Item = ResolutionRule>>(&mut self, rules: I) {
        self.rules.extend(rules);
    }

    /// Installs the transform applied to the combined rule set before
    /// compilation.
    pub fn set_transform(&mut self, transform: ResolutionRuleTransform) {
        self.transform = transform;
    }

    /// Compiles the combined, transformed rule set into a resolver bound to
    /// `instant`.
    #[must_use]
    pub fn compile(&self, instant: CompilationInstant) -> CompiledFunctionResolver {
        let mut rules = self.repository.default_rules();
        rules.extend(self.rules.iter().cloned());
        CompiledFunctionResolver::new(instant, self.transform.transform(rules))
    }
}
