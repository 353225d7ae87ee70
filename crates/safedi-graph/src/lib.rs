//! Dependency graph analysis for the SafeDI code generator.
//!
//! The analysis is a three-stage pipeline over module summaries:
//! 1. `registry` merges summaries into a global fulfilled-type index and
//!    rejects duplicate fulfillments.
//! 2. `builder` discovers roots, computes reachability, and materializes one
//!    `Scope` per reachable provider.
//! 3. `validator` walks each root's scope subtree and collects every
//!    violation before returning.
//!
//! All three stages run synchronously on one thread so diagnostics are
//! deterministic.

pub mod registry;
pub use registry::TypeRegistry;

pub mod scope;
pub use scope::{AliasEdge, PropertyToInstantiate, Scope, ScopeGraph, ScopeId};

pub mod builder;

pub mod validator;

use safedi_common::{GraphErrors, ModuleSummary};

/// Runs the full analysis over an ordered list of module summaries (current
/// module last). Returns the validated scope graph, or every diagnostic the
/// input produced.
pub fn analyze(summaries: &[ModuleSummary]) -> Result<(TypeRegistry, ScopeGraph), GraphErrors> {
    let (registry, mut errors) = TypeRegistry::build(summaries);
    let graph = builder::build(&registry);
    errors.extend(validator::validate(&registry, &graph));
    if errors.is_empty() {
        Ok((registry, graph))
    } else {
        Err(GraphErrors::new(errors))
    }
}

#[cfg(test)]
#[path = "tests/fixtures.rs"]
mod fixtures;
#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod registry_tests;
#[cfg(test)]
#[path = "tests/builder_tests.rs"]
mod builder_tests;
#[cfg(test)]
#[path = "tests/validator_tests.rs"]
mod validator_tests;
