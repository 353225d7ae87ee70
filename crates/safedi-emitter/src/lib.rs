//! Code emission for validated dependency trees.
//!
//! Emission only runs on a graph the validator accepted: every child edge
//! resolves, every reception is satisfiable, and there are no illegal
//! cycles. Per-root generation is embarrassingly parallel; the joined output
//! is deterministic because roots are pre-sorted.

pub mod codegen;
pub use codegen::emit_dependency_tree;

pub mod dot;
pub use dot::emit_dot;

#[cfg(test)]
#[path = "tests/codegen_tests.rs"]
mod codegen_tests;
#[cfg(test)]
#[path = "tests/dot_tests.rs"]
mod dot_tests;
