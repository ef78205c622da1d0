//! Workflow graph model.
//!
//! Structural contract for workflows produced by the visual builder:
//! typed nodes connected by directed edges. [`validate`] checks the
//! invariants no other component enforces before a graph reaches the runner.

pub mod types;
pub mod validator;

pub use types::{NodeType, Position, WorkflowEdge, WorkflowGraph, WorkflowNode};
pub use validator::{validate, validate_for_execution, EdgeEndpoint, GraphError};
