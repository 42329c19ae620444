//! Core types for the DAG execution engine
//!
//! This crate provides the building blocks the runtime executes: node
//! definitions with declared parameters and types, the per-run execution
//! context (cache, per-node locks, supplied inputs), the type validation
//! gates, and graph assembly with acyclicity checks.

mod context;
mod error;
mod graph;
mod node;
mod validate;
mod value;

pub use context::ExecutionContext;
pub use error::{DagError, GraphError, NodeError, ValidationError};
pub use graph::Dag;
pub use node::{Args, Callable, NodeBuilder, NodeDef, NodeRef, Param};
pub use validate::{validate_inputs, validate_output, TypeTag};
pub use value::Value;

/// Result type for DAG operations
pub type Result<T> = std::result::Result<T, DagError>;
