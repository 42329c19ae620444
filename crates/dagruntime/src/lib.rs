//! Execution runtime for typed DAGs
//!
//! This crate evaluates graphs built from `dagcore` node definitions: a
//! blocking depth-first runner, a concurrent runner with per-node
//! double-checked result caching, and helpers for pushing a single
//! callable onto an isolated worker pool.

mod executor;
mod worker;

pub use executor::{has_async_nodes, Runner, RunnerConfig};
pub use worker::{run_future_in_worker, run_in_worker, WorkerPool};
