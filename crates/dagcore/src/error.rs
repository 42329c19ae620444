use thiserror::Error;

/// Top-level error for a DAG run
#[derive(Error, Debug)]
pub enum DagError {
    #[error("node '{node}' or one of its dependencies is async; use the concurrent runner")]
    UnsupportedMode { node: String },

    #[error("node '{node}' missing required parameters: {missing:?}")]
    MissingDependencies { node: String, missing: Vec<String> },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed running node '{node}' with args {args:?}: {source}")]
    NodeExecution {
        node: String,
        args: Vec<String>,
        #[source]
        source: NodeError,
    },

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("worker pool error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure produced by a node callable
#[derive(Error, Debug, Clone)]
pub enum NodeError {
    #[error("missing required input: {0}")]
    MissingInput(String),

    #[error("invalid input type for '{field}': expected {expected}, got {actual}")]
    InvalidInputType {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

/// Declared type of an argument or return value was not satisfied
#[derive(Error, Debug, Clone)]
pub enum ValidationError {
    #[error("node '{node}': parameter '{param}' expected {expected}, got {actual}")]
    Input {
        node: String,
        param: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("node '{node}': return value expected {expected}, got {actual}")]
    Output {
        node: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Problems detected while assembling a graph of nodes
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("duplicate node name: {0}")]
    DuplicateNodeName(String),

    #[error("cycle detected in node graph")]
    CycleDetected,
}
