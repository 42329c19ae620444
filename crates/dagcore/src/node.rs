use crate::{NodeError, TypeTag, Value};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Shared reference to an immutable node definition.
///
/// Dependencies hold `Arc`s into the same graph, so a node reachable via
/// multiple parents is one object with one name.
pub type NodeRef = Arc<NodeDef>;

type BlockingFn = dyn Fn(Args) -> Result<Value, NodeError> + Send + Sync;
type FutureFn = dyn Fn(Args) -> BoxFuture<'static, Result<Value, NodeError>> + Send + Sync;

/// The unit of work attached to a node
#[derive(Clone)]
pub enum Callable {
    /// Plain function invoked directly on the calling thread
    Blocking(Arc<BlockingFn>),
    /// Function producing a future; only the concurrent runner can drive it
    Future(Arc<FutureFn>),
}

impl Callable {
    pub fn is_async(&self) -> bool {
        matches!(self, Callable::Future(_))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Blocking(_) => f.write_str("Callable::Blocking"),
            Callable::Future(_) => f.write_str("Callable::Future"),
        }
    }
}

/// One declared parameter of a node
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    /// Parameters with a default need not be satisfied by dependencies or inputs
    pub has_default: bool,
    pub ty: TypeTag,
}

/// Arguments handed to a node callable, already filtered to its declared
/// parameters and type-checked by the runner.
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: HashMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Sorted argument names, for diagnostics
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.values.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get required argument or return error
    pub fn require(&self, name: &str) -> Result<&Value, NodeError> {
        self.values
            .get(name)
            .ok_or_else(|| NodeError::MissingInput(name.to_string()))
    }

    pub fn require_i64(&self, name: &str) -> Result<i64, NodeError> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "Int".to_string(),
            actual: value.type_name().to_string(),
        })
    }

    pub fn require_f64(&self, name: &str) -> Result<f64, NodeError> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "Float".to_string(),
            actual: value.type_name().to_string(),
        })
    }

    pub fn require_str(&self, name: &str) -> Result<&str, NodeError> {
        let value = self.require(name)?;
        value.as_str().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "String".to_string(),
            actual: value.type_name().to_string(),
        })
    }

    pub fn require_bool(&self, name: &str) -> Result<bool, NodeError> {
        let value = self.require(name)?;
        value.as_bool().ok_or_else(|| NodeError::InvalidInputType {
            field: name.to_string(),
            expected: "Bool".to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

/// Immutable description of one computation in the graph
#[derive(Debug, Clone)]
pub struct NodeDef {
    name: String,
    callable: Callable,
    deps: Vec<NodeRef>,
    params: Vec<Param>,
    returns: TypeTag,
    cache_result: bool,
}

impl NodeDef {
    /// Start building a node around a plain blocking function
    pub fn blocking<F>(name: impl Into<String>, f: F) -> NodeBuilder
    where
        F: Fn(Args) -> Result<Value, NodeError> + Send + Sync + 'static,
    {
        NodeBuilder::new(name.into(), Callable::Blocking(Arc::new(f)))
    }

    /// Start building a node around an async function
    pub fn future<F, Fut>(name: impl Into<String>, f: F) -> NodeBuilder
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, NodeError>> + Send + 'static,
    {
        NodeBuilder::new(
            name.into(),
            Callable::Future(Arc::new(move |args| f(args).boxed())),
        )
    }

    /// Leaf node that passes through a caller-supplied input of the same name
    pub fn input(name: impl Into<String>, ty: TypeTag) -> NodeRef {
        let name = name.into();
        let param = name.clone();
        NodeDef::blocking(name.clone(), move |args: Args| {
            args.require(&param).cloned()
        })
        .param(name, ty)
        .returns(ty)
        .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn callable(&self) -> &Callable {
        &self.callable
    }

    pub fn deps(&self) -> &[NodeRef] {
        &self.deps
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn returns(&self) -> TypeTag {
        self.returns
    }

    pub fn cache_result(&self) -> bool {
        self.cache_result
    }

    /// Whether the callable must be driven by the concurrent runner
    pub fn is_async(&self) -> bool {
        self.callable.is_async()
    }

    pub fn declares_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }
}

/// Builder for [`NodeDef`]
pub struct NodeBuilder {
    name: String,
    callable: Callable,
    deps: Vec<NodeRef>,
    params: Vec<Param>,
    returns: TypeTag,
    cache_result: bool,
}

impl NodeBuilder {
    fn new(name: String, callable: Callable) -> Self {
        Self {
            name,
            callable,
            deps: Vec::new(),
            params: Vec::new(),
            returns: TypeTag::Any,
            cache_result: true,
        }
    }

    /// Declare a dependency; its result arrives under the dependency's name
    pub fn dependency(mut self, node: &NodeRef) -> Self {
        self.deps.push(Arc::clone(node));
        self
    }

    /// Declare a required parameter
    pub fn param(mut self, name: impl Into<String>, ty: TypeTag) -> Self {
        self.params.push(Param {
            name: name.into(),
            has_default: false,
            ty,
        });
        self
    }

    /// Declare a parameter the callable can default when absent
    pub fn optional_param(mut self, name: impl Into<String>, ty: TypeTag) -> Self {
        self.params.push(Param {
            name: name.into(),
            has_default: true,
            ty,
        });
        self
    }

    /// Declare the return type; defaults to [`TypeTag::Any`]
    pub fn returns(mut self, ty: TypeTag) -> Self {
        self.returns = ty;
        self
    }

    /// Opt out of per-run result memoization
    pub fn no_cache(mut self) -> Self {
        self.cache_result = false;
        self
    }

    pub fn build(self) -> NodeRef {
        Arc::new(NodeDef {
            name: self.name,
            callable: self.callable,
            deps: self.deps,
            params: self.params,
            returns: self.returns,
            cache_result: self.cache_result,
        })
    }
}
