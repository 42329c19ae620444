use dagcore::{
    validate_inputs, validate_output, Args, Callable, DagError, ExecutionContext, NodeDef,
    NodeError, NodeRef, Value,
};
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

/// Returns true if the node or any transitive dependency is async.
///
/// Tracks visited names so shared sub-graphs are checked once. Acyclicity
/// is a precondition owned by graph assembly ([`dagcore::Dag`]); it is not
/// re-validated here.
pub fn has_async_nodes(node: &NodeDef) -> bool {
    fn check<'a>(node: &'a NodeDef, visited: &mut HashSet<&'a str>) -> bool {
        if !visited.insert(node.name()) {
            return false;
        }
        if node.is_async() {
            return true;
        }
        node.deps().iter().any(|dep| check(dep, visited))
    }
    check(node, &mut HashSet::new())
}

/// Configuration for a [`Runner`]
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Memoize results of cacheable nodes within each run
    pub cache_enabled: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { cache_enabled: true }
    }
}

/// Evaluates a node and its transitive dependencies.
///
/// `run_blocking` resolves dependencies depth-first on the calling thread
/// and refuses graphs containing async nodes. `run` evaluates each node's
/// dependencies concurrently and tolerates any mix of blocking and async
/// callables.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Evaluate `node` sequentially with a fresh context.
    ///
    /// Fails with [`DagError::UnsupportedMode`] before anything executes if
    /// the graph contains an async node anywhere.
    pub fn run_blocking(
        &self,
        node: &NodeRef,
        inputs: HashMap<String, Value>,
    ) -> Result<Value, DagError> {
        let ctx = ExecutionContext::new(self.config.cache_enabled, inputs);
        self.run_blocking_with_context(node, &ctx)
    }

    /// Sequential evaluation against a caller-owned context, letting
    /// several top-level runs share one cache.
    pub fn run_blocking_with_context(
        &self,
        node: &NodeRef,
        ctx: &ExecutionContext,
    ) -> Result<Value, DagError> {
        if has_async_nodes(node) {
            return Err(DagError::UnsupportedMode {
                node: node.name().to_string(),
            });
        }
        tracing::info!(run_id = %ctx.run_id(), node = node.name(), "starting blocking run");
        self.eval_blocking(node, ctx)
    }

    fn eval_blocking(&self, node: &NodeDef, ctx: &ExecutionContext) -> Result<Value, DagError> {
        if node.cache_result() {
            if let Some(hit) = ctx.get_cached(node.name()) {
                tracing::debug!(node = node.name(), "cache hit");
                return Ok(hit);
            }
        }

        // Dependencies resolve in declared order, each to completion
        // before the next starts.
        let mut resolved = HashMap::with_capacity(node.deps().len());
        for dep in node.deps() {
            let value = self.eval_blocking(dep, ctx)?;
            resolved.insert(dep.name().to_string(), value);
        }

        let args = resolve_args(node, resolved, ctx)?;
        let arg_names = args.names();
        let started = Instant::now();

        let result = match node.callable() {
            Callable::Blocking(f) => f(args).map_err(|e| wrap_invoke_error(node, arg_names, e))?,
            // Unreachable behind the has_async_nodes gate above
            Callable::Future(_) => {
                return Err(DagError::UnsupportedMode {
                    node: node.name().to_string(),
                })
            }
        };

        validate_output(node, &result)?;
        tracing::debug!(
            node = node.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "node completed"
        );

        if node.cache_result() {
            ctx.set_cached(node.name(), result.clone());
        }
        Ok(result)
    }

    /// Evaluate `node` concurrently with a fresh context.
    pub async fn run(
        &self,
        node: &NodeRef,
        inputs: HashMap<String, Value>,
    ) -> Result<Value, DagError> {
        let ctx = Arc::new(ExecutionContext::new(self.config.cache_enabled, inputs));
        tracing::info!(run_id = %ctx.run_id(), node = node.name(), "starting concurrent run");
        self.run_with_context(Arc::clone(node), ctx).await
    }

    /// Concurrent evaluation against a shared context.
    ///
    /// For cacheable nodes this is the double-checked locking path: probe
    /// the cache without a lock, then take the per-name lock, re-check,
    /// and only compute (and write the cache) if still absent. Concurrent
    /// callers of the same name therefore invoke the callable at most
    /// once per run; which caller computes is unspecified.
    pub fn run_with_context(
        &self,
        node: NodeRef,
        ctx: Arc<ExecutionContext>,
    ) -> BoxFuture<'_, Result<Value, DagError>> {
        async move {
            if node.cache_result() {
                if let Some(hit) = ctx.get_cached(node.name()) {
                    tracing::debug!(node = node.name(), "cache hit");
                    return Ok(hit);
                }

                let node_lock = ctx.node_lock(node.name());
                let _guard = node_lock.lock().await;

                // Another caller may have computed it while we waited.
                if let Some(hit) = ctx.get_cached(node.name()) {
                    tracing::debug!(node = node.name(), "cache hit after lock");
                    return Ok(hit);
                }

                let result = self.eval_concurrent(&node, &ctx).await?;
                ctx.set_cached(node.name(), result.clone());
                Ok(result)
            } else {
                self.eval_concurrent(&node, &ctx).await
            }
        }
        .boxed()
    }

    async fn eval_concurrent(
        &self,
        node: &NodeRef,
        ctx: &Arc<ExecutionContext>,
    ) -> Result<Value, DagError> {
        let mut resolved = HashMap::with_capacity(node.deps().len());
        if !node.deps().is_empty() {
            // Fan out all dependencies at once; the first failure wins
            // and drops the remaining in-flight siblings, so a failed
            // parent never caches partial results under its own name.
            let pending = node
                .deps()
                .iter()
                .map(|dep| self.run_with_context(Arc::clone(dep), Arc::clone(ctx)));
            let results = try_join_all(pending).await?;
            for (dep, value) in node.deps().iter().zip(results) {
                resolved.insert(dep.name().to_string(), value);
            }
        }

        let args = resolve_args(node, resolved, ctx)?;
        let arg_names = args.names();
        let started = Instant::now();

        let result = match node.callable() {
            Callable::Blocking(f) => f(args),
            Callable::Future(f) => f(args).await,
        }
        .map_err(|e| wrap_invoke_error(node, arg_names, e))?;

        validate_output(node, &result)?;
        tracing::debug!(
            node = node.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "node completed"
        );
        Ok(result)
    }
}

/// Merge dependency outputs with caller-supplied inputs (inputs win),
/// filter to the node's declared parameters, enforce required-parameter
/// presence, and run the input type gate.
fn resolve_args(
    node: &NodeDef,
    mut resolved: HashMap<String, Value>,
    ctx: &ExecutionContext,
) -> Result<Args, DagError> {
    for (name, value) in ctx.inputs() {
        resolved.insert(name.clone(), value.clone());
    }

    resolved.retain(|name, _| node.declares_param(name));
    let args = Args::from_map(resolved);

    let missing: Vec<String> = node
        .params()
        .iter()
        .filter(|p| !p.has_default && !args.contains(&p.name))
        .map(|p| p.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(DagError::MissingDependencies {
            node: node.name().to_string(),
            missing,
        });
    }

    validate_inputs(node, &args)?;
    Ok(args)
}

/// Argument-shaped failures from the callable are re-wrapped with the node
/// name and the argument keys it was given; everything else propagates
/// unchanged.
fn wrap_invoke_error(node: &NodeDef, args: Vec<String>, err: NodeError) -> DagError {
    match err {
        NodeError::MissingInput(_) | NodeError::InvalidInputType { .. } => {
            DagError::NodeExecution {
                node: node.name().to_string(),
                args,
                source: err,
            }
        }
        other => DagError::Node(other),
    }
}
