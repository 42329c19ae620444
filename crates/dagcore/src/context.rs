use crate::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

/// Per-run shared state threaded through every recursive evaluation.
///
/// One context is created per top-level run and dropped when the run
/// returns; callers wanting several top-level evaluations to share a cache
/// can pass the same context to each of them explicitly.
pub struct ExecutionContext {
    run_id: Uuid,
    cache_enabled: bool,
    inputs: HashMap<String, Value>,
    cache: Mutex<HashMap<String, Value>>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ExecutionContext {
    pub fn new(cache_enabled: bool, inputs: HashMap<String, Value>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            cache_enabled,
            inputs,
            cache: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    /// Inputs supplied by the original caller; these override same-named
    /// dependency outputs when a node's arguments are resolved.
    pub fn inputs(&self) -> &HashMap<String, Value> {
        &self.inputs
    }

    /// Cached result for a node name, if any. Always `None` when caching
    /// is disabled for the run.
    pub fn get_cached(&self, name: &str) -> Option<Value> {
        if !self.cache_enabled {
            return None;
        }
        lock(&self.cache).get(name).cloned()
    }

    /// Record a node result. Entries are write-once per run: the first
    /// writer wins and later writes for the same name are ignored.
    pub fn set_cached(&self, name: &str, value: Value) {
        if !self.cache_enabled {
            return;
        }
        let mut cache = lock(&self.cache);
        if !cache.contains_key(name) {
            tracing::debug!(run_id = %self.run_id, node = name, "caching result");
            cache.insert(name.to_string(), value);
        }
    }

    /// Per-node mutex used by the concurrent runner's double-checked
    /// locking. Created lazily, exactly once per name: creation is
    /// serialized by the map-level lock so two concurrent requests for a
    /// missing name observe the same mutex.
    pub fn node_lock(&self, name: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = lock(&self.locks);
        Arc::clone(
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(()))),
        )
    }
}

// Entries are write-once; a poisoned guard still holds consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
