use crate::{GraphError, NodeRef};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::sync::Arc;

/// Name-keyed arena over the transitive closure of a set of root nodes.
///
/// Assembly walks every dependency reachable from the roots, rejects two
/// distinct nodes sharing one name, and validates acyclicity with a
/// topological sort. The runners themselves treat acyclicity as a
/// precondition and do not re-check it; building a `Dag` is how a caller
/// gets that guarantee stated explicitly.
#[derive(Debug)]
pub struct Dag {
    nodes: HashMap<String, NodeRef>,
    order: Vec<String>,
}

impl Dag {
    pub fn build(roots: impl IntoIterator<Item = NodeRef>) -> Result<Self, GraphError> {
        let mut nodes: HashMap<String, NodeRef> = HashMap::new();
        let mut stack: Vec<NodeRef> = roots.into_iter().collect();

        while let Some(node) = stack.pop() {
            match nodes.get(node.name()) {
                Some(existing) if Arc::ptr_eq(existing, &node) => continue,
                Some(_) => {
                    return Err(GraphError::DuplicateNodeName(node.name().to_string()));
                }
                None => {}
            }
            stack.extend(node.deps().iter().cloned());
            nodes.insert(node.name().to_string(), node);
        }

        let order = topo_order(&nodes)?;
        Ok(Self { nodes, order })
    }

    pub fn get(&self, name: &str) -> Option<&NodeRef> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Node names with every dependency ordered before its dependents
    pub fn topo_order(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn topo_order(nodes: &HashMap<String, NodeRef>) -> Result<Vec<String>, GraphError> {
    let mut graph: DiGraph<String, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();

    for name in nodes.keys() {
        index.insert(name.as_str(), graph.add_node(name.clone()));
    }
    for (name, node) in nodes {
        for dep in node.deps() {
            graph.add_edge(index[dep.name()], index[name.as_str()], ());
        }
    }

    let sorted = toposort(&graph, None).map_err(|_| GraphError::CycleDetected)?;
    Ok(sorted.into_iter().map(|idx| graph[idx].clone()).collect())
}
