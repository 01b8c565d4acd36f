//! A small directed graph: nodes keyed by id, edges carrying a condition.
//!
//! Generic over the node payload `D` so the graph machinery carries no
//! process-model-specific knowledge; [`crate::model::ProcessModel`] is the
//! specialization to workflow nodes.

use std::collections::BTreeMap;

use crate::condition::Condition;
use crate::error::{EngineError, EngineResult};
use crate::id::NodeId;

/// A single outgoing/incoming transition, as returned by the query methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Source node id.
    pub from: NodeId,
    /// Target node id.
    pub to: NodeId,
    /// The condition guarding this edge.
    pub condition: Condition,
}

/// A directed graph of `D`-labelled nodes connected by condition-guarded
/// edges, unique by `(from, to)`.
///
/// Edges are stored in a `BTreeMap` keyed by `(from, to)` so iteration order
/// is deterministic and structural equality of two graphs is well-defined.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph<D> {
    nodes: BTreeMap<NodeId, D>,
    edges: BTreeMap<(NodeId, NodeId), Condition>,
}

impl<D> Default for Graph<D> {
    fn default() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl<D> Graph<D> {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether a node with this id is present.
    pub fn has_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Whether an edge `(from, to)` is present.
    pub fn has_edge(&self, from: &NodeId, to: &NodeId) -> bool {
        self.edges.contains_key(&(from.clone(), to.clone()))
    }

    /// Look up a node's data.
    pub fn get_node(&self, id: &NodeId) -> Option<&D> {
        self.nodes.get(id)
    }

    /// Look up an edge's condition.
    pub fn get_edge(&self, from: &NodeId, to: &NodeId) -> Option<&Condition> {
        self.edges.get(&(from.clone(), to.clone()))
    }

    /// Insert a node. Fails with [`EngineError::NodeAlreadyExists`] if the
    /// id is already present.
    pub fn add_node(&mut self, id: NodeId, data: D) -> EngineResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(EngineError::NodeAlreadyExists(id));
        }
        self.nodes.insert(id, data);
        Ok(())
    }

    /// Insert an edge. Fails if either endpoint is missing or the edge
    /// already exists.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, condition: Condition) -> EngineResult<()> {
        if !self.nodes.contains_key(&from) {
            return Err(EngineError::FromNodeMissing(from));
        }
        if !self.nodes.contains_key(&to) {
            return Err(EngineError::ToNodeMissing(to));
        }
        let key = (from.clone(), to.clone());
        if self.edges.contains_key(&key) {
            return Err(EngineError::EdgeAlreadyExists(from, to));
        }
        self.edges.insert(key, condition);
        Ok(())
    }

    /// Remove a node and cascade-remove every edge incident to it.
    /// Idempotent: removing an absent node is a no-op.
    pub fn remove_node(&mut self, id: &NodeId) {
        self.nodes.remove(id);
        self.edges
            .retain(|(from, to), _| from != id && to != id);
    }

    /// Remove an edge. Idempotent: removing an absent edge is a no-op.
    pub fn remove_edge(&mut self, from: &NodeId, to: &NodeId) {
        self.edges.remove(&(from.clone(), to.clone()));
    }

    /// All outgoing edges of `id`, in canonical order.
    pub fn outgoing(&self, id: &NodeId) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|((from, _), _)| from == id)
            .map(|((from, to), cond)| Edge {
                from: from.clone(),
                to: to.clone(),
                condition: cond.clone(),
            })
            .collect()
    }

    /// All incoming edges of `id`, in canonical order.
    pub fn incoming(&self, id: &NodeId) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|((_, to), _)| to == id)
            .map(|((from, to), cond)| Edge {
                from: from.clone(),
                to: to.clone(),
                condition: cond.clone(),
            })
            .collect()
    }

    /// The target node ids of `id`'s outgoing edges.
    pub fn successors(&self, id: &NodeId) -> Vec<NodeId> {
        self.outgoing(id).into_iter().map(|e| e.to).collect()
    }

    /// The source node ids of `id`'s incoming edges.
    pub fn predecessors(&self, id: &NodeId) -> Vec<NodeId> {
        self.incoming(id).into_iter().map(|e| e.from).collect()
    }

    /// All node ids, in canonical order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// All nodes as `(id, data)` pairs, in canonical order.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &D)> {
        self.nodes.iter()
    }

    /// All edges, in canonical order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.edges.iter().map(|((from, to), cond)| Edge {
            from: from.clone(),
            to: to.clone(),
            condition: cond.clone(),
        })
    }

    /// Structural fmap over every edge's condition.
    pub fn map_edges(&self, f: impl Fn(&Condition) -> Condition) -> Graph<D>
    where
        D: Clone,
    {
        Graph {
            nodes: self.nodes.clone(),
            edges: self
                .edges
                .iter()
                .map(|(k, v)| (k.clone(), f(v)))
                .collect(),
        }
    }

    /// Structural fmap over every node's data.
    pub fn map_nodes<D2>(&self, f: impl Fn(&D) -> D2) -> Graph<D2> {
        Graph {
            nodes: self.nodes.iter().map(|(id, d)| (id.clone(), f(d))).collect(),
            edges: self.edges.clone(),
        }
    }

    /// Lazily enumerate every node-id sequence from `from` to `to`, bounded
    /// to length `cutoff_multiplier * node_count` so cycles don't enumerate
    /// forever. Callers source `cutoff_multiplier` from
    /// [`crate::config::SteppingConfig::path_cutoff_multiplier`].
    pub fn paths(&self, from: &NodeId, to: &NodeId, cutoff_multiplier: usize) -> EngineResult<Paths<'_, D>> {
        if !self.has_node(from) {
            return Err(EngineError::NodeDoesNotExist(from.clone()));
        }
        if !self.has_node(to) {
            return Err(EngineError::NodeDoesNotExist(to.clone()));
        }
        let max_len = cutoff_multiplier.max(1) * self.node_count().max(1);
        Ok(Paths {
            graph: self,
            to: to.clone(),
            max_len,
            stack: vec![vec![from.clone()]],
        })
    }
}

/// Iterator over node-id sequences from one node to another, produced by
/// [`Graph::paths`].
pub struct Paths<'g, D> {
    graph: &'g Graph<D>,
    to: NodeId,
    max_len: usize,
    stack: Vec<Vec<NodeId>>,
}

impl<'g, D> Iterator for Paths<'g, D> {
    type Item = Vec<NodeId>;

    fn next(&mut self) -> Option<Vec<NodeId>> {
        while let Some(path) = self.stack.pop() {
            let last = path.last().cloned().expect("path is never empty");
            let is_target = last == self.to;
            if path.len() <= self.max_len {
                for succ in self.graph.successors(&last) {
                    let mut next_path = path.clone();
                    next_path.push(succ);
                    self.stack.push(next_path);
                }
            }
            if is_target {
                return Some(path);
            }
        }
        None
    }
}
