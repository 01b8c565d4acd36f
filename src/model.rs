#![allow(clippy::expect_used)] // fresh-graph invariants below cannot fail; data_unchecked is the bang variant
//! Process model combinators: a monoid under sequential composition, plus
//! parallel-any, parallel-all, and loop combinators, all preserving the
//! "unique Start/End, matched split/join" invariants.

use crate::condition::{and_then, c_true, Condition};
use crate::error::{EngineError, EngineResult};
use crate::graph::Graph;
use crate::id::{IdGenerator, NodeId};
use crate::node::NodeData;
use crate::observability::EngineTracer;

/// An immutable, combinator-built process model.
///
/// Construct with [`neutral`], [`make`], and the composition functions in
/// this module — never by hand-assembling a [`Graph`] — so the invariants
/// in the crate docs keep holding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessModel {
    graph: Graph<NodeData>,
}

impl ProcessModel {
    /// The underlying graph, for callers that need direct structural access
    /// (e.g. the stepping engine).
    pub fn graph(&self) -> &Graph<NodeData> {
        &self.graph
    }

    fn from_graph(graph: Graph<NodeData>) -> Self {
        Self { graph }
    }
}

/// The identity element of [`append`]: `Start --true--> End`.
pub fn neutral() -> ProcessModel {
    let mut g = Graph::new();
    g.add_node(NodeId::start(), NodeData::Start)
        .expect("fresh graph: Start cannot already exist");
    g.add_node(NodeId::end(), NodeData::End)
        .expect("fresh graph: End cannot already exist");
    g.add_edge(NodeId::start(), NodeId::end(), c_true())
        .expect("fresh graph: Start->End cannot already exist");
    ProcessModel::from_graph(g)
}

/// Wraps a single node between a fresh Start and End, connected by `true`
/// edges on both sides.
///
/// `id` is the node's graph identity. For `NodeData::Activity`, callers
/// conventionally pass `NodeId::new(&activity.id)`; for `Or`/`And`/`Join`
/// (as used internally by [`one_of`], [`both`], [`loop_`]) it is a fresh id
/// from an [`IdGenerator`].
pub fn make(id: NodeId, data: NodeData) -> ProcessModel {
    let mut g = Graph::new();
    g.add_node(NodeId::start(), NodeData::Start)
        .expect("fresh graph: Start cannot already exist");
    g.add_node(NodeId::end(), NodeData::End)
        .expect("fresh graph: End cannot already exist");
    g.add_node(id.clone(), data)
        .expect("fresh graph: node cannot already exist");
    g.add_edge(NodeId::start(), id.clone(), c_true())
        .expect("fresh graph: Start->node cannot already exist");
    g.add_edge(id, NodeId::end(), c_true())
        .expect("fresh graph: node->End cannot already exist");
    ProcessModel::from_graph(g)
}

/// Insert every node of `other` into `base`, then every edge. Fails with
/// `NodeAlreadyExists` / `EdgeAlreadyExists` on any collision.
fn merge_into(mut base: Graph<NodeData>, other: Graph<NodeData>) -> EngineResult<Graph<NodeData>> {
    for (id, data) in other.nodes() {
        base.add_node(id.clone(), data.clone())?;
    }
    for edge in other.edges() {
        base.add_edge(edge.from, edge.to, edge.condition)?;
    }
    Ok(base)
}

/// Sequential composition: `m1` then `m2`. Forms a monoid with [`neutral`]
/// as identity. Fails with `NodeAlreadyExists` if `m1` and `m2` share any
/// non-sentinel node id.
pub fn append(m1: &ProcessModel, m2: &ProcessModel) -> EngineResult<ProcessModel> {
    let _span = EngineTracer::default().start_model_construction_span("append").entered();
    let mut g1 = m1.graph.clone();
    let mut g2 = m2.graph.clone();

    let end_edges = g1.incoming(&NodeId::end());
    let start_edges = g2.outgoing(&NodeId::start());

    g1.remove_node(&NodeId::end());
    g2.remove_node(&NodeId::start());

    let mut merged = merge_into(g1, g2)?;

    for e1 in &end_edges {
        for e2 in &start_edges {
            merged.add_edge(
                e1.from.clone(),
                e2.to.clone(),
                and_then(e1.condition.clone(), e2.condition.clone()),
            )?;
        }
    }

    Ok(ProcessModel::from_graph(merged))
}

/// Builds the shared-Start/End parallel merge of `m1` and `m2`: `m2`'s
/// Start/End become the shared ones; `m1`'s Start-outgoing edges are
/// reattached to originate from `m2`'s Start, its End-incoming edges from
/// `m2`'s End, and `m1`'s Start/End nodes themselves are dropped.
fn parallel_merge(m1: &ProcessModel, m2: &ProcessModel) -> EngineResult<Graph<NodeData>> {
    let mut g1 = m1.graph.clone();
    let g2 = m2.graph.clone();

    let m1_start_edges = g1.outgoing(&NodeId::start());
    let m1_end_edges = g1.incoming(&NodeId::end());

    g1.remove_node(&NodeId::start());
    g1.remove_node(&NodeId::end());

    let mut merged = merge_into(g2, g1)?;

    for e in m1_start_edges {
        merged.add_edge(NodeId::start(), e.to, e.condition)?;
    }
    for e in m1_end_edges {
        merged.add_edge(e.from, NodeId::end(), e.condition)?;
    }

    Ok(merged)
}

/// Splices a fresh split/join pair in between a graph's shared Start/End:
/// `Start --true--> split --(original edges)--> ... --(original edges)-->
/// join --true--> End`.
fn wrap_with_split_join(
    mut pm: Graph<NodeData>,
    split_id: NodeId,
    split_data: NodeData,
    join_id: NodeId,
) -> EngineResult<Graph<NodeData>> {
    let start_edges = pm.outgoing(&NodeId::start());
    let end_edges = pm.incoming(&NodeId::end());

    for e in &start_edges {
        pm.remove_edge(&e.from, &e.to);
    }
    for e in &end_edges {
        pm.remove_edge(&e.from, &e.to);
    }

    pm.add_node(split_id.clone(), split_data)?;
    pm.add_node(
        join_id.clone(),
        NodeData::Join {
            for_node_id: split_id.clone(),
        },
    )?;

    for e in start_edges {
        pm.add_edge(split_id.clone(), e.to, e.condition)?;
    }
    for e in end_edges {
        pm.add_edge(e.from, join_id.clone(), e.condition)?;
    }

    pm.add_edge(NodeId::start(), split_id, c_true())?;
    pm.add_edge(join_id, NodeId::end(), c_true())?;

    Ok(pm)
}

/// Exclusive-choice parallel composition: exactly one of `m1`/`m2` runs.
pub fn one_of(m1: &ProcessModel, m2: &ProcessModel, id_gen: &dyn IdGenerator) -> EngineResult<ProcessModel> {
    let _span = EngineTracer::default().start_model_construction_span("one_of").entered();
    let pm = parallel_merge(m1, m2)?;
    let split_id = id_gen.new_id();
    let join_id = id_gen.new_id();
    let graph = wrap_with_split_join(
        pm,
        split_id.clone(),
        NodeData::Or {
            join_node_id: join_id.clone(),
        },
        join_id,
    )?;
    Ok(ProcessModel::from_graph(graph))
}

/// Parallel-all composition: both `m1` and `m2` run, synchronizing at the
/// join.
pub fn both(m1: &ProcessModel, m2: &ProcessModel, id_gen: &dyn IdGenerator) -> EngineResult<ProcessModel> {
    let _span = EngineTracer::default().start_model_construction_span("both").entered();
    let pm = parallel_merge(m1, m2)?;
    let split_id = id_gen.new_id();
    let join_id = id_gen.new_id();
    let graph = wrap_with_split_join(
        pm,
        split_id.clone(),
        NodeData::And {
            join_node_id: join_id.clone(),
        },
        join_id,
    )?;
    Ok(ProcessModel::from_graph(graph))
}

/// Wraps `m` with a `Join` before and an `Or` after, adding a back-edge
/// `Or -> Join` carrying `cond`. The forward edge `Or -> End` keeps its
/// default `true` condition — set it with [`with_end_condition`] to choose
/// when the loop actually exits.
pub fn loop_(m: &ProcessModel, cond: Condition, id_gen: &dyn IdGenerator) -> EngineResult<ProcessModel> {
    let _span = EngineTracer::default().start_model_construction_span("loop").entered();
    let mut g = m.graph.clone();

    let start_edges = g.outgoing(&NodeId::start());
    let end_edges = g.incoming(&NodeId::end());

    for e in &start_edges {
        g.remove_edge(&e.from, &e.to);
    }
    for e in &end_edges {
        g.remove_edge(&e.from, &e.to);
    }

    let join_id = id_gen.new_id();
    let or_id = id_gen.new_id();

    g.add_node(
        join_id.clone(),
        NodeData::Join {
            for_node_id: or_id.clone(),
        },
    )?;
    g.add_node(
        or_id.clone(),
        NodeData::Or {
            join_node_id: join_id.clone(),
        },
    )?;

    for e in start_edges {
        g.add_edge(join_id.clone(), e.to, e.condition)?;
    }
    for e in end_edges {
        g.add_edge(e.from, or_id.clone(), e.condition)?;
    }

    g.add_edge(NodeId::start(), join_id.clone(), c_true())?;
    g.add_edge(or_id.clone(), join_id, cond)?;
    g.add_edge(or_id, NodeId::end(), c_true())?;

    Ok(ProcessModel::from_graph(g))
}

fn replace_edge_condition(
    g: &mut Graph<NodeData>,
    edges: Vec<crate::graph::Edge>,
    cond: &Condition,
) -> EngineResult<()> {
    for e in edges {
        g.remove_edge(&e.from, &e.to);
        g.add_edge(e.from, e.to, cond.clone())?;
    }
    Ok(())
}

/// Replaces the condition of every outgoing-from-Start edge with `c`.
pub fn with_start_condition(m: &ProcessModel, c: Condition) -> EngineResult<ProcessModel> {
    let mut g = m.graph.clone();
    let edges = g.outgoing(&NodeId::start());
    replace_edge_condition(&mut g, edges, &c)?;
    Ok(ProcessModel::from_graph(g))
}

/// Replaces the condition of every incoming-to-End edge with `c`.
pub fn with_end_condition(m: &ProcessModel, c: Condition) -> EngineResult<ProcessModel> {
    let mut g = m.graph.clone();
    let edges = g.incoming(&NodeId::end());
    replace_edge_condition(&mut g, edges, &c)?;
    Ok(ProcessModel::from_graph(g))
}

/// `(condition, target)` for every outgoing edge of `id`.
pub fn conditions_with_targets(m: &ProcessModel, id: &NodeId) -> Vec<(Condition, NodeId)> {
    m.graph
        .outgoing(id)
        .into_iter()
        .map(|e| (e.condition, e.to))
        .collect()
}

/// The data of node `id`.
pub fn data<'a>(m: &'a ProcessModel, id: &NodeId) -> EngineResult<&'a NodeData> {
    m.graph
        .get_node(id)
        .ok_or_else(|| EngineError::NodeDoesNotExist(id.clone()))
}

/// The data of node `id`. Panics if `id` is absent — for call sites that
/// know the id exists (e.g. a target id just returned by `expand`).
pub fn data_unchecked<'a>(m: &'a ProcessModel, id: &NodeId) -> &'a NodeData {
    data(m, id).expect("node id is known to exist")
}
