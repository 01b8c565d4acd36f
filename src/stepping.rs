//! The fixed-point stepping engine: advances a step set by one event at a
//! time, applying OR exclusive-choice and AND/JOIN synchronization rules on
//! top of each step's own generic evaluation.

use std::collections::HashMap;

use crate::event::Event;
use crate::id::NodeId;
use crate::model::{data, ProcessModel};
use crate::node::NodeData;
use crate::observability::EngineTracer;
use crate::step::{ProcessStep, StepOutcome};

enum FoldResult {
    Keep(ProcessStep),
    Advance(NodeId),
    Drop,
}

fn generic_step(step: &ProcessStep, last_event: &dyn Event) -> FoldResult {
    match step.step(last_event) {
        StepOutcome::Transition(Some(next)) => FoldResult::Advance(next),
        StepOutcome::Transition(None) => FoldResult::Drop,
        StepOutcome::NoTransition(s) => FoldResult::Keep(s),
    }
}

/// Whether `for_node_id` names an `And` split.
fn is_and_split(model: &ProcessModel, for_node_id: &NodeId) -> bool {
    matches!(data(model, for_node_id), Ok(NodeData::And { .. }))
}

/// Whether every node lying on a path from `for_node_id` to `join_id`
/// (exclusive of `join_id` itself) has finished — i.e. none of them still
/// appears as the origin of a pending step.
pub fn and_done(
    model: &ProcessModel,
    steps: &[ProcessStep],
    for_node_id: &NodeId,
    join_id: &NodeId,
    path_cutoff_multiplier: usize,
) -> bool {
    let paths = match model.graph().paths(for_node_id, join_id, path_cutoff_multiplier) {
        Ok(p) => p,
        Err(_) => return true,
    };

    let mut pending_nodes = std::collections::BTreeSet::new();
    for path in paths {
        for id in path {
            if &id != join_id {
                pending_nodes.insert(id);
            }
        }
    }

    !steps.iter().any(|s| pending_nodes.contains(&s.node_id))
}

/// Whether `step` (whose node is an `Or` split) should be dropped to
/// enforce exclusive-choice semantics.
///
/// `occurrence` is this step's 1-based visit order among `previous_steps`'
/// steps sharing its `node_id`, and `siblings_in_current_so_far` is how
/// many such steps have already been pushed into the new step set by the
/// time this one is considered — both supplied by the fold in
/// [`advance_once`] so this function stays a pure predicate.
fn or_decided(
    step: &ProcessStep,
    occurrence: usize,
    siblings_in_current_so_far: usize,
    previous_steps: &[ProcessStep],
) -> bool {
    let siblings_in_previous = previous_steps
        .iter()
        .filter(|s| s.node_id == step.node_id)
        .count();

    let only_left = siblings_in_previous == 1;
    let second_and_only_in_current = occurrence == 2 && siblings_in_current_so_far == 0;

    only_left || second_and_only_in_current
}

/// One iteration of the fixed-point loop: folds over `previous_steps`,
/// producing the next step set.
pub fn advance_once(
    model: &ProcessModel,
    previous_steps: &[ProcessStep],
    last_event: &dyn Event,
    path_cutoff_multiplier: usize,
) -> Vec<ProcessStep> {
    let mut current: Vec<ProcessStep> = Vec::new();
    let mut or_visits: HashMap<NodeId, usize> = HashMap::new();

    for step in previous_steps {
        let result = match &step.node_data {
            NodeData::Or { .. } => {
                let occurrence = {
                    let counter = or_visits.entry(step.node_id.clone()).or_insert(0);
                    *counter += 1;
                    *counter
                };

                let siblings_in_current_so_far = current
                    .iter()
                    .filter(|s| s.node_id == step.node_id)
                    .count();

                if or_decided(step, occurrence, siblings_in_current_so_far, previous_steps) {
                    FoldResult::Drop
                } else {
                    generic_step(step, last_event)
                }
            }
            NodeData::Join { for_node_id } => {
                if is_and_split(model, for_node_id)
                    && !and_done(model, previous_steps, for_node_id, &step.node_id, path_cutoff_multiplier)
                {
                    FoldResult::Keep(step.clone())
                } else {
                    generic_step(step, last_event)
                }
            }
            _ => generic_step(step, last_event),
        };

        match result {
            FoldResult::Keep(s) => current.push(s),
            FoldResult::Advance(next) => current.extend(ProcessStep::expand(model, &next)),
            FoldResult::Drop => {}
        }
    }

    canonicalize(current)
}

/// Deterministic sort + dedup, since `Condition` doesn't derive `Ord`.
fn canonicalize(mut steps: Vec<ProcessStep>) -> Vec<ProcessStep> {
    steps.sort_by(|a, b| a.structural_key().cmp(&b.structural_key()));
    steps.dedup_by(|a, b| a.structural_key() == b.structural_key());
    steps
}

/// Runs [`advance_once`] to a fixed point (structural equality with the
/// prior state), starting from `steps`. Each iteration runs inside its own
/// [`EngineTracer::start_stepping_span`].
pub fn advance_to_fixed_point(
    model: &ProcessModel,
    mut steps: Vec<ProcessStep>,
    last_event: &dyn Event,
    path_cutoff_multiplier: usize,
    instance_id: &NodeId,
) -> Vec<ProcessStep> {
    let tracer = EngineTracer::default();
    let mut iteration = 0;
    loop {
        let _span = tracer.start_stepping_span(instance_id, iteration).entered();
        let next = advance_once(model, &steps, last_event, path_cutoff_multiplier);
        if next == steps {
            return steps;
        }
        steps = next;
        iteration += 1;
    }
}
