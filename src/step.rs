//! A process step: one pending outgoing transition from a currently active
//! node, plus its residual condition.

use crate::condition::{c_false, eval, Condition, Eval};
use crate::event::Event;
use crate::id::NodeId;
use crate::model::{self, ProcessModel};
use crate::node::NodeData;

/// A pending outgoing transition.
///
/// `node_id`/`node_data` describe the node this transition originates
/// from — the node currently considered "active" by virtue of this step
/// existing. `condition` is the immutable original guard; `rest_condition`
/// is what remains to be satisfied after partial evaluation against prior
/// events.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStep {
    /// The edge's original condition, as built by the combinators.
    pub condition: Condition,
    /// The residual obligation, updated by [`ProcessStep::step`].
    pub rest_condition: Condition,
    /// The edge's target node, or `None` for the terminal step at End.
    pub target: Option<NodeId>,
    /// The node this transition originates from.
    pub node_id: NodeId,
    /// That node's data, cached so callers don't need a model lookup.
    pub node_data: NodeData,
}

/// The result of evaluating a [`ProcessStep`] against one event.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The step's condition was satisfied; the instance moves to `target`.
    Transition(Option<NodeId>),
    /// The step persists, possibly with a reduced residual condition.
    NoTransition(ProcessStep),
}

impl ProcessStep {
    /// The pending transitions leaving `node_id`.
    ///
    /// `End` produces exactly one terminal step whose condition is
    /// `Value(false)` and therefore never fires. Every other node produces
    /// one step per outgoing edge.
    pub fn expand(model: &ProcessModel, node_id: &NodeId) -> Vec<ProcessStep> {
        let data = model::data_unchecked(model, node_id).clone();

        if data.is_end() {
            return vec![ProcessStep {
                condition: c_false(),
                rest_condition: c_false(),
                target: None,
                node_id: node_id.clone(),
                node_data: data,
            }];
        }

        model::conditions_with_targets(model, node_id)
            .into_iter()
            .map(|(cond, target)| ProcessStep {
                condition: cond.clone(),
                rest_condition: cond,
                target: Some(target),
                node_id: node_id.clone(),
                node_data: data.clone(),
            })
            .collect()
    }

    /// Evaluates this step's residual condition against `last_event`.
    pub fn step(&self, last_event: &dyn Event) -> StepOutcome {
        match eval(&self.rest_condition, last_event) {
            Eval::Done => StepOutcome::Transition(self.target.clone()),
            Eval::Rest(rest) => {
                let mut next = self.clone();
                next.rest_condition = rest;
                StepOutcome::NoTransition(next)
            }
        }
    }

    /// A structural sort/dedup key.
    ///
    /// `Condition` carries a `serde_json::Value` payload, which implements
    /// `PartialEq` but not `Eq`/`Ord`; this renders a canonical string
    /// instead of deriving those traits on `Condition` itself.
    pub fn structural_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.node_id,
            self.target.as_ref().map(NodeId::as_str).unwrap_or(""),
            serde_json::to_string(&self.rest_condition).unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{c_true, is_type};
    use crate::event::RecordEvent;
    use crate::model::{data, make, neutral};
    use crate::node::Activity;

    #[test]
    fn expand_end_produces_unfirable_terminal_step() {
        let m = neutral();
        let steps = ProcessStep::expand(&m, &NodeId::end());
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].target, None);
        assert!(matches!(steps[0].node_data, NodeData::End));

        let e = RecordEvent::new("Anything");
        assert_eq!(steps[0].step(&e), StepOutcome::NoTransition(steps[0].clone()));
    }

    #[test]
    fn expand_activity_produces_one_step_per_outgoing_edge() {
        let m = make(
            NodeId::new("a"),
            NodeData::Activity(Activity::new("a", "v1", "handler")),
        );
        let steps = ProcessStep::expand(&m, &NodeId::start());
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].target, Some(NodeId::new("a")));
        assert_eq!(steps[0].condition, c_true());
    }

    #[test]
    fn step_transitions_when_done() {
        let m = make(
            NodeId::new("a"),
            NodeData::Activity(Activity::new("a", "v1", "handler")),
        );
        let step = ProcessStep {
            condition: is_type("Go"),
            rest_condition: is_type("Go"),
            target: Some(NodeId::new("a")),
            node_id: NodeId::start(),
            node_data: data(&m, &NodeId::start()).unwrap().clone(),
        };
        let e = RecordEvent::new("Go");
        assert_eq!(step.step(&e), StepOutcome::Transition(Some(NodeId::new("a"))));

        let other = RecordEvent::new("Stop");
        assert_eq!(step.step(&other), StepOutcome::NoTransition(step.clone()));
    }
}
