//! Node payload types: what a [`crate::graph::Graph`] node actually holds in
//! a process model.

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// A unit of work a process model steps through.
///
/// The engine does not execute activities; it only tracks which are
/// currently active and which events/outputs are associated with them. The
/// `module` field names the handler a caller-side executor should dispatch
/// to — opaque to the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Identifier, unique within the owning process model.
    pub id: String,
    /// Version tag, free-form and caller-defined.
    pub version: String,
    /// Event types that must occur for this activity to be considered
    /// started, in the sense consumed by the stepping engine's conditions.
    pub required_events: Vec<String>,
    /// Event types this activity is expected to emit once complete.
    pub output_events: Vec<String>,
    /// Opaque handler name a caller-side executor dispatches to.
    pub module: String,
}

impl Activity {
    /// Build an activity with no required/output events declared.
    pub fn new(id: impl Into<String>, version: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            required_events: Vec::new(),
            output_events: Vec::new(),
            module: module.into(),
        }
    }

    /// Builder-style: declare a required event type.
    pub fn requires(mut self, event_type: impl Into<String>) -> Self {
        self.required_events.push(event_type.into());
        self
    }

    /// Builder-style: declare an output event type.
    pub fn outputs(mut self, event_type: impl Into<String>) -> Self {
        self.output_events.push(event_type.into());
        self
    }
}

/// The payload of a process model node.
///
/// `Or`, `And`, and `Join` are introduced only by the parallel combinators
/// ([`crate::model::ProcessModel::one_of`], [`crate::model::ProcessModel::both`])
/// and always come in matched split/join pairs; nothing outside those
/// combinators constructs them directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeData {
    /// The unique entry point of a process model.
    Start,
    /// The unique exit point of a process model.
    End,
    /// A unit of work.
    Activity(Activity),
    /// Exclusive-choice split: exactly one of its two outgoing branches is
    /// taken, decided by [`crate::stepping::or_decided`].
    Or {
        /// The `Join` node that closes this split.
        join_node_id: NodeId,
    },
    /// Parallel split: every outgoing branch is taken.
    And {
        /// The `Join` node that closes this split.
        join_node_id: NodeId,
    },
    /// The join matching an `Or` or `And` split.
    Join {
        /// The split node this join closes.
        for_node_id: NodeId,
    },
}

impl NodeData {
    /// Whether this node is the process model's Start node.
    pub fn is_start(&self) -> bool {
        matches!(self, NodeData::Start)
    }

    /// Whether this node is the process model's End node.
    pub fn is_end(&self) -> bool {
        matches!(self, NodeData::End)
    }

    /// Whether this node is an `Or` or `And` split.
    pub fn is_split(&self) -> bool {
        matches!(self, NodeData::Or { .. } | NodeData::And { .. })
    }

    /// Whether this node is a `Join`.
    pub fn is_join(&self) -> bool {
        matches!(self, NodeData::Join { .. })
    }

    /// The matching split/join id this node references, if any.
    pub fn matching_id(&self) -> Option<&NodeId> {
        match self {
            NodeData::Or { join_node_id } | NodeData::And { join_node_id } => Some(join_node_id),
            NodeData::Join { for_node_id } => Some(for_node_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_builder_accumulates_events() {
        let a = Activity::new("ship", "v1", "shipping::handler")
            .requires("OrderPlaced")
            .outputs("OrderShipped");
        assert_eq!(a.required_events, vec!["OrderPlaced".to_string()]);
        assert_eq!(a.output_events, vec!["OrderShipped".to_string()]);
    }

    #[test]
    fn node_data_predicates() {
        assert!(NodeData::Start.is_start());
        assert!(NodeData::End.is_end());
        let or = NodeData::Or {
            join_node_id: NodeId::new("join-1"),
        };
        assert!(or.is_split());
        assert_eq!(or.matching_id(), Some(&NodeId::new("join-1")));

        let join = NodeData::Join {
            for_node_id: NodeId::new("or-1"),
        };
        assert!(join.is_join());
        assert_eq!(join.matching_id(), Some(&NodeId::new("or-1")));
    }
}
