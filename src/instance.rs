//! A running execution of a [`ProcessModel`]: event log plus current step
//! set, advanced one event at a time.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::event::{Event, RecordEvent};
use crate::id::{IdGenerator, NodeId};
use crate::model::ProcessModel;
use crate::node::{Activity, NodeData};
use crate::observability::EngineTracer;
use crate::step::ProcessStep;
use crate::stepping::advance_to_fixed_point;

/// A running process instance.
///
/// Construction expands the Start node and runs a synthetic bootstrap pass
/// so that any boundary conditions satisfiable without an event (the
/// `true` edges combinators insert) resolve immediately — see
/// [`ProcessInstance::new`].
#[derive(Debug, Clone)]
pub struct ProcessInstance {
    id: NodeId,
    model: Arc<ProcessModel>,
    current_steps: Vec<ProcessStep>,
    events: Vec<Arc<dyn Event>>,
    path_cutoff_multiplier: usize,
}

/// The synthetic event used only to resolve `true`-conditioned edges at
/// construction time, before any real event has arrived. Never appended to
/// `events`.
fn bootstrap_event() -> RecordEvent {
    RecordEvent::new("__process_engine_bootstrap__")
}

impl ProcessInstance {
    /// Creates an instance at Start, with a fresh id from `id_gen`, using
    /// [`EngineConfig::default`]'s stepping limits.
    pub fn new(model: Arc<ProcessModel>, id_gen: &dyn IdGenerator) -> Self {
        Self::with_config(model, id_gen, &EngineConfig::default())
    }

    /// Creates an instance at Start with a caller-supplied id, using
    /// [`EngineConfig::default`]'s stepping limits.
    pub fn with_id(model: Arc<ProcessModel>, id: NodeId) -> Self {
        Self::with_id_and_config(model, id, &EngineConfig::default())
    }

    /// Creates an instance at Start, with a fresh id from `id_gen`, governed
    /// by `config`'s stepping limits.
    pub fn with_config(model: Arc<ProcessModel>, id_gen: &dyn IdGenerator, config: &EngineConfig) -> Self {
        Self::with_id_and_config(model, id_gen.new_id(), config)
    }

    /// Creates an instance at Start with a caller-supplied id, governed by
    /// `config`'s stepping limits.
    pub fn with_id_and_config(model: Arc<ProcessModel>, id: NodeId, config: &EngineConfig) -> Self {
        let path_cutoff_multiplier = config.stepping.path_cutoff_multiplier;
        let tracer = EngineTracer::default();
        let _span = tracer.start_instance_span(&id).entered();

        let initial = ProcessStep::expand(&model, &NodeId::start());
        let bootstrap = bootstrap_event();
        let current_steps =
            advance_to_fixed_point(&model, initial, &bootstrap, path_cutoff_multiplier, &id);
        Self {
            id,
            model,
            current_steps,
            events: Vec::new(),
            path_cutoff_multiplier,
        }
    }

    /// This instance's id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The model this instance runs against.
    pub fn model(&self) -> &Arc<ProcessModel> {
        &self.model
    }

    /// Appends `event` to the log and advances the step set to a fixed
    /// point.
    pub fn step(&mut self, event: Arc<dyn Event>) {
        let tracer = EngineTracer::default();
        let _span = tracer.start_instance_span(&self.id).entered();

        self.events.push(Arc::clone(&event));
        self.current_steps = advance_to_fixed_point(
            &self.model,
            std::mem::take(&mut self.current_steps),
            event.as_ref(),
            self.path_cutoff_multiplier,
            &self.id,
        );
    }

    /// The instance's append-only event log, in arrival order.
    pub fn events(&self) -> &[Arc<dyn Event>] {
        &self.events
    }

    /// The current, canonically-ordered step set.
    pub fn current_steps(&self) -> &[ProcessStep] {
        &self.current_steps
    }

    /// The node data of every currently active node.
    pub fn currently_active(&self) -> Vec<NodeData> {
        self.current_steps.iter().map(|s| s.node_data.clone()).collect()
    }

    /// The subset of [`ProcessInstance::currently_active`] that are
    /// activities.
    pub fn currently_active_activities(&self) -> Vec<Activity> {
        self.current_steps
            .iter()
            .filter_map(|s| match &s.node_data {
                NodeData::Activity(a) => Some(a.clone()),
                _ => None,
            })
            .collect()
    }

    /// Whether the instance has reached End and only End.
    pub fn is_done(&self) -> bool {
        self.currently_active().iter().all(|d| d.is_end()) && !self.current_steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::is_type;
    use crate::id::CounterIdGenerator;
    use crate::model::{append, make, neutral, with_end_condition, with_start_condition};

    fn activity(name: &str) -> ProcessModel {
        make(
            NodeId::new(name),
            NodeData::Activity(Activity::new(name, "v1", "handler")),
        )
    }

    #[test]
    fn neutral_instance_is_done_immediately() {
        let instance = ProcessInstance::new(Arc::new(neutral()), &CounterIdGenerator::new());
        assert!(instance.is_done());
        assert_eq!(instance.events().len(), 0);
    }

    #[test]
    fn single_activity_completes_on_its_output_event() {
        let m = with_end_condition(&activity("ship"), is_type("Shipped")).unwrap();
        let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());
        assert!(!instance.is_done());
        assert_eq!(instance.currently_active_activities().len(), 1);

        instance.step(Arc::new(RecordEvent::new("Shipped")));
        assert!(instance.is_done());
        assert_eq!(instance.events().len(), 1);
    }

    #[test]
    fn step_appends_events_in_order() {
        let m = with_end_condition(&activity("ship"), is_type("Shipped")).unwrap();
        let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());

        let e1: Arc<dyn Event> = Arc::new(RecordEvent::new("Noise"));
        let e2: Arc<dyn Event> = Arc::new(RecordEvent::new("Shipped"));
        instance.step(Arc::clone(&e1));
        instance.step(Arc::clone(&e2));

        assert_eq!(instance.events().len(), 2);
        assert_eq!(instance.events()[0].event_type(), "Noise");
        assert_eq!(instance.events()[1].event_type(), "Shipped");
    }

    #[test]
    fn sequential_composition_advances_through_both_activities() {
        let p1 = with_end_condition(&activity("1"), is_type("A")).unwrap();
        let p2 = with_end_condition(&activity("2"), is_type("B")).unwrap();
        let m = append(&p1, &p2).unwrap();

        let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());
        assert_eq!(instance.currently_active_activities()[0].id, "1");

        instance.step(Arc::new(RecordEvent::new("B")));
        assert_eq!(instance.currently_active_activities()[0].id, "1");

        instance.step(Arc::new(RecordEvent::new("A")));
        assert_eq!(instance.currently_active_activities()[0].id, "2");

        instance.step(Arc::new(RecordEvent::new("B")));
        assert!(instance.is_done());
    }

    #[test]
    fn with_start_condition_gates_the_first_activity() {
        let m = with_start_condition(&activity("1"), is_type("Go")).unwrap();
        let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());
        assert_eq!(instance.currently_active_activities().len(), 0);

        instance.step(Arc::new(RecordEvent::new("Elsewhere")));
        assert_eq!(instance.currently_active_activities().len(), 0);

        instance.step(Arc::new(RecordEvent::new("Go")));
        assert_eq!(instance.currently_active_activities()[0].id, "1");
    }
}
