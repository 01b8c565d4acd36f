//! Exercises the engine's `tracing` spans under a real, installed
//! subscriber — the way a binary embedding this crate would set one up.

use std::sync::Arc;

use process_engine::{
    append, is_type, make, with_end_condition, Activity, CounterIdGenerator, NodeData, NodeId,
    ProcessInstance, RecordEvent,
};

fn activity(id: &str) -> process_engine::ProcessModel {
    make(NodeId::new(id), NodeData::Activity(Activity::new(id, "v1", "handler")))
}

#[test]
fn construction_and_stepping_spans_run_under_an_installed_subscriber() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let p1 = with_end_condition(&activity("1"), is_type("EventA")).unwrap();
    let p2 = with_end_condition(&activity("2"), is_type("EventB")).unwrap();
    let m = append(&p1, &p2).unwrap();

    let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());
    instance.step(Arc::new(RecordEvent::new("EventA")));
    instance.step(Arc::new(RecordEvent::new("EventB")));
    assert!(instance.is_done());
}
