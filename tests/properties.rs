//! Property-based tests over the combinator algebra.

use proptest::prelude::*;

use process_engine::{
    append, both, data, is_type, neutral, one_of, CounterIdGenerator, NodeData, NodeId,
};

fn activity(id: &str) -> process_engine::ProcessModel {
    process_engine::make(
        NodeId::new(id),
        NodeData::Activity(process_engine::Activity::new(id, "v1", "handler")),
    )
}

fn has_unique_start_and_end(m: &process_engine::ProcessModel) -> bool {
    m.graph().has_node(&NodeId::start()) && m.graph().has_node(&NodeId::end())
}

fn splits_have_matching_joins(m: &process_engine::ProcessModel) -> bool {
    m.graph().nodes().all(|(id, d)| match d {
        NodeData::Or { join_node_id } | NodeData::And { join_node_id } => {
            matches!(data(m, join_node_id), Ok(NodeData::Join { for_node_id }) if for_node_id == id)
        }
        NodeData::Join { for_node_id } => {
            matches!(data(m, for_node_id), Ok(NodeData::Or { .. }) | Ok(NodeData::And { .. }))
        }
        _ => true,
    })
}

fn distinct_ids(max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z]{3,8}", 1..=max).prop_map(|mut ids| {
        ids.dedup();
        ids
    })
}

proptest! {
    #[test]
    fn append_neutral_is_identity_for_any_activity(id in "[a-z]{3,8}") {
        let m = activity(&id);
        prop_assert_eq!(append(&neutral(), &m).unwrap(), m.clone());
        prop_assert_eq!(append(&m, &neutral()).unwrap(), m);
    }

    #[test]
    fn append_is_associative_for_any_three_distinct_activities(ids in distinct_ids(3)) {
        prop_assume!(ids.len() == 3);
        let m1 = activity(&ids[0]);
        let m2 = activity(&ids[1]);
        let m3 = activity(&ids[2]);

        let left = append(&append(&m1, &m2).unwrap(), &m3).unwrap();
        let right = append(&m1, &append(&m2, &m3).unwrap()).unwrap();
        prop_assert_eq!(left, right);
    }

    #[test]
    fn append_rejects_shared_non_sentinel_ids(id in "[a-z]{3,8}") {
        let m1 = activity(&id);
        let m2 = activity(&id);
        prop_assert!(append(&m1, &m2).is_err());
    }

    #[test]
    fn sequential_chains_keep_one_start_one_end_and_matched_joins(ids in distinct_ids(5)) {
        prop_assume!(!ids.is_empty());
        let mut model = activity(&ids[0]);
        for id in &ids[1..] {
            model = append(&model, &activity(id)).unwrap();
        }
        prop_assert!(has_unique_start_and_end(&model));
        prop_assert!(splits_have_matching_joins(&model));
    }

    #[test]
    fn one_of_and_both_preserve_invariants(ids in distinct_ids(4)) {
        prop_assume!(ids.len() >= 2);
        let id_gen = CounterIdGenerator::new();
        let m1 = activity(&ids[0]);
        let m2 = activity(&ids[1]);

        let or_model = one_of(&m1, &m2, &id_gen).unwrap();
        prop_assert!(has_unique_start_and_end(&or_model));
        prop_assert!(splits_have_matching_joins(&or_model));

        let m3 = activity(&format!("{}x", ids[0]));
        let m4 = activity(&format!("{}x", ids[1]));
        let and_model = both(&m3, &m4, &id_gen).unwrap();
        prop_assert!(has_unique_start_and_end(&and_model));
        prop_assert!(splits_have_matching_joins(&and_model));
    }

    #[test]
    fn end_to_end_drives_instance_to_done(id in "[a-z]{3,8}") {
        use std::sync::Arc;
        use process_engine::{with_end_condition, ProcessInstance, RecordEvent};

        let m = with_end_condition(&activity(&id), is_type("Done")).unwrap();
        let mut instance = ProcessInstance::new(Arc::new(m), &CounterIdGenerator::new());
        instance.step(Arc::new(RecordEvent::new("Done")));
        prop_assert!(instance.is_done());
    }
}
