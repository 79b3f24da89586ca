//! Unit tests for huum-tree.

use huum_core::{HuError, NodeId};

use crate::{FunctionKind, NodeKind, Target, Tree};

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Fixture {
    tree:    Tree<()>,
    root:    NodeId,
    holding: NodeId,
    cu:      NodeId,
    kitchen: NodeId,
    sink:    NodeId,
    bob:     NodeId,
    tank:    NodeId,
    morning: NodeId,
    wake_up: NodeId,
}

/// root → h1 → flat → { kitchen → sink (+ tank storage), bob → morning → wake_up }
fn fixture() -> Fixture {
    let mut tree = Tree::new();
    let root = tree.add_root(NodeKind::Model, "Root", ()).unwrap();
    let holding = tree.add_child(root, NodeKind::Holding, "h1", ()).unwrap();
    let cu = tree.add_child(holding, NodeKind::ConsumerUnit, "flat", ()).unwrap();
    let kitchen = tree.add_child(cu, NodeKind::Room, "Kitchen", ()).unwrap();
    let sink = tree.add_child(kitchen, NodeKind::Appliance, "sink", ()).unwrap();
    let tank = tree.add_child(sink, NodeKind::Storage, "tank", ()).unwrap();
    let bob = tree.add_child(cu, NodeKind::Agent, "bob", ()).unwrap();
    let morning = tree.add_child(bob, NodeKind::LifecycleHabit, "morning", ()).unwrap();
    let wake_up = tree.add_child(morning, NodeKind::Event, "wake_up", ()).unwrap();
    Fixture { tree, root, holding, cu, kitchen, sink, bob, tank, morning, wake_up }
}

#[cfg(test)]
mod registration {
    use super::*;

    #[test]
    fn ids_and_paths() {
        let f = fixture();
        let sink = f.tree.node(f.sink).unwrap();
        assert_eq!(sink.local_id, "$appliance_sink");
        assert_eq!(
            sink.full_path,
            "$model_root.$holding_h1.$cu_flat.$room_kitchen.$appliance_sink"
        );
        assert_eq!(sink.depth, 4);
        assert_eq!(sink.parent, Some(f.kitchen));

        let root = f.tree.node(f.root).unwrap();
        assert_eq!(root.full_path, root.local_id);
        assert!(root.is_root());
        assert_eq!(root.depth, 0);
    }

    #[test]
    fn names_are_lowercased() {
        let f = fixture();
        assert_eq!(f.tree.node(f.kitchen).unwrap().name, "kitchen");
    }

    #[test]
    fn duplicate_child_rejected() {
        let mut f = fixture();
        let err = f.tree.add_child(f.cu, NodeKind::Agent, "BOB", ()).unwrap_err();
        assert!(matches!(err, HuError::ScenarioDefect(_)));
    }

    #[test]
    fn kind_must_fit_parent() {
        let mut f = fixture();
        assert!(f.tree.add_child(f.holding, NodeKind::Room, "attic", ()).is_err());
        assert!(f.tree.add_child(f.tank, NodeKind::Event, "spill", ()).is_err());
    }

    #[test]
    fn dotted_names_rejected() {
        let mut f = fixture();
        assert!(f.tree.add_child(f.cu, NodeKind::Agent, "a.b", ()).is_err());
        assert!(f.tree.add_child(f.cu, NodeKind::Agent, "  ", ()).is_err());
    }

    #[test]
    fn single_root() {
        let mut f = fixture();
        assert!(f.tree.add_root(NodeKind::Model, "other", ()).is_err());
    }

    #[test]
    fn children_of_kind_in_order() {
        let mut f = fixture();
        let alice = f.tree.add_child(f.cu, NodeKind::Agent, "alice", ()).unwrap();
        let agents: Vec<_> = f.tree.children_of_kind(f.cu, NodeKind::Agent).collect();
        assert_eq!(agents, vec![f.bob, alice]);
    }
}

#[cfg(test)]
mod resolution {
    use super::*;

    fn all_nodes(f: &Fixture) -> Vec<NodeId> {
        f.tree.iter().map(|n| n.id).collect()
    }

    #[test]
    fn full_path_resolves_from_everywhere() {
        let f = fixture();
        for target in all_nodes(&f) {
            let path = f.tree.node(target).unwrap().full_path.clone();
            for origin in all_nodes(&f) {
                let got = f.tree.resolve(origin, &path).unwrap();
                assert_eq!(got, vec![Target::Node(target)], "{path} from {origin}");
            }
        }
    }

    #[test]
    fn missing_path_from_root_fails() {
        let f = fixture();
        let err = f.tree.resolve(f.root, "$model_root.$holding_h9").unwrap_err();
        assert!(matches!(err, HuError::Resolution { .. }));
        let err = f.tree.resolve(f.root, "$nothing_here").unwrap_err();
        assert!(matches!(err, HuError::Resolution { .. }));
    }

    #[test]
    fn empty_and_self() {
        let f = fixture();
        assert_eq!(f.tree.resolve(f.bob, "").unwrap(), vec![Target::Node(f.bob)]);
        assert_eq!(f.tree.resolve(f.bob, "$self").unwrap(), vec![Target::Node(f.bob)]);
        assert_eq!(f.tree.resolve(f.bob, "$agent").unwrap(), vec![Target::Node(f.bob)]);
    }

    #[test]
    fn upward_search_finds_sibling_subtree() {
        let f = fixture();
        let got = f.tree.resolve(f.bob, "$room_kitchen.$appliance_sink").unwrap();
        assert_eq!(got, vec![Target::Node(f.sink)]);
        // case-insensitive
        let got = f.tree.resolve(f.wake_up, "$ROOM_Kitchen.$appliance_SINK").unwrap();
        assert_eq!(got, vec![Target::Node(f.sink)]);
    }

    #[test]
    fn local_id_then_children() {
        let f = fixture();
        let got = f.tree.resolve(f.sink, "$agent_bob.$lifestylehabit_morning.$event_wake_up").unwrap();
        assert_eq!(got, vec![Target::Node(f.wake_up)]);
        let got = f.tree.resolve(f.bob, "$lifestylehabit_morning").unwrap();
        assert_eq!(got, vec![Target::Node(f.morning)]);
    }

    #[test]
    fn missing_child_after_descent_is_fatal() {
        let f = fixture();
        assert!(f.tree.resolve(f.bob, "$room_kitchen.$appliance_oven").is_err());
        assert!(f.tree.resolve(f.bob, "$room_bathroom").is_err());
    }

    #[test]
    fn functions() {
        let f = fixture();
        let got = f
            .tree
            .resolve_function(f.bob, "$room_kitchen.$appliance_sink.$storage_tank.$get_value_function")
            .unwrap();
        assert_eq!(got, Target::Function { owner: f.tank, function: FunctionKind::ValueFunction });

        let got = f.tree.resolve_one(f.wake_up, "$room_kitchen.$appliance_sink.$replace_user").unwrap();
        assert_eq!(got, Target::Function { owner: f.sink, function: FunctionKind::Occupant });

        let got = f.tree.resolve_one(f.sink, "$cu_flat.$replace_all_agents").unwrap();
        assert_eq!(got, Target::Function { owner: f.cu, function: FunctionKind::AllAgents });

        // from inside the unit the keyword is found by climbing
        let got = f.tree.resolve_one(f.bob, "$replace_all_agents").unwrap();
        assert_eq!(got.node(), f.cu);
    }

    #[test]
    fn function_must_be_last() {
        let f = fixture();
        assert!(f.tree.resolve(f.sink, "$storage_tank.$get_value_function.$self").is_err());
    }

    #[test]
    fn node_is_not_a_function() {
        let f = fixture();
        assert!(f.tree.resolve_function(f.sink, "$storage_tank").is_err());
    }

    #[test]
    fn error_names_path_and_origin() {
        let f = fixture();
        match f.tree.resolve(f.bob, "$room_attic").unwrap_err() {
            HuError::Resolution { path, origin, .. } => {
                assert_eq!(path, "$room_attic");
                assert_eq!(origin, "$model_root.$holding_h1.$cu_flat.$agent_bob");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
