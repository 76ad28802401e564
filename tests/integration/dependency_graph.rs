//! Dependency graph behavior through the public engine API.

use devtrack_core::{Error, RelationKind, TaskStatus};

use crate::fixtures::EngineHarness;

#[test]
fn test_edges_are_queryable_from_both_endpoints() {
    let h = EngineHarness::new();
    let design = h.add_task("design", TaskStatus::Active);
    let build = h.add_task("build", TaskStatus::Pending);

    let edge = h
        .engine
        .add_dependency(build, design, RelationKind::Blocks)
        .unwrap();

    let outgoing = h.engine.list_outgoing(build);
    let incoming = h.engine.list_incoming(design);
    assert_eq!(outgoing, vec![edge.clone()]);
    assert_eq!(incoming, vec![edge]);
    assert!(h.engine.list_outgoing(design).is_empty());
    assert!(h.engine.list_incoming(build).is_empty());
}

#[test]
fn test_blocking_cycle_is_rejected_across_a_chain() {
    let h = EngineHarness::new();
    let a = h.add_task("a", TaskStatus::Active);
    let b = h.add_task("b", TaskStatus::Active);
    let c = h.add_task("c", TaskStatus::Active);

    h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    h.engine.add_dependency(b, c, RelationKind::Requires).unwrap();

    // c -> a would close the loop a -> b -> c -> a.
    let err = h.engine.add_dependency(c, a, RelationKind::Blocks).unwrap_err();
    assert!(matches!(err, Error::CircularDependency { .. }));

    // The rejected edge left no trace.
    assert!(h.engine.list_outgoing(c).is_empty());
}

#[test]
fn test_informational_edges_never_form_blocking_cycles() {
    let h = EngineHarness::new();
    let a = h.add_task("a", TaskStatus::Active);
    let b = h.add_task("b", TaskStatus::Active);

    h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    // The reverse direction is fine when the edge carries no blocking weight.
    h.engine
        .add_dependency(b, a, RelationKind::RelatedTo)
        .unwrap();

    assert_eq!(h.engine.list_outgoing(b).len(), 1);
    assert!(h.engine.is_blocked(a).unwrap());
    assert!(!h.engine.is_blocked(b).unwrap());
}

#[test]
fn test_blocked_status_is_derived_not_stored() {
    let h = EngineHarness::new();
    let blocker = h.add_task("blocker", TaskStatus::Active);
    let dependent = h.add_task("dependent", TaskStatus::Pending);
    h.engine
        .add_dependency(dependent, blocker, RelationKind::Requires)
        .unwrap();

    assert!(h.engine.is_blocked(dependent).unwrap());
    // The stored status is whatever the host put there.
    assert_eq!(h.host.task(dependent).unwrap().status, TaskStatus::Pending);

    h.change_status(blocker, TaskStatus::Done);
    assert!(!h.engine.is_blocked(dependent).unwrap());
    assert_eq!(h.host.task(dependent).unwrap().status, TaskStatus::Pending);
}

#[test]
fn test_blocking_queries_report_transitive_neighbours_only_directly() {
    let h = EngineHarness::new();
    let a = h.add_task("a", TaskStatus::Active);
    let b = h.add_task("b", TaskStatus::Active);
    let c = h.add_task("c", TaskStatus::Active);
    h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    h.engine.add_dependency(b, c, RelationKind::Blocks).unwrap();

    assert_eq!(h.engine.blocking_tasks_of(a), vec![b]);
    assert_eq!(h.engine.blocked_tasks_of(c), vec![b]);
    // a waits on b, not directly on c.
    assert!(!h.engine.blocking_tasks_of(a).contains(&c));
}

#[test]
fn test_removing_task_edges_unblocks_dependents() {
    let h = EngineHarness::new();
    let blocker = h.add_task("blocker", TaskStatus::Active);
    let dependent = h.add_task("dependent", TaskStatus::Pending);
    h.engine
        .add_dependency(dependent, blocker, RelationKind::Blocks)
        .unwrap();
    assert!(h.engine.is_blocked(dependent).unwrap());

    let removed = h.engine.remove_task_edges(blocker);

    assert_eq!(removed.len(), 1);
    assert!(!h.engine.is_blocked(dependent).unwrap());
    assert!(h.engine.list_outgoing(dependent).is_empty());
}

#[test]
fn test_remove_unknown_edge_is_an_error() {
    let h = EngineHarness::new();
    let err = h
        .engine
        .remove_dependency(devtrack_core::EdgeId::new())
        .unwrap_err();
    assert!(matches!(err, Error::EdgeNotFound { .. }));
}

#[test]
fn test_duplicate_edges_are_allowed_and_independent() {
    let h = EngineHarness::new();
    let a = h.add_task("a", TaskStatus::Active);
    let b = h.add_task("b", TaskStatus::Active);

    let first = h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    let second = h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    assert_ne!(first.id, second.id);

    h.engine.remove_dependency(first.id).unwrap();
    // The surviving duplicate still blocks.
    assert!(h.engine.is_blocked(a).unwrap());
}
