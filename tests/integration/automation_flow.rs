//! Rule matching and execution behavior through the public engine API.

use devtrack_core::{
    ActionConfig, ExecutionStatus, LifecycleEvent, ProjectId, RelationKind, RuleScope, RuleUpdate,
    TaskId, TaskStatus, TriggerConfig,
};

use crate::fixtures::EngineHarness;

#[test]
fn test_matched_rule_executes_exactly_once_per_dispatch() {
    let h = EngineHarness::new();
    let task = h.add_task("ship it", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged {
            from: None,
            to: Some(TaskStatus::Done),
        },
        ActionConfig::AttachLabel {
            label: "completed".to_string(),
        },
        "integration",
    );

    h.change_status(task, TaskStatus::Done);

    let logs = h.engine.recent_logs(10);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].rule_id, rule.id);
    assert_eq!(logs[0].status, ExecutionStatus::Success);
    assert_eq!(h.engine.get_rule(rule.id).unwrap().execution_count, 1);
}

#[test]
fn test_rules_run_in_creation_order() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);

    let first = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged { from: None, to: None },
        ActionConfig::AttachLabel {
            label: "first".to_string(),
        },
        "integration",
    );
    let second = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged { from: None, to: None },
        ActionConfig::AttachLabel {
            label: "second".to_string(),
        },
        "integration",
    );

    h.change_status(task, TaskStatus::Done);

    // recent() is newest-first, so creation order means `first` is at the back.
    let logs = h.engine.recent_logs(10);
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].rule_id, first.id);
    assert_eq!(logs[0].rule_id, second.id);
    assert_eq!(
        h.host.task(task).unwrap().labels,
        vec!["first".to_string(), "second".to_string()]
    );
}

#[test]
fn test_name_pattern_filters_task_created() {
    let h = EngineHarness::new();
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::TaskCreated {
            name_matches: Some("^bug:".to_string()),
        },
        ActionConfig::AttachLabel {
            label: "triage".to_string(),
        },
        "integration",
    );

    let bug = h.add_task("bug: login broken", TaskStatus::Pending);
    let feature = h.add_task("feature: dark mode", TaskStatus::Pending);
    for (task, name) in [(bug, "bug: login broken"), (feature, "feature: dark mode")] {
        h.engine.dispatch(LifecycleEvent::TaskCreated {
            task,
            project: None,
            name: name.to_string(),
        });
    }

    assert_eq!(h.engine.stats_for(rule.id).success, 1);
    assert_eq!(h.host.task(bug).unwrap().labels, vec!["triage".to_string()]);
    assert!(h.host.task(feature).unwrap().labels.is_empty());
}

#[test]
fn test_project_scope_limits_matching() {
    let h = EngineHarness::new();
    let mine = ProjectId::new();
    let theirs = ProjectId::new();
    let my_task = h.add_project_task("mine", mine);
    let their_task = h.add_project_task("theirs", theirs);

    let rule = h.engine.create_rule(
        RuleScope::Project { id: mine },
        TriggerConfig::StatusChanged { from: None, to: None },
        ActionConfig::AttachLabel {
            label: "tracked".to_string(),
        },
        "integration",
    );

    h.change_status(their_task, TaskStatus::Done);
    assert_eq!(h.engine.stats_for(rule.id).total(), 0);

    h.change_status(my_task, TaskStatus::Done);
    assert_eq!(h.engine.stats_for(rule.id).success, 1);
}

#[test]
fn test_toggled_off_rule_resumes_after_toggle_on() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged { from: None, to: None },
        ActionConfig::Notify {
            recipients: vec!["team".to_string()],
            message: "status moved".to_string(),
        },
        "integration",
    );

    assert!(!h.engine.toggle_active(rule.id).unwrap());
    h.change_status(task, TaskStatus::InReview);
    assert!(h.engine.recent_logs(10).is_empty());

    assert!(h.engine.toggle_active(rule.id).unwrap());
    h.change_status(task, TaskStatus::Done);
    assert_eq!(h.engine.stats_for(rule.id).success, 1);
}

#[test]
fn test_update_rule_changes_future_matches_only() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged {
            from: None,
            to: Some(TaskStatus::Done),
        },
        ActionConfig::AttachLabel {
            label: "old-label".to_string(),
        },
        "integration",
    );

    h.change_status(task, TaskStatus::Done);

    h.engine
        .update_rule(
            rule.id,
            RuleUpdate {
                action: Some(ActionConfig::AttachLabel {
                    label: "new-label".to_string(),
                }),
                ..Default::default()
            },
        )
        .unwrap();

    h.change_status(task, TaskStatus::Active);
    h.change_status(task, TaskStatus::Done);

    assert_eq!(
        h.host.task(task).unwrap().labels,
        vec!["old-label".to_string(), "new-label".to_string()]
    );
    // The first entry's snapshot still shows the config it ran with.
    let logs = h.engine.recent_logs(10);
    let oldest = logs.last().unwrap();
    assert!(oldest.action_snapshot.to_string().contains("old-label"));
}

#[test]
fn test_failing_rule_does_not_stop_the_rest() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);

    // Matches, but its regex is invalid at evaluation time.
    let broken = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::TaskCreated {
            name_matches: Some("(unclosed".to_string()),
        },
        ActionConfig::AttachLabel {
            label: "never".to_string(),
        },
        "integration",
    );
    let healthy = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::TaskCreated { name_matches: None },
        ActionConfig::AttachLabel {
            label: "landed".to_string(),
        },
        "integration",
    );

    h.engine.dispatch(LifecycleEvent::TaskCreated {
        task,
        project: None,
        name: "t".to_string(),
    });

    assert_eq!(h.engine.stats_for(broken.id).skipped, 1);
    assert_eq!(h.engine.stats_for(healthy.id).success, 1);
    assert_eq!(h.host.task(task).unwrap().labels, vec!["landed".to_string()]);
}

#[test]
fn test_dependency_added_trigger_can_filter_by_kind() {
    let h = EngineHarness::new();
    let a = h.add_task("a", TaskStatus::Active);
    let b = h.add_task("b", TaskStatus::Active);

    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::DependencyAdded {
            kind: Some(RelationKind::Blocks),
        },
        ActionConfig::Notify {
            recipients: vec!["lead".to_string()],
            message: "new blocker".to_string(),
        },
        "integration",
    );

    h.engine.add_dependency(a, b, RelationKind::RelatedTo).unwrap();
    assert_eq!(h.engine.stats_for(rule.id).total(), 0);

    h.engine.add_dependency(a, b, RelationKind::Blocks).unwrap();
    assert_eq!(h.engine.stats_for(rule.id).success, 1);
    assert_eq!(h.host.deliveries().len(), 1);
}

#[test]
fn test_identical_events_log_identical_independent_entries() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged {
            from: Some(TaskStatus::Active),
            to: Some(TaskStatus::Done),
        },
        ActionConfig::Notify {
            recipients: vec!["team".to_string()],
            message: "done again".to_string(),
        },
        "integration",
    );

    let event = LifecycleEvent::TaskStatusChanged {
        task,
        project: None,
        from: TaskStatus::Active,
        to: TaskStatus::Done,
    };
    h.engine.dispatch(event.clone());
    h.engine.dispatch(event);

    let logs = h.engine.recent_logs(10);
    assert_eq!(logs.len(), 2);
    assert_ne!(logs[0].id, logs[1].id);
    assert_eq!(logs[0].trigger_snapshot, logs[1].trigger_snapshot);
    assert_eq!(h.engine.stats_for(rule.id).success, 2);
}

#[test]
fn test_stats_survive_rule_deletion() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::StatusChanged { from: None, to: None },
        ActionConfig::Notify {
            recipients: vec!["team".to_string()],
            message: "m".to_string(),
        },
        "integration",
    );
    h.change_status(task, TaskStatus::Done);

    h.engine.delete_rule(rule.id).unwrap();

    assert!(h.engine.get_rule(rule.id).is_none());
    assert_eq!(h.engine.stats_for(rule.id).success, 1);
}

#[test]
fn test_due_date_threshold_trigger_honours_window() {
    let h = EngineHarness::new();
    let task = h.add_task("t", TaskStatus::Active);
    let rule = h.engine.create_rule(
        RuleScope::Global,
        TriggerConfig::DueDateApproaching { within_hours: 24 },
        ActionConfig::Notify {
            recipients: vec!["owner".to_string()],
            message: "due soon".to_string(),
        },
        "integration",
    );

    let due_at = chrono::Utc::now() + chrono::Duration::hours(48);
    h.engine.dispatch(LifecycleEvent::DueDateThresholdCrossed {
        task,
        project: None,
        due_at,
        lead_hours: 48,
    });
    assert_eq!(h.engine.stats_for(rule.id).total(), 0);

    h.engine.dispatch(LifecycleEvent::DueDateThresholdCrossed {
        task,
        project: None,
        due_at,
        lead_hours: 12,
    });
    assert_eq!(h.engine.stats_for(rule.id).success, 1);
}

#[test]
fn test_dispatch_with_no_rules_is_a_quiet_noop() {
    let h = EngineHarness::new();
    h.engine.dispatch(LifecycleEvent::TaskCreated {
        task: TaskId::new(),
        project: None,
        name: "nobody cares".to_string(),
    });
    assert!(h.engine.recent_logs(10).is_empty());
}
