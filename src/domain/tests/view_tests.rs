//! Tests for WorkflowView projection.

use super::*;
use crate::domain::types::{ArtifactType, FeatureName, Objective, Phase, ProjectRoot};
use crate::domain::WorkflowEvent;
use std::path::PathBuf;

fn test_aggregate_id() -> String {
    "550e8400-e29b-41d4-a716-446655440000".to_string()
}

fn workflow_created_event() -> WorkflowEvent {
    WorkflowEvent::WorkflowCreated {
        feature_name: FeatureName("test-feature".into()),
        objective: Objective("test objective".into()),
        project_root: ProjectRoot(PathBuf::from("/test/dir")),
        scope_path: None,
    }
}

#[test]
fn created_event_initializes_view() {
    let mut view = WorkflowView::default();
    view.apply_event(&test_aggregate_id(), &workflow_created_event(), 1);

    assert_eq!(view.feature_name().unwrap().0, "test-feature");
    assert!(view.phase().is_none());
    assert!(!view.is_completed());
    assert_eq!(view.last_event_sequence(), 1);
}

#[test]
fn artifact_lifecycle_clears_pending_on_approval() {
    let mut view = WorkflowView::default();
    view.apply_event(&test_aggregate_id(), &workflow_created_event(), 1);
    view.apply_event(
        &test_aggregate_id(),
        &WorkflowEvent::StageStarted {
            phase: Phase::Scoping,
        },
        2,
    );
    let artifact_id = crate::domain::types::ArtifactId::new();
    view.apply_event(
        &test_aggregate_id(),
        &WorkflowEvent::ArtifactSubmitted {
            artifact_id,
            artifact_type: ArtifactType::ScopeCard,
            body: "card".into(),
        },
        3,
    );
    assert!(view.pending_artifact().is_some());

    view.apply_event(
        &test_aggregate_id(),
        &WorkflowEvent::ArtifactApproved {
            artifact_id,
            merge_strategy: None,
            commit_message: None,
        },
        4,
    );
    assert!(view.pending_artifact().is_none());
}

#[test]
fn workflow_completed_sets_completed_flag() {
    let mut view = WorkflowView::default();
    view.apply_event(&test_aggregate_id(), &workflow_created_event(), 1);
    view.apply_event(&test_aggregate_id(), &WorkflowEvent::WorkflowCompleted, 2);
    assert!(view.is_completed());
}

#[test]
fn failure_history_is_bounded() {
    let mut view = WorkflowView::default();
    view.apply_event(&test_aggregate_id(), &workflow_created_event(), 1);

    for i in 0..(crate::domain::failure::MAX_FAILURE_HISTORY + 5) {
        let failure = crate::domain::failure::FailureContext::new(
            crate::domain::failure::FailureKind::Provider,
            Phase::InProgress,
            None,
            3,
        );
        view.apply_event(
            &test_aggregate_id(),
            &WorkflowEvent::FailureRecorded { failure },
            (i + 2) as u64,
        );
    }
    assert_eq!(
        view.failure_history().len(),
        crate::domain::failure::MAX_FAILURE_HISTORY
    );
    assert!(view.has_failure());
}
