use super::*;
use crate::domain::types::{FeatureName, Objective};

fn services() -> WorkflowServices {
    WorkflowServices::default()
}

fn create_cmd() -> WorkflowCommand {
    WorkflowCommand::CreateWorkflow {
        feature_name: FeatureName("widget".into()),
        objective: Objective("ship the widget".into()),
        project_root: ProjectRoot(std::path::PathBuf::from("/tmp/widget")),
        scope_path: None,
    }
}

#[tokio::test]
async fn create_workflow_starts_scoping() {
    let agg = WorkflowAggregate::default();
    let events = agg.handle(create_cmd(), &services()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], WorkflowEvent::WorkflowCreated { .. }));
    assert!(matches!(
        events[1],
        WorkflowEvent::StageStarted { phase: Phase::Scoping }
    ));
}

async fn hydrate(events: Vec<WorkflowEvent>) -> WorkflowAggregate {
    let mut agg = WorkflowAggregate::default();
    for e in events {
        agg.apply(e);
    }
    agg
}

#[tokio::test]
async fn submitting_artifact_twice_without_resolution_is_rejected() {
    let agg = WorkflowAggregate::default();
    let created = agg.handle(create_cmd(), &services()).await.unwrap();
    let mut agg = hydrate(created).await;

    let pulse = agg.handle(WorkflowCommand::StartPulse, &services()).await.unwrap();
    agg = hydrate(pulse).await;

    let submitted = agg
        .handle(
            WorkflowCommand::SubmitArtifact { body: "scope card".into() },
            &services(),
        )
        .await
        .unwrap();
    agg = hydrate(submitted).await;

    let err = agg
        .handle(
            WorkflowCommand::SubmitArtifact { body: "again".into() },
            &services(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvariantViolation { .. }));
}

#[tokio::test]
async fn quick_scope_path_skips_research_and_planning() {
    let cmd = WorkflowCommand::CreateWorkflow {
        feature_name: FeatureName("widget".into()),
        objective: Objective("ship the widget".into()),
        project_root: ProjectRoot(std::path::PathBuf::from("/tmp/widget")),
        scope_path: Some(crate::domain::types::ScopePath::Quick),
    };
    let agg = WorkflowAggregate::default();
    let created = agg.handle(cmd, &services()).await.unwrap();
    let mut agg = hydrate(created).await;

    let pulse = agg.handle(WorkflowCommand::StartPulse, &services()).await.unwrap();
    agg = hydrate(pulse).await;
    let submitted = agg
        .handle(
            WorkflowCommand::SubmitArtifact { body: "scope card".into() },
            &services(),
        )
        .await
        .unwrap();
    agg = hydrate(submitted).await;

    let approved = agg
        .handle(
            WorkflowCommand::ApproveArtifact {
                merge_strategy: None,
                commit_message: None,
            },
            &services(),
        )
        .await
        .unwrap();
    assert!(approved
        .iter()
        .any(|e| matches!(e, WorkflowEvent::StageAdvanced { to: Phase::InProgress, .. })));
}

#[tokio::test]
async fn rewind_rejects_forward_targets() {
    let agg = WorkflowAggregate::default();
    let created = agg.handle(create_cmd(), &services()).await.unwrap();
    let agg = hydrate(created).await;

    let err = agg
        .handle(WorkflowCommand::Rewind { target: Phase::Done }, &services())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn commands_on_uninitialized_aggregate_are_rejected() {
    let agg = WorkflowAggregate::default();
    let err = agg
        .handle(WorkflowCommand::StartPulse, &services())
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotInitialized));
}
