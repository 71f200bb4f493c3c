use super::*;
use crate::approval::ApprovalBroker;
use crate::domain::types::{FeatureName, Objective, Phase, ProjectRoot};
use serial_test::serial;
use std::sync::Arc;
use tempfile::tempdir;

fn new_orchestrator() -> Orchestrator {
    Orchestrator::new(Arc::new(ApprovalBroker::new()))
}

#[tokio::test]
#[serial]
async fn create_workflow_registers_and_initializes_the_aggregate() {
    let home = tempdir().expect("temp dir");
    std::env::set_var("HOME", home.path());
    let orchestrator = new_orchestrator();

    let (workflow_id, view) = orchestrator
        .create_workflow(
            FeatureName("retry-uploader".into()),
            Objective("add retries to the uploader".into()),
            ProjectRoot(std::path::PathBuf::from("/tmp/project")),
            None,
        )
        .await
        .expect("create_workflow succeeds");

    assert!(view.feature_name().is_some());
    assert_eq!(view.workflow_id(), Some(&workflow_id));
}

#[tokio::test]
#[serial]
async fn dispatching_a_command_against_an_unknown_workflow_errors() {
    let home = tempdir().expect("temp dir");
    std::env::set_var("HOME", home.path());
    let orchestrator = new_orchestrator();

    let result = orchestrator
        .rewind(crate::domain::types::WorkflowId::new(), Phase::Scoping)
        .await;

    assert!(matches!(result, Err(OrchestratorError::UnknownWorkflow(_))));
}

#[tokio::test]
#[serial]
async fn archiving_a_workflow_removes_it_from_the_registry() {
    let home = tempdir().expect("temp dir");
    std::env::set_var("HOME", home.path());
    let orchestrator = new_orchestrator();

    let (workflow_id, _) = orchestrator
        .create_workflow(
            FeatureName("one-off".into()),
            Objective("ship it".into()),
            ProjectRoot(std::path::PathBuf::from("/tmp/project")),
            None,
        )
        .await
        .expect("create_workflow succeeds");

    orchestrator
        .archive(workflow_id, "no longer needed".to_string())
        .await
        .expect("archive succeeds");

    let result = orchestrator.view(workflow_id).await;
    assert!(matches!(result, Err(OrchestratorError::UnknownWorkflow(_))));
}

#[tokio::test]
#[serial]
async fn resuming_a_workflow_from_a_fresh_orchestrator_rehydrates_its_view() {
    let home = tempdir().expect("temp dir");
    std::env::set_var("HOME", home.path());

    let first = new_orchestrator();
    let (workflow_id, _) = first
        .create_workflow(
            FeatureName("resumable".into()),
            Objective("keep working after a restart".into()),
            ProjectRoot(std::path::PathBuf::from("/tmp/project")),
            None,
        )
        .await
        .expect("create_workflow succeeds");
    drop(first);

    let second = new_orchestrator();
    let view = second
        .resume_workflow(workflow_id)
        .await
        .expect("resume succeeds from the persisted log");
    assert_eq!(view.workflow_id(), Some(&workflow_id));

    let view = second
        .start_pulse(workflow_id)
        .await
        .expect("commands dispatch normally once resumed");
    assert!(view.current_pulse().is_some());
}

#[tokio::test]
#[serial]
async fn resuming_an_id_with_no_event_log_errors() {
    let home = tempdir().expect("temp dir");
    std::env::set_var("HOME", home.path());
    let orchestrator = new_orchestrator();

    let result = orchestrator
        .resume_workflow(crate::domain::types::WorkflowId::new())
        .await;

    assert!(matches!(result, Err(OrchestratorError::UnknownWorkflow(_))));
}
