use super::*;
use crate::domain::types::{FeatureName, Objective, ProjectRoot};
use crate::domain::WorkflowCommand;
use cqrs_es::CqrsFramework;
use tempfile::tempdir;

fn build_cqrs_for_test() -> (
    tempfile::TempDir,
    CqrsFramework<WorkflowAggregate, FileEventStore>,
) {
    let dir = tempdir().expect("temp dir");
    let store = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("snapshot.json"),
        snapshot_every: 50,
    };
    let services = crate::domain::WorkflowServices::default();
    let queries: Vec<Box<dyn cqrs_es::Query<WorkflowAggregate>>> = Vec::new();
    (dir, CqrsFramework::new(store, queries, services))
}

fn create_cmd() -> WorkflowCommand {
    WorkflowCommand::CreateWorkflow {
        feature_name: FeatureName("test-feature".into()),
        objective: Objective("test objective".into()),
        project_root: ProjectRoot(std::path::PathBuf::from("/tmp")),
        scope_path: None,
    }
}

#[tokio::test]
async fn test_create_workflow() {
    let (_dir, cqrs) = build_cqrs_for_test();
    let result = cqrs.execute("workflow-1", create_cmd()).await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_load_aggregate() {
    let (dir, cqrs) = build_cqrs_for_test();
    cqrs.execute("workflow-1", create_cmd()).await.unwrap();

    let store = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("snapshot.json"),
        snapshot_every: 50,
    };

    let ctx = store.load_aggregate("workflow-1").await.unwrap();
    assert_eq!(ctx.current_sequence, 2);
}

#[tokio::test]
async fn test_concurrent_writers_conflict() {
    let dir = tempdir().expect("temp dir");
    let store_a = FileEventStore {
        log_path: dir.path().join("events.jsonl"),
        snapshot_path: dir.path().join("snapshot.json"),
        snapshot_every: 0,
    };
    let store_b = store_a.clone();

    let ctx_a = store_a.load_aggregate("workflow-1").await.unwrap();
    let ctx_b = store_b.load_aggregate("workflow-1").await.unwrap();

    store_a
        .commit(
            vec![crate::domain::WorkflowEvent::WorkflowCompleted],
            ctx_a,
            Default::default(),
        )
        .await
        .unwrap();

    let err = store_b
        .commit(
            vec![crate::domain::WorkflowEvent::WorkflowCompleted],
            ctx_b,
            Default::default(),
        )
        .await;
    assert!(matches!(err, Err(AggregateError::AggregateConflict)));
}

#[test]
fn test_should_snapshot() {
    assert!(!should_snapshot(49, 50));
    assert!(should_snapshot(50, 50));
    assert!(should_snapshot(100, 50));
    assert!(!should_snapshot(101, 50));
    assert!(!should_snapshot(50, 0));
}
