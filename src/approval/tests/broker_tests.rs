use super::*;

fn interrupt(id: ApprovalId) -> Interrupt {
    Interrupt {
        id,
        session_id: SessionId::new(),
        turn_id: TurnId::new(),
        payload: InterruptPayload::ShellApproval {
            command: "rm -rf /tmp/x".into(),
            reason: "cleanup".into(),
        },
    }
}

#[tokio::test]
async fn resolve_delivers_to_registered_receiver() {
    let broker = ApprovalBroker::new();
    let id = ApprovalId::new();
    let rx = broker.register(interrupt(id)).await;

    broker.resolve(id, Resolution::Approved).await.unwrap();

    let resolution = rx.await.unwrap();
    assert!(matches!(resolution, Resolution::Approved));
}

#[tokio::test]
async fn resolve_unknown_id_errors() {
    let broker = ApprovalBroker::new();
    let err = broker
        .resolve(ApprovalId::new(), Resolution::Approved)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::Unknown));
}

#[tokio::test]
async fn resolve_twice_errors_on_second_call() {
    let broker = ApprovalBroker::new();
    let id = ApprovalId::new();
    let _rx = broker.register(interrupt(id)).await;

    broker.resolve(id, Resolution::Denied).await.unwrap();
    let err = broker.resolve(id, Resolution::Denied).await.unwrap_err();
    assert!(matches!(err, ResolveError::Unknown));
}

#[tokio::test]
async fn list_reflects_outstanding_interrupts() {
    let broker = ApprovalBroker::new();
    let id = ApprovalId::new();
    let _rx = broker.register(interrupt(id)).await;

    let listed = broker.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
}

#[tokio::test]
async fn cancel_unbound_cancels_interrupts_for_dead_sessions() {
    let broker = ApprovalBroker::new();
    let id = ApprovalId::new();
    let rx = broker.register(interrupt(id)).await;

    broker.cancel_unbound(&[]).await;

    let resolution = rx.await.unwrap();
    assert!(matches!(resolution, Resolution::Cancelled));
}
