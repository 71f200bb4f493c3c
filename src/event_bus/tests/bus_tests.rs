use super::*;

#[tokio::test]
async fn subscriber_receives_published_event() {
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    bus.publish(Event::WorkflowCompleted {
        workflow_id: "wf_1".into(),
    });

    let received = rx.recv().await.unwrap();
    assert!(matches!(received, Event::WorkflowCompleted { .. }));
}

#[tokio::test]
async fn lagged_subscriber_reports_lag_instead_of_blocking() {
    let (tx, mut rx) = tokio::sync::broadcast::channel::<Event>(2);
    for i in 0..5 {
        let _ = tx.send(Event::WorkflowCompleted {
            workflow_id: format!("wf_{i}"),
        });
    }
    let result = rx.recv().await;
    assert!(matches!(
        result,
        Err(tokio::sync::broadcast::error::RecvError::Lagged(_))
    ));
}

#[test]
fn publish_with_no_subscribers_is_not_an_error() {
    let bus = EventBus::new();
    let delivered = bus.publish(Event::WorkflowCompleted {
        workflow_id: "wf_1".into(),
    });
    assert_eq!(delivered, 0);
}
