use super::*;

#[test]
fn wire_tag_uses_colon_discriminator() {
    let event = Event::WorkflowCreated {
        workflow_id: "wf_1".into(),
        title: "Add health endpoint".into(),
        status: "scoping".into(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "workflow:created");
    assert_eq!(json["workflowId"], "wf_1");
}

#[test]
fn stage_changed_serializes_phase_in_snake_case() {
    let event = Event::WorkflowStageChanged {
        workflow_id: "wf_1".into(),
        new_stage: Phase::Researching,
        session_id: None,
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["type"], "workflow:stage_changed");
    assert_eq!(json["newStage"], "researching");
}

#[test]
fn round_trips_through_json() {
    let event = Event::ShellApprovalNeeded {
        approval_id: "appr_1".into(),
        workflow_id: "wf_1".into(),
        session_id: "sess_1".into(),
        command: "rm -rf build".into(),
        reason: "clean build artifacts".into(),
        agent_role: Some(AgentRole::Execution),
    };
    let json = serde_json::to_string(&event).unwrap();
    let back: Event = serde_json::from_str(&json).unwrap();
    assert!(matches!(back, Event::ShellApprovalNeeded { .. }));
}
