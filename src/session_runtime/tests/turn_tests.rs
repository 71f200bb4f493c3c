use super::*;
use crate::approval::{ApprovalBroker, Resolution};
use crate::domain::types::{SessionId, TurnId, TurnRole};
use crate::session_runtime::model::{Model, ModelError, ModelEvent, ModelRequest, ModelUsage};
use crate::session_runtime::tool::{Tool, ToolContext, ToolError, ToolRegistry, ToolResult, ToolSpec};
use crate::session_runtime::turn::{Turn, TurnState};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;

struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "echo".to_string(),
            description: "echoes its input".to_string(),
            input_schema: json!({ "type": "object" }),
        }
    }

    async fn invoke(&self, _ctx: &ToolContext, input: Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult {
            content_lines: vec![input.to_string()],
            is_error: false,
        })
    }
}

struct GatedTool;

#[async_trait::async_trait]
impl Tool for GatedTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "gated".to_string(),
            description: "requires approval".to_string(),
            input_schema: json!({ "type": "object" }),
        }
    }

    fn requires_approval(&self, _input: &Value) -> bool {
        true
    }

    async fn invoke(&self, _ctx: &ToolContext, _input: Value) -> Result<ToolResult, ToolError> {
        Ok(ToolResult {
            content_lines: vec!["ran".to_string()],
            is_error: false,
        })
    }
}

/// Emits a tool call on its first stream, then waits for the tool result to
/// come back on the second before reporting `Done`.
struct ScriptedModel {
    rounds: AtomicUsize,
}

impl ScriptedModel {
    fn new() -> Self {
        Self { rounds: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl Model for ScriptedModel {
    async fn stream(&self, request: ModelRequest) -> Result<mpsc::Receiver<ModelEvent>, ModelError> {
        let round = self.rounds.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            if round == 0 {
                let _ = tx
                    .send(ModelEvent::SegmentComplete { index: 0, content: "checking repo".to_string() })
                    .await;
                let _ = tx
                    .send(ModelEvent::ToolCallRequested {
                        tool_id: "t1".to_string(),
                        name: "echo".to_string(),
                        input: json!({"msg": "hi"}),
                    })
                    .await;
                let _ = tx.send(ModelEvent::Done { stop_reason: "tool_use".to_string() }).await;
            } else {
                assert!(!request.tool_results.is_empty(), "follow-up round must carry tool results");
                let _ = tx
                    .send(ModelEvent::SegmentComplete { index: 1, content: "done".to_string() })
                    .await;
                let _ = tx
                    .send(ModelEvent::Usage(ModelUsage { input_tokens: 10, ..Default::default() }))
                    .await;
                let _ = tx.send(ModelEvent::Done { stop_reason: "end_turn".to_string() }).await;
            }
        });
        Ok(rx)
    }
}

struct GatedModel {
    rounds: AtomicUsize,
}

impl GatedModel {
    fn new() -> Self {
        Self { rounds: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl Model for GatedModel {
    async fn stream(&self, _request: ModelRequest) -> Result<mpsc::Receiver<ModelEvent>, ModelError> {
        let round = self.rounds.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(async move {
            if round == 0 {
                let _ = tx
                    .send(ModelEvent::ToolCallRequested {
                        tool_id: "g1".to_string(),
                        name: "gated".to_string(),
                        input: json!({}),
                    })
                    .await;
                let _ = tx.send(ModelEvent::Done { stop_reason: "tool_use".to_string() }).await;
            } else {
                let _ = tx.send(ModelEvent::Done { stop_reason: "end_turn".to_string() }).await;
            }
        });
        Ok(rx)
    }
}

fn test_ctx(session_id: SessionId, turn_id: TurnId) -> ToolContext {
    ToolContext {
        project_root: PathBuf::from("/tmp/project"),
        worktree_path: None,
        workflow_id: None,
        session_id,
        turn_id,
    }
}

#[tokio::test]
async fn a_tool_call_threads_its_result_into_the_next_round() {
    let model = ScriptedModel::new();
    let mut tools = ToolRegistry::new();
    tools.register(Box::new(EchoTool));
    let approvals = ApprovalBroker::new();

    let session_id = SessionId::new();
    let turn_id = TurnId::new();
    let ctx = test_ctx(session_id, turn_id);
    let mut turn = Turn::new(turn_id, session_id, TurnRole::Assistant);

    let message = turn
        .run(
            &model,
            &tools,
            &approvals,
            &ctx,
            "system prompt".to_string(),
            "execution/claude-main".to_string(),
            "do the thing".to_string(),
        )
        .await
        .expect("turn completes");

    assert_eq!(turn.state, TurnState::Completed);
    assert_eq!(message.segments.len(), 2);
    assert_eq!(message.tool_calls.len(), 1);
    assert!(!message.tool_calls[0].is_error);
    assert_eq!(message.usage.input_tokens, 10);
}

#[tokio::test]
async fn a_denied_gated_tool_call_is_recorded_as_an_error_not_a_crash() {
    let model = GatedModel::new();
    let mut tools = ToolRegistry::new();
    tools.register(Box::new(GatedTool));
    let approvals = ApprovalBroker::new();

    let session_id = SessionId::new();
    let turn_id = TurnId::new();
    let ctx = test_ctx(session_id, turn_id);
    let mut turn = Turn::new(turn_id, session_id, TurnRole::Assistant);

    let run = turn.run(
        &model,
        &tools,
        &approvals,
        &ctx,
        "system prompt".to_string(),
        "execution/claude-main".to_string(),
        "do the risky thing".to_string(),
    );

    let resolver = async {
        loop {
            let pending = approvals.list().await;
            if let Some(interrupt) = pending.into_iter().next() {
                approvals.resolve(interrupt.id, Resolution::Denied).await.unwrap();
                break;
            }
            tokio::task::yield_now().await;
        }
    };

    let (message, _) = tokio::join!(run, resolver);
    let message = message.expect("turn completes even when a tool call is denied");

    assert_eq!(message.tool_calls.len(), 1);
    assert!(message.tool_calls[0].is_error);
}
