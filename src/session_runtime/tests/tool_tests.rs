use super::*;
use crate::domain::types::{SessionId, TurnId};
use crate::session_runtime::tool::{Tool, ToolContext, ToolError, ToolRegistry, ToolResult, ToolSpec};
use serde_json::{json, Value};
use std::path::PathBuf;

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

struct ShellTool;

#[async_trait::async_trait]
impl Tool for ShellTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "shell".to_string(),
            description: "runs a shell command".to_string(),
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

fn test_ctx() -> ToolContext {
    ToolContext {
        project_root: PathBuf::from("/tmp/project"),
        worktree_path: None,
        workflow_id: None,
        session_id: SessionId::new(),
        turn_id: TurnId::new(),
    }
}

#[tokio::test]
async fn invoking_an_unregistered_tool_errors() {
    let registry = ToolRegistry::new();
    let ctx = test_ctx();
    let result = registry.invoke("missing", &ctx, json!({})).await;
    assert!(matches!(result, Err(ToolError::NotFound(_))));
}

#[tokio::test]
async fn invoking_a_registered_tool_returns_its_result() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    let ctx = test_ctx();

    let result = registry.invoke("echo", &ctx, json!({"a": 1})).await.unwrap();
    assert!(!result.is_error);
    assert_eq!(result.content_lines.len(), 1);
}

#[tokio::test]
async fn requires_approval_defaults_to_false() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    assert!(!registry.requires_approval("echo", &json!({})));
}

#[tokio::test]
async fn a_tool_can_opt_into_requiring_approval() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(ShellTool));
    assert!(registry.requires_approval("shell", &json!({})));
}

#[tokio::test]
async fn specs_lists_every_registered_tool() {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(EchoTool));
    registry.register(Box::new(ShellTool));
    let names: Vec<String> = registry.specs().into_iter().map(|s| s.name).collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"echo".to_string()));
    assert!(names.contains(&"shell".to_string()));
}
