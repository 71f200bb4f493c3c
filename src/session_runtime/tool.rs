//! Tool dispatch (spec.md §4.2). Grounded on `mcp/server.rs`'s
//! tools/list + tools/call JSON-RPC dispatch pattern and
//! `agents/protocol.rs`'s `ToolStarted`/`ToolResult` event shapes.

use crate::domain::types::{SessionId, TurnId, WorkflowId};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Declares a tool's name and JSON-schema-shaped input contract, passed to
/// the model so it knows what it can call.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Context passed to a tool invocation: where it's allowed to act and which
/// workflow/session/turn it's acting on behalf of.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub project_root: PathBuf,
    pub worktree_path: Option<PathBuf>,
    pub workflow_id: Option<WorkflowId>,
    pub session_id: SessionId,
    pub turn_id: TurnId,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool timed out after {0:?}")]
    Timeout(Duration),
    #[error("tool '{0}' is not registered")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("tool execution failed: {0}")]
    Failed(String),
    #[error("denied: {0}")]
    Denied(String),
}

#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content_lines: Vec<String>,
    pub is_error: bool,
}

/// Default deadline for a tool invocation (spec.md §5): exceeding it raises
/// `ToolError::Timeout` as a normal tool result, not an aborted turn.
pub const DEFAULT_TOOL_DEADLINE: Duration = Duration::from_secs(5 * 60);

#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Whether invoking this tool with these arguments requires human
    /// approval (e.g. shell execution, credential-bearing git operations).
    fn requires_approval(&self, _input: &Value) -> bool {
        false
    }

    async fn invoke(&self, ctx: &ToolContext, input: Value) -> Result<ToolResult, ToolError>;
}

/// Registry of tools available to a role's session, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.spec().name.clone(), tool);
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools.values().map(|t| t.spec()).collect()
    }

    pub async fn invoke(
        &self,
        name: &str,
        ctx: &ToolContext,
        input: Value,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        match tokio::time::timeout(DEFAULT_TOOL_DEADLINE, tool.invoke(ctx, input)).await {
            Ok(result) => result,
            Err(_) => Err(ToolError::Timeout(DEFAULT_TOOL_DEADLINE)),
        }
    }

    pub fn requires_approval(&self, name: &str, input: &Value) -> bool {
        self.tools
            .get(name)
            .map(|t| t.requires_approval(input))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "tests/tool_tests.rs"]
mod tests;
