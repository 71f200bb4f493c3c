//! The `Model` contract boundary (spec.md §1, §4.2): `Model.stream(prompt,
//! tools) -> (eventStream, usage)`. Grounded on `agents/protocol.rs`'s
//! `AgentEvent` for the event shape; this crate implements nothing beyond a
//! deterministic in-memory test double, matching spec.md §1's exclusion of
//! provider clients.

use crate::session_runtime::tool::ToolSpec;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Default)]
pub struct ModelUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub cost_usd: f64,
}

/// A single event in a model's streamed response. Segments are the model's
/// visible output; thoughts are reasoning traces surfaced separately.
#[derive(Debug, Clone)]
pub enum ModelEvent {
    SegmentDelta { index: u32, delta: String },
    SegmentComplete { index: u32, content: String },
    ThoughtDelta { delta: String },
    ToolCallRequested {
        tool_id: String,
        name: String,
        input: Value,
    },
    Usage(ModelUsage),
    Done { stop_reason: String },
    Error(String),
}

#[derive(Debug, Clone, Default)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub conversation_key: String,
    pub user_message: String,
    pub tools: Vec<ToolSpec>,
    /// Results of tool calls requested in the prior round, fed back so the
    /// model can continue generating. Empty on the first round of a turn.
    pub tool_results: Vec<ToolResultPayload>,
}

/// One tool call's outcome, threaded back into the model on the next round.
#[derive(Debug, Clone)]
pub struct ToolResultPayload {
    pub tool_id: String,
    pub content_lines: Vec<String>,
    pub is_error: bool,
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider error: {0}")]
    Provider(String),
    #[error("stream ended unexpectedly")]
    StreamClosed,
}

/// LLM provider boundary. A turn drives one `stream()` call to completion,
/// reading `ModelEvent`s off the returned channel until `Done`/`Error`.
#[async_trait::async_trait]
pub trait Model: Send + Sync {
    async fn stream(&self, request: ModelRequest) -> Result<mpsc::Receiver<ModelEvent>, ModelError>;
}

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
