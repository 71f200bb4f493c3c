//! The turn loop: drives one `Model::stream()` call (and any follow-on
//! rounds needed to feed tool results back) to completion.
//!
//! Modeled as an explicit state machine rather than an open-ended async
//! function, per spec.md §9's design note: crash recovery inspects
//! `TurnState` to decide whether a turn's outcome is unknown (it was
//! `AwaitingDelta`/`AwaitingTool`/`AwaitingInterrupt` when the process died)
//! or already durably completed. Grounded on `agents/runner.rs`'s
//! execute-and-stream sequencing, generalized to interleave tool calls and
//! approval-broker interrupts instead of running a single external process.

use crate::approval::{ApprovalBroker, Interrupt, InterruptPayload, Resolution};
use crate::domain::types::{ApprovalId, SessionId, TimestampUtc, TurnId, TurnRole};
use crate::session_runtime::message::{Message, Segment, ToolCallRecord};
use crate::session_runtime::model::{Model, ModelError, ModelEvent, ModelRequest, ModelUsage, ToolResultPayload};
use crate::session_runtime::tool::{ToolContext, ToolRegistry};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    AwaitingDelta,
    AwaitingTool,
    AwaitingInterrupt,
    Completed,
    Errored,
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("turn was cancelled while awaiting approval")]
    Cancelled,
}

/// Tracks the live state of a turn in progress. Held by the caller so that
/// a crash-recovery pass can read `state` off durable storage and decide
/// whether the turn's outcome needs replaying.
pub struct Turn {
    pub turn_id: TurnId,
    pub session_id: SessionId,
    pub role: TurnRole,
    pub state: TurnState,
}

impl Turn {
    pub fn new(turn_id: TurnId, session_id: SessionId, role: TurnRole) -> Self {
        Self {
            turn_id,
            session_id,
            role,
            state: TurnState::AwaitingDelta,
        }
    }

    /// Drive this turn to completion, streaming `model` output, dispatching
    /// tool calls through `tools`, and suspending on `approvals` for any
    /// tool call that requires human sign-off. Returns the durable
    /// `Message` projection once the model reports `Done` with no
    /// outstanding tool calls.
    pub async fn run(
        &mut self,
        model: &dyn Model,
        tools: &ToolRegistry,
        approvals: &ApprovalBroker,
        ctx: &ToolContext,
        system_prompt: String,
        conversation_key: String,
        user_message: String,
    ) -> Result<Message, TurnError> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut thoughts: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCallRecord> = Vec::new();
        let mut usage = ModelUsage::default();
        let mut pending_results: Vec<ToolResultPayload> = Vec::new();
        let mut done = false;

        while !done {
            self.state = TurnState::AwaitingDelta;
            let request = ModelRequest {
                system_prompt: system_prompt.clone(),
                conversation_key: conversation_key.clone(),
                user_message: user_message.clone(),
                tools: tools.specs(),
                tool_results: std::mem::take(&mut pending_results),
            };

            let mut rx = match model.stream(request).await {
                Ok(rx) => rx,
                Err(err) => {
                    self.state = TurnState::Errored;
                    return Err(TurnError::Model(err));
                }
            };

            let mut round_has_tool_calls = false;

            while let Some(event) = rx.recv().await {
                match event {
                    ModelEvent::SegmentDelta { .. } => {
                        // Deltas are for live streaming only; the durable
                        // record keeps the completed segment.
                    }
                    ModelEvent::SegmentComplete { index, content } => {
                        segments.push(Segment { index, content });
                    }
                    ModelEvent::ThoughtDelta { delta } => thoughts.push(delta),
                    ModelEvent::Usage(u) => usage = accumulate(usage, u),
                    ModelEvent::ToolCallRequested {
                        tool_id,
                        name,
                        input,
                    } => {
                        round_has_tool_calls = true;
                        self.state = TurnState::AwaitingTool;
                        let record = self
                            .dispatch_tool(tools, approvals, ctx, &tool_id, &name, input)
                            .await?;
                        pending_results.push(ToolResultPayload {
                            tool_id,
                            content_lines: record.output_lines.clone(),
                            is_error: record.is_error,
                        });
                        tool_calls.push(record);
                        self.state = TurnState::AwaitingDelta;
                    }
                    ModelEvent::Done { .. } => {
                        if !round_has_tool_calls {
                            done = true;
                        }
                        break;
                    }
                    ModelEvent::Error(message) => {
                        self.state = TurnState::Errored;
                        return Err(TurnError::Model(ModelError::Provider(message)));
                    }
                }
            }
        }

        self.state = TurnState::Completed;
        Ok(Message {
            turn_id: self.turn_id,
            role: self.role,
            segments,
            thoughts,
            tool_calls,
            usage,
            created_at: TimestampUtc::now(),
        })
    }

    async fn dispatch_tool(
        &mut self,
        tools: &ToolRegistry,
        approvals: &ApprovalBroker,
        ctx: &ToolContext,
        tool_id: &str,
        name: &str,
        input: Value,
    ) -> Result<ToolCallRecord, TurnError> {
        if tools.requires_approval(name, &input) {
            self.state = TurnState::AwaitingInterrupt;
            let resolution = self
                .await_shell_approval(approvals, name, &input)
                .await?;
            match resolution {
                Resolution::Approved => {}
                Resolution::Denied => {
                    return Ok(ToolCallRecord {
                        tool_id: tool_id.to_string(),
                        name: name.to_string(),
                        input,
                        output_lines: vec!["denied by operator".to_string()],
                        is_error: true,
                    });
                }
                Resolution::Cancelled => return Err(TurnError::Cancelled),
                Resolution::Credential(_) | Resolution::Answers(_) => {
                    return Ok(ToolCallRecord {
                        tool_id: tool_id.to_string(),
                        name: name.to_string(),
                        input,
                        output_lines: vec!["unexpected resolution for a shell approval".to_string()],
                        is_error: true,
                    });
                }
            }
        }

        match tools.invoke(name, ctx, input.clone()).await {
            Ok(result) => Ok(ToolCallRecord {
                tool_id: tool_id.to_string(),
                name: name.to_string(),
                input,
                output_lines: result.content_lines,
                is_error: result.is_error,
            }),
            Err(err) => Ok(ToolCallRecord {
                tool_id: tool_id.to_string(),
                name: name.to_string(),
                input,
                output_lines: vec![err.to_string()],
                is_error: true,
            }),
        }
    }

    async fn await_shell_approval(
        &self,
        approvals: &ApprovalBroker,
        name: &str,
        input: &Value,
    ) -> Result<Resolution, TurnError> {
        let interrupt = Interrupt {
            id: ApprovalId::new(),
            session_id: self.session_id,
            turn_id: self.turn_id,
            payload: InterruptPayload::ShellApproval {
                command: format!("{name} {input}"),
                reason: "tool call requires human approval".to_string(),
            },
        };
        let receiver = approvals.register(interrupt).await;
        receiver.await.map_err(|_| TurnError::Cancelled)
    }
}

fn accumulate(a: ModelUsage, b: ModelUsage) -> ModelUsage {
    ModelUsage {
        input_tokens: a.input_tokens + b.input_tokens,
        output_tokens: a.output_tokens + b.output_tokens,
        cache_creation_tokens: a.cache_creation_tokens + b.cache_creation_tokens,
        cache_read_tokens: a.cache_read_tokens + b.cache_read_tokens,
        cost_usd: a.cost_usd + b.cost_usd,
    }
}

#[cfg(test)]
#[path = "tests/turn_tests.rs"]
mod tests;
