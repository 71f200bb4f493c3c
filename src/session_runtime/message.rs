//! Durable message projection written once at turn completion
//! (spec.md §3's "a turn's message projection is written once ... and is
//! thereafter immutable"). Grounded on `agents/protocol.rs`'s event shapes
//! folded into one durable record; no direct teacher analogue for the fold
//! itself.

use crate::domain::types::{TimestampUtc, TurnId, TurnRole};
use crate::session_runtime::model::ModelUsage;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Segment {
    pub index: u32,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub tool_id: String,
    pub name: String,
    pub input: Value,
    pub output_lines: Vec<String>,
    pub is_error: bool,
}

/// The immutable record of one completed turn: everything a client
/// re-hydrating a workflow's history needs, with nothing left to stream.
#[derive(Debug, Clone)]
pub struct Message {
    pub turn_id: TurnId,
    pub role: TurnRole,
    pub segments: Vec<Segment>,
    pub thoughts: Vec<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub usage: ModelUsage,
    pub created_at: TimestampUtc,
}

impl Message {
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
#[path = "tests/message_tests.rs"]
mod tests;
