//! Session runtime: the per-role turn loop that streams LLM output,
//! interleaves tool calls and human interrupts, and projects the result
//! into a durable `Message` (spec.md §4.2).
//!
//! Grounded on `agents/protocol.rs` (`AgentEvent`/`AgentStreamParser`) for
//! the unified streaming-event shape, `agents/runner.rs` for the
//! execute-and-stream sequencing, and `phases/mod.rs`'s conversation-key
//! namespacing for per-role, per-agent conversation continuity.

pub mod message;
pub mod model;
pub mod roles;
pub mod tool;
pub mod turn;

pub use message::{Message, Segment, ToolCallRecord};
pub use model::{Model, ModelEvent, ModelUsage};
pub use roles::{conversation_key, RoleRegistry};
pub use tool::{Tool, ToolContext, ToolError, ToolRegistry, ToolResult};
pub use turn::{Turn, TurnState};
