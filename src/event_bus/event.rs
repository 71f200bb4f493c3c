//! Wire-protocol event families (spec.md §6), JSON-tagged by `type`.

use crate::domain::types::{AgentRole, ArtifactType, Phase};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    #[serde(rename = "workflow:created")]
    WorkflowCreated {
        workflow_id: String,
        title: String,
        status: String,
    },

    #[serde(rename = "workflow:stage_changed")]
    WorkflowStageChanged {
        workflow_id: String,
        new_stage: Phase,
        session_id: Option<String>,
    },

    #[serde(rename = "workflow:approval_needed")]
    WorkflowApprovalNeeded {
        workflow_id: String,
        artifact_type: ArtifactType,
    },

    #[serde(rename = "workflow:completed")]
    WorkflowCompleted { workflow_id: String },

    #[serde(rename = "workflow:error")]
    WorkflowError { workflow_id: String, error: String },

    #[serde(rename = "session:started")]
    SessionStarted {
        session_id: String,
        context_type: String,
        context_id: String,
        agent_role: AgentRole,
    },

    #[serde(rename = "session:completed")]
    SessionCompleted { session_id: String },

    #[serde(rename = "session:error")]
    SessionError { session_id: String, error: String },

    #[serde(rename = "turn:started")]
    TurnStarted {
        session_id: String,
        turn_id: String,
        role: String,
    },

    #[serde(rename = "turn:message_delta")]
    TurnMessageDelta {
        session_id: String,
        turn_id: String,
        segment_index: u32,
        delta: String,
    },

    #[serde(rename = "turn:segment_complete")]
    TurnSegmentComplete {
        session_id: String,
        turn_id: String,
        segment_index: u32,
        content: String,
    },

    #[serde(rename = "turn:thought_delta")]
    TurnThoughtDelta {
        session_id: String,
        turn_id: String,
        delta: String,
    },

    #[serde(rename = "turn:tool_started")]
    TurnToolStarted {
        session_id: String,
        turn_id: String,
        tool_id: String,
        index: u32,
        name: String,
        input: Value,
    },

    #[serde(rename = "turn:tool_completed")]
    TurnToolCompleted {
        session_id: String,
        turn_id: String,
        tool_id: String,
        output: Value,
        success: bool,
    },

    #[serde(rename = "turn:completed")]
    TurnCompleted {
        session_id: String,
        turn_id: String,
        cost: f64,
    },

    #[serde(rename = "questions:asked")]
    QuestionsAsked {
        session_id: String,
        approval_id: String,
        questions: Vec<String>,
    },

    #[serde(rename = "questions:answered")]
    QuestionsAnswered {
        session_id: String,
        approval_id: String,
        answers: Vec<String>,
    },

    #[serde(rename = "questions:submitted")]
    QuestionsSubmitted {
        session_id: String,
        approval_id: String,
    },

    #[serde(rename = "shell:approval_needed")]
    ShellApprovalNeeded {
        approval_id: String,
        workflow_id: String,
        session_id: String,
        command: String,
        reason: String,
        agent_role: Option<AgentRole>,
    },

    #[serde(rename = "shell:approval_resolved")]
    ShellApprovalResolved {
        approval_id: String,
        workflow_id: String,
        session_id: String,
        approved: bool,
    },
}

#[cfg(test)]
#[path = "tests/event_tests.rs"]
mod tests;
