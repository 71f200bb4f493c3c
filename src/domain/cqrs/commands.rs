//! Workflow commands for the CQRS aggregate.
//!
//! Commands represent intent to change state. The aggregate validates
//! commands and produces events that are persisted to the event log.

use crate::domain::failure::FailureContext;
use crate::domain::types::{
    AgentId, FeatureName, MergeStrategy, Objective, Phase, ProjectRoot, ScopePath,
};
use serde::{Deserialize, Serialize};

/// Commands that can be executed against the workflow aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowCommand {
    /// Initialize aggregate state for a new workflow.
    CreateWorkflow {
        feature_name: FeatureName,
        objective: Objective,
        project_root: ProjectRoot,
        /// `None` defers the quick/full fork to the scoping artifact itself.
        scope_path: Option<ScopePath>,
    },

    /// Start a pulse (one agent-session attempt) for the current stage.
    StartPulse,

    /// The running agent submitted the stage's artifact for approval.
    SubmitArtifact { body: String },

    /// Human approved the pending artifact, advancing to the next stage.
    /// Only meaningful at the Review gate do `merge_strategy`/`commit_message`
    /// apply; elsewhere they must be `None`.
    ApproveArtifact {
        merge_strategy: Option<MergeStrategy>,
        commit_message: Option<String>,
    },

    /// Human rejected the pending artifact with feedback, re-running the stage.
    RequestChanges { feedback: String },

    /// Human asked for a follow-up fix pulse against specific review comments.
    RequestFixes {
        comment_ids: Vec<String>,
        summary: String,
    },

    /// Human rewound the workflow to an earlier stage, discarding later state.
    Rewind { target: Phase },

    /// The running pulse finished its work; fingerprint is a content hash of
    /// the resulting diff, used for change-detection and review scoping.
    CompletePulse { fingerprint: u64 },

    /// Record which agent ran for the current stage (for resume/history).
    RecordInvocation { agent_id: AgentId },

    /// Persist a failure context for the current stage/pulse.
    RecordFailure { failure: FailureContext },

    /// Clear the last recorded failure after a successful retry.
    ClearFailure,

    /// Terminate the workflow without completing it.
    Archive { reason: String },
}
