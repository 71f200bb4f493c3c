//! Workflow events for the CQRS aggregate.
//!
//! Events are the durable record: everything the aggregate's state holds is
//! reconstructible by folding these in order (`WorkflowAggregate::apply`).

use crate::domain::failure::FailureContext;
use crate::domain::types::{
    AgentId, ArtifactId, ArtifactType, FeatureName, MergeStrategy, Objective, Phase,
    ProjectRoot, PulseId, ScopePath,
};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    WorkflowCreated {
        feature_name: FeatureName,
        objective: Objective,
        project_root: ProjectRoot,
        scope_path: Option<ScopePath>,
    },

    StageStarted {
        phase: Phase,
    },

    PulseStarted {
        pulse_id: PulseId,
        phase: Phase,
    },

    ArtifactSubmitted {
        artifact_id: ArtifactId,
        artifact_type: ArtifactType,
        body: String,
    },

    ArtifactApproved {
        artifact_id: ArtifactId,
        merge_strategy: Option<MergeStrategy>,
        commit_message: Option<String>,
    },

    ArtifactChangesRequested {
        artifact_id: ArtifactId,
        feedback: String,
    },

    FixesRequested {
        comment_ids: Vec<String>,
        summary: String,
        pulse_id: PulseId,
    },

    StageAdvanced {
        from: Phase,
        to: Phase,
    },

    RewoundTo {
        target: Phase,
    },

    PulseCompleted {
        pulse_id: PulseId,
        fingerprint: u64,
    },

    InvocationRecorded {
        agent_id: AgentId,
        phase: Phase,
    },

    FailureRecorded {
        failure: FailureContext,
    },

    FailureCleared,

    WorkflowCompleted,

    Archived {
        reason: String,
    },
}

impl WorkflowEvent {
    /// Event type discriminator string, matching the serde tag, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WorkflowCreated { .. } => "workflow_created",
            Self::StageStarted { .. } => "stage_started",
            Self::PulseStarted { .. } => "pulse_started",
            Self::ArtifactSubmitted { .. } => "artifact_submitted",
            Self::ArtifactApproved { .. } => "artifact_approved",
            Self::ArtifactChangesRequested { .. } => "artifact_changes_requested",
            Self::FixesRequested { .. } => "fixes_requested",
            Self::StageAdvanced { .. } => "stage_advanced",
            Self::RewoundTo { .. } => "rewound_to",
            Self::PulseCompleted { .. } => "pulse_completed",
            Self::InvocationRecorded { .. } => "invocation_recorded",
            Self::FailureRecorded { .. } => "failure_recorded",
            Self::FailureCleared => "failure_cleared",
            Self::WorkflowCompleted => "workflow_completed",
            Self::Archived { .. } => "archived",
        }
    }
}

impl DomainEvent for WorkflowEvent {
    fn event_type(&self) -> String {
        self.kind().to_string()
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
