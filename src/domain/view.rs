//! Workflow view projection for UI and query purposes.
//!
//! The WorkflowView is derived from WorkflowEvent only (no direct mutation)
//! and contains only the data required for UI, session tracking, and resume.

use crate::domain::cqrs::WorkflowAggregate;
use crate::domain::failure::{FailureContext, MAX_FAILURE_HISTORY};
use crate::domain::types::{
    AgentId, ArtifactId, ArtifactType, FeatureName, MergeStrategy, Objective, Phase, ProjectRoot,
    PulseId, ScopePath, WorkflowId,
};
use crate::domain::WorkflowEvent;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of workflow state derived from events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowView {
    workflow_id: Option<WorkflowId>,
    feature_name: Option<FeatureName>,
    objective: Option<Objective>,
    project_root: Option<ProjectRoot>,
    scope_path: Option<ScopePath>,
    phase: Option<Phase>,
    current_pulse: Option<PulseId>,
    pending_artifact: Option<(ArtifactId, ArtifactType)>,
    last_merge_strategy: Option<MergeStrategy>,
    invocations: Vec<(AgentId, Phase)>,
    last_failure: Option<FailureContext>,
    failure_history: Vec<FailureContext>,
    archived_reason: Option<String>,
    completed: bool,
    last_event_sequence: u64,
}

impl WorkflowView {
    /// Apply an event to update the view.
    pub fn apply_event(&mut self, aggregate_id: &str, event: &WorkflowEvent, sequence: u64) {
        match Uuid::parse_str(aggregate_id) {
            Ok(uuid) => self.workflow_id = Some(WorkflowId(uuid)),
            Err(e) => tracing::warn!("invalid aggregate id '{}': {}", aggregate_id, e),
        }
        self.last_event_sequence = sequence;

        match event {
            WorkflowEvent::WorkflowCreated {
                feature_name,
                objective,
                project_root,
                scope_path,
            } => {
                self.feature_name = Some(feature_name.clone());
                self.objective = Some(objective.clone());
                self.project_root = Some(project_root.clone());
                self.scope_path = *scope_path;
                self.phase = None;
                self.current_pulse = None;
                self.pending_artifact = None;
                self.invocations.clear();
                self.last_failure = None;
                self.failure_history.clear();
                self.completed = false;
                self.archived_reason = None;
            }

            WorkflowEvent::StageStarted { phase } => {
                self.phase = Some(*phase);
                self.pending_artifact = None;
            }

            WorkflowEvent::PulseStarted { pulse_id, .. } => {
                self.current_pulse = Some(*pulse_id);
            }

            WorkflowEvent::ArtifactSubmitted {
                artifact_id,
                artifact_type,
                ..
            } => {
                self.pending_artifact = Some((*artifact_id, *artifact_type));
            }

            WorkflowEvent::ArtifactApproved { merge_strategy, .. } => {
                self.pending_artifact = None;
                self.current_pulse = None;
                if merge_strategy.is_some() {
                    self.last_merge_strategy = *merge_strategy;
                }
            }

            WorkflowEvent::ArtifactChangesRequested { .. } => {
                self.pending_artifact = None;
                self.current_pulse = None;
            }

            WorkflowEvent::FixesRequested { pulse_id, .. } => {
                self.phase = Some(Phase::InProgress);
                self.current_pulse = Some(*pulse_id);
                self.pending_artifact = None;
            }

            WorkflowEvent::StageAdvanced { to, .. } => {
                self.phase = Some(*to);
                self.pending_artifact = None;
            }

            WorkflowEvent::RewoundTo { target } => {
                self.phase = Some(*target);
                self.pending_artifact = None;
                self.current_pulse = None;
            }

            WorkflowEvent::PulseCompleted { .. } => {
                self.current_pulse = None;
            }

            WorkflowEvent::InvocationRecorded { agent_id, phase } => {
                self.invocations.push((agent_id.clone(), *phase));
            }

            WorkflowEvent::FailureRecorded { failure } => {
                self.last_failure = Some(failure.clone());
                self.failure_history.push(failure.clone());
                if self.failure_history.len() > MAX_FAILURE_HISTORY {
                    let excess = self.failure_history.len() - MAX_FAILURE_HISTORY;
                    self.failure_history.drain(0..excess);
                }
            }

            WorkflowEvent::FailureCleared => {
                self.last_failure = None;
            }

            WorkflowEvent::WorkflowCompleted => {
                self.completed = true;
            }

            WorkflowEvent::Archived { reason } => {
                self.archived_reason = Some(reason.clone());
            }
        }
    }

    pub fn workflow_id(&self) -> Option<&WorkflowId> {
        self.workflow_id.as_ref()
    }

    pub fn feature_name(&self) -> Option<&FeatureName> {
        self.feature_name.as_ref()
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    pub fn project_root(&self) -> Option<&ProjectRoot> {
        self.project_root.as_ref()
    }

    pub fn phase(&self) -> Option<Phase> {
        self.phase
    }

    pub fn current_pulse(&self) -> Option<PulseId> {
        self.current_pulse
    }

    pub fn pending_artifact(&self) -> Option<(ArtifactId, ArtifactType)> {
        self.pending_artifact
    }

    pub fn invocations(&self) -> &[(AgentId, Phase)] {
        &self.invocations
    }

    pub fn last_failure(&self) -> Option<&FailureContext> {
        self.last_failure.as_ref()
    }

    pub fn failure_history(&self) -> &[FailureContext] {
        &self.failure_history
    }

    pub fn has_failure(&self) -> bool {
        self.last_failure.is_some()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_archived(&self) -> bool {
        self.archived_reason.is_some()
    }

    pub fn last_event_sequence(&self) -> u64 {
        self.last_event_sequence
    }
}

/// Serializable wrapper for event envelopes used in RPC and broadcasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowEventEnvelope {
    pub aggregate_id: String,
    pub sequence: u64,
    pub event: WorkflowEvent,
}

impl From<&cqrs_es::EventEnvelope<WorkflowAggregate>> for WorkflowEventEnvelope {
    fn from(source: &cqrs_es::EventEnvelope<WorkflowAggregate>) -> Self {
        Self {
            aggregate_id: source.aggregate_id.clone(),
            sequence: source.sequence as u64,
            event: source.payload.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
