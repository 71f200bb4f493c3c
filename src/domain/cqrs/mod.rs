//! CQRS core types for event sourcing.
//!
//! This module contains the core CQRS types:
//! - **Commands**: Intent to change state
//! - **Events**: Facts that have happened
//! - **Aggregate**: Command validation and event application
//! - **Query**: Read-side queries

pub mod commands;
pub mod events;
pub mod query;

pub use commands::WorkflowCommand;
pub use events::WorkflowEvent;
pub use query::WorkflowQuery;

use crate::domain::errors::WorkflowError;
use crate::domain::failure::{FailureContext, MAX_FAILURE_HISTORY};
use crate::domain::services::WorkflowServices;
use crate::domain::types::{
    AgentId, ArtifactId, ArtifactStatus, ArtifactType, FeatureName, MergeStrategy, Objective,
    Phase, ProjectRoot, PulseId, ScopePath, TimestampUtc,
};
use async_trait::async_trait;
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

/// A stage artifact awaiting human approval, or already approved/denied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingArtifact {
    pub artifact_id: ArtifactId,
    pub artifact_type: ArtifactType,
    pub status: ArtifactStatus,
}

/// Active workflow data when the aggregate is initialized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowData {
    feature_name: FeatureName,
    objective: Objective,
    project_root: ProjectRoot,
    scope_path: Option<ScopePath>,
    created_at: TimestampUtc,
    phase: Phase,
    current_pulse: Option<PulseId>,
    pending_artifact: Option<PendingArtifact>,
    invocations: Vec<(AgentId, Phase)>,
    last_failure: Option<FailureContext>,
    failure_history: Vec<FailureContext>,
}

impl WorkflowData {
    pub fn feature_name(&self) -> &FeatureName {
        &self.feature_name
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    pub fn project_root(&self) -> &ProjectRoot {
        &self.project_root
    }

    pub fn scope_path(&self) -> Option<ScopePath> {
        self.scope_path
    }

    pub fn created_at(&self) -> &TimestampUtc {
        &self.created_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_pulse(&self) -> Option<PulseId> {
        self.current_pulse
    }

    pub fn pending_artifact(&self) -> Option<&PendingArtifact> {
        self.pending_artifact.as_ref()
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

    fn push_failure(&mut self, failure: FailureContext) {
        self.last_failure = Some(failure.clone());
        self.failure_history.push(failure);
        if self.failure_history.len() > MAX_FAILURE_HISTORY {
            self.failure_history.remove(0);
        }
    }
}

/// Workflow aggregate state.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum WorkflowState {
    #[default]
    Uninitialized,
    Active(Box<WorkflowData>),
    Archived(Box<WorkflowData>),
    Done(Box<WorkflowData>),
}

/// The workflow aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkflowAggregate {
    pub state: WorkflowState,
}

#[async_trait]
impl Aggregate for WorkflowAggregate {
    type Command = WorkflowCommand;
    type Event = WorkflowEvent;
    type Error = WorkflowError;
    type Services = WorkflowServices;

    fn aggregate_type() -> String {
        "workflow".to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        let now = services.clock.now();

        match (&self.state, command) {
            (
                WorkflowState::Uninitialized,
                WorkflowCommand::CreateWorkflow {
                    feature_name,
                    objective,
                    project_root,
                    scope_path,
                },
            ) => Ok(vec![
                WorkflowEvent::WorkflowCreated {
                    feature_name,
                    objective,
                    project_root,
                    scope_path,
                },
                WorkflowEvent::StageStarted {
                    phase: Phase::Scoping,
                },
            ]),

            (WorkflowState::Uninitialized, _) => Err(WorkflowError::NotInitialized),

            (WorkflowState::Active(data), WorkflowCommand::StartPulse) => {
                if data.current_pulse.is_some() {
                    return Err(WorkflowError::InvalidTransition {
                        message: "a pulse is already running for this stage".into(),
                    });
                }
                Ok(vec![WorkflowEvent::PulseStarted {
                    pulse_id: PulseId::new(),
                    phase: data.phase,
                }])
            }

            (WorkflowState::Active(data), WorkflowCommand::SubmitArtifact { body }) => {
                if data.current_pulse.is_none() {
                    return Err(WorkflowError::InvalidTransition {
                        message: "no pulse running, cannot submit an artifact".into(),
                    });
                }
                if let Some(pending) = &data.pending_artifact {
                    if pending.status == ArtifactStatus::Pending {
                        return Err(WorkflowError::InvariantViolation {
                            message: "a pending artifact already awaits approval".into(),
                        });
                    }
                }
                let artifact_type = data.phase.artifact_type().ok_or_else(|| {
                    WorkflowError::InvalidTransition {
                        message: format!("phase {:?} produces no artifact", data.phase),
                    }
                })?;
                Ok(vec![WorkflowEvent::ArtifactSubmitted {
                    artifact_id: ArtifactId::new(),
                    artifact_type,
                    body,
                }])
            }

            (
                WorkflowState::Active(data),
                WorkflowCommand::ApproveArtifact {
                    merge_strategy,
                    commit_message,
                },
            ) => {
                let pending = data.pending_artifact.as_ref().ok_or_else(|| {
                    WorkflowError::InvalidTransition {
                        message: "no pending artifact to approve".into(),
                    }
                })?;
                if pending.status != ArtifactStatus::Pending {
                    return Err(WorkflowError::InvalidTransition {
                        message: "pending artifact already resolved".into(),
                    });
                }
                if pending.artifact_type != ArtifactType::ReviewCard
                    && (merge_strategy.is_some() || commit_message.is_some())
                {
                    return Err(WorkflowError::InvalidTransition {
                        message: "merge strategy only applies at the review gate".into(),
                    });
                }

                let mut events = vec![WorkflowEvent::ArtifactApproved {
                    artifact_id: pending.artifact_id,
                    merge_strategy,
                    commit_message,
                }];

                if pending.artifact_type == ArtifactType::ScopeCard
                    && data.scope_path == Some(ScopePath::Quick)
                {
                    events.push(WorkflowEvent::StageAdvanced {
                        from: data.phase,
                        to: Phase::InProgress,
                    });
                } else if let Some(next) = data.phase.next() {
                    events.push(WorkflowEvent::StageAdvanced {
                        from: data.phase,
                        to: next,
                    });
                    if next == Phase::Done {
                        events.push(WorkflowEvent::WorkflowCompleted);
                    }
                }
                Ok(events)
            }

            (WorkflowState::Active(data), WorkflowCommand::RequestChanges { feedback }) => {
                let pending = data.pending_artifact.as_ref().ok_or_else(|| {
                    WorkflowError::InvalidTransition {
                        message: "no pending artifact to reject".into(),
                    }
                })?;
                if pending.status != ArtifactStatus::Pending {
                    return Err(WorkflowError::InvalidTransition {
                        message: "pending artifact already resolved".into(),
                    });
                }
                Ok(vec![WorkflowEvent::ArtifactChangesRequested {
                    artifact_id: pending.artifact_id,
                    feedback,
                }])
            }

            (
                WorkflowState::Active(data),
                WorkflowCommand::RequestFixes {
                    comment_ids,
                    summary,
                },
            ) => {
                if data.phase != Phase::Review {
                    return Err(WorkflowError::InvalidTransition {
                        message: "fix requests only apply during review".into(),
                    });
                }
                Ok(vec![
                    WorkflowEvent::FixesRequested {
                        comment_ids,
                        summary,
                        pulse_id: PulseId::new(),
                    },
                    WorkflowEvent::StageAdvanced {
                        from: Phase::Review,
                        to: Phase::InProgress,
                    },
                ])
            }

            (WorkflowState::Active(data), WorkflowCommand::Rewind { target }) => {
                let current_idx = Phase::ORDER.iter().position(|p| *p == data.phase);
                let target_idx = Phase::ORDER.iter().position(|p| *p == target);
                match (current_idx, target_idx) {
                    (Some(cur), Some(tgt)) if tgt < cur => {
                        Ok(vec![WorkflowEvent::RewoundTo { target }])
                    }
                    _ => Err(WorkflowError::InvalidTransition {
                        message: "rewind target must precede the current stage".into(),
                    }),
                }
            }

            (WorkflowState::Active(data), WorkflowCommand::CompletePulse { fingerprint }) => {
                let pulse_id = data.current_pulse.ok_or(WorkflowError::InvalidTransition {
                    message: "no pulse running to complete".into(),
                })?;
                Ok(vec![WorkflowEvent::PulseCompleted {
                    pulse_id,
                    fingerprint,
                }])
            }

            (WorkflowState::Active(data), WorkflowCommand::RecordInvocation { agent_id }) => {
                Ok(vec![WorkflowEvent::InvocationRecorded {
                    agent_id,
                    phase: data.phase,
                }])
            }

            (WorkflowState::Active(_), WorkflowCommand::RecordFailure { failure }) => {
                Ok(vec![WorkflowEvent::FailureRecorded { failure }])
            }

            (WorkflowState::Active(data), WorkflowCommand::ClearFailure) => {
                if data.last_failure.is_none() {
                    return Err(WorkflowError::InvalidTransition {
                        message: "no failure to clear".into(),
                    });
                }
                Ok(vec![WorkflowEvent::FailureCleared])
            }

            (WorkflowState::Active(_), WorkflowCommand::Archive { reason }) => {
                Ok(vec![WorkflowEvent::Archived { reason }])
            }

            (WorkflowState::Archived(_) | WorkflowState::Done(_), _) => {
                Err(WorkflowError::InvalidTransition {
                    message: "workflow has already terminated".into(),
                })
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        self.state = match (std::mem::take(&mut self.state), event) {
            (
                WorkflowState::Uninitialized,
                WorkflowEvent::WorkflowCreated {
                    feature_name,
                    objective,
                    project_root,
                    scope_path,
                },
            ) => WorkflowState::Active(Box::new(WorkflowData {
                feature_name,
                objective,
                project_root,
                scope_path,
                created_at: TimestampUtc::now(),
                phase: Phase::Backlog,
                current_pulse: None,
                pending_artifact: None,
                invocations: Vec::new(),
                last_failure: None,
                failure_history: Vec::new(),
            })),

            (WorkflowState::Active(mut data), WorkflowEvent::StageStarted { phase }) => {
                data.phase = phase;
                data.pending_artifact = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::PulseStarted { pulse_id, .. }) => {
                data.current_pulse = Some(pulse_id);
                WorkflowState::Active(data)
            }

            (
                WorkflowState::Active(mut data),
                WorkflowEvent::ArtifactSubmitted {
                    artifact_id,
                    artifact_type,
                    ..
                },
            ) => {
                data.pending_artifact = Some(PendingArtifact {
                    artifact_id,
                    artifact_type,
                    status: ArtifactStatus::Pending,
                });
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::ArtifactApproved { .. }) => {
                if let Some(pending) = data.pending_artifact.as_mut() {
                    pending.status = ArtifactStatus::Approved;
                }
                data.current_pulse = None;
                WorkflowState::Active(data)
            }

            (
                WorkflowState::Active(mut data),
                WorkflowEvent::ArtifactChangesRequested { .. },
            ) => {
                if let Some(pending) = data.pending_artifact.as_mut() {
                    pending.status = ArtifactStatus::Denied;
                }
                data.current_pulse = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::FixesRequested { pulse_id, .. }) => {
                data.phase = Phase::InProgress;
                data.current_pulse = Some(pulse_id);
                data.pending_artifact = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::StageAdvanced { to, .. }) => {
                data.phase = to;
                data.pending_artifact = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::RewoundTo { target }) => {
                data.phase = target;
                data.pending_artifact = None;
                data.current_pulse = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::PulseCompleted { .. }) => {
                data.current_pulse = None;
                WorkflowState::Active(data)
            }

            (
                WorkflowState::Active(mut data),
                WorkflowEvent::InvocationRecorded { agent_id, phase },
            ) => {
                data.invocations.push((agent_id, phase));
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::FailureRecorded { failure }) => {
                data.push_failure(failure);
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(mut data), WorkflowEvent::FailureCleared) => {
                data.last_failure = None;
                WorkflowState::Active(data)
            }

            (WorkflowState::Active(data), WorkflowEvent::WorkflowCompleted) => {
                WorkflowState::Done(data)
            }

            (WorkflowState::Active(data), WorkflowEvent::Archived { .. }) => {
                WorkflowState::Archived(data)
            }

            (state, _) => state,
        };
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
