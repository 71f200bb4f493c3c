//! Stage-boundary timeline (spec.md §4.7): a pure reducer turning the full
//! `WorkflowEvent` history into a per-stage view, turn-indexed by the
//! artifact-approval events that bound each stage. No mutation, no I/O —
//! the event-sourced design in §4.1 already keeps the full log around, so
//! this just folds it into something a UI (or a test) can read linearly.

use crate::domain::failure::FailureContext;
use crate::domain::types::{AgentId, ArtifactId, ArtifactType, Phase, PulseId};
use crate::domain::view::WorkflowEventEnvelope;
use crate::domain::WorkflowEvent;

/// One event scoped to the stage it happened in, stripped of the phase
/// bookkeeping the structural events (`StageStarted`, `RewoundTo`, ...)
/// already encode via grouping.
#[derive(Debug, Clone, PartialEq)]
pub enum StageEventKind {
    PulseStarted { pulse_id: PulseId },
    ArtifactSubmitted { artifact_id: ArtifactId, artifact_type: ArtifactType },
    ArtifactApproved { artifact_id: ArtifactId },
    ArtifactChangesRequested { artifact_id: ArtifactId, feedback: String },
    FixesRequested { pulse_id: PulseId, summary: String },
    PulseCompleted { pulse_id: PulseId, fingerprint: u64 },
    InvocationRecorded { agent_id: AgentId },
    FailureRecorded { failure: FailureContext },
    FailureCleared,
}

/// Every event recorded while the workflow sat at `phase`, up until the
/// next `StageStarted`/`StageAdvanced`/`RewoundTo`.
#[derive(Debug, Clone, PartialEq)]
pub struct StageEntry {
    pub phase: Phase,
    pub first_sequence: u64,
    pub events: Vec<StageEventKind>,
}

impl StageEntry {
    fn new(phase: Phase, first_sequence: u64) -> Self {
        Self { phase, first_sequence, events: Vec::new() }
    }

    pub fn approved(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, StageEventKind::ArtifactApproved { .. }))
    }

    pub fn pulse_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, StageEventKind::PulseStarted { .. }))
            .count()
    }
}

/// Fold a workflow's full event history into its stage timeline. Events
/// before the first `StageStarted` (i.e. `WorkflowCreated`) have no stage
/// to attach to and are dropped; `WorkflowCompleted`/`Archived` close the
/// timeline but don't belong to any one stage either.
pub fn build(history: &[WorkflowEventEnvelope]) -> Vec<StageEntry> {
    let mut stages: Vec<StageEntry> = Vec::new();

    for envelope in history {
        match &envelope.event {
            WorkflowEvent::StageStarted { phase } => {
                stages.push(StageEntry::new(*phase, envelope.sequence));
            }
            WorkflowEvent::StageAdvanced { to, .. } => {
                stages.push(StageEntry::new(*to, envelope.sequence));
            }
            WorkflowEvent::RewoundTo { target } => {
                stages.push(StageEntry::new(*target, envelope.sequence));
            }
            WorkflowEvent::WorkflowCreated { .. }
            | WorkflowEvent::WorkflowCompleted
            | WorkflowEvent::Archived { .. } => {}
            other => {
                if let (Some(kind), Some(entry)) = (stage_event_kind(other), stages.last_mut()) {
                    entry.events.push(kind);
                }
            }
        }
    }

    stages
}

fn stage_event_kind(event: &WorkflowEvent) -> Option<StageEventKind> {
    match event {
        WorkflowEvent::PulseStarted { pulse_id, .. } => {
            Some(StageEventKind::PulseStarted { pulse_id: *pulse_id })
        }
        WorkflowEvent::ArtifactSubmitted { artifact_id, artifact_type, .. } => {
            Some(StageEventKind::ArtifactSubmitted {
                artifact_id: *artifact_id,
                artifact_type: *artifact_type,
            })
        }
        WorkflowEvent::ArtifactApproved { artifact_id, .. } => {
            Some(StageEventKind::ArtifactApproved { artifact_id: *artifact_id })
        }
        WorkflowEvent::ArtifactChangesRequested { artifact_id, feedback } => {
            Some(StageEventKind::ArtifactChangesRequested {
                artifact_id: *artifact_id,
                feedback: feedback.clone(),
            })
        }
        WorkflowEvent::FixesRequested { pulse_id, summary, .. } => {
            Some(StageEventKind::FixesRequested { pulse_id: *pulse_id, summary: summary.clone() })
        }
        WorkflowEvent::PulseCompleted { pulse_id, fingerprint } => {
            Some(StageEventKind::PulseCompleted { pulse_id: *pulse_id, fingerprint: *fingerprint })
        }
        WorkflowEvent::InvocationRecorded { agent_id, .. } => {
            Some(StageEventKind::InvocationRecorded { agent_id: agent_id.clone() })
        }
        WorkflowEvent::FailureRecorded { failure } => {
            Some(StageEventKind::FailureRecorded { failure: failure.clone() })
        }
        WorkflowEvent::FailureCleared => Some(StageEventKind::FailureCleared),
        _ => None,
    }
}

#[cfg(test)]
#[path = "tests/stage_timeline_tests.rs"]
mod tests;
