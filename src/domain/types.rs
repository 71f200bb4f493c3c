//! Strongly typed domain primitives for the workflow aggregate.
//!
//! These newtypes provide type safety and semantic clarity for workflow
//! identifiers, paths, and enumerations. They are used throughout the
//! domain model and the session runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(WorkflowId);
uuid_id!(SessionId);
uuid_id!(TurnId);
uuid_id!(ArtifactId);
uuid_id!(PulseId);
uuid_id!(ApprovalId);

/// UTC timestamp, serialized as RFC3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampUtc(pub DateTime<Utc>);

impl TimestampUtc {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for TimestampUtc {
    fn default() -> Self {
        Self::now()
    }
}

impl std::fmt::Display for TimestampUtc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

/// The workflow's lifecycle stage. Named `status` in spec.md §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Backlog,
    Scoping,
    Researching,
    Planning,
    InProgress,
    Review,
    Done,
}

impl Phase {
    /// The canonical forward order, skipped stages aside.
    pub const ORDER: [Phase; 6] = [
        Phase::Scoping,
        Phase::Researching,
        Phase::Planning,
        Phase::InProgress,
        Phase::Review,
        Phase::Done,
    ];

    pub fn next(self) -> Option<Phase> {
        let idx = Self::ORDER.iter().position(|p| *p == self)?;
        Self::ORDER.get(idx + 1).copied()
    }

    /// Stage corresponding to the artifact type produced at its end.
    pub fn artifact_type(self) -> Option<ArtifactType> {
        match self {
            Phase::Scoping => Some(ArtifactType::ScopeCard),
            Phase::Researching => Some(ArtifactType::Research),
            Phase::Planning => Some(ArtifactType::Plan),
            Phase::Review => Some(ArtifactType::ReviewCard),
            _ => None,
        }
    }
}

/// Kind of artifact produced at a stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    ScopeCard,
    Research,
    Plan,
    ReviewCard,
}

impl ArtifactType {
    /// The phase whose session produces this artifact type.
    pub fn stage(self) -> Phase {
        match self {
            ArtifactType::ScopeCard => Phase::Scoping,
            ArtifactType::Research => Phase::Researching,
            ArtifactType::Plan => Phase::Planning,
            ArtifactType::ReviewCard => Phase::Review,
        }
    }
}

/// Status of an individual artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    Pending,
    Approved,
    Denied,
}

/// The scope-approval fork: minimal plan vs full research+planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePath {
    Quick,
    Full,
}

/// Closed enumeration of agent roles. Replaces a dynamic role-to-prompt
/// lookup (spec.md §9 redesign flag) with a type the compiler checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Scoping,
    Research,
    Planning,
    Preflight,
    Execution,
    Review,
    ReviewSub,
    RoadmapPlanning,
    Discussion,
    Basic,
}

impl AgentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentRole::Scoping => "scoping",
            AgentRole::Research => "research",
            AgentRole::Planning => "planning",
            AgentRole::Preflight => "preflight",
            AgentRole::Execution => "execution",
            AgentRole::Review => "review",
            AgentRole::ReviewSub => "review_sub",
            AgentRole::RoadmapPlanning => "roadmap_planning",
            AgentRole::Discussion => "discussion",
            AgentRole::Basic => "basic",
        }
    }

    /// The role that runs during a given workflow phase.
    pub fn for_phase(phase: Phase) -> Option<AgentRole> {
        match phase {
            Phase::Scoping => Some(AgentRole::Scoping),
            Phase::Researching => Some(AgentRole::Research),
            Phase::Planning => Some(AgentRole::Planning),
            Phase::InProgress => Some(AgentRole::Execution),
            Phase::Review => Some(AgentRole::Review),
            Phase::Backlog | Phase::Done => None,
        }
    }
}

/// Status of a session (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Error,
}

/// Status of a turn (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStatus {
    Streaming,
    Completed,
    Errored,
    Cancelled,
}

/// `role` field of a Turn: who produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// Status of a pulse (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Aborted,
}

/// Merge strategy selectable at review approval (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    FastForward,
    Squash,
    MergeCommit,
    Rebase,
}

/// Severity of a review comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Status of a review comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCommentStatus {
    Open,
    Fixed,
    Dismissed,
}

/// Kind of review comment (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewCommentKind {
    Line,
    File,
    Review,
}

/// Identifies a specific reviewer/agent instance within a role (e.g. a
/// named model backing a `review_sub` session). Distinct from `AgentRole`,
/// which identifies the *kind* of agent, not the instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AgentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Absolute path to the project's repository root (not the worktree).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoot(pub PathBuf);

impl ProjectRoot {
    pub fn as_path(&self) -> &std::path::Path {
        &self.0
    }
}

/// Short human-facing name for a workflow (spec.md §3 `Workflow.name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureName(pub String);

impl std::fmt::Display for FeatureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Free-text statement of what the workflow is meant to accomplish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_skips_nothing_unless_told_to() {
        assert_eq!(Phase::Scoping.next(), Some(Phase::Researching));
        assert_eq!(Phase::Researching.next(), Some(Phase::Planning));
        assert_eq!(Phase::Planning.next(), Some(Phase::InProgress));
        assert_eq!(Phase::InProgress.next(), Some(Phase::Review));
        assert_eq!(Phase::Review.next(), Some(Phase::Done));
        assert_eq!(Phase::Done.next(), None);
    }

    #[test]
    fn artifact_type_round_trips_to_stage() {
        for phase in Phase::ORDER {
            if let Some(at) = phase.artifact_type() {
                assert_eq!(at.stage(), phase);
            }
        }
    }

    #[test]
    fn role_for_phase_matches_spec_mapping() {
        assert_eq!(AgentRole::for_phase(Phase::Scoping), Some(AgentRole::Scoping));
        assert_eq!(AgentRole::for_phase(Phase::InProgress), Some(AgentRole::Execution));
        assert_eq!(AgentRole::for_phase(Phase::Backlog), None);
    }

    #[test]
    fn ids_are_unique_and_display_as_uuid() {
        let a = WorkflowId::new();
        let b = WorkflowId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string().len(), 36);
    }
}
