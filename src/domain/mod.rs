//! Domain model for event-sourced workflow state management.
//!
//! This module provides a strongly typed CQRS/ES domain model: state changes
//! happen only through commands validated against the current aggregate
//! state, producing events that are persisted to the event log and folded
//! back to rebuild state.
//!
//! # Architecture
//!
//! - **Commands** (`cqrs::commands`): Intent to change state
//! - **Events** (`cqrs::events`): Facts that have happened
//! - **Aggregate** (`cqrs::mod`): Command validation and event application
//! - **View** (`view`): Read-only projection for UI and queries
//! - **Actor** (`actor`): Per-workflow mailbox wrapping the CQRS framework
//! - **Supervisor** (`supervisor`): Restarts a crashed actor from the event log

pub mod actor;
pub mod cqrs;
pub mod errors;
pub mod failure;
pub mod review;
pub mod services;
pub mod supervisor;
pub mod types;
pub mod view;

pub use cqrs::*;

pub use actor::{create_actor_args, WorkflowMessage, WorkflowScheduler, WorkflowSchedulerArgs};
pub use errors::WorkflowError;
pub use failure::{FailureContext, FailureKind, FailurePolicy, RecoveryAction};
pub use review::{ReviewMode, SequentialReviewState, SerializableReviewResult};
pub use services::{WorkflowClock, WorkflowServices};
pub use supervisor::{SupervisorMsg, WorkflowSupervisor};
pub use types::{
    AgentId, AgentRole, ArtifactId, ArtifactStatus, ArtifactType, FeatureName, MergeStrategy,
    Objective, Phase, ProjectRoot, PulseId, ReviewCommentKind, ReviewCommentStatus, ScopePath,
    SessionId, SessionStatus, Severity, TimestampUtc, TurnId, TurnRole, TurnStatus, WorkflowId,
};
pub use view::{WorkflowEventEnvelope, WorkflowView};
