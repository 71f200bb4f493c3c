//! Structured failure handling types for the workflow domain.
//!
//! Canonical failure taxonomy backing spec.md §7's error kinds
//! (`ProviderError`, `ToolError`, `GitError` all classify into a
//! `FailureKind` here so retry/backoff decisions are inspectable and
//! testable instead of living only in ad-hoc `anyhow::Error` strings).

use crate::domain::types::{AgentId, Phase, TimestampUtc};
use serde::{Deserialize, Serialize};

/// Maximum number of failure records to keep in history to prevent unbounded growth.
pub const MAX_FAILURE_HISTORY: usize = 50;

/// Default retry budget for `ProviderError` (spec.md §9 Open Question,
/// decided in DESIGN.md: 3 retries, exponential backoff from 500ms).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
pub const DEFAULT_BACKOFF_CAP_MS: u64 = 8_000;

/// Canonical failure types for agent, tool, and workflow failures.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// LLM provider unreachable, rate-limited, or returned a malformed stream.
    Provider,
    /// Activity timeout - no output for configured duration.
    Timeout,
    /// Network-related error detected from stderr/provider error patterns.
    Network,
    /// Non-zero exit code from a tool process.
    ProcessExit(i32),
    /// Output parsing failed with the given error message.
    ParseFailure(String),
    /// Agent produced no output.
    EmptyOutput,
    /// Workflow-level failure when no reviewers completed.
    AllReviewersFailed,
    /// Git operation failed (merge conflict, rebase abort, worktree locked).
    Git(String),
    /// Unclassified errors for future extensibility.
    Unknown(String),
}

impl FailureKind {
    /// Returns true if this failure type is potentially recoverable via retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FailureKind::Provider
                | FailureKind::Timeout
                | FailureKind::Network
                | FailureKind::EmptyOutput
                | FailureKind::AllReviewersFailed
        )
    }

    /// Returns a human-readable name for this failure type.
    pub fn display_name(&self) -> &'static str {
        match self {
            FailureKind::Provider => "Provider",
            FailureKind::Timeout => "Timeout",
            FailureKind::Network => "Network",
            FailureKind::ProcessExit(_) => "Process Exit",
            FailureKind::ParseFailure(_) => "Parse Failure",
            FailureKind::EmptyOutput => "Empty Output",
            FailureKind::AllReviewersFailed => "All Reviewers Failed",
            FailureKind::Git(_) => "Git Error",
            FailureKind::Unknown(_) => "Unknown",
        }
    }
}

/// Actions that can be taken to recover from a failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryAction {
    /// User chose to retry the failed operation.
    Retried,
    /// User chose to rewind to an earlier stage.
    Rewound,
    /// User chose to abort/archive the workflow.
    Aborted,
}

/// Context for a workflow failure, persisted in state for recovery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailureContext {
    /// Classified failure type.
    pub kind: FailureKind,
    /// Which phase the failure occurred in.
    pub phase: Phase,
    /// Which agent failed (if agent-level failure).
    pub agent_name: Option<AgentId>,
    /// Number of retries attempted for this failure.
    pub retry_count: u32,
    /// Maximum retries allowed from policy.
    pub max_retries: u32,
    /// Timestamp when failure occurred.
    pub failed_at: TimestampUtc,
    /// How the failure was recovered (set after user decision).
    pub recovery_action: Option<RecoveryAction>,
}

impl FailureContext {
    /// Creates a new FailureContext with the given parameters.
    pub fn new(kind: FailureKind, phase: Phase, agent_name: Option<AgentId>, max_retries: u32) -> Self {
        Self {
            kind,
            phase,
            agent_name,
            retry_count: 0,
            max_retries,
            failed_at: TimestampUtc::now(),
            recovery_action: None,
        }
    }

    /// Returns true if this failure can be retried based on retry_count and max_retries.
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries && self.kind.is_retryable()
    }

    /// Increments the retry count and updates the failed_at timestamp.
    pub fn increment_retry(&mut self) {
        self.retry_count += 1;
        self.failed_at = TimestampUtc::now();
    }

    /// Sets the recovery action taken.
    pub fn set_recovery_action(&mut self, action: RecoveryAction) {
        self.recovery_action = Some(action);
    }

    /// Backoff delay before the next retry: exponential from
    /// `DEFAULT_BACKOFF_BASE_MS`, capped at `DEFAULT_BACKOFF_CAP_MS`.
    pub fn backoff_delay_ms(&self) -> u64 {
        let shift = self.retry_count.min(16);
        DEFAULT_BACKOFF_BASE_MS
            .saturating_mul(1u64 << shift)
            .min(DEFAULT_BACKOFF_CAP_MS)
    }
}

/// Retry/backoff policy configuration, overridable per deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailurePolicy {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_backoff_base_ms() -> u64 {
    DEFAULT_BACKOFF_BASE_MS
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_kinds_match_spec_provider_error() {
        assert!(FailureKind::Provider.is_retryable());
        assert!(!FailureKind::ParseFailure("bad json".into()).is_retryable());
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let mut ctx = FailureContext::new(FailureKind::Provider, Phase::InProgress, None, 3);
        assert_eq!(ctx.backoff_delay_ms(), 500);
        ctx.increment_retry();
        assert_eq!(ctx.backoff_delay_ms(), 1_000);
        ctx.increment_retry();
        assert_eq!(ctx.backoff_delay_ms(), 2_000);
        for _ in 0..10 {
            ctx.increment_retry();
        }
        assert_eq!(ctx.backoff_delay_ms(), DEFAULT_BACKOFF_CAP_MS);
    }

    #[test]
    fn can_retry_respects_budget() {
        let mut ctx = FailureContext::new(FailureKind::Provider, Phase::Review, None, 1);
        assert!(ctx.can_retry());
        ctx.increment_retry();
        assert!(!ctx.can_retry());
    }
}
