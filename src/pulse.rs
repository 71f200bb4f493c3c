//! Pulse execution: the bridge between one stage's git isolation (worktree
//! + pulse branch), the session runtime turn loop, and the workflow
//! aggregate's `CompletePulse`/`SubmitArtifact` commands.
//!
//! This is where `session_runtime::Turn` actually gets driven for a live
//! stage. `Model`/`Tool` remain caller-supplied boundaries (spec.md §1
//! excludes concrete provider/tool implementations from this crate), so
//! `run_pulse` is generic over them rather than hard-coding a provider.

use crate::change_fingerprint::compute_change_fingerprint;
use crate::domain::types::{AgentId, PulseId, SessionId, TurnId, TurnRole, WorkflowId};
use crate::git::{self, WorktreeError};
use crate::session_runtime::message::Message;
use crate::session_runtime::model::Model;
use crate::session_runtime::roles::RoleRegistry;
use crate::session_runtime::tool::{ToolContext, ToolRegistry};
use crate::session_runtime::turn::{Turn, TurnError};
use crate::approval::ApprovalBroker;
use crate::domain::types::AgentRole;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PulseError {
    #[error(transparent)]
    Worktree(#[from] WorktreeError),
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error("failed to fingerprint the pulse's changes: {0}")]
    Fingerprint(String),
}

/// Everything a pulse needs to know about where it runs and what it runs
/// for. Built by the caller (the orchestrator, in practice) from the
/// workflow's current phase and a freshly minted `PulseId`.
pub struct PulseContext {
    pub workflow_id: WorkflowId,
    pub pulse_id: PulseId,
    pub role: AgentRole,
    pub agent_id: AgentId,
    pub project_root: PathBuf,
    pub worktree_root: PathBuf,
}

pub struct PulseOutcome {
    pub message: Message,
    pub worktree_path: PathBuf,
    pub fingerprint: u64,
}

/// Runs one pulse end to end: materializes the workflow worktree if it
/// doesn't exist yet, forks a pulse branch off it, drives a single turn
/// against `model`/`tools`, and fingerprints whatever the turn changed on
/// disk. Does not commit — that's `git::commit_all`, called by whatever
/// consumes this outcome once it decides the turn's output is worth
/// keeping (e.g. on `CompletePulse`).
pub async fn run_pulse(
    ctx: &PulseContext,
    roles: &RoleRegistry,
    model: &dyn Model,
    tools: &ToolRegistry,
    approvals: &ApprovalBroker,
    objective: &str,
) -> Result<PulseOutcome, PulseError> {
    let project_root = ctx.project_root.clone();
    let worktree_root = ctx.worktree_root.clone();
    let workflow_id = ctx.workflow_id.to_string();
    let pulse_id = ctx.pulse_id.to_string();

    let worktree_path = tokio::task::spawn_blocking({
        let workflow_id = workflow_id.clone();
        move || git::create_workflow_worktree(&project_root, &workflow_id, &worktree_root)
    })
    .await
    .expect("worktree creation task panicked")?;

    tokio::task::spawn_blocking({
        let worktree_path = worktree_path.clone();
        let workflow_id = workflow_id.clone();
        let pulse_id = pulse_id.clone();
        move || git::create_pulse_branch(&worktree_path, &workflow_id, &pulse_id)
    })
    .await
    .expect("pulse branch creation task panicked")?;

    let session_id = SessionId::new();
    let turn_id = TurnId::new();
    let system_prompt = roles.system_prompt(ctx.role, objective);
    let conversation_key = crate::session_runtime::roles::conversation_key(ctx.role, &ctx.agent_id);
    let tool_ctx = ToolContext {
        project_root: ctx.project_root.clone(),
        worktree_path: Some(worktree_path.clone()),
        workflow_id: Some(ctx.workflow_id),
        session_id,
        turn_id,
    };

    let mut turn = Turn::new(turn_id, session_id, TurnRole::Assistant);
    let message = turn
        .run(
            model,
            tools,
            approvals,
            &tool_ctx,
            system_prompt,
            conversation_key,
            objective.to_string(),
        )
        .await?;

    let fingerprint = fingerprint_worktree(&worktree_path).await?;

    Ok(PulseOutcome { message, worktree_path, fingerprint })
}

async fn fingerprint_worktree(worktree_path: &Path) -> Result<u64, PulseError> {
    let path = worktree_path.to_path_buf();
    tokio::task::spawn_blocking(move || compute_change_fingerprint(&path))
        .await
        .expect("fingerprint task panicked")
        .map_err(|err| PulseError::Fingerprint(err.to_string()))
}

#[cfg(test)]
#[path = "tests/pulse_tests.rs"]
mod tests;
