//! Process-wide facade over every live workflow (spec.md §1, §9's
//! "per-workflow scheduler" design note). This is the single legal entry
//! point for mutating a workflow: every public method here either routes a
//! `WorkflowCommand` to that workflow's `WorkflowScheduler` mailbox
//! (ground: `domain::actor`) or resolves an outstanding interrupt via the
//! shared `ApprovalBroker` (ground: `approval::broker`).

use crate::approval::{ApprovalBroker, ResolveError, Resolution};
use crate::domain::actor::{create_actor_args, WorkflowMessage, WorkflowScheduler};
use crate::domain::errors::WorkflowError;
use crate::domain::failure::FailureContext;
use crate::domain::types::{
    AgentId, ApprovalId, FeatureName, MergeStrategy, Objective, Phase, ProjectRoot, ScopePath,
    WorkflowId,
};
use crate::domain::view::WorkflowView;
use crate::domain::WorkflowCommand;
use ractor::{Actor, ActorRef, SpawnErr};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{oneshot, RwLock};

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("workflow {0} is not registered with this orchestrator")]
    UnknownWorkflow(WorkflowId),
    #[error("failed to spawn workflow scheduler: {0}")]
    Spawn(#[from] SpawnErr),
    #[error(transparent)]
    Command(#[from] WorkflowError),
    #[error("the scheduler's reply channel was dropped")]
    SchedulerGone,
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Owns every live workflow's actor handle plus the process-wide approval
/// broker. One instance per running process.
pub struct Orchestrator {
    workflows: RwLock<HashMap<WorkflowId, ActorRef<WorkflowMessage>>>,
    approvals: Arc<ApprovalBroker>,
}

impl Orchestrator {
    pub fn new(approvals: Arc<ApprovalBroker>) -> Self {
        Self {
            workflows: RwLock::new(HashMap::new()),
            approvals,
        }
    }

    pub fn approvals(&self) -> &Arc<ApprovalBroker> {
        &self.approvals
    }

    async fn handle_for(&self, workflow_id: WorkflowId) -> Result<ActorRef<WorkflowMessage>, OrchestratorError> {
        self.workflows
            .read()
            .await
            .get(&workflow_id)
            .cloned()
            .ok_or(OrchestratorError::UnknownWorkflow(workflow_id))
    }

    async fn dispatch(
        &self,
        workflow_id: WorkflowId,
        command: WorkflowCommand,
    ) -> Result<WorkflowView, OrchestratorError> {
        let handle = self.handle_for(workflow_id).await?;
        let (tx, rx) = oneshot::channel();
        handle
            .send_message(WorkflowMessage::Command(Box::new(command), tx))
            .map_err(|_| OrchestratorError::SchedulerGone)?;
        let view = rx.await.map_err(|_| OrchestratorError::SchedulerGone)??;
        Ok(view)
    }

    /// Spawn a new workflow's scheduler and initialize its aggregate.
    ///
    /// NOTE: spawns the scheduler directly rather than through a
    /// `WorkflowSupervisor`, so this orchestrator does not yet get
    /// crash-restart for free (see DESIGN.md Open Questions).
    pub async fn create_workflow(
        &self,
        feature_name: FeatureName,
        objective: Objective,
        project_root: ProjectRoot,
        scope_path: Option<ScopePath>,
    ) -> Result<(WorkflowId, WorkflowView), OrchestratorError> {
        let workflow_id = WorkflowId::new();
        let (args, _snapshot_rx, _event_rx) = create_actor_args(&workflow_id.to_string())
            .map_err(|err| OrchestratorError::Command(WorkflowError::StorageFailure {
                message: err.to_string(),
            }))?;
        let (handle, _join) = WorkflowScheduler::spawn(None, WorkflowScheduler, args).await?;

        self.workflows.write().await.insert(workflow_id, handle);

        let view = self
            .dispatch(
                workflow_id,
                WorkflowCommand::CreateWorkflow {
                    feature_name,
                    objective,
                    project_root,
                    scope_path,
                },
            )
            .await?;
        Ok((workflow_id, view))
    }

    pub async fn start_pulse(&self, workflow_id: WorkflowId) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::StartPulse).await
    }

    pub async fn submit_artifact(
        &self,
        workflow_id: WorkflowId,
        body: String,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::SubmitArtifact { body }).await
    }

    pub async fn approve(
        &self,
        workflow_id: WorkflowId,
        merge_strategy: Option<MergeStrategy>,
        commit_message: Option<String>,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(
            workflow_id,
            WorkflowCommand::ApproveArtifact { merge_strategy, commit_message },
        )
        .await
    }

    pub async fn request_changes(
        &self,
        workflow_id: WorkflowId,
        feedback: String,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::RequestChanges { feedback })
            .await
    }

    pub async fn request_fixes(
        &self,
        workflow_id: WorkflowId,
        comment_ids: Vec<String>,
        summary: String,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(
            workflow_id,
            WorkflowCommand::RequestFixes { comment_ids, summary },
        )
        .await
    }

    pub async fn rewind(
        &self,
        workflow_id: WorkflowId,
        target: Phase,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::Rewind { target }).await
    }

    /// Record a pulse's outcome (ground: `pulse::run_pulse`'s fingerprint).
    pub async fn complete_pulse(
        &self,
        workflow_id: WorkflowId,
        fingerprint: u64,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::CompletePulse { fingerprint })
            .await
    }

    pub async fn record_invocation(
        &self,
        workflow_id: WorkflowId,
        agent_id: AgentId,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::RecordInvocation { agent_id })
            .await
    }

    pub async fn record_failure(
        &self,
        workflow_id: WorkflowId,
        failure: FailureContext,
    ) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::RecordFailure { failure })
            .await
    }

    pub async fn clear_failure(&self, workflow_id: WorkflowId) -> Result<WorkflowView, OrchestratorError> {
        self.dispatch(workflow_id, WorkflowCommand::ClearFailure).await
    }

    pub async fn archive(
        &self,
        workflow_id: WorkflowId,
        reason: String,
    ) -> Result<WorkflowView, OrchestratorError> {
        let view = self.dispatch(workflow_id, WorkflowCommand::Archive { reason }).await?;
        self.workflows.write().await.remove(&workflow_id);
        Ok(view)
    }

    /// Resolve a pending shell-command or artifact approval.
    pub async fn resolve_shell_approval(
        &self,
        approval_id: ApprovalId,
        resolution: Resolution,
    ) -> Result<(), OrchestratorError> {
        self.approvals.resolve(approval_id, resolution).await?;
        Ok(())
    }

    /// Resolve an outstanding git-credential prompt raised mid-pulse.
    pub async fn resolve_credential_prompt(
        &self,
        approval_id: ApprovalId,
        credential: Option<String>,
    ) -> Result<(), OrchestratorError> {
        self.approvals
            .resolve(approval_id, Resolution::Credential(credential))
            .await?;
        Ok(())
    }

    pub async fn view(&self, workflow_id: WorkflowId) -> Result<WorkflowView, OrchestratorError> {
        let handle = self.handle_for(workflow_id).await?;
        self.view_via(&handle).await
    }

    async fn view_via(
        &self,
        handle: &ActorRef<WorkflowMessage>,
    ) -> Result<WorkflowView, OrchestratorError> {
        let (tx, rx) = oneshot::channel();
        handle
            .send_message(WorkflowMessage::GetView(tx))
            .map_err(|_| OrchestratorError::SchedulerGone)?;
        rx.await.map_err(|_| OrchestratorError::SchedulerGone)
    }

    /// Re-attach to a workflow created by an earlier process, bootstrapping
    /// its scheduler from the persisted event log rather than replaying
    /// `CreateWorkflow` (ground: `domain::actor::bootstrap_view_from_events`,
    /// spec.md §5's resumability requirement). A no-op if the workflow
    /// already has a live handle in this registry. Errors with
    /// `UnknownWorkflow` if the event log has no record of this id at all.
    pub async fn resume_workflow(
        &self,
        workflow_id: WorkflowId,
    ) -> Result<WorkflowView, OrchestratorError> {
        if let Ok(handle) = self.handle_for(workflow_id).await {
            return self.view_via(&handle).await;
        }

        let (args, _snapshot_rx, _event_rx) = create_actor_args(&workflow_id.to_string())
            .map_err(|err| {
                OrchestratorError::Command(WorkflowError::StorageFailure { message: err.to_string() })
            })?;
        let (handle, _join) = WorkflowScheduler::spawn(None, WorkflowScheduler, args).await?;
        let view = self.view_via(&handle).await?;
        if view.workflow_id().is_none() {
            return Err(OrchestratorError::UnknownWorkflow(workflow_id));
        }
        self.workflows.write().await.insert(workflow_id, handle);
        Ok(view)
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;
