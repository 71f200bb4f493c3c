//! Artifact store trait + in-memory implementation.

use super::types::{Plan, ResearchCard, ReviewCard, ScopeCard};
use crate::domain::types::{ArtifactId, ArtifactStatus, WorkflowId};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub enum Artifact {
    Scope(ScopeCard),
    Research(ResearchCard),
    Plan(Plan),
    Review(ReviewCard),
}

impl Artifact {
    pub fn id(&self) -> ArtifactId {
        match self {
            Artifact::Scope(a) => a.id,
            Artifact::Research(a) => a.id,
            Artifact::Plan(a) => a.id,
            Artifact::Review(a) => a.id,
        }
    }

    pub fn status(&self) -> ArtifactStatus {
        match self {
            Artifact::Scope(a) => a.status,
            Artifact::Research(a) => a.status,
            Artifact::Plan(a) => a.status,
            Artifact::Review(a) => a.status,
        }
    }

    fn set_status(&mut self, status: ArtifactStatus) {
        match self {
            Artifact::Scope(a) => a.status = status,
            Artifact::Research(a) => a.status = status,
            Artifact::Plan(a) => a.status = status,
            Artifact::Review(a) => a.status = status,
        }
    }
}

#[derive(Debug, Error)]
pub enum ArtifactStoreError {
    #[error("workflow already has a pending artifact")]
    AlreadyPending,
    #[error("no artifact with that id")]
    NotFound,
    #[error("artifact is not pending")]
    NotPending,
}

#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn submit(
        &self,
        workflow_id: WorkflowId,
        artifact: Artifact,
    ) -> Result<(), ArtifactStoreError>;
    async fn mark_approved(&self, id: ArtifactId) -> Result<(), ArtifactStoreError>;
    async fn mark_denied(&self, id: ArtifactId) -> Result<(), ArtifactStoreError>;
    async fn get(&self, id: ArtifactId) -> Option<Artifact>;
    async fn pending_for_workflow(&self, workflow_id: WorkflowId) -> Option<Artifact>;
    async fn list_for_workflow(&self, workflow_id: WorkflowId) -> Vec<Artifact>;
}

/// In-memory artifact store enforcing the at-most-one-pending invariant.
/// Artifacts are appended, never removed, so rewinds can hide later-stage
/// artifacts by status without losing history.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    by_workflow: RwLock<HashMap<WorkflowId, Vec<Artifact>>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn submit(
        &self,
        workflow_id: WorkflowId,
        artifact: Artifact,
    ) -> Result<(), ArtifactStoreError> {
        let mut guard = self.by_workflow.write().await;
        let artifacts = guard.entry(workflow_id).or_default();
        if artifacts
            .iter()
            .any(|a| a.status() == ArtifactStatus::Pending)
        {
            return Err(ArtifactStoreError::AlreadyPending);
        }
        artifacts.push(artifact);
        Ok(())
    }

    async fn mark_approved(&self, id: ArtifactId) -> Result<(), ArtifactStoreError> {
        self.transition(id, ArtifactStatus::Approved).await
    }

    async fn mark_denied(&self, id: ArtifactId) -> Result<(), ArtifactStoreError> {
        self.transition(id, ArtifactStatus::Denied).await
    }

    async fn get(&self, id: ArtifactId) -> Option<Artifact> {
        let guard = self.by_workflow.read().await;
        guard
            .values()
            .flatten()
            .find(|a| a.id() == id)
            .cloned()
    }

    async fn pending_for_workflow(&self, workflow_id: WorkflowId) -> Option<Artifact> {
        let guard = self.by_workflow.read().await;
        guard
            .get(&workflow_id)?
            .iter()
            .find(|a| a.status() == ArtifactStatus::Pending)
            .cloned()
    }

    async fn list_for_workflow(&self, workflow_id: WorkflowId) -> Vec<Artifact> {
        let guard = self.by_workflow.read().await;
        guard.get(&workflow_id).cloned().unwrap_or_default()
    }
}

impl InMemoryArtifactStore {
    async fn transition(
        &self,
        id: ArtifactId,
        status: ArtifactStatus,
    ) -> Result<(), ArtifactStoreError> {
        let mut guard = self.by_workflow.write().await;
        let artifact = guard
            .values_mut()
            .flatten()
            .find(|a| a.id() == id)
            .ok_or(ArtifactStoreError::NotFound)?;
        if artifact.status() != ArtifactStatus::Pending {
            return Err(ArtifactStoreError::NotPending);
        }
        artifact.set_status(status);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
