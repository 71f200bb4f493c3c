//! Correlation-keyed interrupt registry with exactly-once resolution.

use crate::domain::types::{ApprovalId, SessionId, TurnId};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};

/// The payload an interrupt carries, distinguishing the four interrupt
/// kinds spec.md §4.5 names.
#[derive(Debug, Clone)]
pub enum InterruptPayload {
    ArtifactApproval {
        artifact_id: crate::domain::types::ArtifactId,
    },
    ShellApproval {
        command: String,
        reason: String,
    },
    CredentialPrompt {
        prompt: String,
    },
    QuestionSet {
        questions: Vec<String>,
    },
}

/// Resolution returned to the turn that raised the interrupt.
#[derive(Debug, Clone)]
pub enum Resolution {
    Approved,
    Denied,
    Credential(Option<String>),
    Answers(Vec<String>),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Interrupt {
    pub id: ApprovalId,
    pub session_id: SessionId,
    pub turn_id: TurnId,
    pub payload: InterruptPayload,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no interrupt registered with that id")]
    Unknown,
    #[error("interrupt already resolved")]
    AlreadyResolved,
}

struct Entry {
    interrupt: Interrupt,
    reply: Option<oneshot::Sender<Resolution>>,
}

/// Holds every outstanding interrupt across all workflows. One broker is
/// shared process-wide; callers distinguish workflows via `session_id`.
#[derive(Default)]
pub struct ApprovalBroker {
    entries: Mutex<HashMap<ApprovalId, Entry>>,
}

impl ApprovalBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new interrupt and return the receiver the caller awaits
    /// for its resolution.
    pub async fn register(&self, interrupt: Interrupt) -> oneshot::Receiver<Resolution> {
        let (tx, rx) = oneshot::channel();
        let id = interrupt.id;
        let entry = Entry {
            interrupt,
            reply: Some(tx),
        };
        self.entries.lock().await.insert(id, entry);
        rx
    }

    /// Resolve a pending interrupt exactly once.
    pub async fn resolve(
        &self,
        id: ApprovalId,
        resolution: Resolution,
    ) -> Result<(), ResolveError> {
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(&id).ok_or(ResolveError::Unknown)?;
        let reply = entry.reply.take().ok_or(ResolveError::AlreadyResolved)?;
        entries.remove(&id);
        // Receiver may have been dropped if the turn was cancelled; that's fine.
        let _ = reply.send(resolution);
        Ok(())
    }

    /// Snapshot of all currently outstanding interrupts.
    pub async fn list(&self) -> Vec<Interrupt> {
        self.entries
            .lock()
            .await
            .values()
            .map(|e| e.interrupt.clone())
            .collect()
    }

    /// On process restart, mark every interrupt whose session is no longer
    /// live as cancelled, surfacing an error to its waiter rather than
    /// leaving it to hang forever.
    pub async fn cancel_unbound(&self, live_sessions: &[SessionId]) {
        let mut entries = self.entries.lock().await;
        let stale: Vec<ApprovalId> = entries
            .iter()
            .filter(|(_, e)| !live_sessions.contains(&e.interrupt.session_id))
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(mut entry) = entries.remove(&id) {
                if let Some(reply) = entry.reply.take() {
                    let _ = reply.send(Resolution::Cancelled);
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/broker_tests.rs"]
mod tests;
