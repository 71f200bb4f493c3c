//! Shell-command approval allowlist (spec.md §4.5).
//!
//! Matching is by exact command string after normalization (whitespace
//! collapsed, trimmed) — no wildcard or regex mode. Fingerprints reuse
//! `sha2`, already a dependency for account-usage cache keys.

use sha2::{Digest, Sha256};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllowlistScope {
    /// Remembered for the lifetime of one session, reset at session end.
    Session,
    /// Persisted for the project across sessions.
    Project,
}

fn normalize(command: &str) -> String {
    command.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fingerprint(command: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(command).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Remembered shell-command approvals, partitioned by scope and by the
/// session/project they apply to.
#[derive(Default)]
pub struct ShellApprovalAllowlist {
    session: HashMap<String, std::collections::HashSet<String>>,
    project: std::collections::HashSet<String>,
}

impl ShellApprovalAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remember(&mut self, scope: AllowlistScope, session_id: &str, command: &str) {
        let fp = fingerprint(command);
        match scope {
            AllowlistScope::Session => {
                self.session.entry(session_id.to_string()).or_default().insert(fp);
            }
            AllowlistScope::Project => {
                self.project.insert(fp);
            }
        }
    }

    pub fn is_allowed(&self, session_id: &str, command: &str) -> bool {
        let fp = fingerprint(command);
        if self.project.contains(&fp) {
            return true;
        }
        self.session
            .get(session_id)
            .map(|set| set.contains(&fp))
            .unwrap_or(false)
    }

    /// Drop all session-scoped approvals for a session that has ended.
    pub fn clear_session(&mut self, session_id: &str) {
        self.session.remove(session_id);
    }
}
