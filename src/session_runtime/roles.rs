//! `RoleRegistry`: resolves a closed `AgentRole` to its system prompt, tool
//! set, and conversation-continuity key.
//!
//! Grounded on `config.rs`'s `WorkflowConfig`/`PhaseConfigs` for the
//! per-role settings and `phases/mod.rs`'s `planning_conversation_key`/
//! `reviewing_conversation_key`/etc. for the per-role, per-agent namespacing
//! pattern — generalized here into one function parameterized by role
//! rather than one function per phase. This is the "dynamic role-to-prompt
//! map replaced by a closed enum + startup registry" redesign.

use crate::config::{RoleConfig, WorkflowConfig};
use crate::domain::types::{AgentId, AgentRole};

/// Conversation key namespacing turns by role and agent instance, so a
/// reviewer's conversation never collides with the execution agent's.
pub fn conversation_key(role: AgentRole, agent_id: &AgentId) -> String {
    format!("{}/{}", role.as_str(), agent_id)
}

pub struct RoleRegistry {
    config: WorkflowConfig,
}

impl RoleRegistry {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn role_config(&self, role: AgentRole) -> Option<&RoleConfig> {
        self.config.get_role(role)
    }

    /// The system prompt a role's session opens with. Roles beyond the five
    /// driving the phase state machine (review_sub, discussion, etc.) reuse
    /// the same builder with their own framing sentence.
    pub fn system_prompt(&self, role: AgentRole, objective: &str) -> String {
        let framing = match role {
            AgentRole::Scoping => {
                "Determine whether this change is quick (a small, low-risk edit) or full \
                 (needs research and planning), and produce a scope card."
            }
            AgentRole::Research => {
                "Investigate the codebase and produce a research card summarizing relevant \
                 context for planning."
            }
            AgentRole::Planning => "Produce an implementation plan as a plan artifact.",
            AgentRole::Preflight => "Verify the workspace is ready before execution begins.",
            AgentRole::Execution => "Implement the approved plan, committing work as you go.",
            AgentRole::Review => "Review the implemented change and produce a review card.",
            AgentRole::ReviewSub => "Review the implemented change from your assigned angle.",
            AgentRole::RoadmapPlanning => "Plan the roadmap for this objective.",
            AgentRole::Discussion => "Discuss the objective with the user.",
            AgentRole::Basic => "Assist with the following objective.",
        };
        format!("{framing}\n\nObjective: {objective}")
    }

    pub fn reviewers(&self) -> &[AgentId] {
        &self.config.review.reviewers
    }
}

#[cfg(test)]
#[path = "tests/roles_tests.rs"]
mod tests;
