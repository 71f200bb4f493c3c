//! Role registry configuration.
//!
//! Resolves the spec's dynamic role-to-prompt map into a startup-validated
//! registry over the closed `AgentRole` enumeration: each role names the CLI
//! command backing it, its allowed tool set, and an optional turn budget.

use crate::domain::types::{AgentId, AgentRole};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    pub roles: HashMap<AgentRole, RoleConfig>,
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoleConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub max_turns: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReviewConfig {
    pub reviewers: Vec<AgentId>,
    #[serde(default)]
    pub mode: ReviewModeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewModeConfig {
    #[default]
    Parallel,
    Sequential,
}

/// Roles that must be configured for a workflow to run end to end.
const REQUIRED_ROLES: [AgentRole; 5] = [
    AgentRole::Scoping,
    AgentRole::Research,
    AgentRole::Planning,
    AgentRole::Execution,
    AgentRole::Review,
];

impl WorkflowConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config file as YAML: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default configuration compiled from `workflow.yaml`.
    pub fn default_config() -> Self {
        const DEFAULT_WORKFLOW_YAML: &str = include_str!("../workflow.yaml");
        let config: Self = serde_yaml::from_str(DEFAULT_WORKFLOW_YAML)
            .expect("failed to parse embedded workflow.yaml - this is a bug in the file");
        config
            .validate()
            .expect("embedded workflow.yaml failed validation - this is a bug in the file");
        config
    }

    fn validate(&self) -> Result<()> {
        for role in REQUIRED_ROLES {
            if !self.roles.contains_key(&role) {
                anyhow::bail!("role '{}' not found in roles configuration", role.as_str());
            }
        }
        if self.review.reviewers.is_empty() {
            anyhow::bail!("at least one reviewer must be configured");
        }
        Ok(())
    }

    /// Get role config by role.
    pub fn get_role(&self, role: AgentRole) -> Option<&RoleConfig> {
        self.roles.get(&role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = WorkflowConfig::default_config();
        assert!(config.get_role(AgentRole::Scoping).is_some());
        assert!(config.get_role(AgentRole::Review).is_some());
        assert!(!config.review.reviewers.is_empty());
    }

    #[test]
    fn yaml_parsing_round_trips() {
        let yaml = r#"
roles:
  scoping:
    command: "claude"
    args: ["-p"]
  research:
    command: "claude"
    args: ["-p"]
  planning:
    command: "claude"
    args: ["-p"]
  execution:
    command: "claude"
    args: ["-p"]
  review:
    command: "claude"
    args: ["-p"]

review:
  reviewers: ["claude-main"]
  mode: parallel
"#;
        let config: WorkflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.review.mode, ReviewModeConfig::Parallel);
    }

    #[test]
    fn validation_rejects_missing_role() {
        let yaml = r#"
roles:
  scoping:
    command: "claude"

review:
  reviewers: ["claude-main"]
"#;
        let config: WorkflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_rejects_empty_reviewers() {
        let yaml = r#"
roles:
  scoping: { command: "claude" }
  research: { command: "claude" }
  planning: { command: "claude" }
  execution: { command: "claude" }
  review: { command: "claude" }

review:
  reviewers: []
"#;
        let config: WorkflowConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }
}
