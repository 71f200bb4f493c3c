use super::*;
use crate::config::WorkflowConfig;
use crate::domain::types::{AgentId, AgentRole};

#[test]
fn conversation_key_namespaces_by_role_and_agent() {
    let agent = AgentId::from("claude-main");
    assert_eq!(
        conversation_key(AgentRole::Planning, &agent),
        "planning/claude-main"
    );
    assert_eq!(
        conversation_key(AgentRole::Review, &agent),
        "review/claude-main"
    );
}

#[test]
fn system_prompt_embeds_the_objective() {
    let registry = RoleRegistry::new(WorkflowConfig::default_config());
    let prompt = registry.system_prompt(AgentRole::Execution, "add a retry to the uploader");

    assert!(prompt.contains("add a retry to the uploader"));
    assert!(prompt.contains("Implement the approved plan"));
}

#[test]
fn every_role_has_a_distinct_framing_sentence() {
    let registry = RoleRegistry::new(WorkflowConfig::default_config());
    let roles = [
        AgentRole::Scoping,
        AgentRole::Research,
        AgentRole::Planning,
        AgentRole::Preflight,
        AgentRole::Execution,
        AgentRole::Review,
        AgentRole::ReviewSub,
        AgentRole::RoadmapPlanning,
        AgentRole::Discussion,
        AgentRole::Basic,
    ];
    let prompts: Vec<String> = roles
        .iter()
        .map(|role| registry.system_prompt(*role, "objective"))
        .collect();

    for (i, a) in prompts.iter().enumerate() {
        for (j, b) in prompts.iter().enumerate() {
            if i != j {
                assert_ne!(a, b, "roles {:?} and {:?} share a framing sentence", roles[i], roles[j]);
            }
        }
    }
}

#[test]
fn reviewers_come_from_the_review_config() {
    let registry = RoleRegistry::new(WorkflowConfig::default_config());
    assert!(!registry.reviewers().is_empty());
}
