//! Git worktree, branch, and merge management.
//!
//! Every workflow owns a dedicated worktree and branch tree; pulses fork
//! short-lived branches from it. All mutation goes through `Command::new("git")`
//! with the target worktree as `current_dir`, never a git library, matching
//! the approach this crate inherited its git plumbing from.

pub mod commit;
pub mod credential;
pub mod merge;
pub mod worktree;

pub use commit::{commit_all, CommitOutcome};
pub use credential::CredentialPrompt;
pub use merge::{merge_pulse_into_workflow, merge_workflow_to_base, MergeOutcome};
pub use worktree::{
    branch_name_for_pulse, branch_name_for_workflow, cleanup_workflow_worktree,
    create_pulse_branch, create_workflow_worktree, is_git_repo, RepoInfo, WorktreeError,
};

pub const BRANCH_PREFIX: &str = "autarch";
pub const PULSE_ID_TRAILER: &str = "Autarch-Pulse-Id";
pub const WORKFLOW_ID_TRAILER: &str = "Autarch-Workflow-Id";
