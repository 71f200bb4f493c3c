//! Workflow/pulse worktree and branch lifecycle.
//!
//! Generalizes the teacher's single-worktree-per-session model to the
//! `autarch/<workflowId>` workflow branch plus `autarch/<workflowId>-<pulseId>`
//! pulse branches forked from it (spec.md §4.4).

use super::BRANCH_PREFIX;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("not a git repository: {0}")]
    NotAGitRepo(PathBuf),
    #[error("git command failed: {0}")]
    CommandFailed(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct RepoInfo {
    pub repo_root: PathBuf,
    pub current_branch: Option<String>,
}

/// Check if a directory is inside a git repository.
pub fn is_git_repo(path: &Path) -> bool {
    Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--git-dir"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

fn get_repo_info(path: &Path) -> Result<RepoInfo, WorktreeError> {
    let output = Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--show-toplevel"])
        .output()?;

    if !output.status.success() {
        return Err(WorktreeError::NotAGitRepo(path.to_path_buf()));
    }

    let repo_root = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());

    let branch_output = Command::new("git")
        .current_dir(&repo_root)
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .output()?;
    let branch_str = String::from_utf8_lossy(&branch_output.stdout)
        .trim()
        .to_string();
    let current_branch = if branch_str == "HEAD" {
        None
    } else {
        Some(branch_str)
    };

    Ok(RepoInfo {
        repo_root,
        current_branch,
    })
}

pub fn branch_name_for_workflow(workflow_id: &str) -> String {
    format!("{BRANCH_PREFIX}/{workflow_id}")
}

pub fn branch_name_for_pulse(workflow_id: &str, pulse_id: &str) -> String {
    format!("{BRANCH_PREFIX}/{workflow_id}-{pulse_id}")
}

fn run_git(repo_root: &Path, args: &[&str]) -> Result<(), WorktreeError> {
    let output = Command::new("git")
        .current_dir(repo_root)
        .args(args)
        .output()?;
    if !output.status.success() {
        return Err(WorktreeError::CommandFailed(format!(
            "git {}: {}",
            args.join(" "),
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    Ok(())
}

/// Ensure the workflow branch exists and a worktree is attached to it.
/// Idempotent on retry: if the worktree directory already exists and is a
/// valid worktree on the right branch, this is a no-op.
pub fn create_workflow_worktree(
    project_root: &Path,
    workflow_id: &str,
    worktree_root: &Path,
) -> Result<PathBuf, WorktreeError> {
    if !is_git_repo(project_root) {
        return Err(WorktreeError::NotAGitRepo(project_root.to_path_buf()));
    }
    let repo = get_repo_info(project_root)?;
    let branch = branch_name_for_workflow(workflow_id);
    let worktree_path = worktree_root.join(workflow_id);

    if worktree_path.exists() && is_valid_worktree(&worktree_path) {
        return Ok(worktree_path);
    }

    let branch_exists = Command::new("git")
        .current_dir(&repo.repo_root)
        .args(["rev-parse", "--verify", &branch])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false);

    let args: Vec<&str> = if branch_exists {
        vec![
            "worktree",
            "add",
            worktree_path.to_str().unwrap_or_default(),
            &branch,
        ]
    } else {
        vec![
            "worktree",
            "add",
            "-b",
            &branch,
            worktree_path.to_str().unwrap_or_default(),
            "HEAD",
        ]
    };
    run_git(&repo.repo_root, &args)?;
    Ok(worktree_path)
}

pub fn is_valid_worktree(path: &Path) -> bool {
    if !path.exists() || !path.is_dir() {
        return false;
    }
    Command::new("git")
        .current_dir(path)
        .args(["rev-parse", "--is-inside-work-tree"])
        .output()
        .map(|o| o.status.success() && String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}

/// Fork a pulse branch off the workflow branch inside the workflow's worktree.
/// Returns the base commit the pulse forked from.
pub fn create_pulse_branch(
    worktree_path: &Path,
    workflow_id: &str,
    pulse_id: &str,
) -> Result<String, WorktreeError> {
    let branch = branch_name_for_pulse(workflow_id, pulse_id);
    run_git(worktree_path, &["checkout", "-b", &branch])?;

    let output = Command::new("git")
        .current_dir(worktree_path)
        .args(["rev-parse", "HEAD"])
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Remove the workflow's worktree (falling back to direct directory removal
/// plus `worktree prune`), and optionally delete the workflow branch.
pub fn cleanup_workflow_worktree(
    project_root: &Path,
    worktree_path: &Path,
    workflow_id: &str,
    delete_branch: bool,
) -> Result<(), WorktreeError> {
    let repo = get_repo_info(project_root)?;

    let output = Command::new("git")
        .current_dir(&repo.repo_root)
        .args([
            "worktree",
            "remove",
            "--force",
            worktree_path.to_str().unwrap_or_default(),
        ])
        .output()?;

    if !output.status.success() {
        let _ = std::fs::remove_dir_all(worktree_path);
        run_git(&repo.repo_root, &["worktree", "prune"])?;
    }

    if delete_branch {
        let branch = branch_name_for_workflow(workflow_id);
        let _ = Command::new("git")
            .current_dir(&repo.repo_root)
            .args(["branch", "-D", &branch])
            .output();
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/worktree_tests.rs"]
mod tests;
