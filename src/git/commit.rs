//! Commit staging with structured trailers (spec.md §4.4, §6).

use super::worktree::WorktreeError;
use super::PULSE_ID_TRAILER;
use std::path::Path;
use std::process::Command;

const COMMITTER_NAME: &str = "Autarch";
const COMMITTER_EMAIL: &str = "autarch@localhost";

pub struct CommitOutcome {
    /// Commit sha. When `committed` is false, this is the unchanged HEAD.
    pub sha: String,
    pub committed: bool,
}

/// Resolved commit author identity: project setting, falling back to
/// `git config user.name`/`user.email`, falling back to omitted (committer
/// identity is used for both).
pub struct AuthorIdentity {
    pub name: String,
    pub email: String,
}

fn current_head(worktree_path: &Path) -> Result<String, WorktreeError> {
    let output = Command::new("git")
        .current_dir(worktree_path)
        .args(["rev-parse", "HEAD"])
        .output()?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn has_changes(worktree_path: &Path) -> Result<bool, WorktreeError> {
    let output = Command::new("git")
        .current_dir(worktree_path)
        .args(["status", "--porcelain"])
        .output()?;
    Ok(!output.stdout.is_empty())
}

/// Stage all changes and commit with the fixed Autarch committer identity
/// and the given trailers. Returns the unchanged HEAD with `committed: false`
/// if there was nothing to commit.
pub fn commit_all(
    worktree_path: &Path,
    message: &str,
    pulse_id: &str,
    author: Option<&AuthorIdentity>,
) -> Result<CommitOutcome, WorktreeError> {
    let add = Command::new("git")
        .current_dir(worktree_path)
        .args(["add", "-A"])
        .output()?;
    if !add.status.success() {
        return Err(WorktreeError::CommandFailed(format!(
            "git add -A: {}",
            String::from_utf8_lossy(&add.stderr)
        )));
    }

    if !has_changes(worktree_path)? {
        return Ok(CommitOutcome {
            sha: current_head(worktree_path)?,
            committed: false,
        });
    }

    let full_message = format!("{message}\n\n{PULSE_ID_TRAILER}: {pulse_id}");

    let mut cmd = Command::new("git");
    cmd.current_dir(worktree_path)
        .env("GIT_COMMITTER_NAME", COMMITTER_NAME)
        .env("GIT_COMMITTER_EMAIL", COMMITTER_EMAIL);

    if let Some(author) = author {
        cmd.env("GIT_AUTHOR_NAME", &author.name)
            .env("GIT_AUTHOR_EMAIL", &author.email);
    } else {
        cmd.env("GIT_AUTHOR_NAME", COMMITTER_NAME)
            .env("GIT_AUTHOR_EMAIL", COMMITTER_EMAIL);
    }

    let output = cmd.args(["commit", "-m", &full_message]).output()?;
    if !output.status.success() {
        return Err(WorktreeError::CommandFailed(format!(
            "git commit: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    Ok(CommitOutcome {
        sha: current_head(worktree_path)?,
        committed: true,
    })
}

#[cfg(test)]
#[path = "tests/commit_tests.rs"]
mod tests;
