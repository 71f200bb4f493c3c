//! Merge strategies for landing a workflow branch onto its base, and for
//! folding a completed pulse branch back into the workflow branch
//! (spec.md §4.4).

use super::worktree::WorktreeError;
use super::{PULSE_ID_TRAILER, WORKFLOW_ID_TRAILER};
use crate::domain::types::MergeStrategy;
use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command;

pub struct MergeOutcome {
    pub base_tip: String,
}

fn run(repo_root: &Path, args: &[&str]) -> Result<String, WorktreeError> {
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
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn has_uncommitted_changes(worktree_path: &Path) -> Result<bool, WorktreeError> {
    let output = Command::new("git")
        .current_dir(worktree_path)
        .args(["status", "--porcelain"])
        .output()?;
    Ok(!output.stdout.is_empty())
}

/// Scan `base..source` for `Autarch-Pulse-Id:` trailers, deduplicated and
/// sorted, so pulse identity survives squash-merge history flattening.
fn extract_pulse_ids(repo_root: &Path, base: &str, source: &str) -> Result<Vec<String>, WorktreeError> {
    let log = run(
        repo_root,
        &[
            "log",
            &format!("{base}..{source}"),
            &format!("--pretty=format:%(trailers:key={PULSE_ID_TRAILER},valueonly)"),
        ],
    )?;
    let mut ids: BTreeSet<String> = log
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    Ok(ids.drain(..).collect())
}

/// Merge the workflow branch into the base branch using `strategy`. Must be
/// run with `repo_root`'s own worktree checked out to the base branch (the
/// project's main worktree, never a workflow worktree).
pub fn merge_workflow_to_base(
    repo_root: &Path,
    base_branch: &str,
    workflow_branch: &str,
    workflow_id: &str,
    strategy: MergeStrategy,
    commit_message: Option<&str>,
) -> Result<MergeOutcome, WorktreeError> {
    if has_uncommitted_changes(repo_root)? {
        return Err(WorktreeError::CommandFailed(
            "refusing to merge: worktree has uncommitted changes".into(),
        ));
    }

    run(repo_root, &["checkout", base_branch])?;
    let pre_merge_base_tip = run(repo_root, &["rev-parse", "HEAD"])?;

    match strategy {
        MergeStrategy::FastForward => {
            run(repo_root, &["merge", "--ff-only", workflow_branch])?;
        }
        MergeStrategy::Squash => {
            let pulse_ids = extract_pulse_ids(repo_root, &pre_merge_base_tip, workflow_branch)?;
            run(repo_root, &["merge", "--squash", workflow_branch])?;
            let mut message = commit_message
                .unwrap_or("merge workflow branch")
                .to_string();
            for pulse_id in &pulse_ids {
                message.push_str(&format!("\n\n{PULSE_ID_TRAILER}: {pulse_id}"));
            }
            message.push_str(&format!("\n\n{WORKFLOW_ID_TRAILER}: {workflow_id}"));
            run(repo_root, &["commit", "-m", &message])?;
        }
        MergeStrategy::MergeCommit => {
            let message = commit_message
                .map(String::from)
                .unwrap_or_else(|| format!("merge {workflow_branch} into {base_branch}"));
            run(
                repo_root,
                &["merge", "--no-ff", "-m", &message, workflow_branch],
            )?;
        }
        MergeStrategy::Rebase => {
            run(repo_root, &["checkout", workflow_branch])?;
            let rebase = Command::new("git")
                .current_dir(repo_root)
                .args(["rebase", base_branch])
                .output()?;
            if !rebase.status.success() {
                let _ = Command::new("git")
                    .current_dir(repo_root)
                    .args(["rebase", "--abort"])
                    .output();
                run(repo_root, &["checkout", base_branch])?;
                return Err(WorktreeError::CommandFailed(format!(
                    "rebase failed, aborted: {}",
                    String::from_utf8_lossy(&rebase.stderr)
                )));
            }
            run(repo_root, &["checkout", base_branch])?;
            run(repo_root, &["merge", "--ff-only", workflow_branch])?;
        }
    }

    let base_tip = run(repo_root, &["rev-parse", "HEAD"])?;
    Ok(MergeOutcome { base_tip })
}

/// Fast-forward the pulse branch into the workflow branch, then force-delete
/// the pulse branch on success.
pub fn merge_pulse_into_workflow(
    worktree_path: &Path,
    workflow_branch: &str,
    pulse_branch: &str,
) -> Result<MergeOutcome, WorktreeError> {
    run(worktree_path, &["checkout", workflow_branch])?;
    run(worktree_path, &["merge", "--ff-only", pulse_branch])?;
    let base_tip = run(worktree_path, &["rev-parse", "HEAD"])?;
    run(worktree_path, &["branch", "-D", pulse_branch])?;
    Ok(MergeOutcome { base_tip })
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
