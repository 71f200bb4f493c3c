use super::*;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn init_repo(path: &Path) {
    Command::new("git")
        .current_dir(path)
        .args(["init", "-q"])
        .output()
        .unwrap();
    Command::new("git")
        .current_dir(path)
        .args(["config", "user.email", "test@example.com"])
        .output()
        .unwrap();
    Command::new("git")
        .current_dir(path)
        .args(["config", "user.name", "Test"])
        .output()
        .unwrap();
    std::fs::write(path.join("README.md"), "hello\n").unwrap();
    Command::new("git")
        .current_dir(path)
        .args(["add", "-A"])
        .output()
        .unwrap();
    Command::new("git")
        .current_dir(path)
        .args(["commit", "-q", "-m", "init"])
        .output()
        .unwrap();
}

#[test]
fn non_git_dir_is_not_a_repo() {
    let dir = tempdir().unwrap();
    assert!(!is_git_repo(dir.path()));
}

#[test]
fn branch_naming_is_stable() {
    assert_eq!(branch_name_for_workflow("wf_1"), "autarch/wf_1");
    assert_eq!(
        branch_name_for_pulse("wf_1", "pulse_2"),
        "autarch/wf_1-pulse_2"
    );
}

#[test]
fn create_workflow_worktree_is_idempotent() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let worktrees = tempdir().unwrap();

    let first = create_workflow_worktree(repo.path(), "wf_1", worktrees.path()).unwrap();
    assert!(is_valid_worktree(&first));

    let second = create_workflow_worktree(repo.path(), "wf_1", worktrees.path()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn create_pulse_branch_forks_from_workflow_branch() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let worktrees = tempdir().unwrap();
    let wt = create_workflow_worktree(repo.path(), "wf_1", worktrees.path()).unwrap();

    let base = create_pulse_branch(&wt, "wf_1", "pulse_1").unwrap();
    assert_eq!(base.len(), 40);
}

#[test]
fn cleanup_removes_worktree_directory() {
    let repo = tempdir().unwrap();
    init_repo(repo.path());
    let worktrees = tempdir().unwrap();
    let wt = create_workflow_worktree(repo.path(), "wf_1", worktrees.path()).unwrap();

    cleanup_workflow_worktree(repo.path(), &wt, "wf_1", true).unwrap();
    assert!(!wt.exists());
}
