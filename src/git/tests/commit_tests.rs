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
fn commit_all_stages_and_commits_with_pulse_trailer() {
    let dir = tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("new.txt"), "content\n").unwrap();

    let outcome = commit_all(dir.path(), "add new file", "pulse_1", None).unwrap();
    assert!(outcome.committed);

    let log = Command::new("git")
        .current_dir(dir.path())
        .args(["log", "-1", "--pretty=%B"])
        .output()
        .unwrap();
    let message = String::from_utf8_lossy(&log.stdout);
    assert!(message.contains("Autarch-Pulse-Id: pulse_1"));
}

#[test]
fn commit_all_is_noop_when_clean() {
    let dir = tempdir().unwrap();
    init_repo(dir.path());
    let head_before = current_head(dir.path()).unwrap();

    let outcome = commit_all(dir.path(), "nothing to do", "pulse_1", None).unwrap();
    assert!(!outcome.committed);
    assert_eq!(outcome.sha, head_before);
}

#[test]
fn commit_all_uses_author_override() {
    let dir = tempdir().unwrap();
    init_repo(dir.path());
    std::fs::write(dir.path().join("new.txt"), "content\n").unwrap();

    let author = AuthorIdentity {
        name: "Project Author".into(),
        email: "author@example.com".into(),
    };
    commit_all(dir.path(), "add file", "pulse_1", Some(&author)).unwrap();

    let log = Command::new("git")
        .current_dir(dir.path())
        .args(["log", "-1", "--pretty=%an <%ae> / %cn <%ce>"])
        .output()
        .unwrap();
    let line = String::from_utf8_lossy(&log.stdout);
    assert!(line.contains("Project Author <author@example.com>"));
    assert!(line.contains("Autarch <autarch@localhost>"));
}
