//! Centralized home-based storage paths for all workflow persistence.
//!
//! Layout under `~/.autarch/`:
//! - `state/<wd-hash>/` - workflow state qualified by project root
//! - `logs/<wd-hash>/` - workflow/agent stream logs qualified by project root
//! - `events/` - per-workflow event log + snapshot files
//! - `logs/debug.log` - debug log

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const AUTARCH_DIR: &str = ".autarch";

/// Returns the home-based autarch directory: `~/.autarch/`. Creates it if absent.
pub fn autarch_home_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("could not determine home directory for autarch storage")?;
    let dir = home.join(AUTARCH_DIR);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create autarch directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the events directory: `~/.autarch/events/`.
pub fn events_dir() -> Result<PathBuf> {
    let dir = autarch_home_dir()?.join("events");
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create events directory: {}", dir.display()))?;
    Ok(dir)
}

/// Event log path for a workflow: `~/.autarch/events/<workflow-id>.jsonl`.
pub fn workflow_event_log_path(workflow_id: &str) -> Result<PathBuf> {
    Ok(events_dir()?.join(format!("{}.jsonl", workflow_id)))
}

/// Aggregate snapshot path for a workflow: `~/.autarch/events/<workflow-id>.snapshot.json`.
pub fn workflow_aggregate_snapshot_path(workflow_id: &str) -> Result<PathBuf> {
    Ok(events_dir()?.join(format!("{}.snapshot.json", workflow_id)))
}

/// Returns the state directory for a project root: `~/.autarch/state/<root-hash>/`.
pub fn state_dir(project_root: &Path) -> Result<PathBuf> {
    let hash = project_root_hash(project_root);
    let dir = autarch_home_dir()?.join("state").join(&hash);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create state directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the state file path for a feature within a project root.
pub fn state_path(project_root: &Path, feature_name: &str) -> Result<PathBuf> {
    Ok(state_dir(project_root)?.join(format!("{}.json", feature_name)))
}

/// Returns the logs directory for a project root: `~/.autarch/logs/<root-hash>/`.
pub fn logs_dir(project_root: &Path) -> Result<PathBuf> {
    let hash = project_root_hash(project_root);
    let dir = autarch_home_dir()?.join("logs").join(&hash);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create logs directory: {}", dir.display()))?;
    Ok(dir)
}

/// Returns the debug log path: `~/.autarch/logs/debug.log`.
pub fn debug_log_path() -> Result<PathBuf> {
    let logs = autarch_home_dir()?.join("logs");
    fs::create_dir_all(&logs)
        .with_context(|| format!("failed to create logs directory: {}", logs.display()))?;
    Ok(logs.join("debug.log"))
}

/// Workflow-scoped structured log path: `~/.autarch/logs/<root-hash>/workflow-<id>.jsonl`.
pub fn workflow_log_path(project_root: &Path, workflow_id: &str) -> Result<PathBuf> {
    Ok(logs_dir(project_root)?.join(format!("workflow-{}.jsonl", workflow_id)))
}

/// Agent stream log path: `~/.autarch/logs/<root-hash>/agent-stream-<pulse>.jsonl`.
pub fn agent_stream_log_path(project_root: &Path, pulse_id: &str) -> Result<PathBuf> {
    Ok(logs_dir(project_root)?.join(format!("agent-stream-{}.jsonl", pulse_id)))
}

/// Computes a project root hash (SHA256 truncated to 12 hex characters).
///
/// Canonicalizes first for consistency across symlinks, falling back to the
/// raw path bytes if canonicalization fails (e.g. a deleted directory).
pub fn project_root_hash(path: &Path) -> String {
    let bytes = match fs::canonicalize(path) {
        Ok(canonical) => canonical.to_string_lossy().into_owned().into_bytes(),
        Err(_) => {
            #[cfg(unix)]
            {
                use std::os::unix::ffi::OsStrExt;
                path.as_os_str().as_bytes().to_vec()
            }
            #[cfg(not(unix))]
            {
                path.to_string_lossy().into_owned().into_bytes()
            }
        }
    };

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let result = hasher.finalize();
    hex_encode(&result[..6])
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn project_root_hash_is_consistent() {
        let dir = tempdir().unwrap();
        let hash1 = project_root_hash(dir.path());
        let hash2 = project_root_hash(dir.path());
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 12);
    }

    #[test]
    fn project_root_hash_differs_across_paths() {
        let dir1 = tempdir().unwrap();
        let dir2 = tempdir().unwrap();
        assert_ne!(project_root_hash(dir1.path()), project_root_hash(dir2.path()));
    }

    #[test]
    fn hex_encode_matches_expected() {
        assert_eq!(hex_encode(&[0x00, 0xff, 0x10]), "00ff10");
    }
}
