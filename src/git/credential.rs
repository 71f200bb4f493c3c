//! Askpass-backed credential prompt plumbing (spec.md §4.5).
//!
//! Git operations that need a credential (clone/push/fetch over HTTPS, a
//! passphrase-protected key) invoke `GIT_ASKPASS`/`SSH_ASKPASS`. We point
//! both at this binary's `askpass` subcommand, which writes the prompt text
//! to a file the parent process reads, then blocks on a response file the
//! approval broker writes once the human answers.

use std::path::{Path, PathBuf};
use std::process::Command;

/// A single outstanding credential request surfaced to the approval broker.
#[derive(Debug, Clone)]
pub struct CredentialPrompt {
    pub prompt: String,
    pub request_path: PathBuf,
    pub response_path: PathBuf,
}

/// Wire `GIT_ASKPASS`/`SSH_ASKPASS` on `cmd` to the given helper binary path,
/// with the per-invocation request/response file pair appended as args.
pub fn configure_askpass(cmd: &mut Command, helper_path: &Path, prompt: &CredentialPrompt) {
    let helper_invocation = format!(
        "{} {} {}",
        helper_path.display(),
        prompt.request_path.display(),
        prompt.response_path.display()
    );
    cmd.env("GIT_ASKPASS", &helper_invocation);
    cmd.env("SSH_ASKPASS", &helper_invocation);
    cmd.env("SSH_ASKPASS_REQUIRE", "force");
}

/// Write the prompt text the askpass helper will display, and clear any
/// stale response from a previous invocation reusing the same paths.
pub fn write_prompt(prompt: &CredentialPrompt) -> std::io::Result<()> {
    std::fs::write(&prompt.request_path, &prompt.prompt)?;
    let _ = std::fs::remove_file(&prompt.response_path);
    Ok(())
}

/// Read the resolved credential once the approval broker has written it.
/// `None` means the human answered with an empty/cancelled credential.
pub fn read_response(prompt: &CredentialPrompt) -> std::io::Result<Option<String>> {
    let content = std::fs::read_to_string(&prompt.response_path)?;
    let trimmed = content.trim();
    Ok(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}
