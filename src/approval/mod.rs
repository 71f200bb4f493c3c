//! Approval & interrupt broker (spec.md §4.5).
//!
//! Holds outstanding asynchronous interrupts (artifact approvals, shell
//! approvals, credential prompts, question sets) keyed by a correlation id,
//! and resolves each exactly once via a `tokio::oneshot` channel — the same
//! mailbox-with-oneshot-reply idiom `domain::actor` uses for commands.

pub mod broker;
pub mod shell_allowlist;

pub use broker::{ApprovalBroker, Interrupt, InterruptPayload, ResolveError, Resolution};
pub use shell_allowlist::{AllowlistScope, ShellApprovalAllowlist};
