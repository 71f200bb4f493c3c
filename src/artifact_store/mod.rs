//! Typed artifact persistence (spec.md §4.6).
//!
//! Artifacts are produced once per stage, submitted via a `submit_*` tool
//! call, and never deleted — rewinds hide later-stage artifacts by status
//! rather than removing them (the stage-boundary timeline in
//! `stage_timeline` relies on the full history staying intact). Grounded
//! on `domain::review`'s versioned-record shape and on the aggregate's own
//! `pending_artifact` field for the at-most-one-pending invariant.

pub mod store;
pub mod types;

pub use store::{ArtifactStore, ArtifactStoreError, InMemoryArtifactStore};
pub use types::{Plan, ResearchCard, ReviewCard, ReviewComment, ScopeCard};
