//! The four artifact kinds a workflow's stages produce (spec.md §3, §4.6).

use crate::domain::types::{
    ArtifactId, ArtifactStatus, MergeStrategy, ReviewCommentKind, ReviewCommentStatus, ScopePath,
    Severity, TurnId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeCard {
    pub id: ArtifactId,
    pub turn_id: TurnId,
    pub status: ArtifactStatus,
    pub summary: String,
    pub path: ScopePath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchCard {
    pub id: ArtifactId,
    pub turn_id: TurnId,
    pub status: ArtifactStatus,
    pub findings: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: ArtifactId,
    pub turn_id: TurnId,
    pub status: ArtifactStatus,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCard {
    pub id: ArtifactId,
    pub turn_id: TurnId,
    pub status: ArtifactStatus,
    pub summary: String,
    pub comments: Vec<ReviewComment>,
    pub merge_strategy: Option<MergeStrategy>,
    pub commit_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewComment {
    pub id: String,
    pub kind: ReviewCommentKind,
    pub severity: Severity,
    pub status: ReviewCommentStatus,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub body: String,
}
