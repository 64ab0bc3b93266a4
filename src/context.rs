// ABOUTME: Release context snapshot types consumed by the field-set builder
// ABOUTME: Defines project, semver, git, artifact, and build-option inputs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of the release being templated.
///
/// All values must already be resolved by the surrounding pipeline; this
/// crate performs no git or filesystem discovery of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseContext {
    pub project_name: String,
    /// Computed version string, including any snapshot or prerelease suffix.
    pub version: String,
    pub semver: Semver,
    pub git: GitInfo,
    pub env: HashMap<String, String>,
    pub snapshot: bool,
    /// Render timestamp for the `Date`/`Timestamp` fields.
    pub date: DateTime<Utc>,
}

/// Parsed semantic-version components of the current tag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Semver {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub prerelease: String,
}

/// Git state of the repository being released.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitInfo {
    pub current_tag: String,
    pub branch: String,
    pub commit: String,
    pub short_commit: String,
    pub full_commit: String,
    pub commit_date: DateTime<Utc>,
    /// Source-control remote URL.
    pub url: String,
}

/// A built artifact whose attributes feed the artifact fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub path: String,
    pub os: String,
    pub arch: String,
    pub arm: String,
    pub mips: String,
    /// Binary name recorded by the build step, when it set one.
    pub binary: Option<String>,
    /// Upload hash assigned by the hosting service, when available.
    pub upload_hash: Option<String>,
}

/// Per-build configuration attributes mapped onto the build fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildOptions {
    pub target: String,
    pub ext: String,
    pub name: String,
    pub path: String,
    pub os: String,
    pub arch: String,
}
