//! Local working tree collaborator

pub mod git;

pub use git::GitWorkspace;

use crate::error::CollaboratorResult;
use crate::models::FactoryConfig;
use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

const SLUG_MAX_LEN: usize = 40;

static NON_ALNUM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").unwrap());

/// Workspace contract consumed by the pipeline
///
/// There is one working tree per config directory; callers must never run
/// two branch operations on it concurrently.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Root of the working tree
    fn root(&self) -> &Path;

    /// Clone the repository once; reuse an existing clone
    async fn ensure_cloned(&self) -> CollaboratorResult<()>;

    /// Update the default branch, then check out the item branch (creating
    /// it if it doesn't exist locally or remotely). Returns the branch name.
    async fn create_or_checkout_branch(&self, key: &str, title: &str) -> CollaboratorResult<String>;

    async fn has_uncommitted_changes(&self) -> bool;

    /// Stage everything, commit with `message` and push `branch` upstream
    async fn commit_and_push(&self, branch: &str, message: &str) -> CollaboratorResult<()>;
}

/// Deterministic branch name: `feature/<key>-<slug>`
///
/// The slug is the lower-cased title with every run of non-alphanumeric
/// characters collapsed to one hyphen, trimmed of hyphens, then cut to 40
/// characters.
pub fn branch_name(key: &str, title: &str) -> String {
    let lowered = title.to_lowercase();
    let collapsed = NON_ALNUM_RE.replace_all(&lowered, "-");
    let slug: String = collapsed
        .trim_matches('-')
        .chars()
        .take(SLUG_MAX_LEN)
        .collect();
    format!("feature/{}-{}", key, slug)
}

pub fn from_config(config: &FactoryConfig, config_dir: &Path) -> Arc<dyn Workspace> {
    Arc::new(GitWorkspace::new(
        config.workspace_path(config_dir),
        &config.repo,
        config.command_timeout(),
    ))
}
