//! Code host collaborator (pull requests)

pub mod gh_cli;
pub mod github_rest;

pub use gh_cli::GhCliHost;
pub use github_rest::GitHubRestHost;

use crate::error::CollaboratorResult;
use crate::models::FactoryConfig;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait CodeHost: Send + Sync {
    /// Open a change request from `source_branch` into `target_branch`,
    /// returning its URL
    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> CollaboratorResult<String>;
}

/// Build the code host backend selected by `github.use_cli`
///
/// The CLI backend runs inside `workspace_root` so `gh` can infer the remote.
pub fn from_config(
    config: &FactoryConfig,
    workspace_root: &Path,
) -> anyhow::Result<Arc<dyn CodeHost>> {
    if config.github.use_cli {
        Ok(Arc::new(GhCliHost::new(
            &config.github,
            workspace_root,
            config.command_timeout(),
        )))
    } else {
        Ok(Arc::new(GitHubRestHost::new(
            &config.github,
            config.command_timeout(),
        )?))
    }
}
