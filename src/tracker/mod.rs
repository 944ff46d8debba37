//! Issue tracker collaborator
//!
//! Two Jira backends: the `jira` CLI and the REST v3 API. Both produce the
//! same [`Item`] shape.

mod adf;
pub mod jira_cli;
pub mod jira_rest;

pub use jira_cli::JiraCliTracker;
pub use jira_rest::JiraRestTracker;

use crate::error::CollaboratorResult;
use crate::models::{FactoryConfig, Item};
use async_trait::async_trait;
use std::sync::Arc;

/// Tracker contract consumed by the pipeline and poller
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Fetch one item; a missing key is [`crate::error::CollaboratorError::NotFound`]
    async fn fetch_item(&self, key: &str) -> CollaboratorResult<Item>;

    /// Items assigned to the configured user, server-filtered to open items
    /// of accepted types. Items may be partially populated (key and title).
    async fn fetch_assigned(&self) -> CollaboratorResult<Vec<Item>>;

    async fn add_comment(&self, key: &str, text: &str) -> CollaboratorResult<()>;

    /// Move the item to the status named `target` (case-insensitive).
    /// When no such transition is available this is a no-op, not an error.
    async fn transition(&self, key: &str, target: &str) -> CollaboratorResult<()>;
}

/// Build the tracker backend selected by `jira.use_cli`
pub fn from_config(config: &FactoryConfig) -> anyhow::Result<Arc<dyn Tracker>> {
    if config.jira.use_cli {
        Ok(Arc::new(JiraCliTracker::new(
            &config.jira,
            config.command_timeout(),
        )))
    } else {
        Ok(Arc::new(JiraRestTracker::new(
            &config.jira,
            config.command_timeout(),
        )?))
    }
}

/// Pick the transition whose name matches `target` case-insensitively
pub(crate) fn find_transition<'a, T>(
    transitions: &'a [T],
    target: &str,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    transitions
        .iter()
        .find(|t| name(t).trim().eq_ignore_ascii_case(target.trim()))
}
