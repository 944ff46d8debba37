//! Code generation and external process execution

pub mod claude;
pub mod prompts;
pub mod script_runner;

pub use claude::ClaudeImplementer;
pub use script_runner::{process_alive, RunOptions, ScriptRunner};

use crate::error::CollaboratorResult;
use crate::models::Item;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Code-generation collaborator
///
/// `run` must enforce `timeout` as a hard bound: when it elapses the
/// underlying process is killed and a timeout error is returned.
#[async_trait]
pub trait Implementer: Send + Sync {
    async fn run(
        &self,
        workspace_root: &Path,
        item: &Item,
        timeout: Duration,
    ) -> CollaboratorResult<()>;
}
