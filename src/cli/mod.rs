//! Subcommand implementations

pub mod clear;
pub mod init;
pub mod logs;
pub mod run;
pub mod start;
pub mod status;
pub mod stop;
pub mod trigger;

use crate::engine::{Pipeline, PipelineSettings};
use crate::models::FactoryConfig;
use crate::orchestrator::{ClaudeImplementer, Implementer};
use crate::state::FactoryPaths;
use crate::tracker::Tracker;
use crate::{codehost, tracker, workspace, Result};
use std::sync::Arc;

/// Load and validate `<config_dir>/config.toml`
pub fn load_config(paths: &FactoryPaths) -> Result<FactoryConfig> {
    let config = FactoryConfig::load(&paths.config())?;
    config.validate()?;
    Ok(config)
}

/// Wire the configured collaborators into a pipeline
///
/// The tracker is returned alongside so the poller can share it.
/// `interactive` swaps the implementer's echoed output for a spinner.
pub fn build_pipeline(
    config: &FactoryConfig,
    paths: &FactoryPaths,
    interactive: bool,
) -> Result<(Pipeline, Arc<dyn Tracker>)> {
    let tracker = tracker::from_config(config)?;
    let workspace = workspace::from_config(config, paths.root());
    let code_host = codehost::from_config(config, workspace.root())?;
    let implementer: Arc<dyn Implementer> =
        Arc::new(ClaudeImplementer::new(config.claude.clone()).with_progress(interactive));

    let pipeline = Pipeline::new(
        tracker.clone(),
        workspace,
        implementer,
        code_host,
        PipelineSettings::from_config(config),
    );
    Ok((pipeline, tracker))
}
