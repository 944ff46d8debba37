use super::prompts;
use super::script_runner::{RunOptions, ScriptRunner};
use super::Implementer;
use crate::error::CollaboratorResult;
use crate::models::{ClaudeConfig, Item};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// Claude CLI arguments
#[derive(Debug, Clone)]
pub enum ClaudeArg {
    /// Print mode (-p, non-interactive; prompt is read from stdin)
    Print,
    /// Model name/ID
    Model(String),
    /// Allowed tools (--allowedTools)
    AllowedTools(String),
    /// Skip permission prompts
    SkipPermissions,
}

/// Map Claude arguments to CLI syntax
pub fn build_args(args: &[ClaudeArg]) -> Vec<String> {
    let mut cli_args = Vec::new();
    for arg in args {
        match arg {
            ClaudeArg::Print => cli_args.push("-p".to_string()),
            ClaudeArg::Model(model) => {
                cli_args.push("--model".to_string());
                cli_args.push(model.clone());
            }
            ClaudeArg::AllowedTools(tools) => {
                cli_args.push("--allowedTools".to_string());
                cli_args.push(tools.clone());
            }
            ClaudeArg::SkipPermissions => {
                cli_args.push("--dangerously-skip-permissions".to_string());
            }
        }
    }
    cli_args
}

/// Claude Code implementer
///
/// Runs `claude -p` in the working tree with the item prompt on stdin.
/// Output is echoed so it lands in the daemon log, or summarized on a
/// spinner when running in a terminal.
pub struct ClaudeImplementer {
    config: ClaudeConfig,
    runner: ScriptRunner,
}

impl ClaudeImplementer {
    pub fn new(config: ClaudeConfig) -> Self {
        Self {
            config,
            runner: ScriptRunner::new(),
        }
    }

    /// Show a spinner instead of echoing output
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.runner = self.runner.with_progress(show_progress);
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![ClaudeArg::Print];
        if let Some(model) = &self.config.model {
            args.push(ClaudeArg::Model(model.clone()));
        }
        args.push(ClaudeArg::AllowedTools(self.config.allowed_tools.clone()));
        if self.config.skip_permissions {
            args.push(ClaudeArg::SkipPermissions);
        }
        build_args(&args)
    }
}

#[async_trait]
impl Implementer for ClaudeImplementer {
    async fn run(
        &self,
        workspace_root: &Path,
        item: &Item,
        timeout: Duration,
    ) -> CollaboratorResult<()> {
        let prompt = prompts::implement_prompt(item);
        let args = self.args();
        let options = RunOptions::new(timeout)
            .cwd(workspace_root)
            .stdin(&prompt)
            .echo(true);

        self.runner
            .run_command(&self.config.command, &args, options)
            .await?;
        Ok(())
    }
}
