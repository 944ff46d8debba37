//! GitHub pull requests via the `gh` CLI

use super::CodeHost;
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::models::GitHubConfig;
use crate::orchestrator::{RunOptions, ScriptRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct GhCliHost {
    command: String,
    repo: String,
    workdir: PathBuf,
    timeout: Duration,
    runner: ScriptRunner,
}

impl GhCliHost {
    pub fn new(config: &GitHubConfig, workdir: &Path, timeout: Duration) -> Self {
        Self {
            command: config.cli_command.clone(),
            repo: format!("{}/{}", config.owner, config.repo),
            workdir: workdir.to_path_buf(),
            timeout,
            runner: ScriptRunner::new(),
        }
    }

    fn create_args(&self, title: &str, body: &str, head: &str, base: &str) -> Vec<String> {
        [
            "pr", "create", "--title", title, "--body", body, "--base", base, "--head", head,
            "--repo", self.repo.as_str(),
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

/// `gh pr create` prints the PR URL as its last line
fn pr_url(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("http"))
        .last()
        .map(str::to_string)
}

#[async_trait]
impl CodeHost for GhCliHost {
    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> CollaboratorResult<String> {
        let args = self.create_args(title, body, source_branch, target_branch);
        let out = self
            .runner
            .run_command(
                &self.command,
                &args,
                RunOptions::new(self.timeout).cwd(&self.workdir),
            )
            .await?;
        pr_url(&out).ok_or_else(|| {
            CollaboratorError::Parse(format!("no pull request URL in `gh` output: {}", out.trim()))
        })
    }
}
