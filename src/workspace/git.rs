//! Git-backed workspace
//!
//! Network operations (clone, pull, push) go through the `git` CLI so the
//! user's credential helpers and SSH agent apply. Dirty-tree detection reads
//! the index locally through libgit2.

use super::{branch_name, Workspace};
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::models::RepoConfig;
use crate::orchestrator::{RunOptions, ScriptRunner};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

const GIT: &str = "git";

pub struct GitWorkspace {
    root: PathBuf,
    clone_url: String,
    default_branch: String,
    commit_name: String,
    commit_email: String,
    timeout: Duration,
    runner: ScriptRunner,
}

impl GitWorkspace {
    pub fn new(root: impl Into<PathBuf>, repo: &RepoConfig, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            clone_url: repo.clone_url.clone(),
            default_branch: repo.default_branch.clone(),
            commit_name: repo.commit_name.clone(),
            commit_email: repo.commit_email.clone(),
            timeout,
            runner: ScriptRunner::new(),
        }
    }

    /// Run git inside the working tree
    async fn git(&self, args: &[&str]) -> CollaboratorResult<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let out = self
            .runner
            .run_command(GIT, &args, RunOptions::new(self.timeout).cwd(&self.root))
            .await?;
        Ok(out.trim().to_string())
    }

    fn is_cloned(&self) -> bool {
        self.root.join(".git").exists()
    }

    /// Whether `branch` is listed locally or on any remote
    async fn branch_exists(&self, branch: &str) -> CollaboratorResult<bool> {
        let out = self.git(&["branch", "-a"]).await?;
        Ok(branch_listed(&out, branch))
    }
}

/// Match `branch` against `git branch -a` output exactly
fn branch_listed(output: &str, branch: &str) -> bool {
    output.lines().any(|line| {
        let name = line.trim_start_matches(['*', '+']).trim();
        let name = name.split(" -> ").next().unwrap_or(name);
        let name = name
            .strip_prefix("remotes/")
            .and_then(|rest| rest.split_once('/').map(|(_, b)| b))
            .unwrap_or(name);
        name == branch
    })
}

fn dirty(root: &Path) -> Result<bool, git2::Error> {
    let repo = git2::Repository::open(root)?;
    let mut options = git2::StatusOptions::new();
    options.include_untracked(true).recurse_untracked_dirs(true);
    let statuses = repo.statuses(Some(&mut options))?;
    Ok(!statuses.is_empty())
}

#[async_trait]
impl Workspace for GitWorkspace {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn ensure_cloned(&self) -> CollaboratorResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        if !self.is_cloned() {
            tracing::info!(url = %self.clone_url, path = %self.root.display(), "cloning repository");
            let root = self.root.to_string_lossy().to_string();
            let args = vec!["clone".to_string(), self.clone_url.clone(), root];
            self.runner
                .run_command(GIT, &args, RunOptions::new(self.timeout))
                .await?;
        }

        self.git(&["config", "user.email", self.commit_email.as_str()])
            .await?;
        self.git(&["config", "user.name", self.commit_name.as_str()])
            .await?;
        Ok(())
    }

    async fn create_or_checkout_branch(&self, key: &str, title: &str) -> CollaboratorResult<String> {
        let default_branch = self.default_branch.as_str();
        self.git(&["checkout", default_branch]).await?;
        self.git(&["pull", "origin", default_branch]).await?;

        let branch = branch_name(key, title);
        if self.branch_exists(&branch).await? {
            self.git(&["checkout", branch.as_str()]).await?;
        } else {
            self.git(&["checkout", "-b", branch.as_str()]).await?;
        }
        Ok(branch)
    }

    async fn has_uncommitted_changes(&self) -> bool {
        let root = self.root.clone();
        let status = tokio::task::spawn_blocking(move || dirty(&root)).await;
        match status {
            Ok(Ok(dirty)) => dirty,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "failed to read working tree status");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "status task failed");
                false
            }
        }
    }

    async fn commit_and_push(&self, branch: &str, message: &str) -> CollaboratorResult<()> {
        if branch.trim().is_empty() {
            return Err(CollaboratorError::CommandFailed {
                program: GIT.to_string(),
                detail: "refusing to push an empty branch name".to_string(),
            });
        }
        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-m", message]).await?;
        self.git(&["push", "-u", "origin", branch]).await?;
        Ok(())
    }
}
