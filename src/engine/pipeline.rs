//! Pipeline - turns one tracker item into a pull request
//!
//! Stages run strictly in order: fetch, validate, branch, claude, push, pr,
//! then a best-effort report back to the tracker. The first failing stage
//! ends the run. [`Pipeline::process`] never returns an error; every failure
//! is folded into the [`RunResult`].

use crate::codehost::CodeHost;
use crate::error::CollaboratorError;
use crate::models::{FactoryConfig, FailureKind, Item, RunResult, Stage};
use crate::orchestrator::{prompts, Implementer};
use crate::tracker::Tracker;
use crate::workspace::Workspace;
use std::sync::Arc;
use std::time::Duration;

/// Pipeline knobs taken from the configuration
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Target branch of every pull request
    pub default_branch: String,
    /// Tracker base URL used to link the item from the PR body
    pub tracker_url: String,
    pub auto_transition: bool,
    pub transition_status: String,
    /// Hard bound on the implement stage
    pub implement_timeout: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &FactoryConfig) -> Self {
        Self {
            default_branch: config.repo.default_branch.clone(),
            tracker_url: config.jira.base_url.clone(),
            auto_transition: config.poll.auto_transition,
            transition_status: config.poll.transition_status.clone(),
            implement_timeout: config.claude.timeout(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&FactoryConfig::default())
    }
}

pub struct Pipeline {
    tracker: Arc<dyn Tracker>,
    workspace: Arc<dyn Workspace>,
    implementer: Arc<dyn Implementer>,
    code_host: Arc<dyn CodeHost>,
    settings: PipelineSettings,
}

/// Collaborator error with the stage it happened in
fn stage_error(stage: Stage, err: CollaboratorError) -> (Stage, FailureKind, String) {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Collaborator
    };
    (stage, kind, err.to_string())
}

type StageOutcome<T> = std::result::Result<T, (Stage, FailureKind, String)>;

impl Pipeline {
    pub fn new(
        tracker: Arc<dyn Tracker>,
        workspace: Arc<dyn Workspace>,
        implementer: Arc<dyn Implementer>,
        code_host: Arc<dyn CodeHost>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            tracker,
            workspace,
            implementer,
            code_host,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process one item by key
    pub async fn process(&self, key: &str) -> RunResult {
        tracing::info!(key, "processing item");
        let result = RunResult::started(key);

        match self.run_stages(key).await {
            Ok(pr_url) => {
                match &pr_url {
                    Some(url) => tracing::info!(key, pr_url = %url, "item completed"),
                    None => tracing::info!(key, "item completed without changes"),
                }
                result.complete(pr_url)
            }
            Err((stage, kind, message)) => {
                tracing::error!(key, stage = %stage, error = %message, "item failed");
                result.fail(stage, kind, message)
            }
        }
    }

    async fn run_stages(&self, key: &str) -> StageOutcome<Option<String>> {
        let item = self
            .tracker
            .fetch_item(key)
            .await
            .map_err(|e| stage_error(Stage::Fetch, e))?;
        tracing::info!(key, title = %item.title, item_type = %item.item_type, "fetched item");

        validate(&item)?;

        let branch = self.prepare_branch(&item).await?;
        tracing::info!(key, branch = %branch, "branch ready");

        tracing::info!(key, timeout_secs = self.settings.implement_timeout.as_secs(), "running claude");
        self.implementer
            .run(self.workspace.root(), &item, self.settings.implement_timeout)
            .await
            .map_err(|e| stage_error(Stage::Claude, e))?;

        if !self.workspace.has_uncommitted_changes().await {
            tracing::info!(key, "no changes produced, nothing to publish");
            return Ok(None);
        }

        self.workspace
            .commit_and_push(&branch, &prompts::commit_message(&item))
            .await
            .map_err(|e| stage_error(Stage::Push, e))?;
        tracing::info!(key, branch = %branch, "pushed");

        let pr_url = self
            .code_host
            .open_change_request(
                &prompts::pr_title(&item),
                &prompts::pr_body(&item, &self.settings.tracker_url),
                &branch,
                &self.settings.default_branch,
            )
            .await
            .map_err(|e| stage_error(Stage::Pr, e))?;

        self.report_back(key, &pr_url).await;
        Ok(Some(pr_url))
    }

    async fn prepare_branch(&self, item: &Item) -> StageOutcome<String> {
        self.workspace
            .ensure_cloned()
            .await
            .map_err(|e| stage_error(Stage::Branch, e))?;
        self.workspace
            .create_or_checkout_branch(&item.key, &item.title)
            .await
            .map_err(|e| stage_error(Stage::Branch, e))
    }

    /// Comment and transition; failures are logged only
    async fn report_back(&self, key: &str, pr_url: &str) {
        if let Err(e) = self
            .tracker
            .add_comment(key, &prompts::pr_comment(pr_url))
            .await
        {
            tracing::warn!(key, error = %e, "failed to comment on item");
        }

        if self.settings.auto_transition {
            let target = self.settings.transition_status.as_str();
            if let Err(e) = self.tracker.transition(key, target).await {
                tracing::warn!(key, target, error = %e, "failed to transition item");
            }
        }
    }
}

fn validate(item: &Item) -> StageOutcome<()> {
    if !item.is_accepted_type() {
        return Err((
            Stage::Validate,
            FailureKind::Validation,
            format!("invalid type: {}", item.item_type),
        ));
    }
    if item.is_closed() {
        return Err((
            Stage::Validate,
            FailureKind::Validation,
            format!("issue is closed: {}", item.status),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(item_type: &str, status: &str) -> Item {
        Item {
            item_type: item_type.to_string(),
            status: status.to_string(),
            ..Item::new("PROJ-1")
        }
    }

    #[test]
    fn test_validate_accepts_open_story() {
        assert!(validate(&item("Story", "To Do")).is_ok());
        assert!(validate(&item("SUB-TASK", "In Review")).is_ok());
    }

    #[test]
    fn test_validate_rejects_type_before_status() {
        let (stage, kind, message) = validate(&item("Epic", "Done")).unwrap_err();
        assert_eq!(stage, Stage::Validate);
        assert_eq!(kind, FailureKind::Validation);
        assert_eq!(message, "invalid type: Epic");
    }

    #[test]
    fn test_validate_rejects_closed() {
        let (_, _, message) = validate(&item("Bug", "Resolved")).unwrap_err();
        assert!(message.contains("closed"));
    }

    #[test]
    fn test_timeout_maps_to_timeout_kind() {
        let err = CollaboratorError::TimedOut {
            program: "claude".to_string(),
            after: Duration::from_secs(600),
            pid: None,
        };
        let (stage, kind, message) = stage_error(Stage::Claude, err);
        assert_eq!(stage, Stage::Claude);
        assert_eq!(kind, FailureKind::Timeout);
        assert!(message.contains("timed out"));
    }

    #[test]
    fn test_settings_from_default_config() {
        let settings = PipelineSettings::default();
        assert_eq!(settings.default_branch, "main");
        assert_eq!(settings.transition_status, "In Progress");
        assert_eq!(settings.implement_timeout, Duration::from_secs(600));
    }
}
