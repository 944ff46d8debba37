//! Outcome of one pipeline run

use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage names, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Validate,
    Branch,
    Claude,
    Push,
    Pr,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Validate => "validate",
            Stage::Branch => "branch",
            Stage::Claude => "claude",
            Stage::Push => "push",
            Stage::Pr => "pr",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lifecycle status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Started,
    Failed,
    Completed,
}

impl RunStatus {
    pub fn name(&self) -> &'static str {
        match self {
            RunStatus::Started => "started",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
        }
    }
}

/// Category of a stage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Item not eligible for processing
    Validation,
    /// A tracker/workspace/code-host/implementer call failed
    Collaborator,
    /// The implement stage exceeded its bound
    Timeout,
}

/// First failing stage of a run and its cause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

impl fmt::Display for StageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

/// Result of processing one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub key: String,
    pub status: RunStatus,
    pub pr_url: Option<String>,
    pub failure: Option<StageFailure>,
}

impl RunResult {
    pub fn started(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status: RunStatus::Started,
            pr_url: None,
            failure: None,
        }
    }

    pub fn fail(mut self, stage: Stage, kind: FailureKind, message: impl Into<String>) -> Self {
        self.status = RunStatus::Failed;
        self.failure = Some(StageFailure {
            stage,
            kind,
            message: message.into(),
        });
        self
    }

    pub fn complete(mut self, pr_url: Option<String>) -> Self {
        self.status = RunStatus::Completed;
        self.pr_url = pr_url;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        self.failure.as_ref().map(|f| f.stage)
    }

    /// Error text in the form "<stage>: <cause>"
    pub fn error(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_records_stage_and_message() {
        let result = RunResult::started("PROJ-1").fail(
            Stage::Validate,
            FailureKind::Validation,
            "invalid type: Epic",
        );
        assert_eq!(result.status, RunStatus::Failed);
        assert_eq!(result.failed_stage(), Some(Stage::Validate));
        assert_eq!(result.error().as_deref(), Some("validate: invalid type: Epic"));
    }

    #[test]
    fn test_complete_without_pr() {
        let result = RunResult::started("PROJ-1").complete(None);
        assert!(result.is_completed());
        assert!(result.pr_url.is_none());
        assert!(result.error().is_none());
    }
}
