pub mod config;
pub mod item;
pub mod run;

pub use config::{
    ClaudeConfig, FactoryConfig, GitHubConfig, JiraConfig, PollConfig, RepoConfig,
    CONFIG_TEMPLATE,
};
pub use item::{extract_acceptance_criteria, Comment, Item, ACCEPTED_TYPES, CLOSED_STATUSES};
pub use run::{FailureKind, RunResult, RunStatus, Stage, StageFailure};
