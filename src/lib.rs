// Factory - tracker items to pull requests
// Polls Jira for assigned work, implements it with Claude Code and opens a PR

pub mod cli;
pub mod codehost;
pub mod daemon;
pub mod engine;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod state;
pub mod tracker;
pub mod workspace;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use engine::{Pipeline, PipelineSettings, Poller};
pub use models::{FactoryConfig, Item, RunResult, RunStatus, Stage};
pub use state::{FactoryPaths, Ledger, LedgerRecord, LedgerStatus};
