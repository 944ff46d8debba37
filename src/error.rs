//! Error taxonomy
//!
//! Collaborator backends (tracker, workspace, code host, implementer) return
//! [`CollaboratorError`]. The pipeline never propagates these: it folds them
//! into a [`crate::models::StageFailure`]. Daemon lifecycle misuse surfaces as
//! [`DaemonError`] to the operator.

use std::path::PathBuf;
use std::time::Duration;

/// Result type for collaborator calls
pub type CollaboratorResult<T> = std::result::Result<T, CollaboratorError>;

/// Failure of an external collaborator call
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("`{program}` is not installed or not in PATH")]
    CommandUnavailable { program: String },

    #[error("`{program}` failed: {detail}")]
    CommandFailed { program: String, detail: String },

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    TimedOut {
        program: String,
        after: Duration,
        /// Process id of the killed child, when one was spawned
        pid: Option<u32>,
    },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollaboratorError {
    /// Whether this failure is a hard timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, CollaboratorError::TimedOut { .. })
    }
}

/// Daemon lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon already running (PID {pid})")]
    AlreadyRunning { pid: u32 },

    #[error("daemon not running")]
    NotRunning,

    #[error("failed to launch daemon `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found at {}. Run 'factory init' first", .path.display())]
    Missing { path: PathBuf },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
