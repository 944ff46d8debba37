use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Jira
// =============================================================================

/// Jira configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraConfig {
    /// Base URL (e.g., "https://company.atlassian.net")
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub email: String,
    /// API token (falls back to $JIRA_API_TOKEN)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_token: String,
    /// Use the `jira` CLI instead of the REST API
    #[serde(default = "default_true")]
    pub use_cli: bool,
    /// CLI command (default: "jira")
    #[serde(default = "default_jira_command")]
    pub cli_command: String,
    /// Query selecting assigned, open, accepted items
    #[serde(default = "default_jql")]
    pub jql: String,
}

fn default_true() -> bool {
    true
}

fn default_jira_command() -> String {
    "jira".to_string()
}

fn default_jql() -> String {
    "assignee = currentUser() AND status != Done AND status != Closed AND type in (Bug, Task, Story) ORDER BY updated DESC"
        .to_string()
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            use_cli: true,
            cli_command: default_jira_command(),
            jql: default_jql(),
        }
    }
}

// =============================================================================
// GitHub
// =============================================================================

/// GitHub configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Owner (org or username)
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    /// Personal access token (falls back to $GITHUB_TOKEN)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
    /// Use the `gh` CLI instead of the REST API
    #[serde(default)]
    pub use_cli: bool,
    #[serde(default = "default_github_api")]
    pub api_url: String,
    #[serde(default = "default_gh_command")]
    pub cli_command: String,
}

fn default_github_api() -> String {
    "https://api.github.com".to_string()
}

fn default_gh_command() -> String {
    "gh".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            token: String::new(),
            use_cli: false,
            api_url: default_github_api(),
            cli_command: default_gh_command(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Local working tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default)]
    pub clone_url: String,
    /// Working tree path, relative paths resolve against the config dir
    #[serde(default = "default_local_path")]
    pub local_path: PathBuf,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    #[serde(default = "default_commit_name")]
    pub commit_name: String,
    #[serde(default = "default_commit_email")]
    pub commit_email: String,
}

fn default_local_path() -> PathBuf {
    PathBuf::from("workspace")
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_commit_name() -> String {
    "Jira Automation".to_string()
}

fn default_commit_email() -> String {
    "automation@jira-automation".to_string()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            clone_url: String::new(),
            local_path: default_local_path(),
            default_branch: default_branch(),
            commit_name: default_commit_name(),
            commit_email: default_commit_email(),
        }
    }
}

// =============================================================================
// Polling
// =============================================================================

/// Poll loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
    /// Move the item to `transition_status` after the PR is opened
    #[serde(default = "default_true")]
    pub auto_transition: bool,
    #[serde(default = "default_transition_status")]
    pub transition_status: String,
}

fn default_interval() -> u64 {
    5
}

fn default_transition_status() -> String {
    "In Progress".to_string()
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval(),
            auto_transition: true,
            transition_status: default_transition_status(),
        }
    }
}

impl PollConfig {
    /// Poll interval, never shorter than one minute
    pub fn interval(&self) -> Duration {
        let minutes = if self.interval_minutes < 1 {
            default_interval()
        } else {
            self.interval_minutes
        };
        Duration::from_secs(minutes * 60)
    }
}

// =============================================================================
// Claude
// =============================================================================

/// Claude implementer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeConfig {
    /// CLI command (default: "claude")
    #[serde(default = "default_claude_command")]
    pub command: String,
    /// Model passed as --model; the CLI's own default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: String,
    /// Hard wall-clock bound on one implementation run
    #[serde(default = "default_claude_timeout")]
    pub timeout_minutes: u64,
    /// Pass --dangerously-skip-permissions
    #[serde(default = "default_true")]
    pub skip_permissions: bool,
}

fn default_claude_command() -> String {
    "claude".to_string()
}

fn default_allowed_tools() -> String {
    "Read,Glob,Grep,Edit,Write,Bash".to_string()
}

fn default_claude_timeout() -> u64 {
    10
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            command: default_claude_command(),
            model: None,
            allowed_tools: default_allowed_tools(),
            timeout_minutes: default_claude_timeout(),
            skip_permissions: true,
        }
    }
}

impl ClaudeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_minutes * 60)
    }
}

// =============================================================================
// Factory Configuration
// =============================================================================

/// Factory configuration, stored as `<config_dir>/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Bound on every tracker, git and code-host CLI call
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub jira: JiraConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub repo: RepoConfig,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub claude: ClaudeConfig,
}

fn default_command_timeout() -> u64 {
    120
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: default_command_timeout(),
            jira: JiraConfig::default(),
            github: GitHubConfig::default(),
            repo: RepoConfig::default(),
            poll: PollConfig::default(),
            claude: ClaudeConfig::default(),
        }
    }
}

impl FactoryConfig {
    /// Load config from `path`, filling secrets from the environment
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::Missing {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: FactoryConfig = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if self.jira.api_token.is_empty() {
            if let Ok(token) = std::env::var("JIRA_API_TOKEN") {
                self.jira.api_token = token;
            }
        }
        if self.github.token.is_empty() {
            if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                self.github.token = token;
            }
        }
    }

    /// Reject configs the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repo.clone_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "repo.clone_url",
                reason: "must be set".to_string(),
            });
        }
        if self.github.owner.trim().is_empty() || self.github.repo.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "github.owner/github.repo",
                reason: "must be set".to_string(),
            });
        }
        if !self.jira.use_cli && self.jira.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "jira.base_url",
                reason: "is required when jira.use_cli = false".to_string(),
            });
        }
        if self.repo.default_branch.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "repo.default_branch",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    /// Resolve the working tree path against the config dir
    pub fn workspace_path(&self, config_dir: &Path) -> PathBuf {
        if self.repo.local_path.is_absolute() {
            self.repo.local_path.clone()
        } else {
            config_dir.join(&self.repo.local_path)
        }
    }
}

/// Commented template written by `factory init`
pub const CONFIG_TEMPLATE: &str = r#"# factory configuration

# Bound (seconds) on every jira/git/gh CLI call
command_timeout_secs = 120

[jira]
# Use the `jira` CLI (https://github.com/go-jira/jira). Set to false for REST.
use_cli = true
base_url = "https://company.atlassian.net"
email = ""
# api_token = ""   # or export JIRA_API_TOKEN

[github]
owner = ""
repo = ""
use_cli = false
# token = ""       # or export GITHUB_TOKEN

[repo]
clone_url = ""
local_path = "workspace"
default_branch = "main"

[poll]
interval_minutes = 5
auto_transition = true
transition_status = "In Progress"

[claude]
command = "claude"
# model = "sonnet"
allowed_tools = "Read,Glob,Grep,Edit,Write,Bash"
timeout_minutes = 10
"#;
