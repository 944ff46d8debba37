//! Jira via the `jira` CLI (go-jira)
//!
//! Issue fields are fetched with a single Go template that joins them with
//! ASCII separator characters, then split back apart here.

use super::{find_transition, Tracker};
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::models::{extract_acceptance_criteria, Comment, Item, JiraConfig};
use crate::orchestrator::{RunOptions, ScriptRunner};
use async_trait::async_trait;
use std::time::Duration;

const FIELD_SEP: char = '\u{1e}';
const LIST_SEP: char = '\u{1f}';
const COMMENT_SEP: char = '\u{1d}';

/// Rendered by text/template when a field is missing
const NO_VALUE: &str = "<no value>";

const ISSUE_TEMPLATE: &str = concat!(
    "{{.fields.summary}}\u{1e}",
    "{{.fields.issuetype.name}}\u{1e}",
    "{{.fields.priority.name}}\u{1e}",
    "{{.fields.status.name}}\u{1e}",
    "{{range .fields.labels}}{{.}}\u{1f}{{end}}\u{1e}",
    "{{range .fields.components}}{{.name}}\u{1f}{{end}}\u{1e}",
    "{{range .fields.comment.comments}}{{.author.displayName}}\u{1f}{{.created}}\u{1f}{{.body}}\u{1d}{{end}}\u{1e}",
    "{{.fields.description}}",
);

/// Jira tracker backed by the `jira` CLI
pub struct JiraCliTracker {
    command: String,
    jql: String,
    timeout: Duration,
    runner: ScriptRunner,
}

impl JiraCliTracker {
    pub fn new(config: &JiraConfig, timeout: Duration) -> Self {
        Self {
            command: config.cli_command.clone(),
            jql: config.jql.clone(),
            timeout,
            runner: ScriptRunner::new(),
        }
    }

    async fn exec(&self, args: &[&str]) -> CollaboratorResult<String> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let out = self
            .runner
            .run_command(&self.command, &args, RunOptions::new(self.timeout))
            .await?;
        Ok(out.trim().to_string())
    }
}

#[async_trait]
impl Tracker for JiraCliTracker {
    async fn fetch_item(&self, key: &str) -> CollaboratorResult<Item> {
        let out = self
            .exec(&["view", key, "-t", ISSUE_TEMPLATE])
            .await
            .map_err(|e| match e {
                CollaboratorError::CommandFailed { detail, .. }
                    if detail.contains("404") || detail.to_lowercase().contains("does not exist") =>
                {
                    CollaboratorError::NotFound(format!("issue {}: {}", key, detail))
                }
                other => other,
            })?;
        parse_issue(key, &out)
    }

    async fn fetch_assigned(&self) -> CollaboratorResult<Vec<Item>> {
        let out = self.exec(&["list", "-q", self.jql.as_str()]).await?;
        Ok(parse_list(&out))
    }

    async fn add_comment(&self, key: &str, text: &str) -> CollaboratorResult<()> {
        self.exec(&["comment", key, "--noedit", "-m", text]).await?;
        Ok(())
    }

    async fn transition(&self, key: &str, target: &str) -> CollaboratorResult<()> {
        let out = self.exec(&["transitions", key]).await?;
        let available = parse_transitions(&out);
        let Some((_, name)) = find_transition(&available, target, |(_, name)| name.as_str())
        else {
            tracing::debug!(key, target, "no matching transition, skipping");
            return Ok(());
        };
        self.exec(&["transition", name.as_str(), key, "--noedit"]).await?;
        Ok(())
    }
}

fn field(value: &str) -> String {
    let value = value.trim();
    if value == NO_VALUE {
        String::new()
    } else {
        value.to_string()
    }
}

fn list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEP)
        .map(field)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Split the output of [`ISSUE_TEMPLATE`] into an [`Item`]
fn parse_issue(key: &str, out: &str) -> CollaboratorResult<Item> {
    let parts: Vec<&str> = out.splitn(8, FIELD_SEP).collect();
    let [title, item_type, priority, status, labels, components, comments, description] =
        parts.as_slice()
    else {
        return Err(CollaboratorError::Parse(format!(
            "unexpected `jira view` output for {}",
            key
        )));
    };

    let comments = comments
        .split(COMMENT_SEP)
        .filter(|c| !c.trim().is_empty())
        .filter_map(|c| {
            let mut fields = c.splitn(3, LIST_SEP);
            Some(Comment {
                author: field(fields.next()?),
                created: field(fields.next()?),
                body: field(fields.next().unwrap_or("")),
            })
        })
        .collect();

    let description = field(description);
    Ok(Item {
        key: key.to_string(),
        title: field(title),
        acceptance_criteria: extract_acceptance_criteria(&description),
        description,
        item_type: field(item_type),
        priority: field(priority),
        status: field(status),
        labels: list(labels),
        components: list(components),
        comments,
    })
}

/// Parse `jira list` lines of the form "KEY: title"
fn parse_list(out: &str) -> Vec<Item> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let (key, title) = line.split_once(':').unwrap_or((line, ""));
            let key = key.trim();
            if key.is_empty() {
                return None;
            }
            Some(Item {
                title: title.trim().to_string(),
                ..Item::new(key)
            })
        })
        .collect()
}

/// Parse `jira transitions` lines of the form "ID: Name"
fn parse_transitions(out: &str) -> Vec<(String, String)> {
    out.lines()
        .filter_map(|line| {
            let (id, name) = line.split_once(':')?;
            Some((id.trim().to_string(), name.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issue() {
        let out = [
            "Fix login",
            "Bug",
            "High",
            "To Do",
            "frontend\u{1f}auth\u{1f}",
            "web\u{1f}",
            "Ana\u{1f}2026-01-01T10:00:00.000+0000\u{1f}Use the router\u{1d}Raj\u{1f}2026-01-02T10:00:00.000+0000\u{1f}Add a test\u{1d}",
            "Broken.\n\nAcceptance criteria: lands on /home",
        ]
        .join("\u{1e}");

        let item = parse_issue("PROJ-1", &out).unwrap();
        assert_eq!(item.key, "PROJ-1");
        assert_eq!(item.title, "Fix login");
        assert_eq!(item.item_type, "Bug");
        assert_eq!(item.priority, "High");
        assert_eq!(item.status, "To Do");
        assert_eq!(item.labels, vec!["frontend", "auth"]);
        assert_eq!(item.components, vec!["web"]);
        assert_eq!(item.comments.len(), 2);
        assert_eq!(item.comments[1].author, "Raj");
        assert_eq!(item.comments[1].body, "Add a test");
        assert_eq!(item.acceptance_criteria, "lands on /home");
    }

    #[test]
    fn test_parse_issue_missing_fields() {
        let out = ["Title", "Task", "<no value>", "Open", "", "", "", "<no value>"].join("\u{1e}");
        let item = parse_issue("PROJ-2", &out).unwrap();
        assert_eq!(item.priority, "");
        assert_eq!(item.description, "");
        assert!(item.labels.is_empty());
        assert!(item.comments.is_empty());
    }

    #[test]
    fn test_parse_issue_rejects_garbage() {
        assert!(parse_issue("PROJ-3", "just text").is_err());
    }

    #[test]
    fn test_parse_list() {
        let items = parse_list("PROJ-1:   Fix login\nPROJ-2: Add: colons\n\n");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, "PROJ-1");
        assert_eq!(items[0].title, "Fix login");
        assert_eq!(items[1].title, "Add: colons");
    }

    #[test]
    fn test_parse_transitions_and_match() {
        let available = parse_transitions("11: To Do\n21: In Progress\n31: Done\n");
        let found = find_transition(&available, "in progress", |(_, n)| n.as_str());
        assert_eq!(found.map(|(id, _)| id.as_str()), Some("21"));
        assert!(find_transition(&available, "Blocked", |(_, n)| n.as_str()).is_none());
    }
}
