//! Tracker work items
//!
//! An [`Item`] is built fresh on every fetch and never persisted.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Item types the pipeline accepts (compared case-insensitively)
pub const ACCEPTED_TYPES: &[&str] = &["bug", "task", "story", "sub-task"];

/// Statuses that mark an item as closed (compared case-insensitively)
pub const CLOSED_STATUSES: &[&str] = &["done", "closed", "resolved", "cancelled"];

static ACCEPTANCE_CRITERIA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)acceptance\s*criteria[:\s]*([\s\S]*?)(?:\n\n|$)").unwrap()
});

/// A comment on a tracker item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    /// Creation timestamp as reported by the tracker
    pub created: String,
    pub body: String,
}

/// A unit of work fetched from the tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier (e.g., "PROJ-123")
    pub key: String,
    pub title: String,
    pub description: String,
    /// Issue type name (e.g., "Bug", "Story")
    pub item_type: String,
    pub priority: String,
    pub status: String,
    pub labels: Vec<String>,
    pub components: Vec<String>,
    /// Derived from the description, see [`extract_acceptance_criteria`]
    pub acceptance_criteria: String,
    /// Comments in tracker order
    pub comments: Vec<Comment>,
}

impl Item {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// Set the description and re-derive acceptance criteria from it
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self.acceptance_criteria = extract_acceptance_criteria(&self.description);
        self
    }

    pub fn is_accepted_type(&self) -> bool {
        let item_type = self.item_type.to_lowercase();
        ACCEPTED_TYPES.contains(&item_type.as_str())
    }

    pub fn is_closed(&self) -> bool {
        let status = self.status.to_lowercase();
        CLOSED_STATUSES.contains(&status.as_str())
    }
}

/// Extract the acceptance criteria section from free-text description
///
/// Matches the marker phrase "acceptance criteria" case-insensitively and
/// captures everything after it up to the next blank line or end of text.
/// Only the first occurrence is used.
pub fn extract_acceptance_criteria(description: &str) -> String {
    ACCEPTANCE_CRITERIA_RE
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
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
    fn test_accepted_types_case_insensitive() {
        assert!(item("Bug", "To Do").is_accepted_type());
        assert!(item("TASK", "To Do").is_accepted_type());
        assert!(item("story", "To Do").is_accepted_type());
        assert!(item("Sub-task", "To Do").is_accepted_type());
        assert!(!item("Epic", "To Do").is_accepted_type());
        assert!(!item("", "To Do").is_accepted_type());
    }

    #[test]
    fn test_closed_statuses() {
        assert!(item("Bug", "Done").is_closed());
        assert!(item("Bug", "CLOSED").is_closed());
        assert!(item("Bug", "resolved").is_closed());
        assert!(item("Bug", "Cancelled").is_closed());
        assert!(!item("Bug", "In Progress").is_closed());
    }

    #[test]
    fn test_extract_acceptance_criteria_until_blank_line() {
        let desc = "Fix the login page.\n\nAcceptance Criteria:\n- user can log in\n- error shown\n\nNotes: none";
        assert_eq!(
            extract_acceptance_criteria(desc),
            "- user can log in\n- error shown"
        );
    }

    #[test]
    fn test_extract_acceptance_criteria_to_end_of_text() {
        let desc = "acceptance criteria - returns 200";
        assert_eq!(extract_acceptance_criteria(desc), "- returns 200");
    }

    #[test]
    fn test_extract_acceptance_criteria_first_match_only() {
        let desc = "Acceptance criteria: first\n\nACCEPTANCE CRITERIA: second";
        assert_eq!(extract_acceptance_criteria(desc), "first");
    }

    #[test]
    fn test_extract_acceptance_criteria_absent() {
        assert_eq!(extract_acceptance_criteria("nothing here"), "");
    }

    #[test]
    fn test_with_description_derives_criteria() {
        let item = Item::new("PROJ-2").with_description("AcceptanceCriteria: works");
        assert_eq!(item.acceptance_criteria, "works");
    }
}
