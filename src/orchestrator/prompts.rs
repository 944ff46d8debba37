/// Text templates for the pipeline
///
/// Prompts sent to Claude, plus commit, pull request and tracker comment text.
/// All functions are pure so they can be checked without any collaborator.
use crate::models::{Comment, Item};

/// Trailer line appended to every commit message
pub const COMMIT_TRAILER: &str = "Implemented via factory";

/// Marker used in the prompt when an item has no comments
pub const NO_COMMENTS: &str = "No comments";

const COMMENT_DIVIDER: &str = "\n\n---\n\n";

/// Render comments as "author (date): body" blocks separated by a divider
pub fn format_comments(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return NO_COMMENTS.to_string();
    }
    comments
        .iter()
        .map(|c| format!("**{}** ({}):\n{}", c.author, c.created, c.body))
        .collect::<Vec<_>>()
        .join(COMMENT_DIVIDER)
}

/// Generate Claude implementation prompt for a tracker item
pub fn implement_prompt(item: &Item) -> String {
    format!(
        r#"Implement the following Jira issue:

## {key}: {title}

**Type**: {item_type} | **Priority**: {priority}

## Description
{description}

## Acceptance Criteria
{acceptance_criteria}

## Comments (Additional Context/Instructions)
{comments}

## Instructions
1. Analyze the codebase
2. Review the comments above for additional context or specific instructions
3. Implement the required changes
4. Add/update tests if needed
5. Keep changes minimal and focused
6. Add TODO comments for ambiguous parts"#,
        key = item.key,
        title = item.title,
        item_type = item.item_type,
        priority = item.priority,
        description = item.description,
        acceptance_criteria = item.acceptance_criteria,
        comments = format_comments(&item.comments)
    )
}

pub fn commit_message(item: &Item) -> String {
    format!("{}: {}\n\n{}", item.key, item.title, COMMIT_TRAILER)
}

pub fn pr_title(item: &Item) -> String {
    format!("[{}] {}", item.key, item.title)
}

/// Generate pull request body
///
/// `tracker_url` is the tracker's base URL; the item key links to
/// `<tracker_url>/browse/<key>`.
pub fn pr_body(item: &Item, tracker_url: &str) -> String {
    let tracker_url = tracker_url.trim_end_matches('/');
    let description = if item.description.trim().is_empty() {
        "_No description provided._"
    } else {
        item.description.as_str()
    };
    let acceptance_criteria = if item.acceptance_criteria.trim().is_empty() {
        "_None specified._"
    } else {
        item.acceptance_criteria.as_str()
    };

    format!(
        r#"## Jira Issue
[{key}]({tracker_url}/browse/{key})

**Type**: {item_type}
**Priority**: {priority}

## Description
{description}

## Acceptance Criteria
{acceptance_criteria}

## Validation Checklist
- [ ] Code compiles without errors
- [ ] Existing tests pass
- [ ] New tests cover the change
- [ ] Acceptance criteria verified
- [ ] No unrelated changes included

---
Closes {key}
"#,
        key = item.key,
        tracker_url = tracker_url,
        item_type = item.item_type,
        priority = item.priority,
        description = description,
        acceptance_criteria = acceptance_criteria
    )
}

/// Tracker comment announcing the pull request
pub fn pr_comment(pr_url: &str) -> String {
    format!("PR raised: {}", pr_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_item() -> Item {
        Item {
            title: "Fix login redirect".to_string(),
            item_type: "Bug".to_string(),
            priority: "High".to_string(),
            ..Item::new("PROJ-7")
                .with_description("Users land on 404.\n\nAcceptance criteria: redirect to /home")
        }
    }

    #[test]
    fn test_format_comments_empty() {
        assert_eq!(format_comments(&[]), "No comments");
    }

    #[test]
    fn test_format_comments_divided() {
        let comments = vec![
            Comment {
                author: "Ana".to_string(),
                created: "2026-01-01".to_string(),
                body: "Use the new router".to_string(),
            },
            Comment {
                author: "Raj".to_string(),
                created: "2026-01-02".to_string(),
                body: "Also add a test".to_string(),
            },
        ];
        assert_eq!(
            format_comments(&comments),
            "**Ana** (2026-01-01):\nUse the new router\n\n---\n\n**Raj** (2026-01-02):\nAlso add a test"
        );
    }

    #[test]
    fn test_implement_prompt_contains_item_fields() {
        let prompt = implement_prompt(&sample_item());
        assert!(prompt.contains("## PROJ-7: Fix login redirect"));
        assert!(prompt.contains("**Type**: Bug | **Priority**: High"));
        assert!(prompt.contains("## Acceptance Criteria\nredirect to /home"));
        assert!(prompt.contains("No comments"));
    }

    #[test]
    fn test_commit_message_and_title() {
        let item = sample_item();
        assert_eq!(
            commit_message(&item),
            "PROJ-7: Fix login redirect\n\nImplemented via factory"
        );
        assert_eq!(pr_title(&item), "[PROJ-7] Fix login redirect");
    }

    #[test]
    fn test_pr_body_links_issue() {
        let body = pr_body(&sample_item(), "https://acme.atlassian.net/");
        assert!(body.contains("[PROJ-7](https://acme.atlassian.net/browse/PROJ-7)"));
        assert!(body.contains("## Validation Checklist"));
        assert!(body.trim_end().ends_with("Closes PROJ-7"));
    }

    #[test]
    fn test_pr_body_placeholders() {
        let body = pr_body(&Item::new("PROJ-8"), "https://acme.atlassian.net");
        assert!(body.contains("_No description provided._"));
        assert!(body.contains("_None specified._"));
    }
}
