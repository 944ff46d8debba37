//! Jira via the REST v3 API

use super::{adf, find_transition, Tracker};
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::models::{extract_acceptance_criteria, Comment, Item, JiraConfig};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const ISSUE_FIELDS: &str = "summary,description,issuetype,priority,status,labels,components,comment";
const SEARCH_FIELDS: &str = "summary,issuetype,status";
const SEARCH_LIMIT: &str = "20";

#[derive(Debug, Default, Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct Author {
    #[serde(default, rename = "displayName")]
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct RestComment {
    #[serde(default)]
    author: Option<Author>,
    #[serde(default)]
    created: String,
    #[serde(default)]
    body: Value,
}

#[derive(Debug, Default, Deserialize)]
struct CommentPage {
    #[serde(default)]
    comments: Vec<RestComment>,
}

#[derive(Debug, Default, Deserialize)]
struct IssueFields {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    description: Value,
    #[serde(default)]
    issuetype: Option<Named>,
    #[serde(default)]
    priority: Option<Named>,
    #[serde(default)]
    status: Option<Named>,
    #[serde(default)]
    labels: Vec<String>,
    #[serde(default)]
    components: Vec<Named>,
    #[serde(default)]
    comment: Option<CommentPage>,
}

#[derive(Debug, Deserialize)]
struct IssueResponse {
    key: String,
    #[serde(default)]
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<IssueResponse>,
}

#[derive(Debug, Deserialize)]
struct Transition {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

fn name_of(named: Option<Named>) -> String {
    named.map(|n| n.name).unwrap_or_default()
}

impl From<IssueResponse> for Item {
    fn from(issue: IssueResponse) -> Self {
        let fields = issue.fields;
        let description = adf::to_text(&fields.description);
        let comments = fields
            .comment
            .unwrap_or_default()
            .comments
            .into_iter()
            .map(|c| Comment {
                author: c.author.unwrap_or_default().display_name,
                created: c.created,
                body: adf::to_text(&c.body),
            })
            .collect();

        Item {
            key: issue.key,
            title: fields.summary,
            acceptance_criteria: extract_acceptance_criteria(&description),
            description,
            item_type: name_of(fields.issuetype),
            priority: name_of(fields.priority),
            status: name_of(fields.status),
            labels: fields.labels,
            components: fields.components.into_iter().map(|c| c.name).collect(),
            comments,
        }
    }
}

/// Single-paragraph ADF document
fn adf_paragraph(text: &str) -> Value {
    json!({
        "type": "doc",
        "version": 1,
        "content": [
            {"type": "paragraph", "content": [{"type": "text", "text": text}]}
        ]
    })
}

/// Jira tracker backed by the REST API (basic auth with email + API token)
pub struct JiraRestTracker {
    client: Client,
    base_url: String,
    email: String,
    api_token: String,
    jql: String,
}

impl JiraRestTracker {
    pub fn new(config: &JiraConfig, timeout: Duration) -> CollaboratorResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            email: config.email.clone(),
            api_token: config.api_token.clone(),
            jql: config.jql.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> CollaboratorResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::NOT_FOUND {
            return Err(CollaboratorError::NotFound(body));
        }
        if !status.is_success() {
            return Err(CollaboratorError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    fn parse<T: for<'de> Deserialize<'de>>(body: &str) -> CollaboratorResult<T> {
        serde_json::from_str(body).map_err(|e| CollaboratorError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Tracker for JiraRestTracker {
    async fn fetch_item(&self, key: &str) -> CollaboratorResult<Item> {
        let request = self
            .request(Method::GET, &format!("/rest/api/3/issue/{}", key))
            .query(&[("fields", ISSUE_FIELDS)]);
        let body = self.send(request).await.map_err(|e| match e {
            CollaboratorError::NotFound(_) => CollaboratorError::NotFound(format!("issue {}", key)),
            other => other,
        })?;
        let issue: IssueResponse = Self::parse(&body)?;
        Ok(issue.into())
    }

    async fn fetch_assigned(&self) -> CollaboratorResult<Vec<Item>> {
        let request = self.request(Method::GET, "/rest/api/3/search").query(&[
            ("jql", self.jql.as_str()),
            ("fields", SEARCH_FIELDS),
            ("maxResults", SEARCH_LIMIT),
        ]);
        let body = self.send(request).await?;
        let search: SearchResponse = Self::parse(&body)?;
        Ok(search.issues.into_iter().map(Item::from).collect())
    }

    async fn add_comment(&self, key: &str, text: &str) -> CollaboratorResult<()> {
        let request = self
            .request(Method::POST, &format!("/rest/api/3/issue/{}/comment", key))
            .json(&json!({ "body": adf_paragraph(text) }));
        self.send(request).await?;
        Ok(())
    }

    async fn transition(&self, key: &str, target: &str) -> CollaboratorResult<()> {
        let path = format!("/rest/api/3/issue/{}/transitions", key);
        let body = self.send(self.request(Method::GET, &path)).await?;
        let available: TransitionsResponse = Self::parse(&body)?;

        let Some(transition) = find_transition(&available.transitions, target, |t| t.name.as_str())
        else {
            tracing::debug!(key, target, "no matching transition, skipping");
            return Ok(());
        };

        let request = self
            .request(Method::POST, &path)
            .json(&json!({ "transition": { "id": transition.id } }));
        self.send(request).await?;
        Ok(())
    }
}
