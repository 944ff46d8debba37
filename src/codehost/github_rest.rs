//! GitHub pull requests via the REST API

use super::CodeHost;
use crate::error::{CollaboratorError, CollaboratorResult};
use crate::models::GitHubConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("factory/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct CreatePull<'a> {
    title: &'a str,
    body: &'a str,
    head: &'a str,
    base: &'a str,
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    html_url: String,
}

pub struct GitHubRestHost {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubRestHost {
    pub fn new(config: &GitHubConfig, timeout: Duration) -> CollaboratorResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            token: config.token.clone(),
        })
    }

    fn pulls_url(&self) -> String {
        format!("{}/repos/{}/{}/pulls", self.api_url, self.owner, self.repo)
    }
}

#[async_trait]
impl CodeHost for GitHubRestHost {
    async fn open_change_request(
        &self,
        title: &str,
        body: &str,
        source_branch: &str,
        target_branch: &str,
    ) -> CollaboratorResult<String> {
        let payload = CreatePull {
            title,
            body,
            head: source_branch,
            base: target_branch,
        };
        let response = self
            .client
            .post(self.pulls_url())
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(CollaboratorError::Http {
                status: status.as_u16(),
                body: text,
            });
        }
        let pull: PullResponse =
            serde_json::from_str(&text).map_err(|e| CollaboratorError::Parse(e.to_string()))?;
        Ok(pull.html_url)
    }
}
