//! HTTP implementation of [`IssueApi`] against Jira Cloud REST v3.

use super::{IssueApi, SearchPage};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the Jira client.
#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    /// Site root, without trailing slash (e.g. `https://acme.atlassian.net`).
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    /// Per-request timeout. No retries are attempted.
    pub timeout_seconds: u64,
}

impl Default for JiraClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            timeout_seconds: 30,
        }
    }
}

/// Jira REST client using Basic auth (email + API token).
pub struct JiraClient {
    config: JiraClientConfig,
    http_client: reqwest::Client,
}

impl JiraClient {
    /// Create a new client.
    pub fn new(config: JiraClientConfig) -> Result<Self> {
        info!(
            "Initializing Jira client for {} (timeout {}s)",
            config.base_url, config.timeout_seconds
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DashboardError::upstream("client setup", e.to_string()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/3/{}", self.config.base_url, path)
    }

    /// Issue a GET and decode the JSON body, mapping every failure to `Upstream`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        context: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.api_url(path);
        debug!("GET {} ({})", url, context);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out after {}s", self.config.timeout_seconds)
                } else if e.is_connect() {
                    format!("cannot connect to Jira at {}", self.config.base_url)
                } else {
                    format!("failed to send request: {}", e)
                };
                DashboardError::upstream(context, message)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::upstream_status(
                context,
                status.as_u16(),
                format!("Jira API error {}: {}", status, body),
            ));
        }

        response.json().await.map_err(|e| {
            DashboardError::upstream(context, format!("failed to parse response: {}", e))
        })
    }
}

#[async_trait]
impl IssueApi for JiraClient {
    async fn fetch_issue(&self, key: &str, fields: &[&str]) -> Result<Value> {
        let context = format!("issue {}", key);
        self.get_json(
            &context,
            &format!("issue/{}", key),
            &[("fields", fields.join(","))],
        )
        .await
    }

    async fn search_page(
        &self,
        jql: &str,
        fields: &[&str],
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let mut query = vec![
            ("jql", jql.to_string()),
            ("fields", fields.join(",")),
            ("maxResults", page_size.to_string()),
        ];
        if let Some(token) = page_token {
            query.push(("nextPageToken", token.to_string()));
        }

        self.get_json("search", "search/jql", &query).await
    }
}
