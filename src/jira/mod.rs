//! Remote query client for the Jira REST API.
//!
//! [`IssueApi`] is the seam between the aggregator and the network: the
//! real [`JiraClient`] implements it over HTTP, and tests implement it
//! with in-memory fakes.

pub mod client;

pub use client::{JiraClient, JiraClientConfig};

use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Fields requested for the initiative record.
pub const INITIATIVE_FIELDS: &[&str] = &["summary", "status", "assignee", "project"];

/// Fields requested for phase records.
pub const PHASE_FIELDS: &[&str] = &["summary", "status", "assignee", "duedate"];

/// Fields requested for task records. `parent` is needed to group tasks by phase.
pub const TASK_FIELDS: &[&str] = &[
    "summary", "status", "assignee", "priority", "updated", "duedate", "parent",
];

/// Default number of records per search page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// One page of a paginated search.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Value>,
    /// Continuation token; absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// The token to request the following page with, if there is one.
    ///
    /// An empty token ends pagination the same way a missing one does.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Access to the remote issue tracker.
#[async_trait]
pub trait IssueApi: Send + Sync {
    /// Fetch a single issue with the given field selection.
    async fn fetch_issue(&self, key: &str, fields: &[&str]) -> Result<Value>;

    /// Fetch one page of a search.
    async fn search_page(
        &self,
        jql: &str,
        fields: &[&str],
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<SearchPage>;

    /// Run a search to exhaustion and return every record in page order.
    ///
    /// Any page failure fails the whole search; records from earlier pages
    /// are discarded.
    async fn search(&self, jql: &str, fields: &[&str], page_size: u32) -> Result<Vec<Value>> {
        let mut issues = Vec::new();
        let mut token: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .search_page(jql, fields, page_size, token.as_deref())
                .await?;
            pages += 1;
            debug!(
                "Search page {} returned {} issues for: {}",
                pages,
                page.issues.len(),
                jql
            );

            token = page.continuation().map(String::from);
            issues.extend(page.issues);

            if token.is_none() {
                break;
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Serves pre-baked pages and records the tokens it was asked for.
    struct PagedFake {
        pages: Vec<Result<SearchPage>>,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl PagedFake {
        fn new(pages: Vec<Result<SearchPage>>) -> Self {
            Self {
                pages,
                seen_tokens: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl IssueApi for PagedFake {
        async fn fetch_issue(&self, key: &str, _fields: &[&str]) -> Result<Value> {
            Ok(json!({"key": key}))
        }

        async fn search_page(
            &self,
            _jql: &str,
            _fields: &[&str],
            _page_size: u32,
            page_token: Option<&str>,
        ) -> Result<SearchPage> {
            let mut seen = self.seen_tokens.lock().unwrap();
            let index = seen.len();
            seen.push(page_token.map(String::from));
            self.pages[index].clone()
        }
    }

    fn records(prefix: &str, n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({"key": format!("{}-{}", prefix, i)}))
            .collect()
    }

    #[tokio::test]
    async fn test_search_drains_all_pages_in_order() {
        let fake = PagedFake::new(vec![
            Ok(SearchPage {
                issues: records("P1", 100),
                next_page_token: Some("tok-2".to_string()),
            }),
            Ok(SearchPage {
                issues: records("P2", 40),
                next_page_token: None,
            }),
        ]);

        let all = fake.search("parent = X", TASK_FIELDS, 100).await.unwrap();

        assert_eq!(all.len(), 140);
        assert_eq!(all[0]["key"], "P1-0");
        assert_eq!(all[99]["key"], "P1-99");
        assert_eq!(all[100]["key"], "P2-0");
        assert_eq!(all[139]["key"], "P2-39");
        assert_eq!(
            *fake.seen_tokens.lock().unwrap(),
            vec![None, Some("tok-2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_search_failure_discards_partial_results() {
        let fake = PagedFake::new(vec![
            Ok(SearchPage {
                issues: records("P1", 10),
                next_page_token: Some("tok-2".to_string()),
            }),
            Err(DashboardError::upstream_status("search page", 500, "boom")),
        ]);

        let err = fake.search("parent = X", TASK_FIELDS, 10).await.unwrap_err();
        assert!(matches!(err, DashboardError::Upstream { status: Some(500), .. }));
    }

    #[tokio::test]
    async fn test_empty_token_ends_pagination() {
        let fake = PagedFake::new(vec![Ok(SearchPage {
            issues: records("P1", 3),
            next_page_token: Some(String::new()),
        })]);

        let all = fake.search("parent = X", PHASE_FIELDS, 50).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(fake.seen_tokens.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_search_page_parses_missing_fields() {
        let page: SearchPage = serde_json::from_value(json!({})).unwrap();
        assert!(page.issues.is_empty());
        assert_eq!(page.continuation(), None);
    }
}
