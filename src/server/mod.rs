//! HTTP layer exposing the cached snapshot.
//!
//! API routes live under `/api`; everything else is served from the static
//! directory, with `dashboard.html` as the index page.

pub mod error;
pub mod routes;

use crate::cache::SnapshotCache;
use crate::models::MilestoneRule;
use anyhow::{Context, Result};
use axum::extract::FromRef;
use axum::Router;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Index page served for `/`.
pub const INDEX_FILE: &str = "dashboard.html";

/// Shared state handed to every route.
#[derive(Clone)]
pub struct AppState {
    pub cache: SnapshotCache,
    pub milestone_rules: Arc<[MilestoneRule]>,
}

impl AppState {
    pub fn new(cache: SnapshotCache, milestone_rules: Vec<MilestoneRule>) -> Self {
        Self {
            cache,
            milestone_rules: milestone_rules.into(),
        }
    }
}

impl FromRef<AppState> for SnapshotCache {
    fn from_ref(state: &AppState) -> Self {
        state.cache.clone()
    }
}

/// Build the full application router.
pub fn create_app(state: AppState, static_dir: &Path) -> Router {
    let mut app = Router::new().nest("/api", routes::router());

    if static_dir.is_dir() {
        let assets = ServeDir::new(static_dir).append_index_html_on_directories(false);
        app = app
            .route_service("/", tower_http::services::ServeFile::new(static_dir.join(INDEX_FILE)))
            .fallback_service(assets);
    } else {
        warn!(
            "Static directory {} not found; serving API routes only",
            static_dir.display()
        );
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr, static_dir: &Path) -> Result<()> {
    let app = create_app(state, static_dir);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Serving dashboard on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Aggregator, AggregatorConfig};
    use crate::jira::{JiraClient, JiraClientConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn offline_state() -> AppState {
        let client = JiraClient::new(JiraClientConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        })
        .unwrap();
        let aggregator = Aggregator::new(Arc::new(client), AggregatorConfig::default());
        AppState::new(
            SnapshotCache::new(aggregator, Duration::from_secs(300)),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn test_serves_index_and_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(INDEX_FILE), "<h1>dashboard</h1>").unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/app.js"), "console.log(1)").unwrap();

        let app = create_app(offline_state(), dir.path());

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"<h1>dashboard</h1>");

        let response = app
            .oneshot(Request::builder().uri("/js/app.js").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_only_without_static_dir() {
        let app = create_app(offline_state(), Path::new("/nonexistent/phaseboard-static"));

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
