//! API route handlers.

use super::error::ApiError;
use super::AppState;
use crate::analysis::{detect_milestones, detect_risks};
use crate::cache::SnapshotCache;
use crate::models::{DashboardSnapshot, Milestone, Risk};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Query string accepted by snapshot-backed routes.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshQuery {
    /// `refresh=1` forces a rebuild.
    #[serde(default)]
    pub refresh: Option<String>,
}

impl RefreshQuery {
    pub fn force(&self) -> bool {
        self.refresh.as_deref() == Some("1")
    }
}

/// Response for the health endpoint.
#[derive(Debug, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub cached: bool,
    pub cache_age_sec: Option<u64>,
    pub cache_ttl_sec: u64,
    pub rebuilding: bool,
}

/// GET /api/dashboard - the current snapshot.
pub async fn dashboard(
    State(cache): State<SnapshotCache>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Arc<DashboardSnapshot>>, ApiError> {
    Ok(Json(cache.get(query.force()).await?))
}

/// GET /api/risks - risks detected in the current snapshot.
pub async fn risks(
    State(cache): State<SnapshotCache>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Vec<Risk>>, ApiError> {
    let snapshot = cache.get(query.force()).await?;
    Ok(Json(detect_risks(&snapshot)))
}

/// GET /api/milestones - per-phase milestone checklist.
pub async fn milestones(
    State(state): State<AppState>,
    Query(query): Query<RefreshQuery>,
) -> Result<Json<Vec<Milestone>>, ApiError> {
    let snapshot = state.cache.get(query.force()).await?;
    Ok(Json(detect_milestones(&snapshot, &state.milestone_rules)))
}

/// GET /api/health - cache status. Never triggers a rebuild.
pub async fn health(State(cache): State<SnapshotCache>) -> Json<HealthResponse> {
    let health = cache.health();
    Json(HealthResponse {
        status: "ok".to_string(),
        cached: health.has_snapshot,
        cache_age_sec: health.age_seconds,
        cache_ttl_sec: health.ttl_seconds,
        rebuilding: health.rebuilding,
    })
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/risks", get(risks))
        .route("/milestones", get(milestones))
        .route("/health", get(health))
}
