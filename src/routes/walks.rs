// SPDX-License-Identifier: MIT

//! Walk session routes: start, append points, end, history and route.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::walk::{
    AppendPointsRequest, EndWalkRequest, OkResponse, StartWalkRequest, StartWalkResponse,
};
use crate::models::{Walk, WalkTotals};
use crate::services::route;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

/// Walk routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/walks", get(list_walks))
        .route("/api/walks/start", post(start_walk))
        .route("/api/walks/points", post(append_points))
        .route("/api/walks/end", post(end_walk))
        .route("/api/walks/{id}/route", get(get_walk_route))
}

fn parse_walk_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("walkId must be a UUID".to_string()))
}

fn walk_not_found(walk_id: Uuid) -> AppError {
    AppError::NotFound(format!("Walk {} not found", walk_id))
}

// ─── Session Lifecycle ───────────────────────────────────────

/// Start a walk session. The body may be empty.
async fn start_walk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Result<Json<StartWalkResponse>> {
    let req: StartWalkRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartWalkRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid start payload: {}", e)))?
    };

    if let Some(dog_id) = req.dog_id.as_deref() {
        let dog = state
            .db
            .get_dog(dog_id)
            .ok_or_else(|| AppError::NotFound(format!("Dog {} not found", dog_id)))?;

        if !dog.is_accessible_by(user.email.as_deref()) {
            tracing::warn!(
                user_id = %user.user_id,
                dog_id,
                "Walk start refused for dog owned by another account"
            );
            return Err(AppError::Forbidden(
                "Dog belongs to another account".to_string(),
            ));
        }
    }

    let walk = Walk::new(user.user_id, req.dog_id);
    let walk_id = walk.id;
    state.db.insert_walk(walk);

    tracing::info!(user_id = %user.user_id, walk_id = %walk_id, "Walk started");

    Ok(Json(StartWalkResponse {
        walk_id: walk_id.to_string(),
    }))
}

/// Append a batch of points to one of the caller's walks.
///
/// Batches for an ended walk are still accepted: the tracker's last
/// in-flight batch may arrive after the end call.
async fn append_points(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<AppendPointsRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    req.validate()?;
    let walk_id = parse_walk_id(&req.walk_id)?;

    let stored = state
        .db
        .append_points(user.user_id, walk_id, &req.points)
        .ok_or_else(|| walk_not_found(walk_id))?;

    tracing::debug!(
        walk_id = %walk_id,
        count = req.points.len(),
        stored,
        "Points appended"
    );

    Ok(Json(OkResponse::ok()))
}

/// Record final totals for one of the caller's walks.
async fn end_walk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<EndWalkRequest>, JsonRejection>,
) -> Result<Json<OkResponse>> {
    let Json(req) = payload?;
    req.validate()?;
    let walk_id = parse_walk_id(&req.walk_id)?;

    let totals = WalkTotals {
        duration_s: req.duration_s,
        distance_m: req.distance_m,
    };

    if !state
        .db
        .end_walk(user.user_id, walk_id, totals, chrono::Utc::now())
    {
        return Err(walk_not_found(walk_id));
    }

    tracing::info!(
        walk_id = %walk_id,
        duration_s = totals.duration_s,
        distance_m = totals.distance_m,
        "Walk ended"
    );

    Ok(Json(OkResponse::ok()))
}

// ─── Walk History ────────────────────────────────────────────

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct WalksQuery {
    /// Only walks for this dog
    #[validate(length(min = 1, max = 100))]
    dog_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WalkListItem {
    pub id: String,
    pub dog_id: Option<String>,
    pub created_at: String,
    pub ended_at: Option<String>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub total_duration_s: Option<u64>,
    pub total_distance_m: Option<f64>,
    pub in_progress: bool,
}

impl From<Walk> for WalkListItem {
    fn from(walk: Walk) -> Self {
        Self {
            id: walk.id.to_string(),
            in_progress: walk.is_in_progress(),
            dog_id: walk.dog_id,
            created_at: format_utc_rfc3339(walk.created_at),
            ended_at: walk.ended_at.map(format_utc_rfc3339),
            total_duration_s: walk.total_duration_s,
            total_distance_m: walk.total_distance_m,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WalksResponse {
    pub walks: Vec<WalkListItem>,
}

/// List the caller's walks, newest first.
async fn list_walks(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<WalksQuery>,
) -> Result<Json<WalksResponse>> {
    params.validate()?;

    tracing::debug!(user_id = %user.user_id, dog_id = ?params.dog_id, "Fetching walks");

    let walks = state
        .db
        .list_walks(user.user_id, params.dog_id.as_deref())
        .into_iter()
        .map(WalkListItem::from)
        .collect();

    Ok(Json(WalksResponse { walks }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RouteResponse {
    pub walk_id: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub point_count: usize,
    /// Length of the stored route, which may be shorter than the walk's
    /// recorded total if point batches were lost.
    pub route_distance_m: f64,
    pub total_distance_m: Option<f64>,
    pub polyline: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "unknown"))]
    pub geometry: Option<geojson::Geometry>,
}

/// Get the stored route of one of the caller's walks.
async fn get_walk_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<RouteResponse>> {
    let walk_id = parse_walk_id(&id)?;
    let walk = state
        .db
        .get_walk(user.user_id, walk_id)
        .ok_or_else(|| walk_not_found(walk_id))?;
    let points = state
        .db
        .walk_points(user.user_id, walk_id)
        .ok_or_else(|| walk_not_found(walk_id))?;

    let summary = route::summarize(&points)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Route error: {}", e)))?;

    Ok(Json(RouteResponse {
        walk_id: walk_id.to_string(),
        point_count: summary.point_count,
        route_distance_m: summary.distance_m,
        total_distance_m: walk.total_distance_m,
        polyline: summary.polyline,
        geometry: summary.geometry,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_walk_id_rejects_non_uuid() {
        let err = parse_walk_id("walk-1").unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let id = Uuid::new_v4();
        assert_eq!(parse_walk_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_list_item_marks_in_progress() {
        let walk = Walk::new(Uuid::new_v4(), Some("dog-1".to_string()));
        let item = WalkListItem::from(walk);

        assert!(item.in_progress);
        assert!(item.ended_at.is_none());
        assert!(item.created_at.ends_with('Z'));
        assert_eq!(item.dog_id.as_deref(), Some("dog-1"));
    }
}
