use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::dashboard::{DashboardSnapshot, ViewState};
use crate::telemetry::Coordinate;
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub label: String,
    pub class: String,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Map layers, display fields, view state and controls")
    ),
    tag = "dashboard"
)]
pub async fn snapshot(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    let dashboard = state.dashboard.lock().await;
    Json(dashboard.snapshot())
}

#[utoipa::path(
    post,
    path = "/api/view/auto-center",
    responses(
        (status = 200, description = "Auto-center toggled", body = ViewState)
    ),
    tag = "dashboard"
)]
pub async fn toggle_auto_center(State(state): State<AppState>) -> Json<ViewState> {
    state.controller.toggle_auto_center().await;
    Json(state.dashboard.lock().await.view())
}

#[utoipa::path(
    post,
    path = "/api/view/tile-source",
    responses(
        (status = 200, description = "Tile source toggled", body = ViewState)
    ),
    tag = "dashboard"
)]
pub async fn toggle_tile_source(State(state): State<AppState>) -> Json<ViewState> {
    state.controller.toggle_tile_source().await;
    Json(state.dashboard.lock().await.view())
}

#[utoipa::path(
    post,
    path = "/api/view/refresh",
    responses(
        (status = 202, description = "Out-of-cycle refresh started", body = RefreshResponse)
    ),
    tag = "dashboard"
)]
pub async fn refresh(State(state): State<AppState>) -> (StatusCode, Json<RefreshResponse>) {
    let control = state.controller.request_manual_refresh().await;
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            label: control.label.to_string(),
            class: control.class.to_string(),
        }),
    )
}

#[utoipa::path(
    post,
    path = "/api/view/center",
    responses(
        (status = 200, description = "Map centered on the tracker", body = Coordinate),
        (status = 409, description = "Map has no tracker marker", body = ErrorResponse)
    ),
    tag = "dashboard"
)]
pub async fn center(State(state): State<AppState>) -> ApiResult<Json<Coordinate>> {
    state
        .controller
        .center_on_tracker()
        .await
        .map(Json)
        .ok_or(ApiError::Conflict("no_marker"))
}
