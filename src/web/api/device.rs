use axum::{extract::State, Json};

use crate::telemetry::{PositionSample, StatusSample};
use crate::web::state::AppState;

#[utoipa::path(
    get,
    path = "/api/current-position",
    responses(
        (status = 200, description = "Latest position fix", body = PositionSample)
    ),
    tag = "device"
)]
pub async fn current_position(State(state): State<AppState>) -> Json<PositionSample> {
    let mut device = state.device.lock().await;
    Json(device.next_position())
}

#[utoipa::path(
    get,
    path = "/api/position-history",
    responses(
        (status = 200, description = "Recent position fixes, oldest first", body = Vec<PositionSample>)
    ),
    tag = "device"
)]
pub async fn position_history(State(state): State<AppState>) -> Json<Vec<PositionSample>> {
    let mut device = state.device.lock().await;
    Json(device.history())
}

#[utoipa::path(
    get,
    path = "/api/tracker-status",
    responses(
        (status = 200, description = "Tracker health", body = StatusSample)
    ),
    tag = "device"
)]
pub async fn tracker_status(State(state): State<AppState>) -> Json<StatusSample> {
    let mut device = state.device.lock().await;
    Json(device.status())
}
