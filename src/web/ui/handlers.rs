use axum::{extract::State, response::IntoResponse};

use crate::web::state::AppState;

use super::templates::DashboardTemplate;

/// The page re-reads the dashboard snapshot at the poll interval.
pub async fn dashboard(State(state): State<AppState>) -> impl IntoResponse {
    DashboardTemplate {
        device_name: state.config.device.name.clone(),
        device_id: state.config.device.id.clone(),
        refresh_ms: state.config.dashboard.poll_interval.as_millis() as u64,
    }
}
