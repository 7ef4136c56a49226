use utoipa::OpenApi;

use super::api::dashboard::RefreshResponse;
use super::api::error::ErrorResponse;
use crate::dashboard::{TileSource, ViewState};
use crate::telemetry::{Coordinate, PositionSample, StatusSample};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::device::current_position,
        super::api::device::position_history,
        super::api::device::tracker_status,
        super::api::dashboard::snapshot,
        super::api::dashboard::toggle_auto_center,
        super::api::dashboard::toggle_tile_source,
        super::api::dashboard::refresh,
        super::api::dashboard::center,
    ),
    components(
        schemas(
            PositionSample,
            StatusSample,
            Coordinate,
            ViewState,
            TileSource,
            RefreshResponse,
            ErrorResponse,
        )
    ),
    info(
        title = "geotrack API",
        description = "GPS tracker telemetry and dashboard view API",
        version = "0.1.0"
    ),
    tags(
        (name = "device", description = "Tracker telemetry"),
        (name = "dashboard", description = "Dashboard state and view actions")
    )
)]
pub struct ApiDoc;
