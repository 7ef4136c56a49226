use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::app::{AppError, DashboardApp};
use crate::device::DeviceSimulator;

use super::api::dashboard as dashboard_handlers;
use super::api::device as device_handlers;
use super::api_doc::ApiDoc;
use super::config::Config;
use super::state::AppState;
use super::ui::handlers as ui_handlers;

pub fn app_state(config: &Config, app: &DashboardApp) -> Result<AppState, AppError> {
    let device = DeviceSimulator::new(&config.device, config.start_position()?);
    Ok(AppState {
        config: Arc::new(config.clone()),
        device: Arc::new(Mutex::new(device)),
        dashboard: app.dashboard.clone(),
        controller: app.controller.clone(),
    })
}

pub fn router(state: AppState) -> Router {
    let static_dir = state.config.web.static_dir.clone();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // UI routes
        .route("/", get(ui_handlers::dashboard))
        // Device telemetry
        .route(
            "/api/current-position",
            get(device_handlers::current_position),
        )
        .route(
            "/api/position-history",
            get(device_handlers::position_history),
        )
        .route("/api/tracker-status", get(device_handlers::tracker_status))
        // Dashboard state and view actions
        .route("/api/dashboard", get(dashboard_handlers::snapshot))
        .route(
            "/api/view/auto-center",
            post(dashboard_handlers::toggle_auto_center),
        )
        .route(
            "/api/view/tile-source",
            post(dashboard_handlers::toggle_tile_source),
        )
        .route("/api/view/refresh", post(dashboard_handlers::refresh))
        .route("/api/view/center", post(dashboard_handlers::center))
        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(config: Config) -> Result<(), AppError> {
    let bind_addr = config.web.bind.clone();
    let mut app = DashboardApp::from_config(&config)?;
    let state = app_state(&config, &app)?;

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    let server = tokio::spawn(async move {
        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    app.start().await?;
    let served = server.await;
    app.stop().await;

    match served {
        Ok(result) => result.map_err(AppError::from),
        Err(e) => Err(std::io::Error::other(e).into()),
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::info!("Shutting down"),
        Err(e) => {
            log::warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
