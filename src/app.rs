use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::dashboard::{
    Dashboard, DashboardSettings, PollCycle, PollError, PollLoop, SceneMap, SharedDashboard,
    ViewStateController,
};
use crate::telemetry::{FetchError, TelemetryClient};
use crate::web::config::{Config, ConfigError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry client error: {0}")]
    Fetch(#[from] FetchError),
    #[error("poll loop error: {0}")]
    Poll(#[from] PollError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The dashboard core wired to an HTTP telemetry source.
pub struct DashboardApp {
    pub dashboard: SharedDashboard,
    pub client: TelemetryClient,
    pub controller: ViewStateController,
    poll_loop: PollLoop,
    interval: Duration,
    seed_history: bool,
}

impl DashboardApp {
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let settings = DashboardSettings {
            center: config.map_center()?,
            zoom: config.dashboard.initial_zoom,
            trail_capacity: config.dashboard.trail_capacity,
            timestamp_format: config.dashboard.timestamp_format.clone(),
        };
        let map = SceneMap::new(&config.device.name);
        let dashboard = Dashboard::new(Box::new(map), &settings).shared();

        let client = TelemetryClient::new(
            &config.dashboard.source_url,
            config.dashboard.fetch_timeout,
        )?;
        let cycle = PollCycle::new(Arc::new(client.clone()), dashboard.clone());
        let poll_loop = PollLoop::new(cycle);
        let controller = ViewStateController::new(dashboard.clone(), poll_loop.clone());

        Ok(Self {
            dashboard,
            client,
            controller,
            poll_loop,
            interval: config.dashboard.poll_interval,
            seed_history: config.dashboard.seed_history,
        })
    }

    pub async fn start(&mut self) -> Result<(), AppError> {
        // Seeding twice would duplicate the history in the trail.
        if self.poll_loop.is_running().await {
            return Err(PollError::AlreadyRunning.into());
        }
        if self.seed_history {
            self.seed_trail().await;
        }
        log::info!("Polling telemetry from {}", self.client.base_url());
        self.poll_loop.start(self.interval).await?;
        Ok(())
    }

    pub async fn stop(&mut self) {
        self.poll_loop.stop().await;
    }

    async fn seed_trail(&self) {
        match self.client.fetch_history().await {
            Ok(history) => {
                let mut dashboard = self.dashboard.lock().await;
                dashboard.seed_trail(&history);
                log::info!("Seeded trail with {} historic positions", history.len());
            }
            Err(e) => log::warn!("Failed to fetch position history: {}", e),
        }
    }
}
