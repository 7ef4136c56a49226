mod client;
mod error;
mod types;

pub use client::TelemetryClient;
pub use error::FetchError;
pub use types::{Coordinate, PositionSample, StatusSample};

use async_trait::async_trait;

/// Anything that can answer the two per-cycle telemetry queries.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    async fn fetch_position(&self) -> Result<PositionSample, FetchError>;
    async fn fetch_status(&self) -> Result<StatusSample, FetchError>;
}
