use std::sync::Arc;
use tokio::sync::Mutex;

use crate::dashboard::{SharedDashboard, ViewStateController};
use crate::device::DeviceSimulator;

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub device: Arc<Mutex<DeviceSimulator>>,
    pub dashboard: SharedDashboard,
    pub controller: ViewStateController,
}
