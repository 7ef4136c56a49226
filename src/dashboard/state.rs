use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::map_view::{MapSnapshot, MapView};
use super::presenter::{format_quantity, DisplayFields, StatusPresenter, UNKNOWN_LOCATION};
use super::stats::{StatsFields, TrailStats};
use super::trail::TrailBuffer;
use super::view_state::ViewState;
use crate::telemetry::{Coordinate, PositionSample, StatusSample};

pub type SharedDashboard = Arc<Mutex<Dashboard>>;

const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub center: Coordinate,
    pub zoom: u8,
    pub trail_capacity: usize,
    pub timestamp_format: String,
}

/// Named fields of the display surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayPanel {
    pub current_lat: String,
    pub current_lon: String,
    pub current_speed: String,
    pub current_altitude: String,
    pub current_location: String,
    pub status: Option<DisplayFields>,
    pub stats: StatsFields,
}

impl Default for DisplayPanel {
    fn default() -> Self {
        Self {
            current_lat: PLACEHOLDER.to_string(),
            current_lon: PLACEHOLDER.to_string(),
            current_speed: PLACEHOLDER.to_string(),
            current_altitude: PLACEHOLDER.to_string(),
            current_location: PLACEHOLDER.to_string(),
            status: None,
            stats: TrailStats::default().fields(0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlState {
    pub label: &'static str,
    pub icon: &'static str,
    pub class: &'static str,
}

impl ControlState {
    pub fn auto_center(enabled: bool) -> Self {
        if enabled {
            Self {
                label: "Auto-Tracking",
                icon: "bi-pause-circle",
                class: "btn btn-outline-secondary w-100 mb-2",
            }
        } else {
            Self {
                label: "Auto-Tracking",
                icon: "bi-play-circle",
                class: "btn btn-success w-100 mb-2",
            }
        }
    }

    pub fn refresh_idle() -> Self {
        Self {
            label: "Refresh",
            icon: "bi-arrow-clockwise",
            class: "btn btn-outline-info w-100",
        }
    }

    pub fn refresh_confirmed() -> Self {
        Self {
            label: "Updated!",
            icon: "bi-check-circle",
            class: "btn btn-success w-100",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controls {
    pub auto_center: ControlState,
    pub refresh: ControlState,
    #[serde(skip)]
    pub(crate) refresh_generation: u64,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            auto_center: ControlState::auto_center(true),
            refresh: ControlState::refresh_idle(),
            refresh_generation: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub map: MapSnapshot,
    pub panel: DisplayPanel,
    pub view: ViewState,
    pub controls: Controls,
}

/// Everything the dashboard renders, owned in one place. Each `apply_*` call
/// is one complete update; callers hold the lock for its duration.
pub struct Dashboard {
    pub(crate) map: Box<dyn MapView>,
    pub(crate) view: ViewState,
    pub(crate) controls: Controls,
    trail: TrailBuffer,
    panel: DisplayPanel,
    presenter: StatusPresenter,
    stats: TrailStats,
}

impl Dashboard {
    pub fn new(mut map: Box<dyn MapView>, settings: &DashboardSettings) -> Self {
        map.initialize(settings.center, settings.zoom);
        Self {
            map,
            view: ViewState::default(),
            controls: Controls::default(),
            trail: TrailBuffer::new(settings.trail_capacity),
            panel: DisplayPanel::default(),
            presenter: StatusPresenter::new(&settings.timestamp_format),
            stats: TrailStats::default(),
        }
    }

    pub fn shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    pub fn apply_position(&mut self, sample: &PositionSample, received_at: NaiveDateTime) {
        let coordinate = sample.coordinate();
        self.map.update_marker(sample);
        if self.view.auto_center_enabled {
            self.map.recenter(coordinate);
        }

        self.trail.append(coordinate);
        self.map.render_trail(&self.trail.snapshot());

        self.panel.current_lat = format!("{:.6}", sample.lat);
        self.panel.current_lon = format!("{:.6}", sample.lon);
        self.panel.current_speed = format_quantity(sample.speed);
        self.panel.current_altitude = format_quantity(sample.altitude);
        self.panel.current_location = sample
            .location
            .clone()
            .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());

        self.stats.record(sample, received_at);
        self.panel.stats = self.stats.fields(self.trail.len());
    }

    pub fn apply_status(&mut self, sample: &StatusSample) {
        self.panel.status = Some(self.presenter.format_status(sample));
    }

    /// Pre-fills the trail from earlier positions without moving the marker.
    pub fn seed_trail(&mut self, history: &[PositionSample]) {
        for sample in history {
            self.trail.append(sample.coordinate());
        }
        self.map.render_trail(&self.trail.snapshot());
        self.panel.stats.points = self.trail.len();
    }

    #[cfg(test)]
    pub fn trail(&self) -> &TrailBuffer {
        &self.trail
    }

    pub fn panel(&self) -> &DisplayPanel {
        &self.panel
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    #[cfg(test)]
    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    #[cfg(test)]
    pub fn map(&self) -> &dyn MapView {
        self.map.as_ref()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            map: self.map.snapshot(),
            panel: self.panel.clone(),
            view: self.view,
            controls: self.controls.clone(),
        }
    }
}
