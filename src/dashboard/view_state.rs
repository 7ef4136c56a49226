use serde::Serialize;
use std::time::Duration;
use utoipa::ToSchema;

use super::map_view::{TileSource, TRACKER_ZOOM};
use super::poll_loop::PollLoop;
use super::state::{ControlState, SharedDashboard};
use crate::telemetry::Coordinate;

/// How long the refresh control shows its confirmation.
pub const REFRESH_FEEDBACK: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ViewState {
    pub auto_center_enabled: bool,
    pub tile_source: TileSource,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            auto_center_enabled: true,
            tile_source: TileSource::Standard,
        }
    }
}

/// Applies user view actions to the dashboard and its named controls.
#[derive(Clone)]
pub struct ViewStateController {
    dashboard: SharedDashboard,
    poll: PollLoop,
    feedback: Duration,
}

impl ViewStateController {
    pub fn new(dashboard: SharedDashboard, poll: PollLoop) -> Self {
        Self {
            dashboard,
            poll,
            feedback: REFRESH_FEEDBACK,
        }
    }

    pub async fn toggle_auto_center(&self) -> bool {
        let mut dashboard = self.dashboard.lock().await;
        let enabled = !dashboard.view.auto_center_enabled;
        dashboard.view.auto_center_enabled = enabled;
        dashboard.controls.auto_center = ControlState::auto_center(enabled);
        log::info!(
            "Auto-center {}",
            if enabled { "enabled" } else { "disabled" }
        );
        enabled
    }

    pub async fn toggle_tile_source(&self) -> TileSource {
        let mut dashboard = self.dashboard.lock().await;
        let next = dashboard.view.tile_source.toggled();
        dashboard.map.set_tile_source(next);
        dashboard.view.tile_source = next;
        log::info!("Tile source switched to {:?}", next);
        next
    }

    /// Runs one extra poll cycle and flips the refresh control to its
    /// confirmation state until the feedback delay has passed.
    pub async fn request_manual_refresh(&self) -> ControlState {
        self.poll.refresh_now();

        let generation = {
            let mut dashboard = self.dashboard.lock().await;
            dashboard.controls.refresh_generation += 1;
            dashboard.controls.refresh = ControlState::refresh_confirmed();
            dashboard.controls.refresh_generation
        };

        let dashboard = self.dashboard.clone();
        let delay = self.feedback;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut dashboard = dashboard.lock().await;
            // A later refresh owns the control now.
            if dashboard.controls.refresh_generation == generation {
                dashboard.controls.refresh = ControlState::refresh_idle();
            }
        });

        ControlState::refresh_confirmed()
    }

    /// Centers on the marker at street zoom. `None` if the map has no marker.
    pub async fn center_on_tracker(&self) -> Option<Coordinate> {
        let mut dashboard = self.dashboard.lock().await;
        let position = dashboard.map.marker_position()?;
        dashboard.map.set_view(position, TRACKER_ZOOM);
        Some(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::map_view::{Layer, MapView};
    use crate::dashboard::poll_loop::tests::{rig, ScriptedSource};

    fn controller() -> (
        std::sync::Arc<ScriptedSource>,
        SharedDashboard,
        ViewStateController,
    ) {
        let (source, dashboard, poll) = rig(ScriptedSource::default());
        let controller = ViewStateController::new(dashboard.clone(), poll);
        (source, dashboard, controller)
    }

    #[tokio::test]
    async fn auto_center_starts_enabled_and_toggles() {
        let (_source, dashboard, controller) = controller();
        assert!(dashboard.lock().await.view().auto_center_enabled);

        assert!(!controller.toggle_auto_center().await);
        {
            let dashboard = dashboard.lock().await;
            assert!(!dashboard.view().auto_center_enabled);
            assert_eq!(dashboard.controls().auto_center.icon, "bi-play-circle");
        }

        assert!(controller.toggle_auto_center().await);
        let dashboard = dashboard.lock().await;
        assert_eq!(dashboard.controls().auto_center, ControlState::auto_center(true));
    }

    #[tokio::test]
    async fn tile_source_toggles_with_one_layer() {
        let (_source, dashboard, controller) = controller();
        assert_eq!(controller.toggle_tile_source().await, TileSource::Satellite);
        assert_eq!(controller.toggle_tile_source().await, TileSource::Standard);
        assert_eq!(controller.toggle_tile_source().await, TileSource::Satellite);

        let dashboard = dashboard.lock().await;
        assert_eq!(dashboard.view().tile_source, TileSource::Satellite);
        let tiles: Vec<_> = dashboard
            .map()
            .snapshot()
            .layers
            .into_iter()
            .filter_map(|l| match l {
                Layer::Tiles(t) => Some(t.kind),
                _ => None,
            })
            .collect();
        assert_eq!(tiles, vec![TileSource::Satellite]);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_refresh_fetches_and_reverts_feedback() {
        let (source, dashboard, controller) = controller();

        let control = controller.request_manual_refresh().await;
        assert_eq!(control.label, "Updated!");

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.position_calls(), 1);
        assert_eq!(source.status_calls(), 1);
        assert_eq!(
            dashboard.lock().await.controls().refresh,
            ControlState::refresh_confirmed()
        );

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(
            dashboard.lock().await.controls().refresh,
            ControlState::refresh_idle()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_refresh_extends_feedback() {
        let (_source, dashboard, controller) = controller();
        controller.request_manual_refresh().await;
        tokio::time::sleep(Duration::from_millis(1000)).await;
        controller.request_manual_refresh().await;

        // First refresh's revert fires at 1.5s but the second one owns the control.
        tokio::time::sleep(Duration::from_millis(700)).await;
        assert_eq!(
            dashboard.lock().await.controls().refresh,
            ControlState::refresh_confirmed()
        );

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(
            dashboard.lock().await.controls().refresh,
            ControlState::refresh_idle()
        );
    }

    #[tokio::test]
    async fn center_on_tracker_uses_marker_and_street_zoom() {
        let (_source, dashboard, controller) = controller();
        {
            let mut dashboard = dashboard.lock().await;
            dashboard.view.auto_center_enabled = false;
            dashboard.apply_position(
                &crate::dashboard::state::tests::position(48.1, 11.5),
                crate::dashboard::state::tests::noon(),
            );
        }

        let centered = controller.center_on_tracker().await;
        assert_eq!(centered, Some(Coordinate::new(48.1, 11.5)));
        let snapshot = dashboard.lock().await.map().snapshot();
        assert_eq!(snapshot.center, Coordinate::new(48.1, 11.5));
        assert_eq!(snapshot.zoom, TRACKER_ZOOM);
    }

    #[tokio::test]
    async fn view_only_moves_while_auto_centering() {
        let (_source, dashboard, controller) = controller();
        let initial = dashboard.lock().await.snapshot().map;
        controller.toggle_auto_center().await;

        {
            let mut dashboard = dashboard.lock().await;
            for i in 0..3 {
                dashboard.apply_position(
                    &crate::dashboard::state::tests::position(48.1 + i as f64 * 0.01, 11.5),
                    crate::dashboard::state::tests::noon(),
                );
                let map = dashboard.snapshot().map;
                assert_eq!(map.center, initial.center);
                assert_eq!(map.zoom, initial.zoom);
            }
        }

        controller.toggle_auto_center().await;
        let mut dashboard = dashboard.lock().await;
        dashboard.apply_position(
            &crate::dashboard::state::tests::position(48.2, 11.6),
            crate::dashboard::state::tests::noon(),
        );
        let map = dashboard.snapshot().map;
        assert_eq!(map.center, Coordinate::new(48.2, 11.6));
        assert_eq!(map.zoom, initial.zoom);
    }
}
