//! The dashboard core: trail, map view, status presentation, the poll loop
//! that feeds them and the controller for user view actions.

mod map_view;
mod poll_loop;
mod presenter;
mod state;
mod stats;
mod trail;
mod view_state;

pub use map_view::{SceneMap, TileSource};
pub use poll_loop::{PollCycle, PollError, PollLoop, DEFAULT_POLL_INTERVAL};
pub use presenter::DEFAULT_TIMESTAMP_FORMAT;
pub use state::{Dashboard, DashboardSettings, DashboardSnapshot, SharedDashboard};
pub use trail::DEFAULT_TRAIL_CAPACITY;
pub use view_state::{ViewState, ViewStateController};
