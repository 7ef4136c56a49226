use chrono::Local;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::state::SharedDashboard;
use crate::telemetry::TelemetrySource;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Debug, Error)]
pub enum PollError {
    #[error("poll loop already running")]
    AlreadyRunning,
}

/// One round of both telemetry fetches folded into the dashboard.
#[derive(Clone)]
pub struct PollCycle {
    source: Arc<dyn TelemetrySource>,
    dashboard: SharedDashboard,
}

impl PollCycle {
    pub fn new(source: Arc<dyn TelemetrySource>, dashboard: SharedDashboard) -> Self {
        Self { source, dashboard }
    }

    /// Position and status are fetched concurrently and applied independently.
    /// Failures are logged and dropped; the display keeps its previous values.
    pub async fn run(&self) {
        let position = async {
            match self.source.fetch_position().await {
                Ok(sample) => {
                    let received_at = Local::now().naive_local();
                    let mut dashboard = self.dashboard.lock().await;
                    dashboard.apply_position(&sample, received_at);
                    log::debug!("Position updated to {:.6}, {:.6}", sample.lat, sample.lon);
                }
                Err(e) => log::warn!("Failed to fetch position: {}", e),
            }
        };
        let status = async {
            match self.source.fetch_status().await {
                Ok(sample) => {
                    let mut dashboard = self.dashboard.lock().await;
                    dashboard.apply_status(&sample);
                    log::debug!("Status updated (battery {}%)", sample.battery);
                }
                Err(e) => log::warn!("Failed to fetch tracker status: {}", e),
            }
        };
        tokio::join!(position, status);
    }

    /// Runs a cycle in the background.
    pub fn spawn(&self) -> JoinHandle<()> {
        let cycle = self.clone();
        tokio::spawn(async move { cycle.run().await })
    }
}

#[derive(Debug)]
struct WorkerHandle {
    stop_tx: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

/// Owns the repeating timer. Every tick spawns a [`PollCycle`] so a slow
/// cycle never delays the next one. Clones share the same timer.
#[derive(Clone)]
pub struct PollLoop {
    cycle: PollCycle,
    worker: Arc<Mutex<Option<WorkerHandle>>>,
}

impl PollLoop {
    pub fn new(cycle: PollCycle) -> Self {
        Self {
            cycle,
            worker: Arc::new(Mutex::new(None)),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.worker.lock().await.is_some()
    }

    /// Fires a cycle right away, then once per `interval`.
    pub async fn start(&self, interval: Duration) -> Result<(), PollError> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            return Err(PollError::AlreadyRunning);
        }

        let cycle = self.cycle.clone();
        let (stop_tx, stop_rx) = oneshot::channel();
        let join = tokio::spawn(run_timer(cycle, interval, stop_rx));
        *worker = Some(WorkerHandle { stop_tx, join });

        log::info!("Polling every {}", humantime::format_duration(interval));
        Ok(())
    }

    /// Cancels future ticks. Cycles already in flight run to completion.
    pub async fn stop(&self) {
        let worker = self.worker.lock().await.take();
        if let Some(worker) = worker {
            let _ = worker.stop_tx.send(());
            let _ = worker.join.await;
            log::info!("Polling stopped");
        }
    }

    /// One out-of-band cycle; the timer is left untouched.
    pub fn refresh_now(&self) -> JoinHandle<()> {
        self.cycle.spawn()
    }
}

async fn run_timer(cycle: PollCycle, interval: Duration, mut stop_rx: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                cycle.spawn();
            }
        }
    }
}
