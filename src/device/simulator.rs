use chrono::{Local, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::telemetry::{Coordinate, PositionSample, StatusSample};
use crate::web::config::DeviceConfig;

/// Largest per-read step in degrees.
const JITTER_DEG: f64 = 0.001;
const HISTORY_POINTS: usize = 10;

/// Stand-in for a real GPS tracker: wanders around its start position.
pub struct DeviceSimulator {
    device_id: String,
    start: Coordinate,
    current: PositionSample,
    rng: StdRng,
}

impl DeviceSimulator {
    pub fn new(config: &DeviceConfig, start: Coordinate) -> Self {
        Self::with_rng(config, start, StdRng::from_entropy())
    }

    pub fn with_rng(config: &DeviceConfig, start: Coordinate, rng: StdRng) -> Self {
        Self {
            device_id: config.id.clone(),
            start,
            current: PositionSample {
                lat: start.latitude,
                lon: start.longitude,
                speed: 0.0,
                altitude: config.altitude_m,
                location: config.location.clone(),
                timestamp: Some(now()),
            },
            rng,
        }
    }

    /// Moves the device a small random step and returns the new reading.
    pub fn next_position(&mut self) -> PositionSample {
        self.current.lat += self.rng.gen_range(-JITTER_DEG..=JITTER_DEG);
        self.current.lon += self.rng.gen_range(-JITTER_DEG..=JITTER_DEG);
        self.current.speed = self.rng.gen_range(0..=60) as f64;
        self.current.timestamp = Some(now());
        self.current.clone()
    }

    pub fn status(&mut self) -> StatusSample {
        StatusSample {
            online: true,
            battery: self.rng.gen_range(60..=100),
            signal_strength: self.rng.gen_range(70..=100),
            last_update: now(),
            device_id: Some(self.device_id.clone()),
        }
    }

    /// A short straight track leading away from the start position.
    pub fn history(&mut self) -> Vec<PositionSample> {
        let timestamp = now();
        (0..HISTORY_POINTS)
            .map(|i| PositionSample {
                lat: self.start.latitude + i as f64 * JITTER_DEG,
                lon: self.start.longitude + i as f64 * JITTER_DEG,
                speed: self.rng.gen_range(0..=80) as f64,
                altitude: self.rng.gen_range(30..=50) as f64,
                location: None,
                timestamp: Some(timestamp),
            })
            .collect()
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}
