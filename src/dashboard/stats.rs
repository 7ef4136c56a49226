use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::{Coordinate, PositionSample};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometers.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Running aggregates over every position received this session.
#[derive(Debug, Clone, Default)]
pub struct TrailStats {
    max_speed_kmh: f64,
    distance_km: f64,
    last_coordinate: Option<Coordinate>,
    first_seen: Option<NaiveDateTime>,
    last_seen: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StatsFields {
    pub max_speed: String,
    pub distance: String,
    pub duration: String,
    pub points: usize,
}

impl TrailStats {
    /// `received_at` stands in for samples that carry no timestamp.
    pub fn record(&mut self, sample: &PositionSample, received_at: NaiveDateTime) {
        let coordinate = sample.coordinate();
        if let Some(prev) = self.last_coordinate {
            self.distance_km += haversine_km(prev, coordinate);
        }
        self.last_coordinate = Some(coordinate);
        self.max_speed_kmh = self.max_speed_kmh.max(sample.speed);

        let seen = sample.timestamp.unwrap_or(received_at);
        self.first_seen = Some(self.first_seen.map_or(seen, |first| first.min(seen)));
        self.last_seen = Some(self.last_seen.map_or(seen, |last| last.max(seen)));
    }

    #[cfg(test)]
    pub fn max_speed_kmh(&self) -> f64 {
        self.max_speed_kmh
    }

    #[cfg(test)]
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration(&self) -> chrono::Duration {
        match (self.first_seen, self.last_seen) {
            (Some(first), Some(last)) => last - first,
            _ => chrono::Duration::zero(),
        }
    }

    pub fn fields(&self, trail_points: usize) -> StatsFields {
        let duration = self.duration();
        StatsFields {
            max_speed: format!("{:.0}", self.max_speed_kmh),
            distance: format!("{:.1}", self.distance_km),
            duration: format!("{}h {}m", duration.num_hours(), duration.num_minutes() % 60),
            points: trail_points,
        }
    }
}
