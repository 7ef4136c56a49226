use serde::{Deserialize, Deserializer};
use std::time::Duration;
use thiserror::Error;

use crate::dashboard::{DEFAULT_POLL_INTERVAL, DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TRAIL_CAPACITY};
use crate::telemetry::Coordinate;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            static_dir: default_static_dir(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_device_id")]
    pub id: String,
    #[serde(default = "default_device_name")]
    pub name: String,
    /// Start position as "lat, lon".
    #[serde(default = "default_coordinates")]
    pub coordinates: String,
    #[serde(default = "default_altitude")]
    pub altitude_m: f64,
    #[serde(default = "default_location")]
    pub location: Option<String>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            id: default_device_id(),
            name: default_device_name(),
            coordinates: default_coordinates(),
            altitude_m: default_altitude(),
            location: default_location(),
        }
    }
}

fn default_device_id() -> String {
    "GPS-TRACKER-001".to_string()
}

fn default_device_name() -> String {
    "GPS Tracker".to_string()
}

fn default_coordinates() -> String {
    "52.520008, 13.404954".to_string()
}

fn default_altitude() -> f64 {
    34.0
}

fn default_location() -> Option<String> {
    Some("Berlin, Deutschland".to_string())
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the telemetry API the dashboard polls.
    #[serde(default = "default_source_url")]
    pub source_url: String,
    #[serde(default = "default_poll_interval", deserialize_with = "humantime_duration")]
    pub poll_interval: Duration,
    #[serde(default = "default_fetch_timeout", deserialize_with = "humantime_duration")]
    pub fetch_timeout: Duration,
    #[serde(default = "default_trail_capacity")]
    pub trail_capacity: usize,
    /// Initial map center as "lat, lon". Falls back to the device start position.
    #[serde(default)]
    pub center: Option<String>,
    #[serde(default = "default_zoom")]
    pub initial_zoom: u8,
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    #[serde(default)]
    pub seed_history: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            poll_interval: default_poll_interval(),
            fetch_timeout: default_fetch_timeout(),
            trail_capacity: default_trail_capacity(),
            center: None,
            initial_zoom: default_zoom(),
            timestamp_format: default_timestamp_format(),
            seed_history: false,
        }
    }
}

fn default_source_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_poll_interval() -> Duration {
    DEFAULT_POLL_INTERVAL
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(4)
}

fn default_trail_capacity() -> usize {
    DEFAULT_TRAIL_CAPACITY
}

fn default_zoom() -> u8 {
    13
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

fn humantime_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.start_position()?;
        self.map_center()?;
        if self.dashboard.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "dashboard.poll_interval",
                message: "must be greater than zero".into(),
            });
        }
        let has_bad_item = chrono::format::StrftimeItems::new(&self.dashboard.timestamp_format)
            .any(|item| matches!(item, chrono::format::Item::Error));
        if has_bad_item {
            return Err(ConfigError::Invalid {
                field: "dashboard.timestamp_format",
                message: format!("bad strftime pattern {:?}", self.dashboard.timestamp_format),
            });
        }
        if self.dashboard.trail_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "dashboard.trail_capacity",
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn start_position(&self) -> Result<Coordinate, ConfigError> {
        Coordinate::parse(&self.device.coordinates).ok_or_else(|| ConfigError::Invalid {
            field: "device.coordinates",
            message: format!("expected \"lat, lon\", got {:?}", self.device.coordinates),
        })
    }

    pub fn map_center(&self) -> Result<Coordinate, ConfigError> {
        match &self.dashboard.center {
            Some(center) => Coordinate::parse(center).ok_or_else(|| ConfigError::Invalid {
                field: "dashboard.center",
                message: format!("expected \"lat, lon\", got {:?}", center),
            }),
            None => self.start_position(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_str("{}").unwrap();
        assert_eq!(config.web.bind, "0.0.0.0:8080");
        assert_eq!(config.dashboard.poll_interval, Duration::from_secs(5));
        assert_eq!(config.dashboard.fetch_timeout, Duration::from_secs(4));
        assert_eq!(config.dashboard.trail_capacity, 50);
        assert_eq!(config.device.id, "GPS-TRACKER-001");
        let center = config.map_center().unwrap();
        assert_eq!(center, Coordinate::new(52.520008, 13.404954));
    }

    #[test]
    fn parses_humantime_durations_and_center() {
        let yaml = r#"
dashboard:
  poll_interval: 1500ms
  fetch_timeout: 2s
  trail_capacity: 3
  center: "48.1, 11.5"
"#;
        let config = Config::from_str(yaml).unwrap();
        assert_eq!(config.dashboard.poll_interval, Duration::from_millis(1500));
        assert_eq!(config.dashboard.fetch_timeout, Duration::from_secs(2));
        assert_eq!(config.dashboard.trail_capacity, 3);
        assert_eq!(config.map_center().unwrap(), Coordinate::new(48.1, 11.5));
    }

    #[test]
    fn rejects_bad_coordinates() {
        let yaml = "device:\n  coordinates: nowhere\n";
        let err = Config::from_str(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "device.coordinates",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_timestamp_format() {
        let yaml = "dashboard:\n  timestamp_format: \"%Q\"\n";
        assert!(Config::from_str(yaml).is_err());
    }

    #[test]
    fn rejects_zero_capacity() {
        let yaml = "dashboard:\n  trail_capacity: 0\n";
        assert!(Config::from_str(yaml).is_err());
    }
}
