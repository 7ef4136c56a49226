use serde::Serialize;
use utoipa::ToSchema;

use crate::telemetry::StatusSample;

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BatteryTier {
    High,
    Medium,
    Low,
}

impl BatteryTier {
    pub fn css_class(&self) -> &'static str {
        match self {
            BatteryTier::High => "bg-success",
            BatteryTier::Medium => "bg-warning",
            BatteryTier::Low => "bg-danger",
        }
    }
}

/// High above 50, Medium 21 to 50, Low at 20 and below.
pub fn classify_battery(level: u8) -> BatteryTier {
    match level {
        0..=20 => BatteryTier::Low,
        21..=50 => BatteryTier::Medium,
        _ => BatteryTier::High,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Online,
    Offline,
}

impl Badge {
    pub fn label(&self) -> &'static str {
        match self {
            Badge::Online => "Online",
            Badge::Offline => "Offline",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Badge::Online => "badge bg-success",
            Badge::Offline => "badge bg-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DisplayFields {
    pub badge: Badge,
    pub badge_label: &'static str,
    pub badge_class: &'static str,
    pub battery_text: String,
    pub battery_width_pct: u8,
    pub battery_tier: BatteryTier,
    pub battery_class: &'static str,
    pub signal_text: String,
    pub last_update: String,
}

#[derive(Debug, Clone)]
pub struct StatusPresenter {
    timestamp_format: String,
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_FORMAT)
    }
}

impl StatusPresenter {
    pub fn new(timestamp_format: &str) -> Self {
        Self {
            timestamp_format: timestamp_format.to_string(),
        }
    }

    pub fn format_status(&self, sample: &StatusSample) -> DisplayFields {
        let badge = if sample.online {
            Badge::Online
        } else {
            Badge::Offline
        };
        let battery_tier = classify_battery(sample.battery);
        DisplayFields {
            badge,
            badge_label: badge.label(),
            badge_class: badge.css_class(),
            battery_text: format!("{}%", sample.battery),
            battery_width_pct: sample.battery.min(100),
            battery_tier,
            battery_class: battery_tier.css_class(),
            signal_text: format!("{}%", sample.signal_strength),
            last_update: sample
                .last_update
                .format(&self.timestamp_format)
                .to_string(),
        }
    }
}

/// Whole numbers print without a fractional part.
pub fn format_quantity(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
