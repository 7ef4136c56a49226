use askama::Template;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::presenter::{format_quantity, UNKNOWN_LOCATION};
use crate::telemetry::{Coordinate, PositionSample};

/// Zoom used when the user asks to center on the tracker.
pub const TRACKER_ZOOM: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TileSource {
    #[default]
    Standard,
    Satellite,
}

impl TileSource {
    pub fn url_template(&self) -> &'static str {
        match self {
            TileSource::Standard => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            TileSource::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            TileSource::Standard => {
                "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
            }
            TileSource::Satellite => "Tiles &copy; Esri",
        }
    }

    pub fn max_zoom(&self) -> u8 {
        19
    }

    pub fn toggled(&self) -> Self {
        match self {
            TileSource::Standard => TileSource::Satellite,
            TileSource::Satellite => TileSource::Standard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub kind: TileSource,
    pub url_template: &'static str,
    pub attribution: &'static str,
    pub max_zoom: u8,
}

impl From<TileSource> for TileLayer {
    fn from(kind: TileSource) -> Self {
        Self {
            kind,
            url_template: kind.url_template(),
            attribution: kind.attribution(),
            max_zoom: kind.max_zoom(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerLabel {
    pub title: String,
    pub lines: Vec<String>,
}

impl MarkerLabel {
    fn initial(title: &str) -> Self {
        Self {
            title: title.to_string(),
            lines: vec!["Current position".to_string()],
        }
    }

    fn for_sample(title: &str, sample: &PositionSample) -> Self {
        Self {
            title: title.to_string(),
            lines: vec![
                format!("Position: {:.6}, {:.6}", sample.lat, sample.lon),
                format!("Speed: {} km/h", format_quantity(sample.speed)),
                format!("Altitude: {} m", format_quantity(sample.altitude)),
                format!(
                    "Location: {}",
                    sample.location.as_deref().unwrap_or(UNKNOWN_LOCATION)
                ),
            ],
        }
    }
}

/// Popup markup for the marker. Every label string is HTML-escaped.
#[derive(Template)]
#[template(path = "marker_popup.html")]
struct MarkerPopup<'a> {
    label: &'a MarkerLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub label: MarkerLabel,
    pub popup_html: String,
}

impl Marker {
    fn new(position: Coordinate, label: MarkerLabel) -> Self {
        let popup_html = match (MarkerPopup { label: &label }).render() {
            Ok(html) => html,
            Err(e) => {
                log::warn!("Failed to render marker popup: {}", e);
                String::new()
            }
        };
        Self {
            position,
            label,
            popup_html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailPath {
    pub points: Vec<Coordinate>,
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f32,
}

impl TrailPath {
    fn new(points: Vec<Coordinate>) -> Self {
        Self {
            points,
            color: "blue",
            weight: 3,
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Layer {
    Tiles(TileLayer),
    Marker(Marker),
    Trail(TrailPath),
}

/// What a renderer needs to reproduce the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub center: Coordinate,
    pub zoom: u8,
    pub layers: Vec<Layer>,
}

/// Operations the dashboard needs from a mapping widget.
pub trait MapView: Send {
    fn initialize(&mut self, center: Coordinate, zoom: u8);
    fn update_marker(&mut self, sample: &PositionSample);
    /// Replaces any previously rendered trail.
    fn render_trail(&mut self, points: &[Coordinate]);
    /// Moves the view center, keeping the zoom level.
    fn recenter(&mut self, center: Coordinate);
    fn set_view(&mut self, center: Coordinate, zoom: u8);
    /// Removes every active tile layer and installs `kind`.
    fn set_tile_source(&mut self, kind: TileSource);
    fn marker_position(&self) -> Option<Coordinate>;
    fn snapshot(&self) -> MapSnapshot;
}

/// Retained layer list, rendered by whoever consumes [`MapSnapshot`].
#[derive(Debug, Clone)]
pub struct SceneMap {
    title: String,
    center: Coordinate,
    zoom: u8,
    layers: Vec<Layer>,
}

impl SceneMap {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            center: Coordinate::new(0.0, 0.0),
            zoom: 0,
            layers: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    #[cfg(test)]
    pub fn center(&self) -> Coordinate {
        self.center
    }

    #[cfg(test)]
    pub fn tile_layers(&self) -> impl Iterator<Item = &TileLayer> {
        self.layers.iter().filter_map(|l| match l {
            Layer::Tiles(t) => Some(t),
            _ => None,
        })
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.layers.iter().find_map(|l| match l {
            Layer::Marker(m) => Some(m),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn trail(&self) -> Option<&TrailPath> {
        self.layers.iter().find_map(|l| match l {
            Layer::Trail(t) => Some(t),
            _ => None,
        })
    }

    fn marker_mut(&mut self) -> Option<&mut Marker> {
        self.layers.iter_mut().find_map(|l| match l {
            Layer::Marker(m) => Some(m),
            _ => None,
        })
    }
}

impl MapView for SceneMap {
    fn initialize(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
        self.layers = vec![
            Layer::Tiles(TileSource::Standard.into()),
            Layer::Marker(Marker::new(center, MarkerLabel::initial(&self.title))),
            Layer::Trail(TrailPath::new(Vec::new())),
        ];
    }

    fn update_marker(&mut self, sample: &PositionSample) {
        let marker = Marker::new(
            sample.coordinate(),
            MarkerLabel::for_sample(&self.title, sample),
        );
        match self.marker_mut() {
            Some(current) => *current = marker,
            None => self.layers.push(Layer::Marker(marker)),
        }
    }

    fn render_trail(&mut self, points: &[Coordinate]) {
        self.layers.retain(|l| !matches!(l, Layer::Trail(_)));
        self.layers.push(Layer::Trail(TrailPath::new(points.to_vec())));
    }

    fn recenter(&mut self, center: Coordinate) {
        self.center = center;
    }

    fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.center = center;
        self.zoom = zoom;
    }

    fn set_tile_source(&mut self, kind: TileSource) {
        self.layers.retain(|l| !matches!(l, Layer::Tiles(_)));
        // Tiles stay at the bottom of the stack.
        self.layers.insert(0, Layer::Tiles(kind.into()));
    }

    fn marker_position(&self) -> Option<Coordinate> {
        self.marker().map(|m| m.position)
    }

    fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            center: self.center,
            zoom: self.zoom,
            layers: self.layers.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn berlin() -> Coordinate {
        Coordinate::new(52.520008, 13.404954)
    }

    fn initialized() -> SceneMap {
        let mut map = SceneMap::new("GPS Tracker");
        map.initialize(berlin(), 13);
        map
    }

    fn sample(lat: f64, lon: f64, speed: f64, altitude: f64) -> PositionSample {
        PositionSample {
            lat,
            lon,
            speed,
            altitude,
            location: None,
            timestamp: None,
        }
    }

    #[test]
    fn initialize_installs_standard_tiles_and_marker() {
        let map = initialized();
        let tiles: Vec<_> = map.tile_layers().collect();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].kind, TileSource::Standard);
        assert_eq!(map.marker_position(), Some(berlin()));
        assert_eq!(map.zoom(), 13);
        assert!(map.trail().unwrap().points.is_empty());
    }

    #[test]
    fn marker_moves_and_label_shows_units() {
        let mut map = initialized();
        map.update_marker(&sample(52.5, 13.4, 10.0, 34.0));

        let marker = map.marker().unwrap();
        assert_eq!(marker.position, Coordinate::new(52.5, 13.4));
        assert!(marker.label.lines.iter().any(|l| l.contains("10 km/h")));
        assert!(marker.label.lines.iter().any(|l| l.contains("34 m")));
        assert!(marker
            .label
            .lines
            .iter()
            .any(|l| l == "Position: 52.500000, 13.400000"));
        assert!(marker.label.lines.iter().any(|l| l.contains("Unknown")));
    }

    #[test]
    fn popup_escapes_label_text() {
        let mut map = SceneMap::new("<b>Tracker</b>");
        map.initialize(berlin(), 13);
        let mut position = sample(52.5, 13.4, 10.0, 34.0);
        position.location = Some("<img src=x onerror=alert(1)>".to_string());
        map.update_marker(&position);

        let marker = map.marker().unwrap();
        assert_eq!(
            marker.label.lines.last().map(String::as_str),
            Some("Location: <img src=x onerror=alert(1)>")
        );
        let popup = &marker.popup_html;
        assert!(!popup.contains("<img"), "{popup}");
        assert!(!popup.contains("<b>Tracker"), "{popup}");
        assert!(popup.contains("img src=x onerror=alert(1)"));
        assert!(popup.contains("10 km/h"));
        assert!(popup.contains("<br>"));
    }

    #[test]
    fn same_tile_source_twice_leaves_one_layer() {
        let mut map = initialized();
        map.set_tile_source(TileSource::Satellite);
        map.set_tile_source(TileSource::Satellite);
        let tiles: Vec<_> = map.tile_layers().collect();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].kind, TileSource::Satellite);
        assert!(tiles[0].url_template.contains("World_Imagery"));

        map.set_tile_source(TileSource::Standard);
        map.set_tile_source(TileSource::Standard);
        assert_eq!(map.tile_layers().count(), 1);
        assert!(matches!(map.snapshot().layers[0], Layer::Tiles(_)));
    }

    #[test]
    fn render_trail_replaces_previous_path() {
        let mut map = initialized();
        let a = Coordinate::new(1.0, 1.0);
        let b = Coordinate::new(2.0, 2.0);
        map.render_trail(&[a, b]);
        map.render_trail(&[b]);

        let trails: Vec<_> = map
            .snapshot()
            .layers
            .into_iter()
            .filter(|l| matches!(l, Layer::Trail(_)))
            .collect();
        assert_eq!(trails.len(), 1);
        assert_eq!(map.trail().unwrap().points, vec![b]);
    }

    #[test]
    fn recenter_keeps_zoom() {
        let mut map = initialized();
        map.recenter(Coordinate::new(48.1, 11.5));
        assert_eq!(map.center(), Coordinate::new(48.1, 11.5));
        assert_eq!(map.zoom(), 13);

        map.set_view(berlin(), TRACKER_ZOOM);
        assert_eq!(map.zoom(), TRACKER_ZOOM);
    }

    #[test]
    fn toggled_flips_between_sources() {
        assert_eq!(TileSource::Standard.toggled(), TileSource::Satellite);
        assert_eq!(TileSource::Satellite.toggled(), TileSource::Standard);
    }
}
