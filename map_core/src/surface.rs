//! Seams between the core and whatever draws it.
//!
//! The map surface is a pan/zoom widget with a linear coordinate reference:
//! one display unit is one block. Its axes are `(lat, lng)` and a world
//! position `(x, z)` always lands on `(lat = z, lng = x)`.

use std::fmt;

use map_runtime::{category_of, LocationRecord, CATEGORIES};
use serde::Serialize;

/// A point in the surface's `(lat, lng)` convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayPoint {
    pub lat: f64,
    pub lng: f64,
}

impl DisplayPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn from_world(x: i64, z: i64) -> Self {
        Self {
            lat: z as f64,
            lng: x as f64,
        }
    }

    /// Nearest world `(x, z)` to this display point.
    pub fn to_world(self) -> (i64, i64) {
        (self.lng.round() as i64, self.lat.round() as i64)
    }
}

/// Opaque id handed out by [`MapSurface::add_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub glyph: &'static str,
    /// Styling key; the category key for locations, `origin` for the origin pin.
    pub style_key: String,
    pub title: String,
}

impl MarkerIcon {
    pub fn for_record(record: &LocationRecord) -> Self {
        Self {
            glyph: category_of(&record.category).icon,
            style_key: record.category.clone(),
            title: record.name.clone(),
        }
    }

    pub fn origin() -> Self {
        Self {
            glyph: "◉",
            style_key: "origin".to_string(),
            title: "Origin".to_string(),
        }
    }
}

/// Detail popup bound to a marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupContent {
    pub heading: String,
    pub category: Option<String>,
    pub coordinates: String,
    /// `None` when the record has no notes; the section is not drawn at all.
    pub notes: Option<String>,
}

impl PopupContent {
    pub fn for_record(record: &LocationRecord) -> Self {
        let descriptor = category_of(&record.category);
        Self {
            heading: format!("{} {}", descriptor.icon, record.name),
            category: Some(descriptor.name.to_string()),
            coordinates: format!("X: {} | Z: {}", record.x, record.z),
            notes: record.has_notes().then(|| record.notes.clone()),
        }
    }

    pub fn origin() -> Self {
        Self {
            heading: "Origin".to_string(),
            category: None,
            coordinates: "X: 0, Z: 0".to_string(),
            notes: None,
        }
    }

    pub fn lines(&self) -> Vec<&str> {
        let mut lines = vec![self.heading.as_str()];
        if let Some(category) = &self.category {
            lines.push(category);
        }
        lines.push(&self.coordinates);
        if let Some(notes) = &self.notes {
            lines.push(notes);
        }
        lines
    }
}

impl fmt::Display for PopupContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f32,
}

impl LineStyle {
    pub const GRID: LineStyle = LineStyle {
        color: "#333",
        weight: 1,
        opacity: 0.5,
    };

    pub const AXIS: LineStyle = LineStyle {
        color: "#555",
        weight: 2,
        opacity: 0.8,
    };
}

/// Pan/zoom map widget driven by the core.
pub trait MapSurface {
    fn set_viewport(&mut self, center: DisplayPoint, zoom: i32);

    fn zoom(&self) -> i32;

    fn add_marker(
        &mut self,
        position: DisplayPoint,
        icon: &MarkerIcon,
        popup: &PopupContent,
    ) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn add_polyline(&mut self, points: &[DisplayPoint], style: &LineStyle);

    fn open_popup(&mut self, _handle: MarkerHandle) {}

    fn set_background(&mut self, _color: &str) {}
}

/// One filter button in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryToggle {
    pub key: &'static str,
    pub label: String,
    pub active: bool,
}

/// One entry of the location list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationRow {
    pub title: String,
    pub coordinates: String,
    pub category: &'static str,
    pub record: LocationRecord,
}

impl LocationRow {
    pub fn for_record(record: &LocationRecord) -> Self {
        let descriptor = category_of(&record.category);
        Self {
            title: format!("{} {}", descriptor.icon, record.name),
            coordinates: format!("X: {} | Z: {}", record.x, record.z),
            category: descriptor.name,
            record: record.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// Non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Sidebar that shows filter buttons, the location list and notices.
pub trait PanelSurface {
    fn show_category_filters(&mut self, toggles: &[CategoryToggle]);

    /// An empty slice means "no locations found".
    fn show_locations(&mut self, rows: &[LocationRow]);

    fn show_notice(&mut self, notice: &Notice);
}

/// Filter buttons for every registry category, in registry order.
pub fn category_toggles(is_active: impl Fn(&str) -> bool) -> Vec<CategoryToggle> {
    CATEGORIES
        .iter()
        .map(|descriptor| CategoryToggle {
            key: descriptor.key,
            label: format!("{} {}", descriptor.icon, descriptor.name),
            active: is_active(descriptor.key),
        })
        .collect()
}
