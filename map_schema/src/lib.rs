//! Data contracts for the shared map viewer.
//!
//! Everything here is plain data: location records, the fixed category
//! registry and the dimension themes. Parsing and synchronization live in
//! `map_runtime` and `map_core`.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CATEGORY: &str = "other";
pub const DEFAULT_DIMENSION: &str = "overworld";

pub const DIMENSION_OVERWORLD: &str = "overworld";
pub const DIMENSION_NETHER: &str = "nether";
pub const DIMENSION_END: &str = "end";

/// Dimensions offered by the viewer's dimension switch, in display order.
pub const KNOWN_DIMENSIONS: [&str; 3] = [DIMENSION_OVERWORLD, DIMENSION_NETHER, DIMENSION_END];

const BUILTIN_DEMO_LOCATIONS: &str = include_str!("data/demo_locations.json");

/// A named point of interest in world coordinates.
///
/// `category` and `dimension` are stored normalized (trimmed, lowercase) but
/// otherwise untouched: an unknown category key survives as written and only
/// falls back to [`DEFAULT_CATEGORY`] when looked up for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationRecord {
    pub name: String,
    pub x: i64,
    pub z: i64,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_dimension")]
    pub dimension: String,
    #[serde(default)]
    pub notes: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_dimension() -> String {
    DEFAULT_DIMENSION.to_string()
}

impl LocationRecord {
    pub fn new(name: impl Into<String>, x: i64, z: i64) -> Self {
        Self {
            name: name.into(),
            x,
            z,
            category: default_category(),
            dimension: default_dimension(),
            notes: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimension = dimension.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn descriptor(&self) -> &'static CategoryDescriptor {
        category_of(&self.category)
    }

    pub fn has_notes(&self) -> bool {
        !self.notes.is_empty()
    }
}

/// Display metadata for one registry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDescriptor {
    pub key: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

/// The fixed category registry, in display order. The last entry is the
/// fallback used for unknown keys.
pub static CATEGORIES: [CategoryDescriptor; 7] = [
    CategoryDescriptor {
        key: "base",
        name: "Base",
        icon: "🏠",
        color: "#4a7c39",
    },
    CategoryDescriptor {
        key: "farm",
        name: "Farm",
        icon: "🌾",
        color: "#c4a000",
    },
    CategoryDescriptor {
        key: "portal",
        name: "Portal",
        icon: "🌀",
        color: "#8b2500",
    },
    CategoryDescriptor {
        key: "village",
        name: "Village",
        icon: "🏘️",
        color: "#6b4423",
    },
    CategoryDescriptor {
        key: "landmark",
        name: "Landmark",
        icon: "📍",
        color: "#2980b9",
    },
    CategoryDescriptor {
        key: "danger",
        name: "Danger",
        icon: "⚠️",
        color: "#c0392b",
    },
    CategoryDescriptor {
        key: DEFAULT_CATEGORY,
        name: "Other",
        icon: "❓",
        color: "#7f8c8d",
    },
];

/// Look up a category by key. Total: unknown keys resolve to `other`.
pub fn category_of(key: &str) -> &'static CategoryDescriptor {
    CATEGORIES
        .iter()
        .find(|descriptor| descriptor.key == key)
        .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
}

pub fn is_registered_category(key: &str) -> bool {
    CATEGORIES.iter().any(|descriptor| descriptor.key == key)
}

pub fn category_keys() -> impl Iterator<Item = &'static str> {
    CATEGORIES.iter().map(|descriptor| descriptor.key)
}

/// Map background for a dimension.
pub fn dimension_background(dimension: &str) -> &'static str {
    match dimension {
        DIMENSION_NETHER => "#1a0a0a",
        DIMENSION_END => "#0a0a1a",
        _ => "#1a1a2e",
    }
}

/// The built-in dataset shown when the feed has never been reachable.
pub fn demo_locations() -> Vec<LocationRecord> {
    serde_json::from_str(BUILTIN_DEMO_LOCATIONS).expect("builtin demo locations should parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_falls_back_to_other() {
        let descriptor = category_of("treasure");
        assert_eq!(descriptor.key, "other");
        assert_eq!(descriptor.name, "Other");

        let record = LocationRecord::new("Chest", 1, 2).with_category("treasure");
        assert_eq!(record.descriptor().icon, "❓");
        assert_eq!(record.category, "treasure");
    }

    #[test]
    fn registry_lookup_is_exact() {
        assert_eq!(category_of("portal").name, "Portal");
        assert_eq!(category_of("Portal").key, "other");
        assert!(is_registered_category("danger"));
        assert!(!is_registered_category("treasure"));
        assert_eq!(category_keys().count(), CATEGORIES.len());
    }

    #[test]
    fn dimension_backgrounds() {
        assert_eq!(dimension_background("nether"), "#1a0a0a");
        assert_eq!(dimension_background("end"), "#0a0a1a");
        assert_eq!(dimension_background("overworld"), "#1a1a2e");
        assert_eq!(dimension_background("aether"), "#1a1a2e");
    }

    #[test]
    fn demo_dataset_parses() {
        let demo = demo_locations();
        assert_eq!(demo.len(), 11);
        assert_eq!(demo[0].name, "Spawn Base");
        assert_eq!((demo[0].x, demo[0].z), (0, 50));
        assert_eq!(
            demo.iter().filter(|loc| loc.dimension == "nether").count(),
            2
        );
        assert!(demo.iter().all(|loc| is_registered_category(&loc.category)));
    }

    #[test]
    fn record_defaults_when_deserialized() {
        let record: LocationRecord =
            serde_json::from_str(r#"{"name":"Camp","x":-4,"z":9}"#).expect("record parses");
        assert_eq!(record, LocationRecord::new("Camp", -4, 9));
        insta::assert_snapshot!(
            serde_json::to_string(&record).expect("record serializes"),
            @r#"{"name":"Camp","x":-4,"z":9,"category":"other","dimension":"overworld","notes":""}"#
        );
    }
}
