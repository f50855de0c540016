//! Configuration for the shared map viewer.
//!
//! Loaded from `viewer_config.json` with support for an environment variable
//! override. Everything here is read once at startup.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_VIEWER_CONFIG: &str = include_str!("data/viewer_config.json");

/// Environment variable naming a JSON file that replaces the built-in config.
pub const CONFIG_PATH_ENV: &str = "SHARED_MAP_CONFIG_PATH";

/// Sheet id shipped in templates before anyone configured a real feed.
pub const PLACEHOLDER_SHEET_ID: &str = "YOUR_SHEET_ID_HERE";

/// Root configuration for the viewer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub feed: FeedConfig,
    /// Milliseconds between refreshes. Zero or negative disables the timer.
    pub refresh_interval_ms: i64,
    pub map: MapViewConfig,
    pub grid: GridConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            feed: FeedConfig::default(),
            refresh_interval_ms: 60_000,
            map: MapViewConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_VIEWER_CONFIG).expect("builtin viewer config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, ViewerConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ViewerConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ViewerConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Repeating refresh period, or `None` for a one-shot fetch.
    pub fn refresh_interval(&self) -> Option<Duration> {
        u64::try_from(self.refresh_interval_ms)
            .ok()
            .filter(|millis| *millis > 0)
            .map(Duration::from_millis)
    }
}

/// Where the location feed lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub sheet_id: String,
    pub sheet_name: String,
    /// URL with `{sheet_id}` and `{sheet_name}` placeholders.
    pub url_template: String,
    pub request_timeout_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            sheet_id: PLACEHOLDER_SHEET_ID.to_string(),
            sheet_name: "Sheet1".to_string(),
            url_template:
                "https://docs.google.com/spreadsheets/d/{sheet_id}/gviz/tq?tqx=out:csv&sheet={sheet_name}"
                    .to_string(),
            request_timeout_ms: 15_000,
        }
    }
}

impl FeedConfig {
    pub fn is_configured(&self) -> bool {
        let id = self.sheet_id.trim();
        !id.is_empty() && id != PLACEHOLDER_SHEET_ID
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }
}

/// Initial viewport and zoom limits. `center` is given as `[x, z]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MapViewConfig {
    pub center: [i64; 2],
    pub initial_zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    /// Zoom floor applied when focusing a clicked location.
    pub focus_min_zoom: i32,
}

impl Default for MapViewConfig {
    fn default() -> Self {
        Self {
            center: [0, 0],
            initial_zoom: 2,
            min_zoom: 0,
            max_zoom: 8,
            focus_min_zoom: 4,
        }
    }
}

impl MapViewConfig {
    pub fn clamp_zoom(&self, zoom: i32) -> i32 {
        if self.min_zoom > self.max_zoom {
            return zoom;
        }
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}

/// Coordinate grid overlay, in blocks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub spacing: i64,
    pub extent: i64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 500,
            extent: 10_000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerConfigError {
    #[error("failed to parse viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read viewer config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Which file, if any, the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Builtin,
    File(PathBuf),
}

/// Load the configuration from `path`, falling back to the built-in one.
pub fn load_viewer_config(path: Option<&Path>) -> (ViewerConfig, ConfigSource) {
    if let Some(path) = path {
        match ViewerConfig::from_file(path) {
            Ok(config) => {
                tracing::info!(
                    target: "shared_map::config",
                    path = %path.display(),
                    "viewer_config.loaded=file"
                );
                return (config, ConfigSource::File(path.to_path_buf()));
            }
            Err(err) => {
                tracing::warn!(
                    target: "shared_map::config",
                    path = %path.display(),
                    error = %err,
                    "viewer_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "shared_map::config", "viewer_config.loaded=builtin");
    (ViewerConfig::builtin(), ConfigSource::Builtin)
}

/// Load the configuration named by [`CONFIG_PATH_ENV`], if set.
pub fn load_viewer_config_from_env() -> (ViewerConfig, ConfigSource) {
    let override_path = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    load_viewer_config(override_path.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses() {
        let config = ViewerConfig::builtin();
        assert_eq!(config.refresh_interval_ms, 60_000);
        assert_eq!(config.map.max_zoom, 8);
        assert_eq!(config.grid.spacing, 500);
        assert!(config.feed.is_configured());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            ViewerConfig::from_json_str(r#"{ "refresh_interval_ms": 0, "map": { "max_zoom": 6 } }"#)
                .expect("partial config parses");
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.map.max_zoom, 6);
        assert_eq!(config.map.focus_min_zoom, 4);
        assert_eq!(config.grid, GridConfig::default());
        assert!(!config.feed.is_configured());
    }

    #[test]
    fn refresh_interval_requires_positive_value() {
        let mut config = ViewerConfig::default();
        assert_eq!(config.refresh_interval(), Some(Duration::from_secs(60)));
        config.refresh_interval_ms = -5;
        assert_eq!(config.refresh_interval(), None);
        config.refresh_interval_ms = 250;
        assert_eq!(config.refresh_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn zoom_clamps_to_configured_range() {
        let map = MapViewConfig::default();
        assert_eq!(map.clamp_zoom(-3), 0);
        assert_eq!(map.clamp_zoom(5), 5);
        assert_eq!(map.clamp_zoom(12), 8);
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let (config, source) =
            load_viewer_config(Some(Path::new("/nonexistent/viewer_config.json")));
        assert_eq!(source, ConfigSource::Builtin);
        assert_eq!(config, ViewerConfig::builtin());
    }
}
