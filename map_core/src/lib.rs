//! Core of the shared map viewer.
//!
//! Owns the location store, the filter predicate and the marker reconciler,
//! and drives them from a periodically refreshed remote feed. Drawing is
//! delegated to [`MapSurface`] and [`PanelSurface`] implementations so the
//! same core runs behind a terminal front end or a recording test double.

pub mod config;
pub mod feed;
mod filter;
mod grid;
pub mod metrics;
mod reconcile;
mod service;
mod state;
mod store;
pub mod surface;
mod sync;

pub use config::{
    load_viewer_config, load_viewer_config_from_env, ConfigSource, FeedConfig, GridConfig,
    MapViewConfig, ViewerConfig, ViewerConfigError, CONFIG_PATH_ENV,
};
pub use feed::{feed_url, FeedSource, HttpFeedSource, TransportError};
pub use filter::{visible, FilterPredicate};
pub use grid::{grid_lines, GridLine};
pub use metrics::SyncMetrics;
pub use reconcile::{MarkerReconciler, RenderDelta, RenderedMarker};
pub use service::{apply_command, MapService, ViewerCommand};
pub use state::{AppState, Viewport};
pub use store::{LocationStore, RecordSource};
pub use surface::{
    category_toggles, CategoryToggle, DisplayPoint, LineStyle, LocationRow, MapSurface,
    MarkerHandle, MarkerIcon, Notice, NoticeLevel, PanelSurface, PopupContent,
};
pub use sync::{fetch_feed, SyncController, SyncError, SyncOutcome, SyncPhase};

pub use map_runtime::{
    category_of, demo_locations, parse_feed, CategoryDescriptor, FeedFormatError, LocationRecord,
    ParsedFeed, SkipReason, SkippedRow, CATEGORIES, DEFAULT_DIMENSION, KNOWN_DIMENSIONS,
};
