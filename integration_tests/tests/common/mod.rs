#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use async_trait::async_trait;
use map_core::{
    load_viewer_config_from_env, CategoryToggle, ConfigSource, DisplayPoint, FeedSource,
    LineStyle, LocationRow, MapSurface, MarkerHandle, MarkerIcon, Notice, PanelSurface,
    PopupContent, TransportError, ViewerConfig,
};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_viewer_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test viewer config at {}",
            config_path.display()
        );

        std::env::set_var(map_core::CONFIG_PATH_ENV, &config_path);
    });
}

pub fn test_config() -> ViewerConfig {
    ensure_test_config();
    let (config, source) = load_viewer_config_from_env();
    assert!(
        matches!(source, ConfigSource::File(_)),
        "fixture config was not picked up"
    );
    config
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiveMarker {
    pub position: DisplayPoint,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
}

/// Map surface that keeps the live scene and counts every call.
#[derive(Debug, Default)]
pub struct RecordingMap {
    next: u64,
    pub markers: BTreeMap<MarkerHandle, LiveMarker>,
    pub polylines: Vec<(Vec<DisplayPoint>, LineStyle)>,
    pub viewport: Option<(DisplayPoint, i32)>,
    pub background: Option<String>,
    pub opened: Vec<MarkerHandle>,
    pub adds: usize,
    pub removes: usize,
}

impl RecordingMap {
    /// Titles of the live markers, origin excluded, sorted.
    pub fn location_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self
            .markers
            .values()
            .filter(|marker| marker.icon.style_key != "origin")
            .map(|marker| marker.icon.title.clone())
            .collect();
        titles.sort();
        titles
    }
}

impl MapSurface for RecordingMap {
    fn set_viewport(&mut self, center: DisplayPoint, zoom: i32) {
        self.viewport = Some((center, zoom));
    }

    fn zoom(&self) -> i32 {
        self.viewport.map(|(_, zoom)| zoom).unwrap_or(0)
    }

    fn add_marker(
        &mut self,
        position: DisplayPoint,
        icon: &MarkerIcon,
        popup: &PopupContent,
    ) -> MarkerHandle {
        self.next += 1;
        self.adds += 1;
        let handle = MarkerHandle(self.next);
        self.markers.insert(
            handle,
            LiveMarker {
                position,
                icon: icon.clone(),
                popup: popup.clone(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.removes += 1;
        assert!(
            self.markers.remove(&handle).is_some(),
            "removed unknown marker {handle:?}"
        );
    }

    fn add_polyline(&mut self, points: &[DisplayPoint], style: &LineStyle) {
        self.polylines.push((points.to_vec(), *style));
    }

    fn open_popup(&mut self, handle: MarkerHandle) {
        self.opened.push(handle);
    }

    fn set_background(&mut self, color: &str) {
        self.background = Some(color.to_string());
    }
}

#[derive(Debug, Default)]
pub struct RecordingPanel {
    pub toggles: Vec<CategoryToggle>,
    pub rows: Vec<LocationRow>,
    pub notices: Vec<Notice>,
    pub renders: usize,
}

impl RecordingPanel {
    pub fn row_names(&self) -> Vec<String> {
        self.rows.iter().map(|row| row.record.name.clone()).collect()
    }
}

impl PanelSurface for RecordingPanel {
    fn show_category_filters(&mut self, toggles: &[CategoryToggle]) {
        self.toggles = toggles.to_vec();
    }

    fn show_locations(&mut self, rows: &[LocationRow]) {
        self.rows = rows.to_vec();
        self.renders += 1;
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// Feed that replays canned replies, then keeps failing with 503.
pub struct ScriptedFeed {
    replies: RefCell<VecDeque<Result<String, TransportError>>>,
    delay: Duration,
    pub fetches: Cell<usize>,
}

impl ScriptedFeed {
    pub fn new(replies: Vec<Result<String, TransportError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            delay: Duration::ZERO,
            fetches: Cell::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait(?Send)]
impl FeedSource for ScriptedFeed {
    fn describe(&self) -> String {
        "scripted feed".to_string()
    }

    async fn fetch(&self) -> Result<String, TransportError> {
        self.fetches.set(self.fetches.get() + 1);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let reply = self.replies.borrow_mut().pop_front();
        reply.unwrap_or_else(|| Err(unavailable()))
    }
}

pub fn unavailable() -> TransportError {
    TransportError::Status {
        url: "http://feed.test/export".to_string(),
        status: 503,
    }
}

pub fn body(text: &str) -> Result<String, TransportError> {
    Ok(text.to_string())
}
