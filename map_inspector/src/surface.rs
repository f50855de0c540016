use std::collections::{BTreeMap, VecDeque};

use map_core::{
    AppState, CategoryToggle, DisplayPoint, LineStyle, LocationRow, MapSurface, MarkerHandle,
    MarkerIcon, Notice, PanelSurface, PopupContent, RecordSource, SyncController, SyncMetrics,
    SyncOutcome, SyncPhase,
};

#[derive(Debug, Clone)]
pub struct DrawnMarker {
    pub position: DisplayPoint,
    pub icon: MarkerIcon,
    pub popup: PopupContent,
}

#[derive(Debug, Clone)]
pub struct DrawnLine {
    pub points: Vec<DisplayPoint>,
    pub style: LineStyle,
}

/// Retained map scene, drawn onto a ratatui canvas by the UI thread.
#[derive(Debug, Clone)]
pub struct TerminalMap {
    pub center: DisplayPoint,
    pub zoom: i32,
    pub background: String,
    pub markers: BTreeMap<MarkerHandle, DrawnMarker>,
    pub lines: Vec<DrawnLine>,
    /// At most one popup is open at a time.
    pub popup: Option<MarkerHandle>,
    next_handle: u64,
}

impl Default for TerminalMap {
    fn default() -> Self {
        Self {
            center: DisplayPoint::new(0.0, 0.0),
            zoom: 0,
            background: String::new(),
            markers: BTreeMap::new(),
            lines: Vec::new(),
            popup: None,
            next_handle: 0,
        }
    }
}

impl TerminalMap {
    pub fn open_popup_content(&self) -> Option<&PopupContent> {
        self.popup
            .and_then(|handle| self.markers.get(&handle))
            .map(|marker| &marker.popup)
    }
}

impl MapSurface for TerminalMap {
    fn set_viewport(&mut self, center: DisplayPoint, zoom: i32) {
        self.center = center;
        self.zoom = zoom;
    }

    fn zoom(&self) -> i32 {
        self.zoom
    }

    fn add_marker(
        &mut self,
        position: DisplayPoint,
        icon: &MarkerIcon,
        popup: &PopupContent,
    ) -> MarkerHandle {
        self.next_handle += 1;
        let handle = MarkerHandle(self.next_handle);
        self.markers.insert(
            handle,
            DrawnMarker {
                position,
                icon: icon.clone(),
                popup: popup.clone(),
            },
        );
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
        if self.popup == Some(handle) {
            self.popup = None;
        }
    }

    fn add_polyline(&mut self, points: &[DisplayPoint], style: &LineStyle) {
        self.lines.push(DrawnLine {
            points: points.to_vec(),
            style: *style,
        });
    }

    fn open_popup(&mut self, handle: MarkerHandle) {
        if self.markers.contains_key(&handle) {
            self.popup = Some(handle);
        }
    }

    fn set_background(&mut self, color: &str) {
        self.background = color.to_string();
    }
}

#[derive(Debug, Clone)]
pub struct TerminalPanel {
    pub toggles: Vec<CategoryToggle>,
    pub rows: Vec<LocationRow>,
    pub notices: VecDeque<Notice>,
    pub max_notices: usize,
}

impl Default for TerminalPanel {
    fn default() -> Self {
        Self {
            toggles: Vec::new(),
            rows: Vec::new(),
            notices: VecDeque::new(),
            max_notices: 4,
        }
    }
}

impl PanelSurface for TerminalPanel {
    fn show_category_filters(&mut self, toggles: &[CategoryToggle]) {
        self.toggles = toggles.to_vec();
    }

    fn show_locations(&mut self, rows: &[LocationRow]) {
        self.rows = rows.to_vec();
    }

    fn show_notice(&mut self, notice: &Notice) {
        self.notices.push_front(notice.clone());
        while self.notices.len() > self.max_notices {
            self.notices.pop_back();
        }
    }
}

/// Everything the UI thread needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub map: TerminalMap,
    pub panel: TerminalPanel,
    pub dimension: String,
    pub record_source: Option<RecordSource>,
    pub record_count: usize,
    pub phase: SyncPhase,
    pub metrics: SyncMetrics,
    pub last_outcome: Option<SyncOutcome>,
    pub last_error: Option<String>,
}

impl ViewSnapshot {
    pub fn capture(state: &AppState<TerminalMap, TerminalPanel>, sync: &SyncController) -> Self {
        Self {
            map: state.map().clone(),
            panel: state.panel().clone(),
            dimension: state.predicate().current_dimension().to_string(),
            record_source: state.store().source(),
            record_count: state.store().len(),
            phase: sync.phase(),
            metrics: sync.metrics().clone(),
            last_outcome: sync.last_outcome().cloned(),
            last_error: sync.last_error().map(str::to_string),
        }
    }
}
