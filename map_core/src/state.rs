use map_runtime::{dimension_background, LocationRecord};
use tracing::{debug, info};

use crate::config::{GridConfig, MapViewConfig, ViewerConfig};
use crate::filter::{visible, FilterPredicate};
use crate::grid::grid_lines;
use crate::reconcile::{MarkerReconciler, RenderDelta};
use crate::store::{LocationStore, RecordSource};
use crate::surface::{
    category_toggles, DisplayPoint, LocationRow, MapSurface, MarkerHandle, MarkerIcon, Notice,
    PanelSurface, PopupContent,
};

/// Viewport the core last asked the map surface to show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: DisplayPoint,
    pub zoom: i32,
}

/// All mutable viewer state, owned by a single controller.
///
/// Every mutation goes through one of the `on_*` handlers or
/// [`AppState::replace_records`], each of which finishes by re-rendering.
pub struct AppState<M, P> {
    map: M,
    panel: P,
    store: LocationStore,
    predicate: FilterPredicate,
    reconciler: MarkerReconciler,
    view_config: MapViewConfig,
    grid_config: GridConfig,
    viewport: Viewport,
    origin: Option<MarkerHandle>,
}

impl<M: MapSurface, P: PanelSurface> AppState<M, P> {
    pub fn new(config: &ViewerConfig, map: M, panel: P) -> Self {
        let [x, z] = config.map.center;
        let viewport = Viewport {
            center: DisplayPoint::from_world(x, z),
            zoom: config.map.clamp_zoom(config.map.initial_zoom),
        };
        Self {
            map,
            panel,
            store: LocationStore::new(),
            predicate: FilterPredicate::default(),
            reconciler: MarkerReconciler::new(),
            view_config: config.map.clone(),
            grid_config: config.grid.clone(),
            viewport,
            origin: None,
        }
    }

    /// Draw the static layers and the initial (empty) sidebar. Runs once.
    pub fn init(&mut self) {
        if self.origin.is_some() {
            return;
        }
        self.map.set_viewport(self.viewport.center, self.viewport.zoom);
        self.map
            .set_background(dimension_background(self.predicate.current_dimension()));

        let lines = grid_lines(&self.grid_config);
        for line in &lines {
            self.map.add_polyline(&line.points, &line.style);
        }
        self.origin = Some(self.map.add_marker(
            DisplayPoint::from_world(0, 0),
            &MarkerIcon::origin(),
            &PopupContent::origin(),
        ));
        debug!(
            target: "shared_map::render",
            grid_lines = lines.len(),
            "map.initialized"
        );
        self.render();
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }

    pub fn store(&self) -> &LocationStore {
        &self.store
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }

    pub fn reconciler(&self) -> &MarkerReconciler {
        &self.reconciler
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn origin_marker(&self) -> Option<MarkerHandle> {
        self.origin
    }

    pub fn visible(&self) -> Vec<&LocationRecord> {
        visible(self.store.all(), &self.predicate)
    }

    /// Swap in a new record set and re-render.
    pub fn replace_records(&mut self, records: Vec<LocationRecord>, source: RecordSource) {
        self.store.replace_all(records, source);
        info!(
            target: "shared_map::sync",
            records = self.store.len(),
            source = ?source,
            generation = self.store.generation(),
            "store.replaced"
        );
        self.render();
    }

    /// Bring markers, filter buttons and the location list in line with the
    /// store and predicate.
    pub fn render(&mut self) -> RenderDelta {
        let shown = visible(self.store.all(), &self.predicate);
        let delta = self.reconciler.reconcile(&mut self.map, &shown);
        let rows: Vec<LocationRow> = shown
            .iter()
            .map(|record| LocationRow::for_record(record))
            .collect();

        let predicate = &self.predicate;
        self.panel
            .show_category_filters(&category_toggles(|key| predicate.is_active(key)));
        self.panel.show_locations(&rows);

        debug!(
            target: "shared_map::render",
            visible = rows.len(),
            added = delta.added,
            removed = delta.removed,
            retained = delta.retained,
            "render.reconciled"
        );
        delta
    }

    pub fn on_dimension_change(&mut self, dimension: &str) {
        self.predicate.set_dimension(dimension);
        let current = self.predicate.current_dimension();
        self.map.set_background(dimension_background(current));
        info!(
            target: "shared_map::render",
            dimension = current,
            "filter.dimension_changed"
        );
        self.render();
    }

    pub fn on_category_toggle(&mut self, key: &str) {
        let active = self.predicate.toggle_category(key);
        info!(
            target: "shared_map::render",
            category = key,
            active,
            "filter.category_toggled"
        );
        self.render();
    }

    /// Center on `record` and open the popup of every marker at its position.
    pub fn on_location_clicked(&mut self, record: &LocationRecord) {
        let zoom = self
            .view_config
            .clamp_zoom(self.map.zoom().max(self.view_config.focus_min_zoom));
        self.set_viewport(DisplayPoint::from_world(record.x, record.z), zoom);

        let handles: Vec<MarkerHandle> = self.reconciler.markers_at(record.x, record.z).collect();
        for handle in &handles {
            self.map.open_popup(*handle);
        }
        debug!(
            target: "shared_map::render",
            name = %record.name,
            x = record.x,
            z = record.z,
            popups = handles.len(),
            "location.focused"
        );
    }

    /// Focus the `index`-th row of the location list. Returns false when the
    /// list has no such row.
    pub fn on_location_row_clicked(&mut self, index: usize) -> bool {
        let record = match self.reconciler.rendered().get(index) {
            Some(marker) => marker.record.clone(),
            None => return false,
        };
        self.on_location_clicked(&record);
        true
    }

    pub fn zoom_by(&mut self, delta: i32) {
        let zoom = self
            .view_config
            .clamp_zoom(self.map.zoom().saturating_add(delta));
        self.set_viewport(self.viewport.center, zoom);
    }

    pub fn notify(&mut self, notice: Notice) {
        self.panel.show_notice(&notice);
    }

    fn set_viewport(&mut self, center: DisplayPoint, zoom: i32) {
        self.viewport = Viewport { center, zoom };
        self.map.set_viewport(center, zoom);
    }
}
