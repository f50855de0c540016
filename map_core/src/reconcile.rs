use std::collections::{HashMap, VecDeque};

use map_runtime::LocationRecord;

use crate::surface::{DisplayPoint, MapSurface, MarkerHandle, MarkerIcon, PopupContent};

/// A location marker currently on the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarker {
    pub record: LocationRecord,
    pub handle: MarkerHandle,
}

/// Counts of surface operations performed by one reconcile pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderDelta {
    pub added: usize,
    pub removed: usize,
    pub retained: usize,
}

impl RenderDelta {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Keeps the surface's location markers in step with the visible subset.
///
/// Markers are matched by full record value, so a marker survives a pass only
/// when its position, icon and popup would be identical. Duplicate records
/// are matched one-to-one.
#[derive(Debug, Default)]
pub struct MarkerReconciler {
    rendered: Vec<RenderedMarker>,
}

impl MarkerReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers in the order of the last visible subset.
    pub fn rendered(&self) -> &[RenderedMarker] {
        &self.rendered
    }

    pub fn reconcile<M: MapSurface>(
        &mut self,
        surface: &mut M,
        visible: &[&LocationRecord],
    ) -> RenderDelta {
        let previous = std::mem::take(&mut self.rendered);

        let mut available: HashMap<&LocationRecord, VecDeque<usize>> = HashMap::new();
        for (index, marker) in previous.iter().enumerate() {
            available.entry(&marker.record).or_default().push_back(index);
        }

        let matches: Vec<Option<usize>> = visible
            .iter()
            .map(|record| {
                available
                    .get_mut(*record)
                    .and_then(|indices| indices.pop_front())
            })
            .collect();

        let mut kept = vec![false; previous.len()];
        for index in matches.iter().flatten() {
            kept[*index] = true;
        }

        let mut delta = RenderDelta::default();
        for (marker, _) in previous.iter().zip(&kept).filter(|(_, kept)| !**kept) {
            surface.remove_marker(marker.handle);
            delta.removed += 1;
        }

        let mut rendered = Vec::with_capacity(visible.len());
        for (record, matched) in visible.iter().zip(matches) {
            let handle = match matched {
                Some(index) => {
                    delta.retained += 1;
                    previous[index].handle
                }
                None => {
                    delta.added += 1;
                    add_location_marker(surface, record)
                }
            };
            rendered.push(RenderedMarker {
                record: (*record).clone(),
                handle,
            });
        }

        self.rendered = rendered;
        delta
    }

    /// Handles of markers sitting exactly on world position `(x, z)`.
    pub fn markers_at(&self, x: i64, z: i64) -> impl Iterator<Item = MarkerHandle> + '_ {
        self.rendered
            .iter()
            .filter(move |marker| marker.record.x == x && marker.record.z == z)
            .map(|marker| marker.handle)
    }
}

fn add_location_marker<M: MapSurface>(surface: &mut M, record: &LocationRecord) -> MarkerHandle {
    surface.add_marker(
        DisplayPoint::from_world(record.x, record.z),
        &MarkerIcon::for_record(record),
        &PopupContent::for_record(record),
    )
}
