mod common;

use map_core::{feed_url, AppState, DisplayPoint, LineStyle};

use common::{RecordingMap, RecordingPanel};

#[test]
fn viewer_initializes_from_fixture_config() {
    let config = common::test_config();
    let mut state = AppState::new(&config, RecordingMap::default(), RecordingPanel::default());
    state.init();

    let map = state.map();
    assert_eq!(map.viewport, Some((DisplayPoint::new(-100.0, 100.0), 3)));
    assert_eq!(map.background.as_deref(), Some("#1a1a2e"));

    // five lines per direction across ±2000 at 1000 spacing, then both axes
    assert_eq!(map.polylines.len(), 12);
    assert!(map.polylines[..10]
        .iter()
        .all(|(_, style)| *style == LineStyle::GRID));
    assert_eq!(map.polylines[10].1, LineStyle::AXIS);

    let origin = state.origin_marker().expect("origin marker drawn");
    assert_eq!(map.markers[&origin].popup.to_string(), "Origin\nX: 0, Z: 0");
    assert_eq!(map.markers.len(), 1);

    assert_eq!(state.panel().toggles.len(), 7);
    assert!(state.panel().rows.is_empty());
}

#[test]
fn fixture_feed_url_encodes_sheet_name() {
    let config = common::test_config();
    assert_eq!(
        feed_url(&config.feed).as_deref(),
        Some("http://127.0.0.1:9/integration-sheet/export?sheet=Test%20Locations")
    );
}
