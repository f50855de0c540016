mod common;

use std::collections::BTreeSet;

use map_core::{AppState, MarkerHandle, SyncController};

use common::{body, RecordingMap, RecordingPanel, ScriptedFeed};

fn location_handles(state: &AppState<RecordingMap, RecordingPanel>) -> BTreeSet<MarkerHandle> {
    state
        .reconciler()
        .rendered()
        .iter()
        .map(|marker| marker.handle)
        .collect()
}

#[tokio::test]
async fn refresh_keeps_unchanged_markers() {
    let feed = ScriptedFeed::new(vec![
        body("name,x,z,category,dimension,notes\nA,1,1,base,overworld,\nB,2,2,farm,overworld,\nC,3,3,portal,overworld,\n"),
        body("name,x,z,category,dimension,notes\nA,1,1,base,overworld,\nC,3,3,portal,overworld,moved notes\nD,4,4,village,overworld,\n"),
    ]);
    let config = common::test_config();
    let mut state = AppState::new(&config, RecordingMap::default(), RecordingPanel::default());
    state.init();
    let mut sync = SyncController::new();

    sync.run_cycle(&feed, &mut state).await;
    let first = state.reconciler().rendered().to_vec();
    let adds_after_first = state.map().adds;

    sync.run_cycle(&feed, &mut state).await;
    let second = state.reconciler().rendered();

    // A is untouched; B vanished; C changed notes so it is redrawn; D is new
    assert_eq!(second[0].handle, first[0].handle);
    assert_ne!(second[1].handle, first[2].handle);
    assert_eq!(state.map().adds - adds_after_first, 2);
    assert_eq!(state.map().removes, 2);

    assert_eq!(state.map().location_titles(), vec!["A", "C", "D"]);
    let live: BTreeSet<MarkerHandle> = state
        .map()
        .markers
        .keys()
        .copied()
        .filter(|handle| Some(*handle) != state.origin_marker())
        .collect();
    assert_eq!(live, location_handles(&state));
}

#[tokio::test]
async fn dimension_round_trip_redraws_only_what_changed() {
    let feed = ScriptedFeed::new(vec![body(
        "name,x,z,dimension\nHome,0,10,overworld\nHub,0,1,nether\n",
    )]);
    let config = common::test_config();
    let mut state = AppState::new(&config, RecordingMap::default(), RecordingPanel::default());
    state.init();
    SyncController::new().run_cycle(&feed, &mut state).await;

    state.on_dimension_change("nether");
    assert_eq!(state.map().location_titles(), vec!["Hub"]);
    state.on_dimension_change("overworld");
    assert_eq!(state.map().location_titles(), vec!["Home"]);

    let delta = state.render();
    assert!(delta.is_noop());
    assert_eq!(delta.retained, 1);
}

#[test]
fn popup_text_matches_the_record() {
    let config = common::test_config();
    let mut state = AppState::new(&config, RecordingMap::default(), RecordingPanel::default());
    state.init();
    state.replace_records(
        vec![map_core::LocationRecord::new("Iron Farm", 500, -200)
            .with_category("farm")
            .with_notes("Produces 1000 iron/hour")],
        map_core::RecordSource::Feed,
    );

    let marker = state.reconciler().rendered()[0].handle;
    assert_eq!(
        state.map().markers[&marker].popup.to_string(),
        "🌾 Iron Farm\nFarm\nX: 500 | Z: -200\nProduces 1000 iron/hour"
    );
}
