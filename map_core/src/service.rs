//! The viewer's single-threaded event loop.

use std::future::{pending, Future};
use std::pin::Pin;
use std::time::Duration;

use map_runtime::{LocationRecord, ParsedFeed};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::feed::FeedSource;
use crate::state::AppState;
use crate::surface::{MapSurface, PanelSurface};
use crate::sync::{fetch_feed, SyncController, SyncError, SyncOutcome};

/// User interactions forwarded from a front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerCommand {
    DimensionChanged(String),
    CategoryToggled(String),
    LocationClicked(LocationRecord),
    LocationRowClicked(usize),
    ZoomBy(i32),
    Refresh,
    Shutdown,
}

type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<ParsedFeed, SyncError>> + 'a>>;

/// Owns the app state, the sync controller and the feed source.
pub struct MapService<S, M, P> {
    source: S,
    sync: SyncController,
    state: AppState<M, P>,
    refresh: Option<Duration>,
}

impl<S, M, P> MapService<S, M, P>
where
    S: FeedSource,
    M: MapSurface,
    P: PanelSurface,
{
    pub fn new(config: &ViewerConfig, source: S, map: M, panel: P) -> Self {
        Self {
            source,
            sync: SyncController::new(),
            state: AppState::new(config, map, panel),
            refresh: config.refresh_interval(),
        }
    }

    pub fn state(&self) -> &AppState<M, P> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState<M, P> {
        &mut self.state
    }

    pub fn sync(&self) -> &SyncController {
        &self.sync
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run until a `Shutdown` command arrives or every command sender is
    /// dropped.
    ///
    /// One fetch starts immediately, then one per refresh period. A tick or
    /// `Refresh` that arrives while a fetch is in flight is dropped.
    /// `on_update` runs after every state change.
    pub async fn run<F>(
        &mut self,
        mut commands: UnboundedReceiver<ViewerCommand>,
        mut on_update: F,
    ) where
        F: FnMut(&AppState<M, P>, &SyncController),
    {
        let Self {
            source,
            sync,
            state,
            refresh,
        } = self;
        let source: &S = source;

        state.init();
        info!(
            target: "shared_map::sync",
            source = %source.describe(),
            refresh_ms = refresh.map(|period| period.as_millis() as u64),
            "service.started"
        );

        let mut ticker = refresh.map(|period| {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker
        });
        let mut in_flight: Option<FetchFuture<'_>> = start_fetch(source, sync);
        on_update(state, sync);

        loop {
            tokio::select! {
                result = next_result(&mut in_flight) => {
                    in_flight = None;
                    let outcome = sync.complete(state, result);
                    if let SyncOutcome::FellBackToDemo { .. } = outcome {
                        debug!(target: "shared_map::sync", "service.showing_demo");
                    }
                    on_update(state, sync);
                }
                _ = next_tick(&mut ticker) => {
                    if in_flight.is_none() {
                        in_flight = start_fetch(source, sync);
                    } else {
                        debug!(target: "shared_map::sync", "sync.tick_dropped");
                    }
                }
                command = commands.recv() => {
                    match command {
                        None | Some(ViewerCommand::Shutdown) => break,
                        Some(ViewerCommand::Refresh) => {
                            if in_flight.is_none() {
                                in_flight = start_fetch(source, sync);
                            } else {
                                debug!(target: "shared_map::sync", "sync.refresh_dropped");
                            }
                        }
                        Some(command) => apply_command(state, command),
                    }
                    on_update(state, sync);
                }
            }
        }

        if in_flight.take().is_some() {
            sync.abandon();
        }
        info!(
            target: "shared_map::sync",
            cycles = sync.metrics().cycles,
            "service.stopped"
        );
    }
}

fn start_fetch<'a, S>(source: &'a S, sync: &mut SyncController) -> Option<FetchFuture<'a>>
where
    S: FeedSource,
{
    if sync.begin() {
        Some(Box::pin(fetch_feed(source)))
    } else {
        None
    }
}

async fn next_result(in_flight: &mut Option<FetchFuture<'_>>) -> Result<ParsedFeed, SyncError> {
    match in_flight.as_mut() {
        Some(fetch) => fetch.await,
        None => pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker.as_mut() {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

/// Apply a UI command that does not involve the feed.
pub fn apply_command<M, P>(state: &mut AppState<M, P>, command: ViewerCommand)
where
    M: MapSurface,
    P: PanelSurface,
{
    match command {
        ViewerCommand::DimensionChanged(dimension) => state.on_dimension_change(&dimension),
        ViewerCommand::CategoryToggled(key) => state.on_category_toggle(&key),
        ViewerCommand::LocationClicked(record) => state.on_location_clicked(&record),
        ViewerCommand::LocationRowClicked(index) => {
            if !state.on_location_row_clicked(index) {
                debug!(target: "shared_map::render", index, "location.row_out_of_range");
            }
        }
        ViewerCommand::ZoomBy(delta) => state.zoom_by(delta),
        ViewerCommand::Refresh | ViewerCommand::Shutdown => {}
    }
}
