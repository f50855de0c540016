use map_runtime::{demo_locations, parse_feed, FeedFormatError, ParsedFeed};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::feed::{FeedSource, TransportError};
use crate::metrics::SyncMetrics;
use crate::state::AppState;
use crate::store::RecordSource;
use crate::surface::{MapSurface, Notice, PanelSurface};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Format(#[from] FeedFormatError),
}

/// A cycle runs `Idle -> Fetching -> Idle`; how it ended is kept in
/// [`SyncController::last_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Fetching,
}

/// What a completed cycle did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Refreshed { records: usize, skipped: usize },
    /// First-ever cycle failed; the demo dataset was loaded instead.
    FellBackToDemo { error: String },
    /// A later cycle failed; the previous records stay on screen.
    KeptStale { error: String },
}

/// Fetch and parse one feed snapshot.
pub async fn fetch_feed<S>(source: &S) -> Result<ParsedFeed, SyncError>
where
    S: FeedSource + ?Sized,
{
    let body = source.fetch().await?;
    Ok(parse_feed(&body)?)
}

/// Applies fetch results to the app state and tracks cycle bookkeeping.
#[derive(Debug)]
pub struct SyncController {
    phase: SyncPhase,
    metrics: SyncMetrics,
    last_error: Option<String>,
    last_outcome: Option<SyncOutcome>,
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncController {
    pub fn new() -> Self {
        Self {
            phase: SyncPhase::Idle,
            metrics: SyncMetrics::default(),
            last_error: None,
            last_outcome: None,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// How the most recent completed cycle ended.
    pub fn last_outcome(&self) -> Option<&SyncOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn is_fetching(&self) -> bool {
        self.phase == SyncPhase::Fetching
    }

    /// Enter `Fetching`. Returns false when a cycle is already in flight.
    pub fn begin(&mut self) -> bool {
        if self.is_fetching() {
            debug!(target: "shared_map::sync", "sync.skipped=in_flight");
            return false;
        }
        self.phase = SyncPhase::Fetching;
        self.metrics.record_start();
        debug!(
            target: "shared_map::sync",
            cycle = self.metrics.cycles,
            "sync.started"
        );
        true
    }

    /// Forget an in-flight cycle whose fetch was dropped.
    pub fn abandon(&mut self) {
        if self.is_fetching() {
            self.phase = SyncPhase::Idle;
            debug!(target: "shared_map::sync", "sync.abandoned");
        }
    }

    /// Apply the result of the cycle started by [`SyncController::begin`].
    pub fn complete<M, P>(
        &mut self,
        state: &mut AppState<M, P>,
        result: Result<ParsedFeed, SyncError>,
    ) -> SyncOutcome
    where
        M: MapSurface,
        P: PanelSurface,
    {
        let outcome = match result {
            Ok(parsed) => {
                let records = parsed.records.len();
                let skipped = parsed.skipped.len();
                for row in &parsed.skipped {
                    debug!(
                        target: "shared_map::sync",
                        line = row.line,
                        reason = %row.reason,
                        "feed.row_skipped"
                    );
                }
                if skipped > 0 {
                    warn!(
                        target: "shared_map::sync",
                        skipped,
                        "feed.rows_skipped"
                    );
                }

                state.replace_records(parsed.records, RecordSource::Feed);
                self.last_error = None;
                self.metrics.record_success(records, skipped);
                info!(
                    target: "shared_map::sync",
                    records,
                    skipped,
                    "sync.completed=feed"
                );
                SyncOutcome::Refreshed { records, skipped }
            }
            Err(err) => {
                let error = err.to_string();
                let fall_back = !state.store().is_populated();
                warn!(
                    target: "shared_map::sync",
                    error = %error,
                    demo_fallback = fall_back,
                    "sync.failed"
                );
                state.notify(Notice::warning(failure_message(&err, fall_back)));

                self.last_error = Some(error.clone());
                self.metrics.record_failure(fall_back);
                if fall_back {
                    state.replace_records(demo_locations(), RecordSource::Demo);
                    SyncOutcome::FellBackToDemo { error }
                } else {
                    SyncOutcome::KeptStale { error }
                }
            }
        };

        self.phase = SyncPhase::Idle;
        self.last_outcome = Some(outcome.clone());
        outcome
    }

    /// One full fetch, parse and apply cycle. `None` when a cycle was
    /// already in flight.
    pub async fn run_cycle<S, M, P>(
        &mut self,
        source: &S,
        state: &mut AppState<M, P>,
    ) -> Option<SyncOutcome>
    where
        S: FeedSource + ?Sized,
        M: MapSurface,
        P: PanelSurface,
    {
        if !self.begin() {
            return None;
        }
        let result = fetch_feed(source).await;
        Some(self.complete(state, result))
    }
}

fn failure_message(err: &SyncError, fell_back: bool) -> String {
    let reason = match err {
        SyncError::Transport(TransportError::NotConfigured) => {
            "The location feed is not configured".to_string()
        }
        SyncError::Transport(_) => "Failed to load locations from the feed".to_string(),
        SyncError::Format(format) => format!("Location feed is malformed: {format}"),
    };
    if fell_back {
        format!("{reason}. Using demo data.")
    } else {
        format!("{reason}. Showing the last loaded locations.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use crate::config::ViewerConfig;
    use crate::surface::{
        CategoryToggle, DisplayPoint, LineStyle, LocationRow, MarkerHandle, MarkerIcon,
        NoticeLevel, PopupContent,
    };

    #[derive(Default)]
    struct NullMap {
        next: u64,
    }

    impl MapSurface for NullMap {
        fn set_viewport(&mut self, _center: DisplayPoint, _zoom: i32) {}

        fn zoom(&self) -> i32 {
            2
        }

        fn add_marker(
            &mut self,
            _position: DisplayPoint,
            _icon: &MarkerIcon,
            _popup: &PopupContent,
        ) -> MarkerHandle {
            self.next += 1;
            MarkerHandle(self.next)
        }

        fn remove_marker(&mut self, _handle: MarkerHandle) {}

        fn add_polyline(&mut self, _points: &[DisplayPoint], _style: &LineStyle) {}
    }

    #[derive(Default)]
    struct NoticePanel {
        notices: Vec<Notice>,
    }

    impl PanelSurface for NoticePanel {
        fn show_category_filters(&mut self, _toggles: &[CategoryToggle]) {}

        fn show_locations(&mut self, _rows: &[LocationRow]) {}

        fn show_notice(&mut self, notice: &Notice) {
            self.notices.push(notice.clone());
        }
    }

    struct Scripted {
        replies: RefCell<VecDeque<Result<String, TransportError>>>,
    }

    impl Scripted {
        fn new(replies: Vec<Result<String, TransportError>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
            }
        }
    }

    #[async_trait(?Send)]
    impl FeedSource for Scripted {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        async fn fetch(&self) -> Result<String, TransportError> {
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Err(TransportError::NotConfigured))
        }
    }

    fn state() -> AppState<NullMap, NoticePanel> {
        let mut state = AppState::new(
            &ViewerConfig::builtin(),
            NullMap::default(),
            NoticePanel::default(),
        );
        state.init();
        state
    }

    fn unavailable() -> Result<String, TransportError> {
        Err(TransportError::Status {
            url: "https://feed.test/sheet".to_string(),
            status: 503,
        })
    }

    #[tokio::test]
    async fn first_failure_loads_demo_data() {
        let source = Scripted::new(vec![unavailable()]);
        let mut state = state();
        let mut sync = SyncController::new();

        let outcome = sync.run_cycle(&source, &mut state).await;
        assert!(matches!(outcome, Some(SyncOutcome::FellBackToDemo { .. })));
        assert_eq!(state.store().len(), 11);
        assert_eq!(state.store().source(), Some(RecordSource::Demo));
        assert_eq!(sync.phase(), SyncPhase::Idle);
        assert!(!sync.is_fetching());
        assert!(matches!(
            sync.last_outcome(),
            Some(SyncOutcome::FellBackToDemo { .. })
        ));
        assert_eq!(sync.metrics().demo_fallbacks, 1);

        let notice = &state.panel().notices[0];
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.ends_with("Using demo data."));
    }

    #[tokio::test]
    async fn later_failure_keeps_previous_records() {
        let source = Scripted::new(vec![
            Ok("name,x,z\nA,1,2\nB,3,4\n".to_string()),
            unavailable(),
            Ok("name,x\nA,1\n".to_string()),
        ]);
        let mut state = state();
        let mut sync = SyncController::new();

        let outcome = sync.run_cycle(&source, &mut state).await;
        assert_eq!(
            outcome,
            Some(SyncOutcome::Refreshed {
                records: 2,
                skipped: 0
            })
        );

        let outcome = sync.run_cycle(&source, &mut state).await;
        assert!(matches!(outcome, Some(SyncOutcome::KeptStale { .. })));
        let outcome = sync.run_cycle(&source, &mut state).await;
        assert!(matches!(outcome, Some(SyncOutcome::KeptStale { .. })));

        assert_eq!(state.store().len(), 2);
        assert_eq!(state.store().source(), Some(RecordSource::Feed));
        assert_eq!(state.store().generation(), 1);
        assert_eq!(sync.metrics().failures, 2);
        assert_eq!(sync.metrics().consecutive_failures, 2);
        assert_eq!(sync.metrics().demo_fallbacks, 0);
        assert!(sync
            .last_error()
            .is_some_and(|error| error.contains("missing required columns: z")));
    }

    #[tokio::test]
    async fn skipped_rows_are_counted() {
        let source = Scripted::new(vec![Ok("name,x,z\nA,1,2\n,3,4\nC,x,5\n".to_string())]);
        let mut state = state();
        let mut sync = SyncController::new();

        let outcome = sync.run_cycle(&source, &mut state).await;
        assert_eq!(
            outcome,
            Some(SyncOutcome::Refreshed {
                records: 1,
                skipped: 2
            })
        );
        assert_eq!(sync.metrics().last_skipped_rows, 2);
    }

    #[test]
    fn begin_refuses_overlapping_cycles() {
        let mut sync = SyncController::new();
        assert!(sync.begin());
        assert!(!sync.begin());
        assert_eq!(sync.metrics().cycles, 1);
    }

    #[test]
    fn empty_feed_counts_as_populated() {
        let mut state = state();
        let mut sync = SyncController::new();
        sync.begin();
        let outcome = sync.complete(
            &mut state,
            Ok(ParsedFeed {
                records: Vec::new(),
                skipped: Vec::new(),
            }),
        );
        assert_eq!(
            outcome,
            SyncOutcome::Refreshed {
                records: 0,
                skipped: 0
            }
        );

        sync.begin();
        let outcome = sync.complete(&mut state, Err(FeedFormatError::MissingHeader.into()));
        assert!(matches!(outcome, SyncOutcome::KeptStale { .. }));
        assert!(state.store().is_empty());
    }
}
