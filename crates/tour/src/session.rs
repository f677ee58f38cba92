use std::fs;
use std::path::Path;
use std::sync::Arc;

use runtime::SubscriptionId;
use tracing::{debug, info};

use crate::config::{AnimationSettings, TourConfig};
use crate::controller::{AnimationController, MoveOutcome};
use crate::error::{TourError, TourLoadError};
use crate::gallery::Gallery;
use crate::gate::ProgressGate;
use crate::notify::NotificationService;
use crate::surface::{FeedbackSurface, MapSurface};
use crate::waypoint::WaypointStore;

pub const CONFIG_FILE: &str = "config.json";
pub const WAYPOINTS_FILE: &str = "waypoints.json";

/// One tour session: the loaded documents plus the controller driving them.
///
/// This is the surface a selector UI or tap handler talks to.
#[derive(Debug)]
pub struct TourSession {
    config: TourConfig,
    store: Arc<WaypointStore>,
    gate: ProgressGate,
    controller: AnimationController,
    notifications: NotificationService,
}

impl TourSession {
    /// Starts on the last visited stop (see [`TourConfig::initial_index`]).
    pub fn new(
        config: TourConfig,
        store: WaypointStore,
        map: Arc<dyn MapSurface>,
        feedback: Arc<dyn FeedbackSurface>,
    ) -> Self {
        let start = config.initial_index(store.len());
        Self::with_start_index(config, store, start, map, feedback)
    }

    pub fn with_start_index(
        config: TourConfig,
        store: WaypointStore,
        start: usize,
        map: Arc<dyn MapSurface>,
        feedback: Arc<dyn FeedbackSurface>,
    ) -> Self {
        let store = Arc::new(store);
        let gate = ProgressGate::new(config.last_visited());
        let notifications = NotificationService::new(feedback);
        let controller = AnimationController::new(
            store.clone(),
            AnimationSettings::from_config(&config),
            start,
            map,
            notifications.clone(),
        );
        Self {
            config,
            store,
            gate,
            controller,
            notifications,
        }
    }

    /// Loads `config.json` and `waypoints.json` from `dir`.
    pub fn load_dir(
        dir: impl AsRef<Path>,
        map: Arc<dyn MapSurface>,
        feedback: Arc<dyn FeedbackSurface>,
    ) -> Result<Self, TourLoadError> {
        let (config, store) = load_documents(dir)?;
        Ok(Self::new(config, store, map, feedback))
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn store(&self) -> &WaypointStore {
        &self.store
    }

    pub fn gate(&self) -> &ProgressGate {
        &self.gate
    }

    pub fn controller(&self) -> &AnimationController {
        &self.controller
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn live_stream_url(&self) -> Option<&str> {
        self.config.live_stream_url.as_deref()
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        self.gate.is_reachable(index)
    }

    pub fn request_move(&self, index: usize) -> Result<MoveOutcome, TourError> {
        self.controller.request_move(index)
    }

    pub fn next(&self) -> Result<MoveOutcome, TourError> {
        self.controller.next()
    }

    pub fn previous(&self) -> Result<MoveOutcome, TourError> {
        self.controller.previous()
    }

    pub fn on_index_changed(&self, handler: impl Fn(usize) + Send + Sync + 'static) -> SubscriptionId {
        self.controller.on_index_changed(handler)
    }

    /// Tap on a stop marker: opens its gallery if the stop has been visited.
    ///
    /// Never moves the marker.
    pub fn tap(&self, index: usize) -> Result<Gallery, TourError> {
        let Some(stop) = self.store.get(index) else {
            return Err(TourError::InvalidIndex {
                index,
                len: self.store.len(),
            });
        };
        if !self.gate.is_reachable(index) {
            info!(index, stop = stop.name(), "stop not available yet");
            return Err(TourError::NotYetAvailable { index });
        }
        debug!(index, photos = stop.photos().len(), "opening gallery");
        Ok(Gallery::open(stop))
    }

    /// Visits every stop from the first through the last visited one, in
    /// order, waiting out each full move and dwell. A stop the marker already
    /// sits on gets its arrival feedback and dwell without moving. Returns the
    /// number of moves made.
    pub async fn play_through(&self) -> Result<usize, TourError> {
        let Some(last) = self.gate.last_visited() else {
            info!("no visited stops, nothing to play");
            return Ok(0);
        };
        let last = last.min(self.store.len() - 1);

        let mut moves = 0;
        for index in 0..=last {
            self.controller.wait_until_idle().await;
            match self.controller.request_move(index)? {
                MoveOutcome::Started => moves += 1,
                // Already on this stop: still announce it and wait the dwell.
                MoveOutcome::AlreadyThere => {
                    self.controller.dwell_in_place()?;
                }
                MoveOutcome::Busy | MoveOutcome::Queued => {}
            }
            self.controller.wait_until_idle().await;
        }
        info!(moves, last, "tour played through");
        Ok(moves)
    }
}

pub fn load_documents(dir: impl AsRef<Path>) -> Result<(TourConfig, WaypointStore), TourLoadError> {
    let dir = dir.as_ref();
    let config = TourConfig::from_json_str(&read(&dir.join(CONFIG_FILE))?)?;
    let store = WaypointStore::from_json_str(&read(&dir.join(WAYPOINTS_FILE))?)?;
    Ok((config, store))
}

fn read(path: &Path) -> Result<String, TourLoadError> {
    fs::read_to_string(path).map_err(|source| TourLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{TourSession, load_documents};
    use crate::config::TourConfig;
    use crate::error::{TourError, TourLoadError};
    use crate::surface::{RecordingSurface, SurfaceCall};
    use crate::waypoint::{Waypoint, WaypointStore};
    use foundation::LatLng;
    use std::sync::Arc;

    fn session(last_visited: Option<i64>) -> TourSession {
        session_with_surface(last_visited).0
    }

    fn session_with_surface(last_visited: Option<i64>) -> (TourSession, Arc<RecordingSurface>) {
        let store = WaypointStore::new(
            (0..4)
                .map(|i| {
                    Waypoint::new(
                        format!("stop {i}"),
                        LatLng::new(i as f64, 0.0),
                        vec![format!("{i}.jpg")],
                    )
                })
                .collect(),
        )
        .unwrap();
        let config = TourConfig {
            last_visited_index: last_visited,
            dwell_duration_ms: 50,
            interpolation_steps: 5,
            step_delay_ms: 10,
            ..TourConfig::default()
        };
        let surface = Arc::new(RecordingSurface::new());
        let session = TourSession::new(config, store, surface.clone(), surface.clone());
        (session, surface)
    }

    #[test]
    fn tap_gates_on_progress() {
        let s = session(Some(1));
        let g = s.tap(1).unwrap();
        assert_eq!(g.title(), "stop 1");
        assert_eq!(s.tap(2), Err(TourError::NotYetAvailable { index: 2 }));
        assert_eq!(s.tap(9), Err(TourError::InvalidIndex { index: 9, len: 4 }));
        assert_eq!(s.controller().current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn play_through_stops_at_last_visited() {
        let s = session(Some(2));
        let visited = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = visited.clone();
        s.on_index_changed(move |i| sink.lock().push(i));

        // Starts on stop 2, so the first leg goes back to stop 0.
        assert_eq!(s.play_through().await, Ok(3));
        assert_eq!(*visited.lock(), vec![0, 1, 2]);
        assert_eq!(s.controller().current_index(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn play_through_announces_the_occupied_stop() {
        let (s, surface) = session_with_surface(Some(2));
        let from_first = TourSession::with_start_index(
            s.config().clone(),
            s.store().clone(),
            0,
            surface.clone(),
            surface.clone(),
        );

        assert_eq!(from_first.play_through().await, Ok(2));
        assert_eq!(from_first.controller().current_index(), 2);
        let shown: Vec<_> = surface
            .calls()
            .into_iter()
            .filter_map(|(_, c)| match c {
                SurfaceCall::PopupShown(p) => Some(p.text),
                _ => None,
            })
            .collect();
        assert_eq!(shown, vec!["stop 0", "stop 1", "stop 2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn play_through_without_progress_is_noop() {
        let s = session(None);
        assert_eq!(s.play_through().await, Ok(0));
        assert_eq!(s.controller().current_index(), 0);
    }

    #[test]
    fn missing_directory_reports_path() {
        let err = load_documents("/nonexistent/tour").unwrap_err();
        match err {
            TourLoadError::Io { path, .. } => assert!(path.ends_with("config.json")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
