use std::sync::Arc;
use std::time::Duration;

use foundation::LatLng;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tokio::time::{Instant, sleep};
use tour::{
    ARRIVAL_POPUP_TTL, MoveOutcome, Phase, RecordingSurface, TourConfig, TourError, TourSession,
    Waypoint, WaypointStore,
};

fn abc_store() -> WaypointStore {
    WaypointStore::new(vec![
        Waypoint::new("A", LatLng::new(0.0, 0.0), vec!["a1.jpg".into()]),
        Waypoint::new("B", LatLng::new(1.0, 1.0), vec!["b1.jpg".into(), "b2.jpg".into()]),
        Waypoint::new("C", LatLng::new(2.0, 2.0), vec![]),
    ])
    .unwrap()
}

fn config(last_visited: i64, dwell_ms: u64) -> TourConfig {
    TourConfig {
        last_visited_index: Some(last_visited),
        dwell_duration_ms: dwell_ms,
        interpolation_steps: 30,
        step_delay_ms: 10,
        ..TourConfig::default()
    }
}

fn session_at(config: TourConfig, start: usize) -> (TourSession, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new());
    let session =
        TourSession::with_start_index(config, abc_store(), start, surface.clone(), surface.clone());
    (session, surface)
}

#[tokio::test(start_paused = true)]
async fn gated_tap_then_move_to_visited_stop() {
    let (session, surface) = session_at(config(1, 500), 0);

    // Gallery access to an unvisited stop: notice only, no motion.
    assert!(!session.is_reachable(2));
    assert_eq!(session.tap(2), Err(TourError::NotYetAvailable { index: 2 }));
    assert_eq!(session.controller().state().phase, Phase::Idle);
    assert_eq!(session.controller().current_index(), 0);
    assert_eq!(surface.marker_positions(), vec![LatLng::new(0.0, 0.0)]);

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let sink = arrivals.clone();
    let rx = session.controller().subscribe_state();
    session.on_index_changed(move |index| {
        let s = *rx.borrow();
        sink.lock().push((index, s, Instant::now()));
    });

    assert_eq!(session.request_move(1), Ok(MoveOutcome::Started));
    session.controller().wait_until_idle().await;
    let idle_at = Instant::now();

    let arrivals = arrivals.lock().clone();
    assert_eq!(arrivals.len(), 1);
    let (index, at_arrival, arrived_at) = arrivals[0];
    assert_eq!(index, 1);
    assert_eq!(at_arrival.phase, Phase::Dwelling);
    assert_eq!(at_arrival.current_index, 1);
    // Exact, not approximate.
    assert_eq!(at_arrival.live_position, LatLng::new(1.0, 1.0));
    assert!(idle_at - arrived_at >= Duration::from_millis(500));

    for p in surface.marker_positions() {
        assert!((p.lat - p.lng).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&p.lat));
    }
    assert_eq!(session.tap(1).map(|g| g.len()), Ok(2));
}

#[tokio::test(start_paused = true)]
async fn back_to_back_requests_keep_the_first() {
    let (session, _) = session_at(config(2, 100), 1);

    assert_eq!(session.request_move(2), Ok(MoveOutcome::Started));
    assert_eq!(session.request_move(0), Ok(MoveOutcome::Busy));
    assert_eq!(session.controller().state().phase, Phase::Moving { target: 2 });
    assert_eq!(session.controller().current_index(), 1);

    session.controller().wait_until_idle().await;
    assert_eq!(session.controller().current_index(), 2);
    assert_eq!(session.controller().state().live_position, LatLng::new(2.0, 2.0));
}

#[tokio::test(start_paused = true)]
async fn back_to_back_from_first_stop() {
    let (session, _) = session_at(config(2, 100), 0);

    assert_eq!(session.request_move(2), Ok(MoveOutcome::Started));
    // Marker has not left stop 0 yet, so this is a no-op either way.
    assert_eq!(session.request_move(0), Ok(MoveOutcome::AlreadyThere));

    session.controller().wait_until_idle().await;
    assert_eq!(session.controller().current_index(), 2);
}

#[tokio::test(start_paused = true)]
async fn busy_during_dwell_is_dropped() {
    let (session, _) = session_at(config(2, 1000), 0);
    session.request_move(1).unwrap();

    let mut rx = session.controller().subscribe_state();
    rx.wait_for(|s| s.phase == Phase::Dwelling).await.unwrap();
    drop(rx);

    let before = session.controller().state();
    assert_eq!(session.request_move(2), Ok(MoveOutcome::Busy));
    assert_eq!(session.controller().state(), before);

    session.controller().wait_until_idle().await;
    assert_eq!(session.controller().current_index(), 1);
}

async fn popup_lifetime_with_dwell(dwell_ms: u64) {
    let (session, surface) = session_at(config(2, dwell_ms), 0);
    session.request_move(2).unwrap();
    session.controller().wait_until_idle().await;
    sleep(ARRIVAL_POPUP_TTL + Duration::from_millis(100)).await;

    let shown: Vec<_> = surface
        .calls()
        .into_iter()
        .filter_map(|(_, c)| match c {
            tour::SurfaceCall::PopupShown(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].text, "C");
    assert_eq!(shown[0].anchor, LatLng::new(2.0, 2.0));

    let id = shown[0].id;
    let lifetime = surface.removed_at(id).expect("popup removed") - surface.shown_at(id).unwrap();
    assert!(lifetime <= ARRIVAL_POPUP_TTL, "dwell {dwell_ms}: popup lived {lifetime:?}");
    assert!(surface.visible_popups().is_empty());
}

#[tokio::test(start_paused = true)]
async fn popup_expires_independent_of_zero_dwell() {
    popup_lifetime_with_dwell(0).await;
}

#[tokio::test(start_paused = true)]
async fn popup_expires_independent_of_long_dwell() {
    popup_lifetime_with_dwell(5000).await;
}

#[tokio::test(start_paused = true)]
async fn new_move_closes_open_popup() {
    let (session, surface) = session_at(config(2, 0), 0);
    session.request_move(1).unwrap();
    session.controller().wait_until_idle().await;
    let first = session.notifications().active_popup().expect("popup open");

    session.request_move(2).unwrap();
    sleep(Duration::from_millis(1)).await;
    assert_eq!(session.notifications().active_popup(), None);
    let closed = surface.removed_at(first).unwrap() - surface.shown_at(first).unwrap();
    assert!(closed < ARRIVAL_POPUP_TTL);

    session.controller().wait_until_idle().await;
    assert_eq!(surface.visible_popups().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn celebration_does_not_extend_dwell() {
    let mut cfg = config(2, 200);
    cfg.celebration_enabled = true;
    let (session, surface) = session_at(cfg, 0);

    session.request_move(1).unwrap();
    let mut rx = session.controller().subscribe_state();
    rx.wait_for(|s| s.phase == Phase::Dwelling).await.unwrap();
    drop(rx);
    let arrived = Instant::now();

    session.controller().wait_until_idle().await;
    let dwelled = Instant::now() - arrived;
    assert!(dwelled >= Duration::from_millis(200));
    assert!(dwelled < Duration::from_millis(250));

    sleep(Duration::from_millis(2500)).await;
    let bursts = surface.burst_times();
    assert!(bursts.len() > 100);
    // Bursts keep coming after the controller is idle again.
    assert!(*bursts.last().unwrap() > arrived + Duration::from_millis(250));
    // The last frame may land just past the deadline, never a full frame later.
    assert!(*bursts.last().unwrap() - arrived <= tour::CELEBRATION_DURATION + Duration::from_millis(20));
}

#[tokio::test(start_paused = true)]
async fn zero_dwell_still_notifies() {
    let (session, surface) = session_at(config(2, 0), 0);
    let hits = Arc::new(Mutex::new(0));
    let h = hits.clone();
    session.on_index_changed(move |_| *h.lock() += 1);

    session.request_move(1).unwrap();
    session.controller().wait_until_idle().await;
    assert_eq!(*hits.lock(), 1);
    assert_eq!(surface.visible_popups().len(), 1);
}

#[test]
fn default_start_is_last_visited() {
    let surface = Arc::new(RecordingSurface::new());
    let session = TourSession::new(config(1, 0), abc_store(), surface.clone(), surface);
    assert_eq!(session.controller().current_index(), 1);
    assert_eq!(session.controller().state().live_position, LatLng::new(1.0, 1.0));
}

#[test]
fn loads_player_assets() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../apps/tour_player/data");
    let surface = Arc::new(RecordingSurface::new());
    let session = TourSession::load_dir(root, surface.clone(), surface).expect("load tour");
    assert!(session.store().len() >= 2);
    assert!(session.gate().last_visited().is_some());
}
