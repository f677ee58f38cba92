//! Marker animation state machine.
//!
//! Phases cycle `Idle -> Moving -> Dwelling -> Idle`. Every suspension point
//! is an explicit timed wait on the cycle task:
//!
//! 1. `steps` interpolation steps, each followed by `step_delay`;
//! 2. snap to the stored destination, pan, enter `Dwelling`, notify;
//! 3. wait `dwell`, then return to `Idle` (or start a coalesced move).
//!
//! At most one cycle task exists at a time. The `Idle -> Moving` transition
//! happens synchronously inside [`AnimationController::request_move`], so a
//! second request issued right after the first already sees `Moving`.

use std::sync::Arc;

use foundation::LatLng;
use parking_lot::Mutex;
use runtime::{EventBus, SubscriptionId};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::{AnimationSettings, BusyPolicy};
use crate::error::TourError;
use crate::notify::NotificationService;
use crate::surface::MapSurface;
use crate::waypoint::WaypointStore;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Moving { target: usize },
    Dwelling,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NavigationState {
    /// Last stop the marker fully reached. Never an in-flight target.
    pub current_index: usize,
    pub phase: Phase,
    pub live_position: LatLng,
}

impl NavigationState {
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }
}

/// Result of an accepted (non-error) move request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Started,
    /// Target is the current stop; nothing to do.
    AlreadyThere,
    /// An animation is running and the request was dropped.
    Busy,
    /// An animation is running and the request will run after it.
    Queued,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    MoveStarted { from: usize, to: usize },
    /// Fired once per completed move, on entering `Dwelling`.
    IndexChanged { index: usize },
    DwellFinished { index: usize },
    MoveDropped { target: usize },
    MoveQueued { target: usize },
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Leg {
    target: usize,
    destination: LatLng,
}

struct Inner {
    store: Arc<WaypointStore>,
    settings: AnimationSettings,
    map: Arc<dyn MapSurface>,
    notifications: NotificationService,
    state: watch::Sender<NavigationState>,
    // Lock before touching `phase` so a drained move and a new request
    // cannot both observe `Idle`.
    pending: Mutex<Option<Leg>>,
    bus: Mutex<EventBus<TourEvent>>,
}

/// Owns the [`NavigationState`] and is its only writer.
///
/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct AnimationController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationController")
            .field("state", &self.state())
            .field("settings", &self.inner.settings)
            .finish()
    }
}

impl AnimationController {
    /// Places the marker on `initial_index` (clamped to the tour) and starts
    /// idle there.
    pub fn new(
        store: Arc<WaypointStore>,
        settings: AnimationSettings,
        initial_index: usize,
        map: Arc<dyn MapSurface>,
        notifications: NotificationService,
    ) -> Self {
        let current_index = initial_index.min(store.len().saturating_sub(1));
        let live_position = store
            .get(current_index)
            .map(|w| w.position())
            .unwrap_or_default();
        map.set_marker_position(live_position);

        let (state, _) = watch::channel(NavigationState {
            current_index,
            phase: Phase::Idle,
            live_position,
        });

        Self {
            inner: Arc::new(Inner {
                store,
                settings,
                map,
                notifications,
                state,
                pending: Mutex::new(None),
                bus: Mutex::new(EventBus::new()),
            }),
        }
    }

    pub fn state(&self) -> NavigationState {
        *self.inner.state.borrow()
    }

    pub fn current_index(&self) -> usize {
        self.inner.state.borrow().current_index
    }

    pub fn subscribe_state(&self) -> watch::Receiver<NavigationState> {
        self.inner.state.subscribe()
    }

    pub fn subscribe(&self, handler: impl Fn(&TourEvent) + Send + Sync + 'static) -> SubscriptionId {
        self.inner.bus.lock().subscribe(handler)
    }

    /// Calls `handler` with the new index each time a move completes.
    pub fn on_index_changed(&self, handler: impl Fn(usize) + Send + Sync + 'static) -> SubscriptionId {
        self.subscribe(move |event| {
            if let TourEvent::IndexChanged { index } = event {
                handler(*index);
            }
        })
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.bus.lock().unsubscribe(id)
    }

    pub fn recent_events(&self) -> Vec<TourEvent> {
        self.inner.bus.lock().events().cloned().collect()
    }

    /// Resolves once the controller is idle with nothing pending.
    pub async fn wait_until_idle(&self) {
        let mut rx = self.inner.state.subscribe();
        // The sender lives in `self`, so this cannot fail.
        let _ = rx.wait_for(NavigationState::is_idle).await;
    }

    /// Moves the marker to `target`.
    ///
    /// Must be called from within a Tokio runtime; the animation runs on a
    /// spawned task and this returns as soon as it is accepted.
    pub fn request_move(&self, target: usize) -> Result<MoveOutcome, TourError> {
        let len = self.inner.store.len();
        let Some(destination) = self.inner.store.get(target).map(|w| w.position()) else {
            warn!(target, len, "rejected move to invalid waypoint index");
            return Err(TourError::InvalidIndex { index: target, len });
        };
        let handle = Handle::try_current().map_err(|_| TourError::RuntimeUnavailable)?;
        let leg = Leg {
            target,
            destination,
        };

        let mut outcome = MoveOutcome::Started;
        let mut from = 0;
        {
            let mut pending = self.inner.pending.lock();
            self.inner.state.send_if_modified(|s| {
                if s.current_index == target {
                    // Staying put is the newest intent; drop anything queued.
                    if s.phase != Phase::Idle
                        && self.inner.settings.busy_policy == BusyPolicy::Coalesce
                    {
                        *pending = None;
                    }
                    outcome = MoveOutcome::AlreadyThere;
                    return false;
                }
                if s.phase != Phase::Idle {
                    outcome = match self.inner.settings.busy_policy {
                        BusyPolicy::Drop => MoveOutcome::Busy,
                        BusyPolicy::Coalesce => {
                            *pending = Some(leg);
                            MoveOutcome::Queued
                        }
                    };
                    return false;
                }
                from = s.current_index;
                s.phase = Phase::Moving { target };
                true
            });
        }

        match outcome {
            MoveOutcome::Started => {
                debug!(from, to = target, "move started");
                self.emit(TourEvent::MoveStarted { from, to: target });
                handle.spawn(self.clone().run_cycle(leg));
            }
            MoveOutcome::AlreadyThere => debug!(target, "already at target"),
            MoveOutcome::Busy => {
                debug!(target, "controller busy, move dropped");
                self.emit(TourEvent::MoveDropped { target });
            }
            MoveOutcome::Queued => {
                debug!(target, "controller busy, move queued");
                self.emit(TourEvent::MoveQueued { target });
            }
        }
        Ok(outcome)
    }

    /// Moves to the next stop, wrapping past the end.
    pub fn next(&self) -> Result<MoveOutcome, TourError> {
        let len = self.inner.store.len();
        self.request_move((self.current_index() + 1) % len)
    }

    /// Moves to the previous stop, wrapping past the start.
    pub fn previous(&self) -> Result<MoveOutcome, TourError> {
        let len = self.inner.store.len();
        self.request_move((self.current_index() + len - 1) % len)
    }

    /// Runs the arrival feedback and dwell for the stop the marker is
    /// already on, without moving. `index_changed` subscribers are not
    /// notified since the index does not change.
    pub fn dwell_in_place(&self) -> Result<MoveOutcome, TourError> {
        let handle = Handle::try_current().map_err(|_| TourError::RuntimeUnavailable)?;
        let mut index = 0;
        let started = self.inner.state.send_if_modified(|s| {
            if s.phase != Phase::Idle {
                return false;
            }
            index = s.current_index;
            s.phase = Phase::Dwelling;
            true
        });
        if !started {
            debug!("controller busy, dwell dropped");
            return Ok(MoveOutcome::Busy);
        }

        debug!(index, "dwelling in place");
        let this = self.clone();
        handle.spawn(async move {
            this.show_feedback(index);
            tokio::time::sleep(this.inner.settings.dwell).await;
            if let Some(leg) = this.finish_dwell(index) {
                this.run_cycle(leg).await;
            }
        });
        Ok(MoveOutcome::Started)
    }

    async fn run_cycle(self, first: Leg) {
        let mut leg = first;
        loop {
            self.travel(leg).await;
            self.arrive(leg);
            tokio::time::sleep(self.inner.settings.dwell).await;
            match self.finish_dwell(leg.target) {
                Some(next) => leg = next,
                None => break,
            }
        }
    }

    async fn travel(&self, leg: Leg) {
        self.inner.notifications.dismiss_arrival();

        let origin = self.inner.state.borrow().live_position;
        let steps = self.inner.settings.steps.max(1);
        for step in 0..steps {
            let t = f64::from(step) / f64::from(steps);
            self.set_live_position(LatLng::lerp(origin, leg.destination, t));
            tokio::time::sleep(self.inner.settings.step_delay).await;
        }

        // Snap to the stored coordinates, not the interpolated estimate.
        self.set_live_position(leg.destination);
        self.inner.map.pan_to(leg.destination);
    }

    fn set_live_position(&self, position: LatLng) {
        self.inner.state.send_modify(|s| s.live_position = position);
        self.inner.map.set_marker_position(position);
    }

    fn arrive(&self, leg: Leg) {
        self.inner.state.send_modify(|s| {
            s.current_index = leg.target;
            s.phase = Phase::Dwelling;
        });
        debug!(index = leg.target, "arrived");
        self.emit(TourEvent::IndexChanged { index: leg.target });
        self.show_feedback(leg.target);
    }

    fn show_feedback(&self, index: usize) {
        if let Some(stop) = self.inner.store.get(index) {
            self.inner.notifications.show_arrival(stop);
        }
        if self.inner.settings.celebration_enabled {
            self.inner.notifications.celebrate();
        }
    }

    fn finish_dwell(&self, index: usize) -> Option<Leg> {
        let next = {
            let mut pending = self.inner.pending.lock();
            let next = pending.take().filter(|leg| leg.target != index);
            self.inner.state.send_modify(|s| {
                s.phase = match next {
                    Some(leg) => Phase::Moving { target: leg.target },
                    None => Phase::Idle,
                };
            });
            next
        };

        self.emit(TourEvent::DwellFinished { index });
        if let Some(leg) = next {
            debug!(from = index, to = leg.target, "starting queued move");
            self.emit(TourEvent::MoveStarted {
                from: index,
                to: leg.target,
            });
        }
        next
    }

    fn emit(&self, event: TourEvent) {
        let handlers = {
            let mut bus = self.inner.bus.lock();
            bus.record(event.clone());
            bus.handlers()
        };
        for handler in handlers {
            handler(&event);
        }
    }
}
