use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use runtime::{DEFAULT_FRAME_INTERVAL, FramePacer};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::surface::{ConfettiBurst, FeedbackSurface, Popup, PopupId};
use crate::waypoint::Waypoint;

/// Arrival popups remove themselves after this long, whatever the dwell is.
pub const ARRIVAL_POPUP_TTL: Duration = Duration::from_millis(2000);
/// Length of the confetti effect.
pub const CELEBRATION_DURATION: Duration = Duration::from_millis(2000);

struct ActivePopup {
    id: PopupId,
    expiry: Option<JoinHandle<()>>,
}

struct Inner {
    surface: Arc<dyn FeedbackSurface>,
    active: Mutex<Option<ActivePopup>>,
    next_popup: AtomicU64,
    frame_interval: Duration,
}

/// Transient arrival feedback: one popup at a time plus fire-and-forget
/// confetti. Nothing here reports failure back to the caller.
#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for NotificationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationService")
            .field("active_popup", &self.active_popup())
            .field("frame_interval", &self.inner.frame_interval)
            .finish()
    }
}

impl NotificationService {
    pub fn new(surface: Arc<dyn FeedbackSurface>) -> Self {
        Self::with_frame_interval(surface, DEFAULT_FRAME_INTERVAL)
    }

    pub fn with_frame_interval(surface: Arc<dyn FeedbackSurface>, frame_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                surface,
                active: Mutex::new(None),
                next_popup: AtomicU64::new(0),
                frame_interval,
            }),
        }
    }

    pub fn active_popup(&self) -> Option<PopupId> {
        self.inner.active.lock().as_ref().map(|p| p.id)
    }

    /// Shows the arrival popup for `waypoint`, replacing any popup still open.
    pub fn show_arrival(&self, waypoint: &Waypoint) -> PopupId {
        let id = PopupId(self.inner.next_popup.fetch_add(1, Ordering::Relaxed));
        let popup = Popup {
            id,
            anchor: waypoint.position(),
            text: waypoint.name().to_string(),
        };

        let expiry = match Handle::try_current() {
            Ok(handle) => {
                let svc = self.clone();
                Some(handle.spawn(async move {
                    tokio::time::sleep(ARRIVAL_POPUP_TTL).await;
                    svc.expire(id);
                }))
            }
            Err(_) => {
                warn!(popup = id.0, "no runtime, popup will not auto-dismiss");
                None
            }
        };

        let previous = self
            .inner
            .active
            .lock()
            .replace(ActivePopup { id, expiry });
        if let Some(prev) = previous {
            self.close(prev);
        }

        debug!(popup = id.0, stop = waypoint.name(), "arrival popup shown");
        self.inner.surface.show_popup(&popup);
        id
    }

    /// Removes the open popup, if any. Returns `true` if one was removed.
    pub fn dismiss_arrival(&self) -> bool {
        let active = self.inner.active.lock().take();
        match active {
            Some(popup) => {
                self.close(popup);
                true
            }
            None => false,
        }
    }

    fn expire(&self, id: PopupId) {
        let mut active = self.inner.active.lock();
        if active.as_ref().is_some_and(|p| p.id == id) {
            *active = None;
            drop(active);
            debug!(popup = id.0, "arrival popup expired");
            self.inner.surface.remove_popup(id);
        }
    }

    fn close(&self, popup: ActivePopup) {
        if let Some(expiry) = popup.expiry {
            expiry.abort();
        }
        debug!(popup = popup.id.0, "arrival popup dismissed");
        self.inner.surface.remove_popup(popup.id);
    }

    /// Starts the confetti effect: one burst per frame until
    /// [`CELEBRATION_DURATION`] elapses. Returns without waiting.
    pub fn celebrate(&self) -> Option<JoinHandle<()>> {
        let Ok(handle) = Handle::try_current() else {
            warn!("no runtime, skipping celebration");
            return None;
        };
        let surface = self.inner.surface.clone();
        let frame_interval = self.inner.frame_interval;
        Some(handle.spawn(async move {
            let mut pacer = FramePacer::new(frame_interval, CELEBRATION_DURATION);
            let mut frames = 0u64;
            while let Some(frame) = pacer.tick().await {
                surface.burst(&ConfettiBurst::for_frame(frame.index));
                frames += 1;
            }
            debug!(frames, "celebration finished");
        }))
    }
}
