use foundation::LatLng;
use tour::{ConfettiBurst, FeedbackSurface, MapSurface, Popup, PopupId};
use tracing::{debug, info, trace};

/// Headless surface: every render call becomes a log line.
#[derive(Debug, Default)]
pub struct LogSurface;

impl MapSurface for LogSurface {
    fn set_marker_position(&self, position: LatLng) {
        trace!(%position, "marker");
    }

    fn pan_to(&self, center: LatLng) {
        debug!(%center, "pan");
    }
}

impl FeedbackSurface for LogSurface {
    fn show_popup(&self, popup: &Popup) {
        info!(popup = popup.id.0, at = %popup.anchor, "{}", popup.text);
    }

    fn remove_popup(&self, id: PopupId) {
        debug!(popup = id.0, "popup closed");
    }

    fn burst(&self, burst: &ConfettiBurst) {
        trace!(frame = burst.frame, particles = burst.particle_count, "confetti");
    }
}
