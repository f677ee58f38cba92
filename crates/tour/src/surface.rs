//! Capabilities the tour core drives but does not implement.
//!
//! A rendering front end provides these; the controller only ever talks to
//! the map and the feedback layer through them.

use foundation::LatLng;
use parking_lot::Mutex;
use tokio::time::Instant;

/// Confetti color.
pub const CELEBRATION_COLOR: &str = "#4c2882";

pub trait MapSurface: Send + Sync {
    fn set_marker_position(&self, position: LatLng);
    fn pan_to(&self, center: LatLng);
}

pub trait FeedbackSurface: Send + Sync {
    fn show_popup(&self, popup: &Popup);
    fn remove_popup(&self, id: PopupId);
    fn burst(&self, burst: &ConfettiBurst);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopupId(pub u64);

/// Arrival notice anchored at a stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub id: PopupId,
    pub anchor: LatLng,
    pub text: String,
}

/// One frame's worth of particles.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiBurst {
    pub frame: u64,
    pub particle_count: u32,
    pub start_velocity: f32,
    pub spread_deg: f32,
    /// Normalized viewport origin, `[x, y]` in `0..=1`.
    pub origin: [f32; 2],
    pub colors: Vec<String>,
}

impl ConfettiBurst {
    pub fn for_frame(frame: u64) -> Self {
        Self {
            frame,
            particle_count: 50,
            start_velocity: 40.0,
            spread_deg: 80.0,
            origin: [0.5, 0.6],
            colors: vec![CELEBRATION_COLOR.to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    MarkerMoved(LatLng),
    Panned(LatLng),
    PopupShown(Popup),
    PopupRemoved(PopupId),
    Burst(u64),
}

/// Surface that records every call with its timestamp.
///
/// Useful as a headless stand-in and for asserting timing behavior.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    calls: Mutex<Vec<(Instant, SurfaceCall)>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: SurfaceCall) {
        self.calls.lock().push((Instant::now(), call));
    }

    pub fn calls(&self) -> Vec<(Instant, SurfaceCall)> {
        self.calls.lock().clone()
    }

    pub fn marker_positions(&self) -> Vec<LatLng> {
        self.calls
            .lock()
            .iter()
            .filter_map(|(_, c)| match c {
                SurfaceCall::MarkerMoved(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    pub fn last_pan(&self) -> Option<LatLng> {
        self.calls.lock().iter().rev().find_map(|(_, c)| match c {
            SurfaceCall::Panned(p) => Some(*p),
            _ => None,
        })
    }

    /// Popups shown and not yet removed, oldest first.
    pub fn visible_popups(&self) -> Vec<Popup> {
        let mut open: Vec<Popup> = Vec::new();
        for (_, call) in self.calls.lock().iter() {
            match call {
                SurfaceCall::PopupShown(p) => open.push(p.clone()),
                SurfaceCall::PopupRemoved(id) => open.retain(|p| p.id != *id),
                _ => {}
            }
        }
        open
    }

    pub fn shown_at(&self, id: PopupId) -> Option<Instant> {
        self.calls.lock().iter().find_map(|(t, c)| match c {
            SurfaceCall::PopupShown(p) if p.id == id => Some(*t),
            _ => None,
        })
    }

    pub fn removed_at(&self, id: PopupId) -> Option<Instant> {
        self.calls.lock().iter().find_map(|(t, c)| match c {
            SurfaceCall::PopupRemoved(r) if *r == id => Some(*t),
            _ => None,
        })
    }

    pub fn burst_times(&self) -> Vec<Instant> {
        self.calls
            .lock()
            .iter()
            .filter_map(|(t, c)| matches!(c, SurfaceCall::Burst(_)).then_some(*t))
            .collect()
    }
}

impl MapSurface for RecordingSurface {
    fn set_marker_position(&self, position: LatLng) {
        self.push(SurfaceCall::MarkerMoved(position));
    }

    fn pan_to(&self, center: LatLng) {
        self.push(SurfaceCall::Panned(center));
    }
}

impl FeedbackSurface for RecordingSurface {
    fn show_popup(&self, popup: &Popup) {
        self.push(SurfaceCall::PopupShown(popup.clone()));
    }

    fn remove_popup(&self, id: PopupId) {
        self.push(SurfaceCall::PopupRemoved(id));
    }

    fn burst(&self, burst: &ConfettiBurst) {
        self.push(SurfaceCall::Burst(burst.frame));
    }
}
