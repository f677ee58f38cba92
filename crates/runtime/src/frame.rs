use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Nominal display refresh used for per-frame effects.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Frame metadata for a fixed-rate schedule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta between frames.
    pub dt: Duration,
}

impl Frame {
    pub fn new(index: u64, dt: Duration) -> Self {
        Self { index, dt }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt)
    }
}

/// Drives a per-frame callback schedule until a deadline.
///
/// Late frames are skipped rather than bunched up, the way a browser's
/// animation-frame callback behaves when the page stalls.
#[derive(Debug)]
pub struct FramePacer {
    interval: Interval,
    next: Frame,
    deadline: Instant,
}

impl FramePacer {
    pub fn new(dt: Duration, duration: Duration) -> Self {
        let dt = dt.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(dt);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            interval,
            next: Frame::new(0, dt),
            deadline: Instant::now() + duration,
        }
    }

    /// Waits for the next frame slot.
    ///
    /// The first frame is delivered immediately. Returns `None` once the
    /// deadline has passed; a frame is always delivered at least once.
    pub async fn tick(&mut self) -> Option<Frame> {
        if self.next.index > 0 && Instant::now() >= self.deadline {
            return None;
        }
        self.interval.tick().await;
        let frame = self.next;
        self.next = frame.next();
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{Frame, FramePacer};
    use std::time::Duration;
    use tokio::time::Instant;

    #[test]
    fn next_advances_index() {
        let f0 = Frame::new(0, Duration::from_millis(500));
        let f1 = f0.next();
        assert_eq!(f1.index, 1);
        assert_eq!(f1.dt, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn pacer_stops_after_deadline() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(Duration::from_millis(10), Duration::from_millis(100));
        let mut frames = 0u64;
        while let Some(frame) = pacer.tick().await {
            assert_eq!(frame.index, frames);
            frames += 1;
        }
        // Frames at 0, 10, ..., 100 ms.
        assert_eq!(frames, 11);
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_still_delivers_one_frame() {
        let mut pacer = FramePacer::new(Duration::from_millis(10), Duration::ZERO);
        assert!(pacer.tick().await.is_some());
        assert!(pacer.tick().await.is_none());
    }
}
