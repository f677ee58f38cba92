/// Marker fill opacity for a visited stop.
pub const VISITED_OPACITY: f32 = 1.0;
/// Marker fill opacity for a stop not yet reached.
pub const UPCOMING_OPACITY: f32 = 0.3;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Badge {
    Visited,
    Upcoming,
}

impl Badge {
    pub fn opacity(self) -> f32 {
        match self {
            Badge::Visited => VISITED_OPACITY,
            Badge::Upcoming => UPCOMING_OPACITY,
        }
    }
}

/// Decides which stops disclose their content.
///
/// This gates photo access only. Marker travel through the selector
/// controls is never checked against it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct ProgressGate {
    last_visited: Option<usize>,
}

impl ProgressGate {
    pub fn new(last_visited: Option<usize>) -> Self {
        Self { last_visited }
    }

    pub fn last_visited(&self) -> Option<usize> {
        self.last_visited
    }

    pub fn is_reachable(&self, index: usize) -> bool {
        self.last_visited.is_some_and(|last| index <= last)
    }

    pub fn badge(&self, index: usize) -> Badge {
        if self.is_reachable(index) {
            Badge::Visited
        } else {
            Badge::Upcoming
        }
    }
}
