use tracing::warn;

use crate::error::TourError;
use crate::waypoint::Waypoint;

/// Shown in place of a photo that failed to load.
pub const PHOTO_FALLBACK_MESSAGE: &str = "Photo unavailable";

/// Cursor over one stop's photo set. Navigation wraps in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    title: String,
    photos: Vec<String>,
    index: usize,
}

impl Gallery {
    pub fn open(stop: &Waypoint) -> Self {
        Self {
            title: stop.name().to_string(),
            photos: stop.photos().to_vec(),
            index: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&str> {
        self.photos.get(self.index).map(String::as_str)
    }

    pub fn next(&mut self) -> Option<&str> {
        if !self.photos.is_empty() {
            self.index = (self.index + 1) % self.photos.len();
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<&str> {
        if !self.photos.is_empty() {
            let len = self.photos.len();
            self.index = (self.index + len - 1) % len;
        }
        self.current()
    }

    /// "Photo i of n", 1-based.
    pub fn caption(&self) -> String {
        if self.photos.is_empty() {
            return "No photos".to_string();
        }
        format!("Photo {} of {}", self.index + 1, self.photos.len())
    }

    /// Records a failed load of the current photo and returns the text to
    /// show instead. The gallery stays usable.
    pub fn load_failed(&self, reason: &str) -> &'static str {
        let err = TourError::AssetLoadFailure {
            photo: self.current().unwrap_or_default().to_string(),
        };
        warn!(gallery = %self.title, %reason, "{err}");
        PHOTO_FALLBACK_MESSAGE
    }
}
