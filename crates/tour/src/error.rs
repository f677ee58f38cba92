use std::path::PathBuf;

/// Conditions raised while the tour is running.
///
/// None of these halt the session; callers handle them where they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourError {
    /// A gated action targeted a stop that has not been visited yet.
    NotYetAvailable { index: usize },
    /// Index outside `[0, len)`.
    InvalidIndex { index: usize, len: usize },
    /// A gallery photo could not be loaded.
    AssetLoadFailure { photo: String },
    /// Timed work was requested outside a Tokio runtime.
    RuntimeUnavailable,
}

impl std::fmt::Display for TourError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TourError::NotYetAvailable { index } => {
                write!(f, "stop {index} is not available yet")
            }
            TourError::InvalidIndex { index, len } => {
                write!(f, "waypoint index {index} out of range (tour has {len} stops)")
            }
            TourError::AssetLoadFailure { photo } => write!(f, "failed to load photo {photo}"),
            TourError::RuntimeUnavailable => write!(f, "no async runtime available"),
        }
    }
}

impl std::error::Error for TourError {}

/// Startup failures. These are the only conditions that stop a session.
#[derive(Debug)]
pub enum TourLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        document: &'static str,
        source: serde_json::Error,
    },
    EmptyTour,
    InvalidCoordinate {
        index: usize,
        name: String,
    },
}

impl std::fmt::Display for TourLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TourLoadError::Io { path, source } => {
                write!(f, "failed to read {}: {source}", path.display())
            }
            TourLoadError::Parse { document, source } => {
                write!(f, "failed to parse {document} document: {source}")
            }
            TourLoadError::EmptyTour => write!(f, "waypoint document has no stops"),
            TourLoadError::InvalidCoordinate { index, name } => {
                write!(f, "waypoint {index} ({name}) has a non-finite position")
            }
        }
    }
}

impl std::error::Error for TourLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TourLoadError::Io { source, .. } => Some(source),
            TourLoadError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
