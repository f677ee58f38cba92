use foundation::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

use crate::error::TourLoadError;

/// A named, geolocated stop with its photo set.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    name: String,
    position: LatLng,
    photos: Vec<String>,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, position: LatLng, photos: Vec<String>) -> Self {
        Self {
            name: name.into(),
            position,
            photos,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }
}

/// On-disk shape of one waypoint entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaypointDoc {
    pub name: String,
    /// `[lat, lng]` in degrees.
    pub position: [f64; 2],
    #[serde(default)]
    pub photos: Vec<String>,
}

impl From<WaypointDoc> for Waypoint {
    fn from(doc: WaypointDoc) -> Self {
        Waypoint::new(doc.name, doc.position.into(), doc.photos)
    }
}

/// Immutable, ordered, non-empty list of stops.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointStore {
    stops: Vec<Waypoint>,
}

impl WaypointStore {
    pub fn new(stops: Vec<Waypoint>) -> Result<Self, TourLoadError> {
        if stops.is_empty() {
            return Err(TourLoadError::EmptyTour);
        }
        if let Some((index, stop)) = stops
            .iter()
            .enumerate()
            .find(|(_, s)| !s.position.is_finite())
        {
            return Err(TourLoadError::InvalidCoordinate {
                index,
                name: stop.name.clone(),
            });
        }
        Ok(Self { stops })
    }

    pub fn from_json_str(json: &str) -> Result<Self, TourLoadError> {
        let docs: Vec<WaypointDoc> =
            serde_json::from_str(json).map_err(|source| TourLoadError::Parse {
                document: "waypoint",
                source,
            })?;
        Self::new(docs.into_iter().map(Waypoint::from).collect())
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Always `false`; construction rejects empty tours.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Waypoint> {
        self.stops.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.stops.iter()
    }

    /// Ordered positions for drawing the route line.
    pub fn route(&self) -> Vec<LatLng> {
        self.stops.iter().map(|s| s.position).collect()
    }

    pub fn bounds(&self) -> LatLngBounds {
        // Stores are never empty, so the fallback is never taken.
        LatLngBounds::from_points(&self.route())
            .unwrap_or_else(|| LatLngBounds::from_point(LatLng::default()))
    }

    pub fn route_length_m(&self) -> f64 {
        foundation::path_length_m(&self.route())
    }
}
