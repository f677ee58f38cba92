use crate::math::LatLng;

/// Axis-aligned lat/lng bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut b = Self::from_point(*first);
        for p in rest {
            b.extend(*p);
        }
        Some(b)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::lerp(self.south_west, self.north_east, 0.5)
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }
}

#[cfg(test)]
mod tests {
    use super::LatLngBounds;
    use crate::math::LatLng;

    #[test]
    fn empty_has_no_bounds() {
        assert!(LatLngBounds::from_points(&[]).is_none());
    }

    #[test]
    fn covers_all_points() {
        let pts = [
            LatLng::new(1.0, -2.0),
            LatLng::new(-3.0, 4.0),
            LatLng::new(0.5, 0.5),
        ];
        let b = LatLngBounds::from_points(&pts).unwrap();
        assert_eq!(b.south_west, LatLng::new(-3.0, -2.0));
        assert_eq!(b.north_east, LatLng::new(1.0, 4.0));
        assert!(pts.iter().all(|p| b.contains(*p)));
        assert_eq!(b.center(), LatLng::new(-1.0, 1.0));
    }
}
