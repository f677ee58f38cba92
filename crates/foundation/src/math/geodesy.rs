use super::LatLng;

/// Mean Earth radius (meters, IUGG).
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_008.8;

/// Great-circle distance between two positions (haversine).
pub fn haversine_distance_m(a: LatLng, b: LatLng) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat * 0.5).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng * 0.5).sin().powi(2);
    2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Sum of leg lengths along an ordered path.
pub fn path_length_m(points: &[LatLng]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance_m(w[0], w[1]))
        .sum()
}
