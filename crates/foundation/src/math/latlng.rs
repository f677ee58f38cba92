/// Geographic position in degrees.
///
/// Arithmetic is component-wise and treats the pair as a flat 2D vector,
/// which is what straight-line marker interpolation on a web map needs.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Point at fraction `t` of the straight segment `a -> b`.
    ///
    /// `t` is not clamped. Callers that need the exact endpoint should use
    /// `b` directly instead of `lerp(a, b, 1.0)`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

impl std::ops::Add for LatLng {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.lat + other.lat, self.lng + other.lng)
    }
}

impl std::ops::Sub for LatLng {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.lat - other.lat, self.lng - other.lng)
    }
}

impl std::ops::Mul<f64> for LatLng {
    type Output = Self;

    fn mul(self, s: f64) -> Self::Output {
        Self::new(self.lat * s, self.lng * s)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lng)
    }
}
