use serde::{Deserialize, Serialize};

/// WGS84 latitude/longitude pair in degrees.
///
/// Equality is exact floating-point equality. Two points that print the same
/// after rounding but differ in a distant decimal place are different points.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// `[lon, lat]`, the axis order GeoJSON uses.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

#[cfg(test)]
mod tests {
    use super::GeoPoint;

    #[test]
    fn equality_is_exact() {
        let a = GeoPoint::new(48.8566, 2.3522);
        let b = GeoPoint::new(48.8566, 2.3522 + 1e-12);
        assert_eq!(a, GeoPoint::new(48.8566, 2.3522));
        assert_ne!(a, b);
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(GeoPoint::new(-0.0, 0.0), GeoPoint::new(0.0, -0.0));
    }

    #[test]
    fn lon_lat_swaps_axes() {
        assert_eq!(GeoPoint::new(1.0, 2.0).lon_lat(), [2.0, 1.0]);
    }
}
