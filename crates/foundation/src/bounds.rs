use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Latitude/longitude rectangle, used to fit the viewport to a route.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: GeoPoint,
    pub north_east: GeoPoint,
}

impl GeoBounds {
    pub fn new(south_west: GeoPoint, north_east: GeoPoint) -> Self {
        GeoBounds {
            south_west,
            north_east,
        }
    }

    /// Smallest rectangle containing both points, in either order.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        GeoBounds {
            south_west: GeoPoint::new(a.lat.min(b.lat), a.lon.min(b.lon)),
            north_east: GeoPoint::new(a.lat.max(b.lat), a.lon.max(b.lon)),
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            0.5 * (self.south_west.lat + self.north_east.lat),
            0.5 * (self.south_west.lon + self.north_east.lon),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::geo::GeoPoint;

    #[test]
    fn corners_are_ordered() {
        let b = GeoBounds::from_corners(GeoPoint::new(10.0, -5.0), GeoPoint::new(-2.0, 7.0));
        assert_eq!(b.south_west, GeoPoint::new(-2.0, -5.0));
        assert_eq!(b.north_east, GeoPoint::new(10.0, 7.0));
        assert!(b.contains(GeoPoint::new(0.0, 0.0)));
        assert!(!b.contains(GeoPoint::new(11.0, 0.0)));
        assert_eq!(b.center(), GeoPoint::new(4.0, 1.0));
    }
}
