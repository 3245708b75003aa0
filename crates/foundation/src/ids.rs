use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Identity of an origin marker, `"<lat>,<lon>"`.
///
/// Built from exact coordinates: no snapping or tolerance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginKey(String);

impl OriginKey {
    pub fn of(point: GeoPoint) -> Self {
        OriginKey(coordinate_text(point))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a route, `"<lat>,<lon>→<lat>,<lon>"`.
///
/// Every result row with the same origin and destination coordinates maps to
/// the same key, whichever row produced it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn between(start: GeoPoint, end: GeoPoint) -> Self {
        RouteKey(format!(
            "{}→{}",
            coordinate_text(start),
            coordinate_text(end)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn coordinate_text(p: GeoPoint) -> String {
    // Normalize -0 so the text agrees with numeric equality.
    let lat = if p.lat == 0.0 { 0.0 } else { p.lat };
    let lon = if p.lon == 0.0 { 0.0 } else { p.lon };
    format!("{lat},{lon}")
}

#[cfg(test)]
mod tests {
    use super::{OriginKey, RouteKey};
    use crate::geo::GeoPoint;

    #[test]
    fn origin_key_text() {
        assert_eq!(OriginKey::of(GeoPoint::new(48.5, -2.25)).as_str(), "48.5,-2.25");
        assert_eq!(OriginKey::of(GeoPoint::new(0.0, 1.0)).as_str(), "0,1");
    }

    #[test]
    fn route_key_text() {
        let key = RouteKey::between(GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.5));
        assert_eq!(key.to_string(), "0,0→1,1.5");
    }

    #[test]
    fn equal_coordinates_give_equal_keys() {
        let a = RouteKey::between(GeoPoint::new(-0.0, 10.0), GeoPoint::new(5.0, 6.0));
        let b = RouteKey::between(GeoPoint::new(0.0, 10.0), GeoPoint::new(5.0, 6.0));
        assert_eq!(a, b);
    }

    #[test]
    fn precision_differences_give_distinct_keys() {
        let a = OriginKey::of(GeoPoint::new(1.0, 2.0));
        let b = OriginKey::of(GeoPoint::new(1.000_000_000_001, 2.0));
        assert_ne!(a, b);
    }

    #[test]
    fn direction_matters() {
        let p = GeoPoint::new(1.0, 2.0);
        let q = GeoPoint::new(3.0, 4.0);
        assert_ne!(RouteKey::between(p, q), RouteKey::between(q, p));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = OriginKey::of(GeoPoint::new(1.0, 2.0));
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"1,2\"");
    }
}
