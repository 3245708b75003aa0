//! Geometry literals as returned by the Wikidata query service.
//!
//! A coordinate arrives as WKT text, `Point(<lon> <lat>)`, longitude first.
//! Extraction never fails loudly: anything that does not match yields `None`
//! and callers skip the row.

use std::sync::LazyLock;

use regex::Regex;

use crate::geo::GeoPoint;

static POINT_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Point\((-?\d+(?:\.\d+)?) (-?\d+(?:\.\d+)?)\)$")
        .expect("valid point literal pattern")
});

/// Parses `Point(<lon> <lat>)` into a [`GeoPoint`].
pub fn parse_point_literal(text: &str) -> Option<GeoPoint> {
    let caps = POINT_LITERAL.captures(text)?;
    let lon: f64 = caps.get(1)?.as_str().parse().ok()?;
    let lat: f64 = caps.get(2)?.as_str().parse().ok()?;
    Some(GeoPoint::new(lat, lon))
}

/// Writes `point` back in literal form. `parse_point_literal` reads it back
/// to the same numbers for every finite point.
pub fn format_point_literal(point: GeoPoint) -> String {
    format!("Point({} {})", plain(point.lon), plain(point.lat))
}

// `f64`'s `Display` never uses exponent notation, which keeps the output
// inside the literal grammar. `-0` is written as `0`.
fn plain(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

#[cfg(test)]
mod tests {
    use super::{format_point_literal, parse_point_literal};
    use crate::geo::GeoPoint;
    use proptest::prelude::*;

    #[test]
    fn parses_lon_then_lat() {
        let p = parse_point_literal("Point(2.3522 48.8566)").expect("point");
        assert_eq!(p, GeoPoint::new(48.8566, 2.3522));
    }

    #[test]
    fn parses_signed_and_integer_components() {
        assert_eq!(
            parse_point_literal("Point(-73.985 -40.5)"),
            Some(GeoPoint::new(-40.5, -73.985))
        );
        assert_eq!(
            parse_point_literal("Point(0 0)"),
            Some(GeoPoint::new(0.0, 0.0))
        );
    }

    #[test]
    fn rejects_non_matching_text() {
        for text in [
            "",
            "Point()",
            "Point(1.0)",
            "Point(1.0,2.0)",
            "point(1.0 2.0)",
            "Point(1.0 2.0) ",
            " Point(1.0 2.0)",
            "Point(+1.0 2.0)",
            "Point(1. 2.0)",
            "Point(1e3 2.0)",
            "<http://www.wikidata.org/entity/Q2> Point(1.0 2.0)",
        ] {
            assert_eq!(parse_point_literal(text), None, "{text:?}");
        }
    }

    #[test]
    fn round_trips_through_text() {
        let samples = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(-0.0, 12.5),
            GeoPoint::new(51.507222222, -0.1275),
            GeoPoint::new(-33.865143, 151.2099),
            GeoPoint::new(0.1 + 0.2, -179.999_999_9),
            GeoPoint::new(89.0, 180.0),
        ];
        for p in samples {
            let text = format_point_literal(p);
            let back = parse_point_literal(&text).expect("round trip");
            assert_eq!(back, p, "{text}");
            assert_eq!(format_point_literal(back), text);
        }
    }

    proptest! {
        #[test]
        fn formatted_points_parse_back(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let p = GeoPoint::new(lat, lon);
            let text = format_point_literal(p);
            prop_assert_eq!(parse_point_literal(&text), Some(p), "{}", text);
        }

        #[test]
        fn parsing_arbitrary_text_never_panics(text in any::<String>()) {
            let _ = parse_point_literal(&text);
        }

        #[test]
        fn parsing_point_shaped_text_never_panics(text in "Point\\([-0-9. e+]{0,24}\\)") {
            if let Some(p) = parse_point_literal(&text) {
                prop_assert!(p.lat.is_finite() && p.lon.is_finite());
            }
        }
    }
}
