use std::collections::BTreeMap;

use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use serde_json::{Value, json};
use tracing::debug;

use crate::surface::{ArrowStyle, MapSurface, PrimitiveId, RoutePopup, RouteStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Marker {
        at: GeoPoint,
        label: String,
    },
    Line {
        from: GeoPoint,
        to: GeoPoint,
        style: RouteStyle,
    },
    ArrowHead {
        line: PrimitiveId,
        style: ArrowStyle,
    },
}

/// Headless [`MapSurface`] that keeps every live primitive in memory.
///
/// Backs the CLI's GeoJSON export and the tests; it also records the last
/// viewport fit and the open popup so highlight behavior can be observed.
#[derive(Debug, Default)]
pub struct MemorySurface {
    next_id: u32,
    primitives: BTreeMap<PrimitiveId, Primitive>,
    viewport: Option<GeoBounds>,
    popup: Option<RoutePopup>,
    fit_count: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    pub fn primitives(&self) -> impl Iterator<Item = (PrimitiveId, &Primitive)> + '_ {
        self.primitives.iter().map(|(id, p)| (*id, p))
    }

    pub fn markers(&self) -> Vec<(PrimitiveId, GeoPoint, &str)> {
        self.primitives
            .iter()
            .filter_map(|(id, p)| match p {
                Primitive::Marker { at, label } => Some((*id, *at, label.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(PrimitiveId, GeoPoint, GeoPoint, RouteStyle)> {
        self.primitives
            .iter()
            .filter_map(|(id, p)| match p {
                Primitive::Line { from, to, style } => Some((*id, *from, *to, *style)),
                _ => None,
            })
            .collect()
    }

    pub fn arrow_heads(&self) -> Vec<(PrimitiveId, PrimitiveId, ArrowStyle)> {
        self.primitives
            .iter()
            .filter_map(|(id, p)| match p {
                Primitive::ArrowHead { line, style } => Some((*id, *line, *style)),
                _ => None,
            })
            .collect()
    }

    /// First marker placed exactly at `at`.
    pub fn marker_at(&self, at: GeoPoint) -> Option<PrimitiveId> {
        self.markers()
            .into_iter()
            .find(|(_, p, _)| *p == at)
            .map(|(id, _, _)| id)
    }

    pub fn line_between(&self, from: GeoPoint, to: GeoPoint) -> Option<PrimitiveId> {
        self.lines()
            .into_iter()
            .find(|(_, f, t, _)| *f == from && *t == to)
            .map(|(id, _, _, _)| id)
    }

    pub fn line_style(&self, id: PrimitiveId) -> Option<RouteStyle> {
        match self.primitives.get(&id) {
            Some(Primitive::Line { style, .. }) => Some(*style),
            _ => None,
        }
    }

    pub fn viewport(&self) -> Option<GeoBounds> {
        self.viewport
    }

    pub fn fit_count(&self) -> usize {
        self.fit_count
    }

    pub fn popup(&self) -> Option<&RoutePopup> {
        self.popup.as_ref()
    }

    /// Markers and route lines as a GeoJSON `FeatureCollection`.
    ///
    /// Arrowheads are folded into their line as an `arrow` property.
    pub fn to_geojson(&self) -> Value {
        let mut features = Vec::new();
        for (id, primitive) in &self.primitives {
            match primitive {
                Primitive::Marker { at, label } => features.push(json!({
                    "type": "Feature",
                    "id": id.0,
                    "geometry": { "type": "Point", "coordinates": at.lon_lat() },
                    "properties": { "kind": "marker", "label": label },
                })),
                Primitive::Line { from, to, style } => {
                    let arrow = self
                        .primitives
                        .values()
                        .any(|p| matches!(p, Primitive::ArrowHead { line, .. } if line == id));
                    features.push(json!({
                        "type": "Feature",
                        "id": id.0,
                        "geometry": {
                            "type": "LineString",
                            "coordinates": [from.lon_lat(), to.lon_lat()],
                        },
                        "properties": {
                            "kind": "route",
                            "color": style.css_color(),
                            "weight": style.weight,
                            "arrow": arrow,
                        },
                    }));
                }
                Primitive::ArrowHead { .. } => {}
            }
        }
        json!({ "type": "FeatureCollection", "features": features })
    }

    fn insert(&mut self, primitive: Primitive) -> PrimitiveId {
        let id = PrimitiveId(self.next_id);
        self.next_id += 1;
        self.primitives.insert(id, primitive);
        id
    }
}

impl MapSurface for MemorySurface {
    fn add_marker(&mut self, at: GeoPoint, label: &str) -> PrimitiveId {
        self.insert(Primitive::Marker {
            at,
            label: label.to_string(),
        })
    }

    fn add_line(&mut self, from: GeoPoint, to: GeoPoint, style: RouteStyle) -> PrimitiveId {
        self.insert(Primitive::Line { from, to, style })
    }

    fn add_arrow_head(&mut self, line: PrimitiveId, style: ArrowStyle) -> PrimitiveId {
        self.insert(Primitive::ArrowHead { line, style })
    }

    fn restyle_line(&mut self, line: PrimitiveId, new_style: RouteStyle) {
        match self.primitives.get_mut(&line) {
            Some(Primitive::Line { style, .. }) => *style = new_style,
            _ => debug!(id = line.0, "restyle of unknown line"),
        }
    }

    fn restyle_arrow_head(&mut self, arrow: PrimitiveId, new_style: ArrowStyle) {
        match self.primitives.get_mut(&arrow) {
            Some(Primitive::ArrowHead { style, .. }) => *style = new_style,
            _ => debug!(id = arrow.0, "restyle of unknown arrowhead"),
        }
    }

    fn remove(&mut self, id: PrimitiveId) {
        if self.primitives.remove(&id).is_none() {
            debug!(id = id.0, "remove of unknown primitive");
        }
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.viewport = Some(bounds);
        self.fit_count += 1;
    }

    fn open_popup(&mut self, popup: &RoutePopup) {
        self.popup = Some(popup.clone());
    }

    fn close_popup(&mut self) {
        self.popup = None;
    }
}

#[cfg(test)]
mod tests {
    use super::MemorySurface;
    use crate::config::RouteStyles;
    use crate::surface::MapSurface;
    use foundation::geo::GeoPoint;

    #[test]
    fn tracks_live_primitives() {
        let styles = RouteStyles::default();
        let mut s = MemorySurface::new();
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        let marker = s.add_marker(b, "Louvre");
        let line = s.add_line(a, b, styles.line);
        let arrow = s.add_arrow_head(line, styles.arrow_for(styles.line));
        assert_eq!(s.len(), 3);
        assert_eq!(s.marker_at(b), Some(marker));
        assert_eq!(s.line_between(a, b), Some(line));
        assert_eq!(s.line_between(b, a), None);

        s.remove(arrow);
        s.remove(arrow);
        assert_eq!(s.len(), 2);
        assert!(s.arrow_heads().is_empty());
    }

    #[test]
    fn geojson_export() {
        let styles = RouteStyles::default();
        let mut s = MemorySurface::new();
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(-5.0, 3.5);
        s.add_marker(a, "Italy");
        let line = s.add_line(a, b, styles.line);
        s.add_arrow_head(line, styles.arrow_for(styles.line));

        let fc = s.to_geojson();
        let features = fc["features"].as_array().expect("features");
        assert_eq!(features.len(), 2);
        assert_eq!(features[0]["geometry"]["coordinates"][0], 20.0);
        assert_eq!(features[0]["properties"]["label"], "Italy");
        assert_eq!(features[1]["geometry"]["type"], "LineString");
        assert_eq!(features[1]["properties"]["color"], "#ff0000");
        assert_eq!(features[1]["properties"]["arrow"], true);
    }
}
