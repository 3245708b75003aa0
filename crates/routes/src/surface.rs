use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use foundation::ids::RouteKey;
use serde::{Deserialize, Serialize};

/// Handle to one primitive drawn on a [`MapSurface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimitiveId(pub u32);

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStyle {
    pub color: [f32; 4],
    /// Stroke width in screen pixels.
    pub weight: f32,
}

impl RouteStyle {
    pub const fn new(color: [f32; 4], weight: f32) -> Self {
        Self { color, weight }
    }

    /// CSS color string for web map libraries.
    pub fn css_color(&self) -> String {
        css_color(self.color)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrowStyle {
    pub color: [f32; 4],
    pub weight: f32,
    pub pixel_size: f32,
}

pub fn css_color(color: [f32; 4]) -> String {
    let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let [r, g, b, a] = color;
    if a >= 1.0 {
        format!("#{:02x}{:02x}{:02x}", c(r), c(g), c(b))
    } else {
        format!("rgba({}, {}, {}, {})", c(r), c(g), c(b), a.clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupEntry {
    pub index: usize,
    pub label: String,
}

/// Popup listing the results that travel along one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePopup {
    pub route: RouteKey,
    pub at: GeoPoint,
    pub start_label: String,
    pub end_label: String,
    /// Number of results on the route, including the ones not listed.
    pub total: usize,
    pub entries: Vec<PopupEntry>,
    pub hidden: usize,
}

/// The map the registry draws on.
///
/// Implementations hand out ids; the registry owns the meaning of every id it
/// receives and is the only caller that removes them.
pub trait MapSurface {
    fn add_marker(&mut self, at: GeoPoint, label: &str) -> PrimitiveId;
    fn add_line(&mut self, from: GeoPoint, to: GeoPoint, style: RouteStyle) -> PrimitiveId;
    /// Arrowhead decoration at the end of `line`.
    fn add_arrow_head(&mut self, line: PrimitiveId, style: ArrowStyle) -> PrimitiveId;
    fn restyle_line(&mut self, line: PrimitiveId, style: RouteStyle);
    fn restyle_arrow_head(&mut self, arrow: PrimitiveId, style: ArrowStyle);
    fn remove(&mut self, id: PrimitiveId);
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn open_popup(&mut self, popup: &RoutePopup);
    fn close_popup(&mut self);
}
