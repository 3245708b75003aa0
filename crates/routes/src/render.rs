use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use foundation::ids::RouteKey;
use runtime::timers::TimerId;

use crate::config::RouteStyles;
use crate::surface::{MapSurface, PrimitiveId};

/// Everything drawn for one route, removed as a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteVisual {
    pub key: RouteKey,
    pub start: GeoPoint,
    pub end: GeoPoint,
    pub start_label: String,
    pub end_label: String,
    pub destination_marker: PrimitiveId,
    pub line: PrimitiveId,
    pub arrow: PrimitiveId,
    /// Pending revert of a transient highlight. Cancelled on teardown.
    pub revert: Option<TimerId>,
    pub emphasized: bool,
}

impl RouteVisual {
    pub fn primitives(&self) -> [PrimitiveId; 3] {
        [self.destination_marker, self.line, self.arrow]
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_corners(self.start, self.end)
    }
}

/// Draws, restyles and removes route primitives. Holds no map state.
#[derive(Debug, Clone, Default)]
pub struct RouteRenderer {
    styles: RouteStyles,
}

impl RouteRenderer {
    pub fn new(styles: RouteStyles) -> Self {
        Self { styles }
    }

    pub fn styles(&self) -> &RouteStyles {
        &self.styles
    }

    /// Destination marker, line and arrowhead in the resting style. The
    /// origin marker belongs to the origin entry, not to the route.
    pub fn build<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        start: GeoPoint,
        end: GeoPoint,
        start_label: &str,
        end_label: &str,
    ) -> RouteVisual {
        let destination_marker = surface.add_marker(end, end_label);
        let line = surface.add_line(start, end, self.styles.line);
        let arrow = surface.add_arrow_head(line, self.styles.arrow_for(self.styles.line));
        RouteVisual {
            key: RouteKey::between(start, end),
            start,
            end,
            start_label: start_label.to_string(),
            end_label: end_label.to_string(),
            destination_marker,
            line,
            arrow,
            revert: None,
            emphasized: false,
        }
    }

    pub fn teardown<S: MapSurface + ?Sized>(&self, surface: &mut S, visual: &RouteVisual) {
        for id in visual.primitives() {
            surface.remove(id);
        }
    }

    /// Emphasis style plus a viewport fit to the route.
    pub fn emphasize<S: MapSurface + ?Sized>(&self, surface: &mut S, visual: &mut RouteVisual) {
        let style = self.styles.emphasis;
        surface.restyle_line(visual.line, style);
        surface.restyle_arrow_head(visual.arrow, self.styles.arrow_for(style));
        surface.fit_bounds(visual.bounds());
        visual.emphasized = true;
    }

    pub fn restore<S: MapSurface + ?Sized>(&self, surface: &mut S, visual: &mut RouteVisual) {
        let style = self.styles.line;
        surface.restyle_line(visual.line, style);
        surface.restyle_arrow_head(visual.arrow, self.styles.arrow_for(style));
        visual.emphasized = false;
    }
}
