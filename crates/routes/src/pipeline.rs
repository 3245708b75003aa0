use foundation::geo::GeoPoint;
use foundation::ids::OriginKey;
use results::group::group_by_origin;
use results::prepare_rows;
use results::row::ResultRow;
use serde::Serialize;
use tracing::{info, warn};

use crate::registry::{ClickTarget, ROWS_SKIPPED, RouteMap};
use crate::surface::{MapSurface, PrimitiveId, RoutePopup};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddRouteSummary {
    /// Rows handed in, before deduplication.
    pub received: usize,
    /// Rows kept and indexed.
    pub rows: usize,
    pub origins: usize,
    /// Rows without a usable origin or destination coordinate.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Every destination of the origin is now drawn.
    OriginExpanded { origin: OriginKey, routes: usize },
    RouteSelected(RoutePopup),
    Ignored,
}

impl<S: MapSurface> RouteMap<S> {
    /// Loads a result set: replaces the origin markers and the route → result
    /// mapping. Routes already drawn stay. An empty set changes nothing.
    pub fn add_route(&mut self, rows: Vec<ResultRow>) -> AddRouteSummary {
        if rows.is_empty() {
            warn!("no result rows to map");
            return AddRouteSummary::default();
        }
        let received = rows.len();

        self.clear_origin_markers();
        let rows = prepare_rows(rows);
        let grouping = group_by_origin(&rows);
        self.connect_route_to_result(&rows);
        self.rows = rows;

        let origins = grouping.groups.len();
        for group in grouping.groups {
            self.upsert_origin_marker(group.origin, &group.origin_label, group.destinations);
        }
        if !grouping.skipped.is_empty() {
            self.metrics
                .inc_counter(ROWS_SKIPPED, grouping.skipped.len() as u64);
        }

        let summary = AddRouteSummary {
            received,
            rows: self.rows.len(),
            origins,
            skipped: grouping.skipped.len(),
        };
        info!(
            received = summary.received,
            rows = summary.rows,
            origins = summary.origins,
            skipped = summary.skipped,
            "mapped result set"
        );
        summary
    }

    /// Replaces whatever is on the map with `rows`.
    pub fn show_results(&mut self, rows: Vec<ResultRow>) -> AddRouteSummary {
        self.clear_map();
        self.add_route(rows)
    }

    pub fn clear_map(&mut self) {
        self.clear_all();
        info!("map cleared");
    }

    /// Drops drawn routes only. Markers, rows and the mapping stay.
    pub fn clear_all_routes_only(&mut self) {
        self.clear_routes();
    }

    /// Draws a route to every destination of the origin. Returns how many.
    pub fn expand_origin(&mut self, key: &OriginKey) -> usize {
        let Some(entry) = self.origin_markers.get(key) else {
            return 0;
        };
        let origin = entry.origin;
        let label = entry.label.clone();
        let destinations = entry.destinations.clone();
        for dest in &destinations {
            self.draw_route(origin, dest.point, &label, &dest.label, false);
        }
        destinations.len()
    }

    pub fn draw_all_routes(&mut self) -> usize {
        let keys: Vec<OriginKey> = self.origin_markers.keys().cloned().collect();
        keys.iter().map(|key| self.expand_origin(key)).sum()
    }

    /// Dispatches a click on a map primitive. `at` is where the click landed.
    pub fn handle_click(&mut self, id: PrimitiveId, at: GeoPoint) -> ClickOutcome {
        match self.click_target(id).cloned() {
            Some(ClickTarget::OriginMarker(origin)) => {
                let routes = self.expand_origin(&origin);
                ClickOutcome::OriginExpanded { origin, routes }
            }
            Some(ClickTarget::Route(key)) => match self.select_route(&key, at) {
                Some(popup) => ClickOutcome::RouteSelected(popup),
                None => ClickOutcome::Ignored,
            },
            None => ClickOutcome::Ignored,
        }
    }
}
