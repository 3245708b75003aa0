use std::collections::{BTreeMap, BTreeSet, HashMap};

use foundation::geo::GeoPoint;
use foundation::ids::{OriginKey, RouteKey};
use foundation::time::Time;
use results::group::Destination;
use results::row::IndexedRow;
use runtime::metrics::Metrics;
use runtime::timers::TimerQueue;
use tracing::debug;

use crate::config::RouteMapConfig;
use crate::highlight::ResultSelection;
use crate::render::{RouteRenderer, RouteVisual};
use crate::surface::{MapSurface, PrimitiveId};

pub const ROUTES_DRAWN: &str = "routes.drawn";
pub const ROUTES_REPLACED: &str = "routes.replaced";
pub const ROUTES_REMOVED: &str = "routes.removed";
pub const ROUTES_REMOVE_UNKNOWN: &str = "routes.remove_unknown";
pub const MARKERS_CREATED: &str = "markers.created";
pub const MARKERS_MERGED: &str = "markers.merged";
pub const ROWS_SKIPPED: &str = "rows.skipped";
pub const HIGHLIGHTS_REVERTED: &str = "highlights.reverted";
pub const ROUTES_LIVE: &str = "routes.live";
pub const MARKERS_LIVE: &str = "markers.live";

/// One marker per distinct origin coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginMarkerEntry {
    pub marker: PrimitiveId,
    pub origin: GeoPoint,
    pub label: String,
    /// No two entries share a coordinate.
    pub destinations: Vec<Destination>,
}

/// What a click on a registered primitive means.
///
/// Targets hold keys, not copies of the data: a click always sees the current
/// destination list of its origin, however often it was merged into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    OriginMarker(OriginKey),
    Route(RouteKey),
}

/// The route/marker registry: sole owner of map state.
///
/// Holds the surface it draws on, the rows of the current result set, which
/// result rows travel along which route, and the pending highlight reverts.
pub struct RouteMap<S: MapSurface> {
    pub(crate) surface: S,
    pub(crate) renderer: RouteRenderer,
    pub(crate) config: RouteMapConfig,
    pub(crate) selection: Box<dyn ResultSelection>,
    pub(crate) routes: BTreeMap<RouteKey, RouteVisual>,
    pub(crate) origin_markers: BTreeMap<OriginKey, OriginMarkerEntry>,
    pub(crate) route_results: BTreeMap<RouteKey, BTreeSet<usize>>,
    pub(crate) click_targets: HashMap<PrimitiveId, ClickTarget>,
    pub(crate) rows: Vec<IndexedRow>,
    pub(crate) timers: TimerQueue<RouteKey>,
    pub(crate) now: Time,
    pub(crate) metrics: Metrics,
}

impl<S: MapSurface> RouteMap<S> {
    pub fn new(surface: S, selection: Box<dyn ResultSelection>) -> Self {
        Self::with_config(surface, selection, RouteMapConfig::default())
    }

    pub fn with_config(
        surface: S,
        selection: Box<dyn ResultSelection>,
        config: RouteMapConfig,
    ) -> Self {
        Self {
            surface,
            renderer: RouteRenderer::new(config.styles.clone()),
            config,
            selection,
            routes: BTreeMap::new(),
            origin_markers: BTreeMap::new(),
            route_results: BTreeMap::new(),
            click_targets: HashMap::new(),
            rows: Vec::new(),
            timers: TimerQueue::new(),
            now: Time::ZERO,
            metrics: Metrics::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &RouteMapConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn now(&self) -> Time {
        self.now
    }

    /// Rows of the current result set, indexed by `fixed_index`.
    pub fn rows(&self) -> &[IndexedRow] {
        &self.rows
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn has_route(&self, key: &RouteKey) -> bool {
        self.routes.contains_key(key)
    }

    pub fn visual(&self, key: &RouteKey) -> Option<&RouteVisual> {
        self.routes.get(key)
    }

    pub fn route_keys(&self) -> impl Iterator<Item = &RouteKey> + '_ {
        self.routes.keys()
    }

    pub fn origin_marker_count(&self) -> usize {
        self.origin_markers.len()
    }

    pub fn origin_marker(&self, key: &OriginKey) -> Option<&OriginMarkerEntry> {
        self.origin_markers.get(key)
    }

    pub fn origin_keys(&self) -> impl Iterator<Item = &OriginKey> + '_ {
        self.origin_markers.keys()
    }

    /// Result indices sharing `key`, ascending. Empty for unknown routes.
    pub fn results_for_route(&self, key: &RouteKey) -> Vec<usize> {
        self.route_results
            .get(key)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn route_result_index(&self) -> &BTreeMap<RouteKey, BTreeSet<usize>> {
        &self.route_results
    }

    pub fn click_target(&self, id: PrimitiveId) -> Option<&ClickTarget> {
        self.click_targets.get(&id)
    }

    pub fn pending_highlight_reverts(&self) -> usize {
        self.timers.len()
    }

    /// Creates the marker for `origin`, or merges `destinations` into the
    /// existing one. Returns the marker handle; `None` for an empty list.
    pub fn upsert_origin_marker(
        &mut self,
        origin: GeoPoint,
        label: &str,
        destinations: Vec<Destination>,
    ) -> Option<PrimitiveId> {
        if destinations.is_empty() {
            return None;
        }
        let key = OriginKey::of(origin);

        if let Some(entry) = self.origin_markers.get_mut(&key) {
            let added = merge_destinations(&mut entry.destinations, destinations);
            self.metrics.inc_counter(MARKERS_MERGED, 1);
            debug!(
                origin = %key,
                added,
                total = entry.destinations.len(),
                "merged destinations into existing origin marker"
            );
            return Some(entry.marker);
        }

        let marker = self.surface.add_marker(origin, label);
        let mut merged = Vec::with_capacity(destinations.len());
        merge_destinations(&mut merged, destinations);
        self.click_targets
            .insert(marker, ClickTarget::OriginMarker(key.clone()));
        self.origin_markers.insert(
            key,
            OriginMarkerEntry {
                marker,
                origin,
                label: label.to_string(),
                destinations: merged,
            },
        );
        self.metrics.inc_counter(MARKERS_CREATED, 1);
        self.update_gauges();
        Some(marker)
    }

    /// Create-or-replace: an existing visual for the same route is torn down
    /// before the new one is registered, so each key has at most one.
    pub fn draw_route(
        &mut self,
        start: GeoPoint,
        end: GeoPoint,
        start_label: &str,
        end_label: &str,
        highlight: bool,
    ) -> RouteKey {
        let key = RouteKey::between(start, end);
        if let Some(old) = self.routes.remove(&key) {
            self.teardown_visual(old);
            self.metrics.inc_counter(ROUTES_REPLACED, 1);
        }

        let visual = self
            .renderer
            .build(&mut self.surface, start, end, start_label, end_label);
        for id in [visual.line, visual.arrow] {
            self.click_targets.insert(id, ClickTarget::Route(key.clone()));
        }
        self.routes.insert(key.clone(), visual);
        self.metrics.inc_counter(ROUTES_DRAWN, 1);
        self.update_gauges();

        if highlight {
            self.emphasize(&key, self.config.fresh_highlight_s);
        }
        key
    }

    /// Removes every primitive of the route. Unknown keys are a logged no-op.
    pub fn remove_route(&mut self, key: &RouteKey) -> bool {
        let Some(visual) = self.routes.remove(key) else {
            debug!(route = %key, "route not drawn, nothing to remove");
            self.metrics.inc_counter(ROUTES_REMOVE_UNKNOWN, 1);
            return false;
        };
        self.teardown_visual(visual);
        self.metrics.inc_counter(ROUTES_REMOVED, 1);
        self.update_gauges();
        true
    }

    pub fn clear_routes(&mut self) {
        let routes = std::mem::take(&mut self.routes);
        for (_, visual) in routes {
            self.teardown_visual(visual);
        }
        self.update_gauges();
    }

    pub fn clear_origin_markers(&mut self) {
        let markers = std::mem::take(&mut self.origin_markers);
        for (_, entry) in markers {
            self.surface.remove(entry.marker);
            self.click_targets.remove(&entry.marker);
        }
        self.update_gauges();
    }

    /// Full reset: visuals, route → result mapping, cached rows and timers.
    pub fn clear_all(&mut self) {
        self.clear_routes();
        self.clear_origin_markers();
        self.route_results.clear();
        self.rows.clear();
        self.timers.clear();
        self.click_targets.clear();
        self.surface.close_popup();
    }

    /// Rebuilds the route → result mapping for `rows` from scratch.
    pub fn connect_route_to_result(&mut self, rows: &[IndexedRow]) {
        self.route_results = route_result_index(rows);
    }

    pub fn add_result_to_route_mapping(
        &mut self,
        origin: GeoPoint,
        destination: GeoPoint,
        result_index: usize,
    ) {
        self.route_results
            .entry(RouteKey::between(origin, destination))
            .or_default()
            .insert(result_index);
    }

    /// Advances the clock and reverts every highlight whose delay ran out.
    ///
    /// Returns the number of routes restored to their resting style.
    pub fn tick(&mut self, now: Time) -> usize {
        self.now = now;
        let mut reverted = 0;
        for (id, key) in self.timers.due(now) {
            let Some(visual) = self.routes.get_mut(&key) else {
                debug!(route = %key, "highlight revert for a route that is gone");
                continue;
            };
            if visual.revert != Some(id) {
                continue;
            }
            visual.revert = None;
            self.renderer.restore(&mut self.surface, visual);
            reverted += 1;
        }
        if reverted > 0 {
            self.metrics.inc_counter(HIGHLIGHTS_REVERTED, reverted as u64);
        }
        reverted
    }

    /// Emphasis + viewport fit now, revert after `delay_s`. Restarts the delay
    /// if the route is already emphasized.
    pub(crate) fn emphasize(&mut self, key: &RouteKey, delay_s: f64) -> bool {
        let Some(visual) = self.routes.get_mut(key) else {
            return false;
        };
        if let Some(pending) = visual.revert.take() {
            self.timers.cancel(pending);
        }
        self.renderer.emphasize(&mut self.surface, visual);
        visual.revert = Some(self.timers.schedule(self.now, delay_s, key.clone()));
        true
    }

    fn teardown_visual(&mut self, visual: RouteVisual) {
        if let Some(pending) = visual.revert {
            self.timers.cancel(pending);
        }
        for id in visual.primitives() {
            self.click_targets.remove(&id);
        }
        self.renderer.teardown(&mut self.surface, &visual);
    }

    fn update_gauges(&mut self) {
        self.metrics.set_gauge(ROUTES_LIVE, self.routes.len() as i64);
        self.metrics
            .set_gauge(MARKERS_LIVE, self.origin_markers.len() as i64);
    }
}

/// Appends the destinations whose coordinate is not already present.
/// Returns how many were added.
pub fn merge_destinations(
    existing: &mut Vec<Destination>,
    incoming: impl IntoIterator<Item = Destination>,
) -> usize {
    let mut added = 0;
    for dest in incoming {
        if existing.iter().any(|d| d.point == dest.point) {
            continue;
        }
        existing.push(dest);
        added += 1;
    }
    added
}

/// Route → result indices for a result set. Rows without usable coordinates
/// have no route and are left out.
pub fn route_result_index(rows: &[IndexedRow]) -> BTreeMap<RouteKey, BTreeSet<usize>> {
    let mut out: BTreeMap<RouteKey, BTreeSet<usize>> = BTreeMap::new();
    for indexed in rows {
        if let Some(key) = indexed.row.route_key() {
            out.entry(key).or_default().insert(indexed.fixed_index);
        }
    }
    out
}
