use std::cell::RefCell;
use std::rc::Rc;

use foundation::geo::GeoPoint;
use foundation::ids::RouteKey;
use foundation::time::Time;
use tracing::debug;

use crate::registry::RouteMap;
use crate::surface::{MapSurface, PopupEntry, RoutePopup};

/// The result list next to the map.
pub trait ResultSelection {
    /// Marks exactly `indices` as selected; everything else is cleared.
    fn highlight(&mut self, indices: &[usize]);
    fn scroll_into_view(&mut self, index: usize);
}

impl<T: ResultSelection + ?Sized> ResultSelection for Rc<RefCell<T>> {
    fn highlight(&mut self, indices: &[usize]) {
        self.borrow_mut().highlight(indices);
    }

    fn scroll_into_view(&mut self, index: usize) {
        self.borrow_mut().scroll_into_view(index);
    }
}

/// For hosts without a result list.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSelection;

impl ResultSelection for NoSelection {
    fn highlight(&mut self, _indices: &[usize]) {}

    fn scroll_into_view(&mut self, _index: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// Index outside the current result set. Nothing changed.
    Ignored,
    /// The route was already drawn and got emphasized again.
    Refreshed,
    /// The route was drawn for this request.
    Drawn,
}

impl<S: MapSurface> RouteMap<S> {
    /// Emphasizes the route for result `index`, drawing it first if needed.
    ///
    /// The revert delay counts from the last [`RouteMap::tick`]; hosts that
    /// may have stopped ticking call [`RouteMap::select_result_at`] or tick
    /// first.
    pub fn highlight_route_on_map(
        &mut self,
        route_key: &RouteKey,
        origin: GeoPoint,
        destination: GeoPoint,
        index: usize,
        origin_label: &str,
        destination_label: &str,
    ) -> HighlightOutcome {
        if index >= self.rows.len() {
            debug!(index, rows = self.rows.len(), "highlight for unknown result index");
            return HighlightOutcome::Ignored;
        }

        let outcome = if self.routes.contains_key(route_key) {
            self.emphasize(route_key, self.config.existing_highlight_s);
            self.highlight_results_for_route(route_key);
            HighlightOutcome::Refreshed
        } else {
            self.draw_route(origin, destination, origin_label, destination_label, true);
            self.add_result_to_route_mapping(origin, destination, index);
            self.selection.highlight(&[index]);
            HighlightOutcome::Drawn
        };
        self.selection.scroll_into_view(index);
        outcome
    }

    /// Highlights the route of result `index`, as when its list entry is
    /// picked. Rows without usable coordinates are ignored.
    pub fn select_result(&mut self, index: usize) -> HighlightOutcome {
        let Some(indexed) = self.rows.get(index) else {
            return HighlightOutcome::Ignored;
        };
        let Some((origin, destination)) = indexed.row.endpoints() else {
            debug!(index, "result has no route to highlight");
            return HighlightOutcome::Ignored;
        };
        let origin_label = indexed.row.origin_label().to_string();
        let destination_label = indexed.row.destination_label().to_string();
        let key = RouteKey::between(origin, destination);
        self.highlight_route_on_map(
            &key,
            origin,
            destination,
            index,
            &origin_label,
            &destination_label,
        )
    }

    /// [`RouteMap::select_result`] with a fresh clock reading. Highlights
    /// that expired while the host was idle are reverted first.
    pub fn select_result_at(&mut self, now: Time, index: usize) -> HighlightOutcome {
        self.tick(now);
        self.select_result(index)
    }

    /// Deselects every entry of the result list. The map is left as is.
    pub fn clear_result_highlights(&mut self) {
        self.selection.highlight(&[]);
    }

    /// Selects every result travelling along `key` in the result list.
    pub fn highlight_results_for_route(&mut self, key: &RouteKey) -> Vec<usize> {
        let indices = self.results_for_route(key);
        self.selection.highlight(&indices);
        indices
    }

    /// Route click: selects its results, scrolls to the first one and opens
    /// the popup. `None` if the route is not drawn.
    pub fn select_route(&mut self, key: &RouteKey, at: GeoPoint) -> Option<RoutePopup> {
        let popup = self.route_popup(key, at)?;
        let indices = self.highlight_results_for_route(key);
        if let Some(&first) = indices.first() {
            self.selection.scroll_into_view(first);
        }
        self.surface.open_popup(&popup);
        Some(popup)
    }

    pub fn route_popup(&self, key: &RouteKey, at: GeoPoint) -> Option<RoutePopup> {
        let visual = self.routes.get(key)?;
        let indices = self.results_for_route(key);
        let entries: Vec<PopupEntry> = indices
            .iter()
            .take(self.config.popup_max_entries)
            .map(|&index| PopupEntry {
                index,
                label: self.result_label(index),
            })
            .collect();
        Some(RoutePopup {
            route: key.clone(),
            at,
            start_label: visual.start_label.clone(),
            end_label: visual.end_label.clone(),
            total: indices.len(),
            hidden: indices.len() - entries.len(),
            entries,
        })
    }

    /// The popup's delete button.
    pub fn delete_route_from_popup(&mut self, key: &RouteKey) -> bool {
        let removed = self.remove_route(key);
        self.surface.close_popup();
        removed
    }

    /// A popup entry was clicked.
    pub fn jump_to_result(&mut self, index: usize) -> bool {
        if index >= self.rows.len() {
            return false;
        }
        self.selection.highlight(&[index]);
        self.selection.scroll_into_view(index);
        true
    }

    fn result_label(&self, index: usize) -> String {
        self.rows
            .get(index)
            .and_then(|r| r.row.item_label())
            .filter(|label| !label.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Result {index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::HighlightOutcome;
    use crate::config::{RED, YELLOW};
    use crate::testing::{fixture, pt};
    use foundation::ids::RouteKey;
    use foundation::time::Time;
    use pretty_assertions::assert_eq;
    use results::row::ResultRow;

    fn row(item: &str, label: Option<&str>, dest: &str) -> ResultRow {
        let row = ResultRow::default()
            .with_item(item)
            .with_origin("X", "Point(0 0)")
            .with_destination("Y", dest);
        match label {
            Some(label) => row.with_label(label),
            None => row,
        }
    }

    #[test]
    fn out_of_range_index_changes_nothing() {
        let (mut map, log) = fixture();
        map.add_route(vec![row("A", None, "Point(1 1)")]);
        let before = map.surface().len();

        let key = RouteKey::between(pt(0.0, 0.0), pt(1.0, 1.0));
        let outcome = map.highlight_route_on_map(&key, pt(0.0, 0.0), pt(1.0, 1.0), 7, "X", "Y");
        assert_eq!(outcome, HighlightOutcome::Ignored);
        assert_eq!(map.surface().len(), before);
        assert_eq!(map.route_count(), 0);
        assert!(log.borrow().highlighted.is_empty());
    }

    #[test]
    fn fresh_highlight_draws_and_maps_the_result() {
        let (mut map, log) = fixture();
        map.add_route(vec![row("A", None, "Point(1 1)")]);
        map.clear_all_routes_only();

        assert_eq!(map.select_result(0), HighlightOutcome::Drawn);
        let key = RouteKey::between(pt(0.0, 0.0), pt(1.0, 1.0));
        assert!(map.visual(&key).expect("visual").emphasized);
        assert_eq!(map.results_for_route(&key), vec![0]);
        assert_eq!(log.borrow().highlighted, vec![vec![0]]);
        assert_eq!(log.borrow().scrolled, vec![0]);

        map.tick(Time(0.5));
        assert!(!map.visual(&key).expect("visual").emphasized);
    }

    #[test]
    fn existing_route_refreshes_with_longer_delay() {
        let (mut map, log) = fixture();
        map.add_route(vec![
            row("A", None, "Point(1 1)"),
            row("B", None, "Point(1 1)"),
        ]);
        map.draw_all_routes();
        let key = RouteKey::between(pt(0.0, 0.0), pt(1.0, 1.0));
        let line = map.visual(&key).expect("visual").line;

        assert_eq!(map.select_result(1), HighlightOutcome::Refreshed);
        assert_eq!(map.surface().line_style(line).map(|s| s.color), Some(YELLOW));
        assert_eq!(log.borrow().highlighted.last(), Some(&vec![0, 1]));
        assert_eq!(log.borrow().scrolled, vec![1]);

        assert_eq!(map.tick(Time(1.0)), 0);
        assert_eq!(map.tick(Time(2.0)), 1);
        assert_eq!(map.surface().line_style(line).map(|s| s.color), Some(RED));
    }

    #[test]
    fn highlight_after_idle_gap_counts_from_the_new_time() {
        let (mut map, _log) = fixture();
        map.add_route(vec![
            row("A", None, "Point(1 1)"),
            row("B", None, "Point(2 2)"),
        ]);
        map.clear_all_routes_only();
        let first = RouteKey::between(pt(0.0, 0.0), pt(1.0, 1.0));
        let second = RouteKey::between(pt(0.0, 0.0), pt(2.0, 2.0));

        assert_eq!(map.select_result(0), HighlightOutcome::Drawn);
        assert_eq!(map.select_result_at(Time(60.0), 1), HighlightOutcome::Drawn);
        assert_eq!(map.now(), Time(60.0));
        assert!(!map.visual(&first).expect("visual").emphasized);
        assert!(map.visual(&second).expect("visual").emphasized);

        assert_eq!(map.tick(Time(60.25)), 0);
        assert!(map.visual(&second).expect("visual").emphasized);
        assert_eq!(map.tick(Time(60.5)), 1);
        assert!(!map.visual(&second).expect("visual").emphasized);
    }

    #[test]
    fn clearing_result_highlights_leaves_the_map() {
        let (mut map, log) = fixture();
        map.add_route(vec![row("A", None, "Point(1 1)")]);
        map.select_result(0);
        let drawn = map.surface().len();

        map.clear_result_highlights();
        assert_eq!(log.borrow().highlighted.last(), Some(&Vec::new()));
        assert_eq!(map.surface().len(), drawn);
        assert_eq!(map.route_count(), 1);
    }

    #[test]
    fn route_click_selects_results_and_caps_popup() {
        let (mut map, log) = fixture();
        let rows: Vec<ResultRow> = (0..12)
            .map(|i| {
                let label = if i == 3 { None } else { Some(format!("Item {i}")) };
                row(&format!("Q{i}"), label.as_deref(), "Point(1 1)")
            })
            .collect();
        map.add_route(rows);
        map.draw_all_routes();

        let key = RouteKey::between(pt(0.0, 0.0), pt(1.0, 1.0));
        let popup = map.select_route(&key, pt(0.5, 0.5)).expect("popup");
        assert_eq!(popup.total, 12);
        assert_eq!(popup.entries.len(), 10);
        assert_eq!(popup.hidden, 2);
        assert_eq!(popup.entries[0].label, "Item 0");
        assert_eq!(popup.entries[3].label, "Result 3");
        assert_eq!(popup.start_label, "X");
        assert_eq!(popup.end_label, "Y");
        assert_eq!(map.surface().popup(), Some(&popup));

        let log = log.borrow();
        assert_eq!(log.highlighted.last().map(Vec::len), Some(12));
        assert_eq!(log.scrolled, vec![0]);
    }

    #[test]
    fn route_without_results_still_gets_a_popup() {
        let (mut map, log) = fixture();
        let key = map.draw_route(pt(0.0, 0.0), pt(1.0, 1.0), "X", "Y", false);
        let popup = map.select_route(&key, pt(0.0, 0.0)).expect("popup");
        assert_eq!(popup.total, 0);
        assert!(popup.entries.is_empty());
        assert!(log.borrow().scrolled.is_empty());
    }

    #[test]
    fn delete_from_popup_removes_route_and_closes() {
        let (mut map, _log) = fixture();
        let key = map.draw_route(pt(0.0, 0.0), pt(1.0, 1.0), "X", "Y", false);
        map.select_route(&key, pt(0.0, 0.0));

        assert!(map.delete_route_from_popup(&key));
        assert!(map.surface().popup().is_none());
        assert!(map.surface().is_empty());
        assert!(!map.delete_route_from_popup(&key));
    }

    #[test]
    fn jump_to_result_checks_range() {
        let (mut map, log) = fixture();
        map.add_route(vec![row("A", None, "Point(1 1)")]);
        assert!(map.jump_to_result(0));
        assert!(!map.jump_to_result(1));
        assert_eq!(log.borrow().scrolled, vec![0]);
    }
}
