//! Offline helpers behind the `routes` binary.

use std::fs;
use std::path::Path;

use results::row::{ResultRow, rows_from_json};
use routes::{AddRouteSummary, HighlightOutcome, MemorySurface, NoSelection, RouteMap, RouteMapConfig};
use runtime::metrics::MetricsSnapshot;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Draw every route instead of leaving them behind their origin markers.
    pub draw_all: bool,
    /// Result index to highlight, as if picked in the result list.
    pub highlight: Option<usize>,
    pub config: RouteMapConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rendered {
    pub summary: AddRouteSummary,
    pub routes: usize,
    pub metrics: MetricsSnapshot,
    pub geojson: Value,
}

/// Runs `rows` through the map pipeline on an in-memory surface.
pub fn render_rows(rows: Vec<ResultRow>, options: &RenderOptions) -> Rendered {
    let mut map = RouteMap::with_config(
        MemorySurface::new(),
        Box::new(NoSelection),
        options.config.clone(),
    );
    let summary = map.show_results(rows);
    if options.draw_all {
        map.draw_all_routes();
    }
    if let Some(index) = options.highlight {
        if map.select_result(index) == HighlightOutcome::Ignored {
            tracing::warn!(index, "nothing to highlight for that result");
        }
    }
    Rendered {
        summary,
        routes: map.route_count(),
        metrics: map.metrics().snapshot(),
        geojson: map.surface().to_geojson(),
    }
}

/// Reads a rows file. Bindings that do not fit the row shape are skipped
/// with a warning.
pub fn load_rows(path: &Path) -> Result<Vec<ResultRow>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    let decoded = rows_from_json(&text).map_err(|e| format!("{path:?}: {e}"))?;
    if !decoded.rejected.is_empty() {
        tracing::warn!(
            path = %path.display(),
            positions = ?decoded.rejected,
            "skipped unreadable bindings"
        );
    }
    Ok(decoded.rows)
}

pub fn load_config(path: &Path) -> Result<RouteMapConfig, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    RouteMapConfig::from_json(&text).map_err(|e| format!("{path:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::{RenderOptions, load_rows, render_rows};
    use pretty_assertions::assert_eq;
    use results::row::ResultRow;

    fn rows() -> Vec<ResultRow> {
        vec![
            ResultRow::default()
                .with_item("http://www.wikidata.org/entity/Q1")
                .with_origin("Delft", "Point(4.35 52.01)")
                .with_destination("Rijksmuseum", "Point(4.88 52.36)"),
            ResultRow::default()
                .with_item("http://www.wikidata.org/entity/Q1")
                .with_origin("Delft", "Point(4.35 52.01)")
                .with_destination("Rijksmuseum", "Point(4.88 52.36)"),
            ResultRow::default()
                .with_item("http://www.wikidata.org/entity/Q2")
                .with_origin("Delft", "Point(4.35 52.01)")
                .with_destination("Mauritshuis", "Point(4.31 52.08)"),
        ]
    }

    fn kinds(geojson: &serde_json::Value) -> Vec<String> {
        geojson["features"]
            .as_array()
            .map(|fs| {
                fs.iter()
                    .map(|f| f["properties"]["kind"].as_str().unwrap_or("").to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[test]
    fn markers_only_by_default() {
        let out = render_rows(rows(), &RenderOptions::default());
        assert_eq!(out.summary.rows, 2);
        assert_eq!(out.summary.origins, 1);
        assert_eq!(out.routes, 0);
        assert_eq!(kinds(&out.geojson), vec!["marker"]);
        assert!(out.metrics.counters.contains(&("markers.created", 1)));
    }

    #[test]
    fn draw_all_adds_routes() {
        let options = RenderOptions {
            draw_all: true,
            ..RenderOptions::default()
        };
        let out = render_rows(rows(), &options);
        assert_eq!(out.routes, 2);
        let kinds = kinds(&out.geojson);
        assert_eq!(kinds.iter().filter(|k| *k == "route").count(), 2);
        assert_eq!(kinds.iter().filter(|k| *k == "marker").count(), 3);
    }

    #[test]
    fn highlight_draws_the_picked_route() {
        let options = RenderOptions {
            highlight: Some(1),
            ..RenderOptions::default()
        };
        let out = render_rows(rows(), &options);
        assert_eq!(out.routes, 1);
        let route = out.geojson["features"]
            .as_array()
            .and_then(|fs| fs.iter().find(|f| f["properties"]["kind"] == "route"))
            .cloned()
            .expect("route feature");
        assert_eq!(route["properties"]["color"], "#ffff00");
    }

    #[test]
    fn load_rows_keeps_the_readable_bindings() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rows.json");
        let text = r#"[
            {"item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q1"}},
            {"item": {"type": "uri"}},
            {"item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q3"}}
        ]"#;
        std::fs::write(&path, text).expect("write");
        let rows = load_rows(&path).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].item_uri(), "http://www.wikidata.org/entity/Q3");

        std::fs::write(&path, "{\"head\": {}}").expect("write");
        assert!(load_rows(&path).is_err());
    }
}
