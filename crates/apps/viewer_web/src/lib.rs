use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use foundation::geo::GeoPoint;
use foundation::ids::RouteKey;
use foundation::time::Time;
use query::{
    QueryError, SUGGESTION_DEBOUNCE_S, SearchForm, Suggestion, rows_from_bindings,
    suggestion_term,
};
use results::row::{DecodedRows, ResultRow, rows_from_json};
use routes::{ClickOutcome, HighlightOutcome, MapSurface, RouteMap};
use runtime::debounce::Debouncer;
use runtime::generation::{RequestGenerations, RequestToken};
use serde_json::json;

mod bridge;
mod list;

use bridge::{
    JsMapSurface, JsResultList, js_show_alert, js_show_notice, js_show_results_list,
    js_show_suggestions,
};
pub use list::{ResultListEntry, result_list};

struct ViewerState {
    map: RouteMap<JsMapSurface>,
    form: SearchForm,
    suggestions: Vec<Suggestion>,
    /// Raw search input, released after the debounce delay.
    typing: Debouncer<String>,
    queries: RequestGenerations,
    lookups: RequestGenerations,
}

impl ViewerState {
    fn new() -> Self {
        Self {
            map: RouteMap::new(JsMapSurface, Box::new(JsResultList)),
            form: SearchForm::new(),
            suggestions: Vec::new(),
            typing: Debouncer::new(SUGGESTION_DEBOUNCE_S),
            queries: RequestGenerations::new(),
            lookups: RequestGenerations::new(),
        }
    }
}

thread_local! {
    static STATE: RefCell<ViewerState> = RefCell::new(ViewerState::new());
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json(value: &impl serde::Serialize) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_err)
}

/// Text shown when a background request fails. The map is not touched.
fn failure_notice(what: &str, err: &str) -> String {
    format!("Could not load {what}: {err}")
}

fn notify_failure(what: &str, err: &str) {
    log(&format!("{what} failed: {err}"));
    js_show_notice(&failure_notice(what, err));
}

/// Keeps the rows that decoded; the skipped positions only go to the console.
fn readable_rows(decoded: DecodedRows) -> Vec<ResultRow> {
    if !decoded.rejected.is_empty() {
        log(&format!(
            "skipped {} unreadable bindings at {:?}",
            decoded.rejected.len(),
            decoded.rejected
        ));
    }
    decoded.rows
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Maps a result set on top of what is drawn. Returns the summary as JSON.
#[wasm_bindgen]
pub fn add_route(rows_json: &str) -> Result<String, JsValue> {
    let rows = readable_rows(rows_from_json(rows_json).map_err(js_err)?);
    let summary = STATE.with(|state| state.borrow_mut().map.add_route(rows));
    to_json(&summary)
}

/// Replaces the map and the result list with a new result set.
#[wasm_bindgen]
pub fn show_results(rows_json: &str) -> Result<String, JsValue> {
    show_rows(readable_rows(rows_from_json(rows_json).map_err(js_err)?))
}

fn show_rows(rows: Vec<ResultRow>) -> Result<String, JsValue> {
    let (summary, entries) = STATE.with(|state| {
        let mut s = state.borrow_mut();
        let summary = s.map.show_results(rows);
        (summary, result_list(s.map.rows()))
    });
    js_show_results_list(&to_json(&entries)?);
    to_json(&summary)
}

#[wasm_bindgen]
pub fn clear_map() {
    STATE.with(|state| state.borrow_mut().map.clear_map());
}

#[wasm_bindgen]
pub fn clear_all_routes_only() {
    STATE.with(|state| state.borrow_mut().map.clear_all_routes_only());
}

fn outcome_name(outcome: HighlightOutcome) -> String {
    match outcome {
        HighlightOutcome::Ignored => "ignored",
        HighlightOutcome::Refreshed => "refreshed",
        HighlightOutcome::Drawn => "drawn",
    }
    .to_string()
}

#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn highlight_route_on_map(
    origin_lat: f64,
    origin_lon: f64,
    destination_lat: f64,
    destination_lon: f64,
    index: usize,
    origin_label: &str,
    destination_label: &str,
    now_ms: f64,
) -> String {
    let origin = GeoPoint::new(origin_lat, origin_lon);
    let destination = GeoPoint::new(destination_lat, destination_lon);
    let key = RouteKey::between(origin, destination);
    let outcome = STATE.with(|state| {
        let mut s = state.borrow_mut();
        s.map.tick(Time::from_millis(now_ms));
        s.map.highlight_route_on_map(
            &key,
            origin,
            destination,
            index,
            origin_label,
            destination_label,
        )
    });
    outcome_name(outcome)
}

/// A result list entry was clicked.
#[wasm_bindgen]
pub fn select_result(index: usize, now_ms: f64) -> String {
    let now = Time::from_millis(now_ms);
    outcome_name(STATE.with(|state| state.borrow_mut().map.select_result_at(now, index)))
}

/// Click on an empty part of the page: deselects the result list.
#[wasm_bindgen]
pub fn clear_result_highlights() {
    STATE.with(|state| state.borrow_mut().map.clear_result_highlights());
}

/// A popup entry was clicked.
#[wasm_bindgen]
pub fn jump_to_result(index: usize) -> bool {
    STATE.with(|state| state.borrow_mut().map.jump_to_result(index))
}

/// Click on a marker, line or arrowhead the bridge handed out.
#[wasm_bindgen]
pub fn handle_click(id: u32, lat: f64, lon: f64) -> Result<String, JsValue> {
    let outcome = STATE.with(|state| {
        state
            .borrow_mut()
            .map
            .handle_click(routes::PrimitiveId(id), GeoPoint::new(lat, lon))
    });
    let value = match outcome {
        ClickOutcome::OriginExpanded { origin, routes } => {
            json!({ "kind": "origin", "origin": origin, "routes": routes })
        }
        ClickOutcome::RouteSelected(popup) => json!({ "kind": "route", "popup": popup }),
        ClickOutcome::Ignored => json!({ "kind": "ignored" }),
    };
    to_json(&value)
}

/// The popup's delete button. `route_key` is the popup's `route` field.
#[wasm_bindgen]
pub fn delete_route(route_key: &str) -> bool {
    STATE.with(|state| {
        let mut s = state.borrow_mut();
        let key = s.map.route_keys().find(|k| k.as_str() == route_key).cloned();
        match key {
            Some(key) => s.map.delete_route_from_popup(&key),
            None => {
                s.map.surface_mut().close_popup();
                false
            }
        }
    })
}

/// Frame hook: reverts expired highlights and fires debounced lookups.
#[wasm_bindgen]
pub fn tick(now_ms: f64) -> usize {
    let now = Time::from_millis(now_ms);
    let (reverted, typed) = STATE.with(|state| {
        let mut s = state.borrow_mut();
        let reverted = s.map.tick(now);
        (reverted, s.typing.poll(now))
    });
    if let Some(text) = typed {
        lookup_suggestions(text);
    }
    reverted
}

#[wasm_bindgen]
pub fn on_search_input(text: &str, now_ms: f64) {
    STATE.with(|state| {
        state
            .borrow_mut()
            .typing
            .push(Time::from_millis(now_ms), text.to_string());
    });
}

/// Picks suggestion `index`; returns its label for the input box.
#[wasm_bindgen]
pub fn choose_suggestion(index: usize) -> Option<String> {
    STATE.with(|state| {
        let mut s = state.borrow_mut();
        let suggestion = s.suggestions.get(index).cloned()?;
        s.form.choose(&suggestion);
        Some(suggestion.label)
    })
}

fn lookup_suggestions(text: String) {
    let Some(term) = suggestion_term(&text).map(str::to_string) else {
        STATE.with(|state| {
            let mut s = state.borrow_mut();
            s.lookups.invalidate();
            s.suggestions.clear();
        });
        js_show_suggestions("[]");
        return;
    };
    let token = STATE.with(|state| state.borrow_mut().lookups.begin());
    spawn_local(async move {
        let found = match fetch_suggestions(&term).await {
            Ok(found) => found,
            Err(err) => {
                notify_failure("suggestions", &err);
                return;
            }
        };
        let current = STATE.with(|state| {
            let mut s = state.borrow_mut();
            if !s.lookups.is_current(token) {
                return false;
            }
            s.suggestions = found.clone();
            true
        });
        if current {
            match serde_json::to_string(&found) {
                Ok(json) => js_show_suggestions(&json),
                Err(err) => log(&format!("suggestions not serializable: {err}")),
            }
        }
    });
}

/// Runs the search form. Without a chosen category the page gets an alert
/// and nothing is sent.
#[wasm_bindgen]
pub fn submit_query(sort: &str, limit: &str) -> Result<(), JsValue> {
    let prepared: Result<(String, RequestToken), QueryError> = STATE.with(|state| {
        let mut s = state.borrow_mut();
        s.form.set_options(sort, limit)?;
        let sparql = s.form.submit()?;
        Ok((sparql, s.queries.begin()))
    });
    let (sparql, token) = match prepared {
        Ok(prepared) => prepared,
        Err(err @ QueryError::MissingCategory) => {
            js_show_alert(&format!("{}{}", capitalize(&err.to_string()), "."));
            return Ok(());
        }
        Err(err) => return Err(js_err(err)),
    };

    spawn_local(async move {
        let rows = match post_query(&sparql).await {
            Ok(rows) => rows,
            Err(err) => {
                let current = STATE.with(|state| state.borrow().queries.is_current(token));
                if current {
                    notify_failure("results", &err);
                }
                return;
            }
        };
        let current = STATE.with(|state| state.borrow().queries.is_current(token));
        if !current {
            return;
        }
        if let Err(err) = show_rows(rows) {
            log(&format!("showing results failed: {err:?}"));
        }
    });
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn post_query(sparql: &str) -> Result<Vec<ResultRow>, String> {
    let resp = Request::post("/query")
        .json(&json!({ "query": sparql }))
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("server error: {}", resp.status()));
    }
    let bindings: Vec<serde_json::Value> = resp.json().await.map_err(|e| e.to_string())?;
    Ok(readable_rows(rows_from_bindings(bindings)))
}

async fn fetch_suggestions(term: &str) -> Result<Vec<Suggestion>, String> {
    let term = String::from(js_sys::encode_uri_component(term));
    let resp = Request::get(&format!("/suggest?term={term}"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("server error: {}", resp.status()));
    }
    resp.json().await.map_err(|e| e.to_string())
}
