//! Calls into the page script. The page defines `window.routeMapBridge`
//! with the functions below; ids are plain numbers on the JS side.

use foundation::bounds::GeoBounds;
use foundation::geo::GeoPoint;
use routes::{ArrowStyle, MapSurface, PrimitiveId, ResultSelection, RoutePopup, RouteStyle};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = addMarker)]
    fn js_add_marker(lat: f64, lon: f64, label: &str) -> u32;

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = addLine)]
    fn js_add_line(from_lat: f64, from_lon: f64, to_lat: f64, to_lon: f64, color: &str, weight: f32) -> u32;

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = addArrowHead)]
    fn js_add_arrow_head(line: u32, color: &str, weight: f32, pixel_size: f32) -> u32;

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = restyleLine)]
    fn js_restyle_line(line: u32, color: &str, weight: f32);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = restyleArrowHead)]
    fn js_restyle_arrow_head(arrow: u32, color: &str, weight: f32, pixel_size: f32);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = removeLayer)]
    fn js_remove(id: u32);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = fitBounds)]
    fn js_fit_bounds(south: f64, west: f64, north: f64, east: f64);

    /// `popup_json` is a serialized `RoutePopup`.
    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = openPopup)]
    fn js_open_popup(popup_json: &str);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = closePopup)]
    fn js_close_popup();

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = highlightResults)]
    fn js_highlight_results(indices: &[u32]);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = scrollToResult)]
    fn js_scroll_to_result(index: u32);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = showResultsList)]
    pub fn js_show_results_list(entries_json: &str);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = showSuggestions)]
    pub fn js_show_suggestions(suggestions_json: &str);

    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = showAlert)]
    pub fn js_show_alert(message: &str);

    /// Non-blocking message, e.g. a toast. Unlike `showAlert` it does not
    /// wait for the user.
    #[wasm_bindgen(js_namespace = routeMapBridge, js_name = showNotice)]
    pub fn js_show_notice(message: &str);
}

/// The page's Leaflet map.
#[derive(Debug, Default)]
pub struct JsMapSurface;

impl MapSurface for JsMapSurface {
    fn add_marker(&mut self, at: GeoPoint, label: &str) -> PrimitiveId {
        PrimitiveId(js_add_marker(at.lat, at.lon, label))
    }

    fn add_line(&mut self, from: GeoPoint, to: GeoPoint, style: RouteStyle) -> PrimitiveId {
        PrimitiveId(js_add_line(
            from.lat,
            from.lon,
            to.lat,
            to.lon,
            &style.css_color(),
            style.weight,
        ))
    }

    fn add_arrow_head(&mut self, line: PrimitiveId, style: ArrowStyle) -> PrimitiveId {
        PrimitiveId(js_add_arrow_head(
            line.0,
            &routes::css_color(style.color),
            style.weight,
            style.pixel_size,
        ))
    }

    fn restyle_line(&mut self, line: PrimitiveId, style: RouteStyle) {
        js_restyle_line(line.0, &style.css_color(), style.weight);
    }

    fn restyle_arrow_head(&mut self, arrow: PrimitiveId, style: ArrowStyle) {
        js_restyle_arrow_head(
            arrow.0,
            &routes::css_color(style.color),
            style.weight,
            style.pixel_size,
        );
    }

    fn remove(&mut self, id: PrimitiveId) {
        js_remove(id.0);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        js_fit_bounds(
            bounds.south_west.lat,
            bounds.south_west.lon,
            bounds.north_east.lat,
            bounds.north_east.lon,
        );
    }

    fn open_popup(&mut self, popup: &RoutePopup) {
        match serde_json::to_string(popup) {
            Ok(json) => js_open_popup(&json),
            Err(err) => web_sys::console::error_1(&JsValue::from_str(&format!(
                "popup not serializable: {err}"
            ))),
        }
    }

    fn close_popup(&mut self) {
        js_close_popup();
    }
}

/// The result list rendered by the page.
#[derive(Debug, Default)]
pub struct JsResultList;

impl ResultSelection for JsResultList {
    fn highlight(&mut self, indices: &[usize]) {
        let indices: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
        js_highlight_results(&indices);
    }

    fn scroll_into_view(&mut self, index: usize) {
        js_scroll_to_result(index as u32);
    }
}
