use results::row::{Binding, IndexedRow};
use serde::Serialize;

/// One entry of the result list next to the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultListEntry {
    pub index: usize,
    pub label: String,
    pub origin: String,
    pub current_location: String,
    pub url: String,
}

fn text_or(b: &Option<Binding>, fallback: &str) -> String {
    b.as_ref()
        .map(|b| b.value.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn result_list(rows: &[IndexedRow]) -> Vec<ResultListEntry> {
    rows.iter()
        .map(|r| ResultListEntry {
            index: r.fixed_index,
            label: text_or(&r.row.item_label, "Unknown"),
            origin: text_or(&r.row.origin_label, "Unknown"),
            current_location: text_or(&r.row.current_location_label, "Unknown"),
            url: text_or(&r.row.item, "#"),
        })
        .collect()
}
