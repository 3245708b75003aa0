use std::collections::HashSet;

use crate::row::ResultRow;

/// Composite identity of a result row: entity URI plus normalized origin and
/// destination labels.
///
/// The same entity shows up several times when the query fans out over label
/// variants; rows without a URI still collapse on their labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    pub item_uri: String,
    pub origin_label: String,
    pub destination_label: String,
}

impl DedupeKey {
    pub fn of(row: &ResultRow) -> Self {
        DedupeKey {
            item_uri: row.item_uri().to_string(),
            origin_label: normalized(row.origin_label.as_ref().map(|b| b.value.as_str())),
            destination_label: normalized(
                row.current_location_label
                    .as_ref()
                    .map(|b| b.value.as_str()),
            ),
        }
    }
}

fn normalized(label: Option<&str>) -> String {
    label.map(|l| l.trim().to_lowercase()).unwrap_or_default()
}

/// Keeps the first row for each [`DedupeKey`], preserving input order.
///
/// Idempotent: filtering the output again returns it unchanged.
pub fn filter_duplicates(rows: impl IntoIterator<Item = ResultRow>) -> Vec<ResultRow> {
    let mut seen: HashSet<DedupeKey> = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        if seen.insert(DedupeKey::of(&row)) {
            out.push(row);
        }
    }
    out
}
