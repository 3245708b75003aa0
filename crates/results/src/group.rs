use std::collections::HashMap;

use foundation::geo::GeoPoint;
use foundation::ids::OriginKey;
use serde::Serialize;
use tracing::debug;

use crate::row::IndexedRow;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Destination {
    pub point: GeoPoint,
    pub label: String,
    pub result_index: usize,
}

/// All destinations that share one exact origin coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OriginGroup {
    pub origin: GeoPoint,
    pub origin_label: String,
    pub destinations: Vec<Destination>,
}

impl OriginGroup {
    pub fn key(&self) -> OriginKey {
        OriginKey::of(self.origin)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Grouping {
    /// One group per distinct origin key, in first-seen order.
    pub groups: Vec<OriginGroup>,
    /// Fixed indices of rows dropped for an unreadable coordinate.
    pub skipped: Vec<usize>,
}

/// Groups rows by exact origin coordinate.
///
/// Rows whose origin or destination literal does not parse are left off the
/// map. The group label comes from the first row seen at that origin.
pub fn group_by_origin(rows: &[IndexedRow]) -> Grouping {
    let mut out = Grouping::default();
    let mut positions: HashMap<OriginKey, usize> = HashMap::new();

    for indexed in rows {
        let row = &indexed.row;
        let Some((origin, destination)) = row.endpoints() else {
            debug!(
                index = indexed.fixed_index,
                item = row.item_uri(),
                "skipping row without usable coordinates"
            );
            out.skipped.push(indexed.fixed_index);
            continue;
        };

        let key = OriginKey::of(origin);
        let pos = *positions.entry(key).or_insert_with(|| {
            out.groups.push(OriginGroup {
                origin,
                origin_label: row.origin_label().to_string(),
                destinations: Vec::new(),
            });
            out.groups.len() - 1
        });

        out.groups[pos].destinations.push(Destination {
            point: destination,
            label: row.destination_label().to_string(),
            result_index: indexed.fixed_index,
        });
    }

    out
}
