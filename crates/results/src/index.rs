use crate::row::{IndexedRow, ResultRow};

/// Gives each row its position as `fixed_index`.
///
/// Indices are assigned once per result set and are never recomputed, even
/// when rows are later regrouped for rendering.
pub fn assign_fixed_indices(rows: Vec<ResultRow>) -> Vec<IndexedRow> {
    rows.into_iter()
        .enumerate()
        .map(|(fixed_index, row)| IndexedRow { fixed_index, row })
        .collect()
}
