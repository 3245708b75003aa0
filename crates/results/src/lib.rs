pub mod dedupe;
pub mod group;
pub mod index;
pub mod row;

pub use dedupe::*;
pub use group::*;
pub use index::*;
pub use row::*;

/// Deduplicates `rows` and assigns the display indices every other component
/// refers to.
pub fn prepare_rows(rows: Vec<ResultRow>) -> Vec<IndexedRow> {
    assign_fixed_indices(filter_duplicates(rows))
}
