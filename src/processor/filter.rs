use crate::processor::{FilterMap, table::find_column_index};

/// Returns true when `record` satisfies every constraint in `filters`.
///
/// Constraints are AND-ed. A column whose accepted list is empty is not
/// constrained. A constrained column missing from `headers` fails the match.
pub fn row_passes_filters(record: &[String], headers: &[String], filters: &FilterMap) -> bool {
    filters
        .iter()
        .filter(|(_, accepted)| !accepted.is_empty())
        .all(|(column, accepted)| {
            find_column_index(headers, column)
                .and_then(|idx| record.get(idx))
                .is_some_and(|value| accepted.iter().any(|a| a == value))
        })
}
