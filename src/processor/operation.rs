use tracing::trace;

use crate::{
    config::ColumnConfig,
    processor::{
        OperationKind, ProcessorError, accumulator::Accumulator, filter::row_passes_filters,
    },
};

/// How `UniqueOccurrences` keys its counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupingMode {
    /// Every passing row bumps the counter under the configured label
    OneDimensional,
    /// Every passing row bumps the counter under its own value
    Grouped,
}

/// Applies one operation to one record.
///
/// Rows rejected by the column's filters leave `accumulator` untouched and
/// are not an error.
pub fn apply_operation(
    record: &[String],
    headers: &[String],
    accumulator: &mut Accumulator,
    config: &ColumnConfig,
    column_index: usize,
    mode: GroupingMode,
) -> Result<(), ProcessorError> {
    if !row_passes_filters(record, headers, &config.effective_filters()) {
        trace!(column = %config.column, "row skipped by filters");
        return Ok(());
    }

    let y_value = record
        .get(column_index)
        .ok_or_else(|| ProcessorError::MissingColumn(config.column.clone()))?;

    match config.operation {
        OperationKind::UniqueOccurrences => match mode {
            GroupingMode::OneDimensional => accumulator.increment(&config.label),
            GroupingMode::Grouped => accumulator.increment(y_value),
        },
        OperationKind::Average => {
            require_label(config)?;
            let value = parse_integer(&config.column, y_value)?;
            accumulator.add_to_average(&config.label, value)
        }
        OperationKind::NumericalSum => {
            let value = parse_integer(&config.column, y_value)?;
            accumulator.add(&config.label, value)
        }
        OperationKind::SetElementOccurrences => {
            require_label(config)?;
            accumulator.increment(&config.label)
        }
    }
}

fn require_label(config: &ColumnConfig) -> Result<(), ProcessorError> {
    if config.label.is_empty() {
        return Err(ProcessorError::MissingLabel(config.operation));
    }
    Ok(())
}

fn parse_integer(column: &str, value: &str) -> Result<i64, ProcessorError> {
    value
        .parse::<i64>()
        .map_err(|source| ProcessorError::NumericParse {
            column: column.to_string(),
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::AggregateValue;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn headers() -> Vec<String> {
        strings(&["category", "amount"])
    }

    fn run(
        rows: &[&[&str]],
        config: &ColumnConfig,
        mode: GroupingMode,
    ) -> Result<Accumulator, ProcessorError> {
        let headers = headers();
        let idx = headers.iter().position(|h| *h == config.column).unwrap();
        let mut acc = Accumulator::new();
        for row in rows {
            apply_operation(&strings(row), &headers, &mut acc, config, idx, mode)?;
        }
        Ok(acc)
    }

    #[test]
    fn test_unique_occurrences_one_dimensional_counts_rows() {
        let cfg = ColumnConfig::new("category", OperationKind::UniqueOccurrences, "count");
        let acc = run(
            &[&["a", "1"], &["b", "2"], &["a", "3"]],
            &cfg,
            GroupingMode::OneDimensional,
        )
        .unwrap();
        assert_eq!(acc.get("count").unwrap(), Some(AggregateValue::Int(3)));
    }

    #[test]
    fn test_unique_occurrences_grouped_builds_histogram() {
        let cfg = ColumnConfig::new("category", OperationKind::UniqueOccurrences, "ignored");
        let acc = run(
            &[&["a", "1"], &["b", "2"], &["a", "3"], &["", "4"]],
            &cfg,
            GroupingMode::Grouped,
        )
        .unwrap();
        assert_eq!(acc.get("a").unwrap(), Some(AggregateValue::Int(2)));
        assert_eq!(acc.get("b").unwrap(), Some(AggregateValue::Int(1)));
        assert_eq!(acc.get("").unwrap(), Some(AggregateValue::Int(1)));
        assert_eq!(acc.get("ignored").unwrap(), None);
    }

    #[test]
    fn test_average_requires_label() {
        let cfg = ColumnConfig::new("amount", OperationKind::Average, "");
        let err = run(&[&["a", "1"]], &cfg, GroupingMode::Grouped).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::MissingLabel(OperationKind::Average)
        ));
    }

    #[test]
    fn test_set_element_occurrences_requires_label() {
        let cfg = ColumnConfig::new("amount", OperationKind::SetElementOccurrences, "");
        let err = run(&[&["a", "1"]], &cfg, GroupingMode::OneDimensional).unwrap_err();
        assert_eq!(
            err.to_string(),
            "aggregate value cannot be unassigned for operation type: SetElementOccurrences"
        );
    }

    #[test]
    fn test_set_element_occurrences_ignores_value() {
        let cfg = ColumnConfig::new("amount", OperationKind::SetElementOccurrences, "present");
        let acc = run(
            &[&["a", "x"], &["b", ""]],
            &cfg,
            GroupingMode::Grouped,
        )
        .unwrap();
        assert_eq!(acc.get("present").unwrap(), Some(AggregateValue::Int(2)));
    }

    #[test]
    fn test_average_accumulates_running_pair() {
        let cfg = ColumnConfig::new("amount", OperationKind::Average, "avg");
        let mut acc = run(&[&["a", "10"], &["a", "-4"]], &cfg, GroupingMode::Grouped).unwrap();
        let running = acc.running("avg").unwrap();
        assert_eq!((running.total, running.count), (6, 2));
        acc.finalize_averages();
        assert_eq!(acc.get("avg").unwrap(), Some(AggregateValue::Float(3.0)));
    }

    #[test]
    fn test_numerical_sum_parse_error() {
        let cfg = ColumnConfig::new("amount", OperationKind::NumericalSum, "total");
        let err = run(&[&["a", "10"], &["a", "1.5"]], &cfg, GroupingMode::Grouped).unwrap_err();
        match err {
            ProcessorError::NumericParse { column, value, .. } => {
                assert_eq!(column, "amount");
                assert_eq!(value, "1.5");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_filtered_row_leaves_accumulator_untouched() {
        let cfg = ColumnConfig::new("amount", OperationKind::NumericalSum, "total")
            .with_filter("category", &["a"]);
        // "oops" would fail to parse if the row were not skipped first
        let acc = run(&[&["b", "oops"], &["b", "7"]], &cfg, GroupingMode::OneDimensional).unwrap();
        assert!(acc.is_empty());
    }

    #[test]
    fn test_accepted_values_restrict_target_column() {
        let cfg = ColumnConfig::new("category", OperationKind::UniqueOccurrences, "")
            .with_accepted_values(&["a"]);
        let acc = run(&[&["a", "1"], &["b", "2"]], &cfg, GroupingMode::Grouped).unwrap();
        assert_eq!(acc.get("a").unwrap(), Some(AggregateValue::Int(1)));
        assert_eq!(acc.get("b").unwrap(), None);
    }
}
