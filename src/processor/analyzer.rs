use std::{collections::HashMap, path::Path};

use tracing::debug;

use crate::{
    config::{ColumnConfig, ReportConfig},
    processor::{
        AggregateValue, ChartRecord, ChartValue, OperationKind, ProcessorError,
        accumulator::Accumulator,
        filter::row_passes_filters,
        operation::{GroupingMode, apply_operation},
        table::Table,
    },
};

/// Runs reports over one loaded table
///
/// # Examples
///
/// ```rust
/// # use csv_report_analyzer::{Analyzer, ColumnConfig, OperationKind, Table};
/// let table = Table::from_reader("category,amount\na,10\nb,5\na,20\n".as_bytes()).unwrap();
/// let analyzer = Analyzer::new(table);
/// let config = ColumnConfig::new("amount", OperationKind::NumericalSum, "total");
/// assert_eq!(analyzer.analyze_one_dimensional(&config).unwrap(), "35");
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    table: Table,
}

impl Analyzer {
    pub fn new(table: Table) -> Self {
        Analyzer { table }
    }

    /// Memory-maps and parses `path`, see [`Table::load_csv`].
    pub fn load_csv(path: &Path) -> Result<Self, ProcessorError> {
        Ok(Self::new(Table::load_csv(path)?))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Aggregates every data row into a single value.
    ///
    /// Returns integer zero when no row passes the filters.
    ///
    /// # Errors
    /// - [`ProcessorError::MissingColumn`] if the target column does not exist
    /// - [`ProcessorError::MissingLabel`] for a label-requiring operation
    ///   without a label
    /// - [`ProcessorError::NumericParse`] if a passing value is not an integer
    pub fn aggregate_one_dimensional(
        &self,
        config: &ColumnConfig,
    ) -> Result<AggregateValue, ProcessorError> {
        let headers = self.table.headers();
        let column_index = self.table.column_index(&config.column)?;

        let mut accumulator = Accumulator::new();
        for record in self.table.records() {
            apply_operation(
                record,
                headers,
                &mut accumulator,
                config,
                column_index,
                GroupingMode::OneDimensional,
            )?;
        }

        if config.operation == OperationKind::Average {
            accumulator.finalize_averages();
        }
        debug!(?accumulator, "one-dimensional scan complete");

        Ok(accumulator
            .get(&config.label)?
            .unwrap_or(AggregateValue::Int(0)))
    }

    /// [`Self::aggregate_one_dimensional`] formatted as a plain integer or a
    /// minimal-digit decimal string.
    pub fn analyze_one_dimensional(&self, config: &ColumnConfig) -> Result<String, ProcessorError> {
        Ok(self.aggregate_one_dimensional(config)?.to_string())
    }

    /// Aggregates the dependent columns per value of the independent column.
    ///
    /// A row contributes only if it passes the report filters and the
    /// independent column's accepted values. Each dependent column then
    /// applies its own filters. The result holds one record per group,
    /// sorted ascending by the group value.
    ///
    /// # Errors
    /// - [`ProcessorError::MissingColumn`] for an unknown independent or
    ///   dependent column
    /// - [`ProcessorError::EmptyGroupKey`] if a passing row has an empty
    ///   independent value
    /// - any error of the per-row operation
    pub fn analyze_two_dimensional(
        &self,
        config: &ReportConfig,
    ) -> Result<Vec<ChartRecord>, ProcessorError> {
        let headers = self.table.headers();
        let independent_index = self.table.column_index(&config.independent_column)?;
        let dependent = config
            .dependent_columns
            .iter()
            .map(|c| Ok((c, self.table.column_index(&c.column)?)))
            .collect::<Result<Vec<_>, ProcessorError>>()?;
        let independent_filter = config.independent_filter();

        let mut groups: HashMap<String, Accumulator> = HashMap::new();
        for record in self.table.records() {
            if !row_passes_filters(record, headers, &config.filter_columns)
                || !row_passes_filters(record, headers, &independent_filter)
            {
                continue;
            }

            let accumulator = groups
                .entry(record[independent_index].clone())
                .or_default();
            for (column_config, column_index) in &dependent {
                apply_operation(
                    record,
                    headers,
                    accumulator,
                    column_config,
                    *column_index,
                    GroupingMode::Grouped,
                )?;
            }
        }

        if config.has_average() {
            for accumulator in groups.values_mut() {
                accumulator.finalize_averages();
            }
        }
        debug!(groups = groups.len(), "two-dimensional scan complete");

        convert_to_chart_format(&config.independent_column, groups)
    }
}

fn convert_to_chart_format(
    independent_column: &str,
    groups: HashMap<String, Accumulator>,
) -> Result<Vec<ChartRecord>, ProcessorError> {
    let mut keyed = Vec::with_capacity(groups.len());
    for (key, accumulator) in groups {
        if key.is_empty() {
            return Err(ProcessorError::EmptyGroupKey);
        }
        let mut record: ChartRecord = accumulator
            .into_values()?
            .into_iter()
            .map(|(label, value)| (label, ChartValue::from(value)))
            .collect();
        record.insert(independent_column.to_string(), ChartValue::Str(key.clone()));
        keyed.push((key, record));
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}
