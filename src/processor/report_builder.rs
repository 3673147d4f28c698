use lru::LruCache;

use crate::config::{ColumnConfig, ReportConfig};
use crate::processor::analyzer::Analyzer;
use crate::processor::{ChartRecord, OperationKind, ProcessorError};
use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

const CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Hash, Eq, PartialEq, Clone, Debug)]
pub enum ReportKey {
    Scalar(ColumnConfig),
    Chart(ReportConfig),
}

/// Output of an executed report
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutput {
    /// Formatted one-dimensional result
    Scalar(String),
    /// Sorted per-group records
    Chart(Vec<ChartRecord>),
}

#[derive(Debug)]
pub struct ReportCache {
    cache: RefCell<LruCache<ReportKey, ReportOutput>>,
}

impl ReportCache {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(LruCache::new(CACHE_CAPACITY)),
        }
    }

    pub fn get(&self, key: &ReportKey) -> Option<ReportOutput> {
        self.cache.borrow_mut().get(key).cloned()
    }

    pub fn put(&self, key: ReportKey, value: ReportOutput) {
        self.cache.borrow_mut().put(key, value);
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReportCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent report composition over a shared [`Analyzer`]
///
/// Without [`ReportBuilder::group_by`] the builder runs a one-dimensional
/// report and needs exactly one column. With it, every column becomes a
/// dependent column of a two-dimensional report.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    analyzer: Rc<Analyzer>,
    cache: Option<Rc<ReportCache>>,
    independent_column: Option<String>,
    accepted_values: Vec<String>,
    filters: Vec<(String, Vec<String>)>,
    columns: Vec<ColumnConfig>,
}

impl ReportBuilder {
    pub fn new(analyzer: Rc<Analyzer>, cache: Option<Rc<ReportCache>>) -> Self {
        Self {
            analyzer,
            cache,
            independent_column: None,
            accepted_values: Vec::new(),
            filters: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Group rows by this column
    pub fn group_by(mut self, column: &str) -> Self {
        self.independent_column = Some(column.to_string());
        self
    }

    /// Restrict the group-by column to these values
    pub fn accept(mut self, values: &[&str]) -> Self {
        self.accepted_values = values.iter().map(|v| v.to_string()).collect();
        self
    }

    /// Report-level filter. For a one-dimensional report it is merged into
    /// the single column's filters.
    pub fn filter(mut self, column: &str, values: &[&str]) -> Self {
        self.filters.push((
            column.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    /// Histogram of `column`'s values (row count when ungrouped)
    pub fn count_values(self, column: &str) -> Self {
        self.column(ColumnConfig::new(
            column,
            OperationKind::UniqueOccurrences,
            "",
        ))
    }

    pub fn count_values_as(self, column: &str, label: &str) -> Self {
        self.column(ColumnConfig::new(
            column,
            OperationKind::UniqueOccurrences,
            label,
        ))
    }

    pub fn sum(self, column: &str, label: &str) -> Self {
        self.column(ColumnConfig::new(column, OperationKind::NumericalSum, label))
    }

    pub fn average(self, column: &str, label: &str) -> Self {
        self.column(ColumnConfig::new(column, OperationKind::Average, label))
    }

    pub fn count_rows(self, column: &str, label: &str) -> Self {
        self.column(ColumnConfig::new(
            column,
            OperationKind::SetElementOccurrences,
            label,
        ))
    }

    pub fn column(mut self, config: ColumnConfig) -> Self {
        self.columns.push(config);
        self
    }

    /// Disable caching
    pub fn no_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// The configuration this builder would run
    pub fn build(self) -> Result<ReportKey, ProcessorError> {
        match self.independent_column {
            None => {
                let mut columns = self.columns;
                if columns.len() != 1 {
                    return Err(ProcessorError::InvalidReport(format!(
                        "a report without group_by needs exactly one column, got {}",
                        columns.len()
                    )));
                }
                if !self.accepted_values.is_empty() {
                    return Err(ProcessorError::InvalidReport(
                        "accepted values need a group_by column".into(),
                    ));
                }
                let mut config = columns.remove(0);
                config.filter_columns.extend(self.filters);
                Ok(ReportKey::Scalar(config))
            }
            Some(independent_column) => {
                if self.columns.is_empty() {
                    return Err(ProcessorError::InvalidReport(
                        "a grouped report needs at least one column".into(),
                    ));
                }
                Ok(ReportKey::Chart(ReportConfig {
                    independent_column,
                    accepted_values: self.accepted_values,
                    filter_columns: self.filters.into_iter().collect(),
                    dependent_columns: self.columns,
                }))
            }
        }
    }

    /// Execute the report, serving it from the cache when possible
    pub fn execute(self) -> Result<ReportOutput, ProcessorError> {
        let analyzer = Rc::clone(&self.analyzer);
        let cache = self.cache.clone();
        let key = self.build()?;

        if let Some(cached) = cache.as_ref().and_then(|c| c.get(&key)) {
            return Ok(cached);
        }

        let output = match &key {
            ReportKey::Scalar(config) => {
                ReportOutput::Scalar(analyzer.analyze_one_dimensional(config)?)
            }
            ReportKey::Chart(config) => {
                ReportOutput::Chart(analyzer.analyze_two_dimensional(config)?)
            }
        };

        if let Some(cache) = cache {
            cache.put(key, output.clone());
        }
        Ok(output)
    }
}

impl Analyzer {
    pub fn report(self: &Rc<Self>) -> ReportBuilder {
        ReportBuilder::new(self.clone(), None)
    }

    pub fn report_with_cache(self: &Rc<Self>, cache: &Rc<ReportCache>) -> ReportBuilder {
        ReportBuilder::new(self.clone(), Some(cache.clone()))
    }
}
