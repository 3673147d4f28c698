//! Report configuration.
//!
//! Both report shapes deserialize from JSON with `serde`. Operation names are
//! checked while loading, so an unknown operation never reaches the
//! aggregation pass.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::processor::{FilterMap, OperationKind, ProcessorError};

/// One aggregation task: which column, which operation, under which label,
/// restricted by which filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnConfig {
    /// Name the result is reported under. Required for `Average` and
    /// `SetElementOccurrences`.
    #[serde(default, alias = "aggregate_value_label")]
    pub label: String,
    #[serde(alias = "operation_column")]
    pub column: String,
    #[serde(alias = "operation_type")]
    pub operation: OperationKind,
    #[serde(default)]
    pub filter_columns: FilterMap,
    /// Values of `column` itself that are eligible. Empty means all.
    #[serde(default)]
    pub accepted_values: Vec<String>,
}

impl ColumnConfig {
    pub fn new(column: &str, operation: OperationKind, label: &str) -> Self {
        ColumnConfig {
            label: label.to_string(),
            column: column.to_string(),
            operation,
            filter_columns: FilterMap::new(),
            accepted_values: Vec::new(),
        }
    }

    pub fn with_filter(mut self, column: &str, values: &[&str]) -> Self {
        self.filter_columns
            .insert(column.to_string(), to_strings(values));
        self
    }

    pub fn with_accepted_values(mut self, values: &[&str]) -> Self {
        self.accepted_values = to_strings(values);
        self
    }

    /// Report filters plus, when present, the accepted values of the target
    /// column, which replace any report filter on that same column.
    pub fn effective_filters(&self) -> FilterMap {
        let mut filters = self.filter_columns.clone();
        if !self.accepted_values.is_empty() {
            filters.insert(self.column.clone(), self.accepted_values.clone());
        }
        filters
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProcessorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ProcessorError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// Two-dimensional report: rows grouped by `independent_column`, each
/// dependent column aggregated per group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportConfig {
    pub independent_column: String,
    #[serde(default)]
    pub accepted_values: Vec<String>,
    #[serde(default)]
    pub filter_columns: FilterMap,
    #[serde(default)]
    pub dependent_columns: Vec<ColumnConfig>,
}

impl ReportConfig {
    pub fn new(independent_column: &str) -> Self {
        ReportConfig {
            independent_column: independent_column.to_string(),
            ..Default::default()
        }
    }

    /// Implicit filter restricting the independent column to its accepted values
    pub fn independent_filter(&self) -> FilterMap {
        FilterMap::from([(
            self.independent_column.clone(),
            self.accepted_values.clone(),
        )])
    }

    pub fn has_average(&self) -> bool {
        self.dependent_columns
            .iter()
            .any(|c| c.operation == OperationKind::Average)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProcessorError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ProcessorError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
