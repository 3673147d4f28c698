use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod accumulator;
pub mod analyzer;
pub mod filter;
pub mod operation;
pub mod report_builder;
pub mod table;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("CSV input has no header row")]
    EmptyInput,

    #[error("column '{0}' not found in the CSV file")]
    MissingColumn(String),

    #[error("aggregate value cannot be unassigned for operation type: {0}")]
    MissingLabel(OperationKind),

    #[error("unsupported operation type: {0}")]
    UnsupportedOperation(String),

    #[error("error parsing numerical value '{value}' in column '{column}': {source}")]
    NumericParse {
        column: String,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("integer overflow while accumulating '{label}'")]
    Overflow { label: String },

    #[error("found empty key in output map, which is not allowed")]
    EmptyGroupKey,

    #[error("value for key '{0}' is neither an int nor a float")]
    Inconsistent(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),
}

/// Column name -> accepted values. An empty value list means "no constraint".
pub type FilterMap = BTreeMap<String, Vec<String>>;

/// Aggregation applied to every row that passes the filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperationKind {
    /// Histogram of observed values (grouped) or a plain row count (scalar)
    UniqueOccurrences,
    /// Integer mean rounded to three decimals
    Average,
    /// Integer sum
    NumericalSum,
    /// Count of rows present in the set selected by the filters
    SetElementOccurrences,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::UniqueOccurrences => "UniqueOccurrences",
            OperationKind::Average => "Average",
            OperationKind::NumericalSum => "NumericalSum",
            OperationKind::SetElementOccurrences => "SetElementOccurrences",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = ProcessorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UniqueOccurrences" => Ok(OperationKind::UniqueOccurrences),
            "Average" => Ok(OperationKind::Average),
            "NumericalSum" => Ok(OperationKind::NumericalSum),
            "SetElementOccurrences" => Ok(OperationKind::SetElementOccurrences),
            other => Err(ProcessorError::UnsupportedOperation(other.to_string())),
        }
    }
}

impl TryFrom<String> for OperationKind {
    type Error = ProcessorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationKind> for String {
    fn from(kind: OperationKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A finalized accumulator value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateValue {
    Int(i64),
    Float(f64),
}

impl fmt::Display for AggregateValue {
    /// Integers print plainly, floats with the fewest digits that round-trip
    /// and never in exponent form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateValue::Int(v) => write!(f, "{}", v),
            AggregateValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// One cell of a chart record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartValue {
    Str(String),
    Int(i64),
    Float(f64),
}

impl From<AggregateValue> for ChartValue {
    fn from(value: AggregateValue) -> Self {
        match value {
            AggregateValue::Int(v) => ChartValue::Int(v),
            AggregateValue::Float(v) => ChartValue::Float(v),
        }
    }
}

/// Flat per-group record of a two-dimensional report
pub type ChartRecord = BTreeMap<String, ChartValue>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_parse() {
        assert_eq!(
            "Average".parse::<OperationKind>().unwrap(),
            OperationKind::Average
        );
        let err = "Median".parse::<OperationKind>().unwrap_err();
        assert!(matches!(err, ProcessorError::UnsupportedOperation(ref s) if s == "Median"));
        assert_eq!(err.to_string(), "unsupported operation type: Median");
    }

    #[test]
    fn test_aggregate_value_display() {
        assert_eq!(AggregateValue::Int(35).to_string(), "35");
        assert_eq!(AggregateValue::Float(15.0).to_string(), "15");
        assert_eq!(AggregateValue::Float(2.333).to_string(), "2.333");
        assert_eq!(AggregateValue::Float(-0.5).to_string(), "-0.5");
    }

    #[test]
    fn test_chart_value_serializes_untagged() {
        let mut record = ChartRecord::new();
        record.insert("category".into(), ChartValue::Str("a".into()));
        record.insert("avg".into(), ChartValue::Float(15.0));
        record.insert("n".into(), ChartValue::Int(2));
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"avg":15.0,"category":"a","n":2}"#);
    }
}
