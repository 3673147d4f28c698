//! # csv_report_analyzer
//!
//! Aggregates CSV data along one or two dimensions into either a single
//! scalar result or a sorted list of per-group records ready for charting.
//!
//! # Features
//!
//! - **Operations**: unique-occurrence counts, numeric sums, averages
//!   (rounded to three decimals) and set-element counts
//! - **Filtering**: per-column accepted values, AND-ed across columns
//! - **Two-dimensional reports** grouped by an independent column, sorted by
//!   group value
//! - **Memory-mapped CSV loading**
//! - **Cached reports** through an LRU cache
//!
//! # Example
//!
//! ```rust
//! use csv_report_analyzer::{Analyzer, ColumnConfig, OperationKind, ReportConfig, Table};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = Table::from_reader("category,amount\na,10\nb,5\na,20\n".as_bytes())?;
//!     let analyzer = Analyzer::new(table);
//!
//!     // Scalar
//!     let total = ColumnConfig::new("amount", OperationKind::NumericalSum, "total");
//!     assert_eq!(analyzer.analyze_one_dimensional(&total)?, "35");
//!
//!     // Grouped
//!     let mut report = ReportConfig::new("category");
//!     report
//!         .dependent_columns
//!         .push(ColumnConfig::new("amount", OperationKind::Average, "avg"));
//!     let records = analyzer.analyze_two_dimensional(&report)?;
//!     println!("{}", serde_json::to_string(&records)?);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod processor;

pub use config::{ColumnConfig, ReportConfig};
pub use processor::{
    AggregateValue, ChartRecord, ChartValue, FilterMap, OperationKind, ProcessorError,
    analyzer::Analyzer,
    report_builder::{ReportBuilder, ReportCache, ReportOutput},
    table::Table,
};
