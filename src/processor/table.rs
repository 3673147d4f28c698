use std::{fs::File, io::Read, path::Path};

use memmap2::Mmap;
use tracing::info;

use crate::processor::ProcessorError;

/// Fully materialized CSV document: a header row plus data records of the
/// same width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from already-parsed rows.
    ///
    /// # Errors
    /// Returns [`ProcessorError::InvalidReport`] if a record's width differs
    /// from the header count.
    pub fn new(headers: Vec<String>, records: Vec<Vec<String>>) -> Result<Self, ProcessorError> {
        if let Some((row, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != headers.len())
        {
            return Err(ProcessorError::InvalidReport(format!(
                "record {} has {} fields, expected {}",
                row + 1,
                record.len(),
                headers.len()
            )));
        }
        Ok(Table { headers, records })
    }

    /// Parses CSV from any reader. The first row names the columns.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ProcessorError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(false)
            .from_reader(reader);

        let mut rows = csv_reader.records();
        let headers: Vec<String> = match rows.next() {
            Some(header) => header?.iter().map(str::to_string).collect(),
            None => return Err(ProcessorError::EmptyInput),
        };

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.iter().map(str::to_string).collect());
        }

        Ok(Table { headers, records })
    }

    /// Loads a CSV file using memory mapping
    ///
    /// The whole file is parsed from its first byte on every call, so
    /// repeated loads of the same file always see the complete document.
    ///
    /// # Errors
    /// Returns a [`ProcessorError`] if:
    /// - File cannot be opened or mapped
    /// - CSV is malformed (rows mismatch header)
    /// - The file is empty
    pub fn load_csv(path: &Path) -> Result<Self, ProcessorError> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let table = Self::from_reader(&mmap[..])?;
        info!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.records.len(),
            "loaded CSV"
        );
        Ok(table)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows, header excluded
    pub fn records(&self) -> &[Vec<String>] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    /// Position of `name` in the header row
    pub fn column_index(&self, name: &str) -> Result<usize, ProcessorError> {
        find_column_index(&self.headers, name)
            .ok_or_else(|| ProcessorError::MissingColumn(name.to_string()))
    }
}

pub(crate) fn find_column_index(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}
