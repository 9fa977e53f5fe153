//! Tabular Config Store
//!
//! Spreadsheet-like storage for the configuration tables. [`TabularStore`] is the capability
//! the pipeline depends on: named tables of 1-indexed rows and columns. [`ConfigSheet`] layers
//! the record-level operations (header initialisation, record loading, cell write-back, column
//! formats) on top of any store.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

pub mod memory;
pub mod workbook;

pub use memory::MemoryWorkbook;
pub use workbook::WorkbookFile;

/// First data row of every configuration table; row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Empty => None,
        }
    }

    /// JSON form used as an interpolation parameter.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Empty => serde_json::Value::Null,
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Number(n) => serde_json::Value::String(format_number(*n)),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => f.write_str(&format_number(*n)),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

// Ids are stored as numbers; render integral values without a fraction.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// One row of a configuration table, keyed by the table's field names in schema order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigRecord {
    values: Vec<(String, CellValue)>,
}

impl ConfigRecord {
    /// Zip a row positionally against `fields`; missing trailing cells become empty.
    pub fn from_row(fields: &[String], row: &[CellValue]) -> Self {
        let values = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.clone(), row.get(i).cloned().unwrap_or_default()))
            .collect();
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Field value, or an empty cell when the field is not part of the schema.
    pub fn value(&self, field: &str) -> CellValue {
        self.get(field).cloned().unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.values.iter().map(|(_, value)| value)
    }

    /// Cells in schema order, ready to be written as a row.
    pub fn to_row(&self) -> Vec<CellValue> {
        self.values().cloned().collect()
    }
}

/// Storage capability for named, rectangular tables. Rows and columns are 1-indexed.
pub trait TabularStore: Send {
    fn has_table(&self, name: &str) -> bool;

    /// Create the table if it does not exist yet.
    fn ensure_table(&mut self, name: &str) -> Result<(), StoreError>;

    /// Remove all values, formats and attached charts from the table.
    fn clear_table(&mut self, name: &str) -> Result<(), StoreError>;

    /// Index of the last row holding a non-empty cell; 0 for an empty table.
    fn last_row(&self, name: &str) -> Result<usize, StoreError>;

    /// Read a `rows` x `columns` block starting at (`start_row`, `start_column`).
    /// Cells outside the stored data read as empty.
    fn read_range(
        &self,
        name: &str,
        start_row: usize,
        start_column: usize,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<CellValue>>, StoreError>;

    /// Write a block of values with its top-left corner at (`start_row`, `start_column`).
    fn write_range(
        &mut self,
        name: &str,
        start_row: usize,
        start_column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<(), StoreError>;

    /// Set the display format of `column` from `start_row` to the bottom of the table.
    fn set_column_format(
        &mut self,
        name: &str,
        column: usize,
        start_row: usize,
        pattern: &str,
    ) -> Result<(), StoreError>;
}

pub(crate) fn check_position(row: usize, column: usize) -> Result<(), StoreError> {
    if row == 0 || column == 0 {
        return Err(StoreError::InvalidRange(format!(
            "rows and columns start at 1 (got row {}, column {})",
            row, column
        )));
    }
    Ok(())
}

/// Record-level view of one named table.
pub struct ConfigSheet<'a> {
    store: &'a mut dyn TabularStore,
    name: String,
}

impl<'a> ConfigSheet<'a> {
    pub fn new(store: &'a mut dyn TabularStore, name: impl Into<String>) -> Self {
        Self {
            store,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> bool {
        self.store.has_table(&self.name)
    }

    /// Number of the last non-empty row, 0 if the table is missing or empty.
    pub fn last_row(&self) -> Result<usize, StoreError> {
        if !self.exists() {
            return Ok(0);
        }
        self.store.last_row(&self.name)
    }

    /// Clear the table (creating it if needed) and write a single header row.
    pub fn initialize_table(&mut self, header_fields: &[String]) -> Result<(), StoreError> {
        self.store.ensure_table(&self.name)?;
        self.store.clear_table(&self.name)?;
        let header = header_fields
            .iter()
            .map(|field| CellValue::Text(field.clone()))
            .collect();
        self.store.write_range(&self.name, 1, 1, &[header])
    }

    /// Load every row from `start_row` to the last non-empty row, one record per row.
    /// Only the first `fields.len()` columns are read.
    pub fn read_records(
        &self,
        fields: &[String],
        start_row: usize,
    ) -> Result<Vec<ConfigRecord>, StoreError> {
        let last_row = self.store.last_row(&self.name)?;
        if fields.is_empty() || last_row < start_row {
            return Ok(Vec::new());
        }
        let rows = self.store.read_range(
            &self.name,
            start_row,
            1,
            last_row - start_row + 1,
            fields.len(),
        )?;
        Ok(rows
            .iter()
            .map(|row| ConfigRecord::from_row(fields, row))
            .collect())
    }

    /// Load records keyed by `id_field`. Rows without an id are skipped and a duplicated id
    /// keeps the later row; both only produce a warning.
    pub fn read_records_by_id(
        &self,
        fields: &[String],
        id_field: &str,
    ) -> Result<HashMap<String, ConfigRecord>, StoreError> {
        let mut items = HashMap::new();
        for (index, record) in self.read_records(fields, FIRST_DATA_ROW)?.into_iter().enumerate() {
            let row = FIRST_DATA_ROW + index;
            let id = record.value(id_field);
            if id.is_blank() {
                warn!(
                    table = %self.name,
                    row,
                    id_field,
                    "No id detected in row, skipping"
                );
                continue;
            }
            let id = id.to_string();
            if items.contains_key(&id) {
                warn!(
                    table = %self.name,
                    row,
                    id = %id,
                    "Duplicated id detected, the previous one will be overwritten"
                );
            }
            items.insert(id, record);
        }
        Ok(items)
    }

    pub fn write_cell(
        &mut self,
        row: usize,
        column: usize,
        value: CellValue,
    ) -> Result<(), StoreError> {
        check_position(row, column)?;
        self.store.write_range(&self.name, row, column, &[vec![value]])
    }

    /// Apply `formats[suffix]` to each field whose name ends in `_<suffix>`, from row 2 down.
    pub fn apply_column_format(
        &mut self,
        fields: &[String],
        formats: &HashMap<&str, &str>,
    ) -> Result<(), StoreError> {
        for (index, field) in fields.iter().enumerate() {
            if let Some(pattern) = formats.get(field_suffix(field)) {
                self.store
                    .set_column_format(&self.name, index + 1, FIRST_DATA_ROW, pattern)?;
            }
        }
        Ok(())
    }
}

/// Text after the last `_` of a field name, or the whole name when there is none.
pub fn field_suffix(field: &str) -> &str {
    field.rsplit_once('_').map_or(field, |(_, suffix)| suffix)
}
