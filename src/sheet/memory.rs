//! In-memory workbook: the reference [`TabularStore`] and the document model persisted by
//! [`super::WorkbookFile`].

use super::{check_position, CellValue, TabularStore};
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display format attached to one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFormat {
    pub start_row: usize,
    pub pattern: String,
}

/// One named table of a workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
    /// Column number (1-indexed) to format.
    #[serde(default)]
    pub formats: BTreeMap<usize, ColumnFormat>,
    /// Opaque chart definitions attached to the sheet.
    #[serde(default)]
    pub charts: Vec<serde_json::Value>,
}

impl Sheet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn last_row(&self) -> usize {
        self.rows
            .iter()
            .rposition(|row| row.iter().any(|cell| !cell.is_blank()))
            .map_or(0, |index| index + 1)
    }
}

/// Workbook held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryWorkbook {
    #[serde(default)]
    sheets: Vec<Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    /// Format set on `column`, as `(start_row, pattern)`.
    pub fn column_format(&self, name: &str, column: usize) -> Option<(usize, String)> {
        self.sheet(name)?
            .formats
            .get(&column)
            .map(|f| (f.start_row, f.pattern.clone()))
    }

    /// Attach a chart definition to a sheet.
    pub fn add_chart(&mut self, name: &str, chart: serde_json::Value) -> Result<(), StoreError> {
        self.sheet_mut(name)?.charts.push(chart);
        Ok(())
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet, StoreError> {
        self.sheets
            .iter_mut()
            .find(|s| s.name == name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn sheet_or_error(&self, name: &str) -> Result<&Sheet, StoreError> {
        self.sheet(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }
}

impl TabularStore for MemoryWorkbook {
    fn has_table(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    fn ensure_table(&mut self, name: &str) -> Result<(), StoreError> {
        if !self.has_table(name) {
            self.sheets.push(Sheet::new(name));
        }
        Ok(())
    }

    fn clear_table(&mut self, name: &str) -> Result<(), StoreError> {
        let sheet = self.sheet_mut(name)?;
        sheet.rows.clear();
        sheet.formats.clear();
        sheet.charts.clear();
        Ok(())
    }

    fn last_row(&self, name: &str) -> Result<usize, StoreError> {
        Ok(self.sheet_or_error(name)?.last_row())
    }

    fn read_range(
        &self,
        name: &str,
        start_row: usize,
        start_column: usize,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<CellValue>>, StoreError> {
        check_position(start_row, start_column)?;
        let sheet = self.sheet_or_error(name)?;
        Ok((0..rows)
            .map(|r| {
                let stored = sheet.rows.get(start_row - 1 + r);
                (0..columns)
                    .map(|c| {
                        stored
                            .and_then(|row| row.get(start_column - 1 + c))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect())
    }

    fn write_range(
        &mut self,
        name: &str,
        start_row: usize,
        start_column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        check_position(start_row, start_column)?;
        let sheet = self.sheet_mut(name)?;
        for (r, cells) in values.iter().enumerate() {
            let row_index = start_row - 1 + r;
            if sheet.rows.len() <= row_index {
                sheet.rows.resize_with(row_index + 1, Vec::new);
            }
            let row = &mut sheet.rows[row_index];
            for (c, value) in cells.iter().enumerate() {
                let column_index = start_column - 1 + c;
                if row.len() <= column_index {
                    row.resize(column_index + 1, CellValue::Empty);
                }
                row[column_index] = value.clone();
            }
        }
        Ok(())
    }

    fn set_column_format(
        &mut self,
        name: &str,
        column: usize,
        start_row: usize,
        pattern: &str,
    ) -> Result<(), StoreError> {
        check_position(start_row, column)?;
        self.sheet_mut(name)?.formats.insert(
            column,
            ColumnFormat {
                start_row,
                pattern: pattern.to_string(),
            },
        );
        Ok(())
    }
}
