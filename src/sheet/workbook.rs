//! Workbook file store: a JSON document on disk, rewritten after every mutation so each
//! write-back is durable on its own.

use super::memory::MemoryWorkbook;
use super::{CellValue, TabularStore};
use crate::error::StoreError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct WorkbookFile {
    path: PathBuf,
    workbook: MemoryWorkbook,
}

impl WorkbookFile {
    /// Open the workbook at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let workbook = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            if contents.trim().is_empty() {
                MemoryWorkbook::new()
            } else {
                serde_json::from_str(&contents).map_err(|e| {
                    StoreError::Corrupt(format!("{}: {}", path.display(), e))
                })?
            }
        } else {
            MemoryWorkbook::new()
        };
        Ok(Self { path, workbook })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn workbook(&self) -> &MemoryWorkbook {
        &self.workbook
    }

    fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(&self.workbook)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Workbook saved");
        Ok(())
    }
}

impl TabularStore for WorkbookFile {
    fn has_table(&self, name: &str) -> bool {
        self.workbook.has_table(name)
    }

    fn ensure_table(&mut self, name: &str) -> Result<(), StoreError> {
        if self.workbook.has_table(name) {
            return Ok(());
        }
        self.workbook.ensure_table(name)?;
        self.save()
    }

    fn clear_table(&mut self, name: &str) -> Result<(), StoreError> {
        self.workbook.clear_table(name)?;
        self.save()
    }

    fn last_row(&self, name: &str) -> Result<usize, StoreError> {
        self.workbook.last_row(name)
    }

    fn read_range(
        &self,
        name: &str,
        start_row: usize,
        start_column: usize,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<CellValue>>, StoreError> {
        self.workbook
            .read_range(name, start_row, start_column, rows, columns)
    }

    fn write_range(
        &mut self,
        name: &str,
        start_row: usize,
        start_column: usize,
        values: &[Vec<CellValue>],
    ) -> Result<(), StoreError> {
        self.workbook
            .write_range(name, start_row, start_column, values)?;
        self.save()
    }

    fn set_column_format(
        &mut self,
        name: &str,
        column: usize,
        start_row: usize,
        pattern: &str,
    ) -> Result<(), StoreError> {
        self.workbook
            .set_column_format(name, column, start_row, pattern)?;
        self.save()
    }
}
