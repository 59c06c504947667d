//! Worksheet type

use crate::cell::{CellAddress, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

static EMPTY: CellValue = CellValue::Empty;

/// A worksheet: a named sparse grid of cell values
///
/// Lookups never fail. Coordinates outside the stored cells, including
/// coordinates beyond the sheet limits, read as [`CellValue::Empty`].
#[derive(Debug, Clone)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell value by row and column indices
    pub fn value_at(&self, row: u32, col: u16) -> &CellValue {
        self.cells.get(row, col).unwrap_or(&EMPTY)
    }

    /// Get a cell value by resolved address
    pub fn value(&self, addr: CellAddress) -> &CellValue {
        self.value_at(addr.row, addr.col)
    }

    /// Get a cell value by address string (e.g., "H7")
    pub fn value_by_ref(&self, address: &str) -> Result<&CellValue> {
        Ok(self.value(CellAddress::parse(address)?))
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col as u32, MAX_COLS - 1));
        }

        self.cells.set(row, col, value.into());
        Ok(())
    }

    /// Smallest range covering every non-empty cell, `None` for an empty sheet
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells.bounds()
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
