//! Cell storage implementation
//!
//! Sparse storage for worksheet cells. Only non-empty cells are stored, in a
//! row-based `BTreeMap` so rows iterate in order.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellValue>>`
#[derive(Debug, Default, Clone)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellValue>>,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell value, `None` when nothing is stored there
    pub fn get(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Set a cell value
    ///
    /// Setting [`CellValue::Empty`] removes the cell.
    pub fn set(&mut self, row: u32, col: u16, value: CellValue) {
        if value.is_empty() {
            if let Some(row_map) = self.rows.get_mut(&row) {
                row_map.remove(&col);
                if row_map.is_empty() {
                    self.rows.remove(&row);
                }
            }
        } else {
            self.rows.entry(row).or_default().insert(col, value);
        }
    }

    /// Number of stored (non-empty) cells
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Smallest range covering every stored cell
    pub fn bounds(&self) -> Option<CellRange> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0;
        for cols in self.rows.values() {
            if let (Some(first), Some(last)) = (cols.keys().next(), cols.keys().next_back()) {
                min_col = min_col.min(*first);
                max_col = max_col.max(*last);
            }
        }

        Some(CellRange::from_indices(min_row, min_col, max_row, max_col))
    }
}
