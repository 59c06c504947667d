//! # excavator-core
//!
//! Core grid types for the sheet-excavator extraction engine.
//!
//! This crate provides the read-side data model every loader produces and
//! every extraction function consumes:
//! - [`CellAddress`] and [`CellRange`] - A1-style references and their 0-based coordinates
//! - [`CellValue`] - Typed cell contents (text, number, boolean, date, error, empty)
//! - [`Worksheet`] - A named sparse grid of cell values
//! - [`Workbook`] - An ordered collection of worksheets
//!
//! ## Example
//!
//! ```rust
//! use excavator_core::{CellAddress, CellValue, Workbook, Worksheet};
//!
//! let mut sheet = Worksheet::new("Profil_1");
//! sheet.set_cell_value("H7", "Snorre").unwrap();
//!
//! let mut workbook = Workbook::new("field.xlsx");
//! workbook.add_worksheet(sheet).unwrap();
//!
//! let addr = CellAddress::parse("h7").unwrap();
//! assert_eq!((addr.row, addr.col), (6, 7));
//!
//! let sheet = workbook.worksheet_by_name("Profil_1").unwrap();
//! assert_eq!(sheet.value_at(addr.row, addr.col).as_string(), Some("Snorre"));
//! assert_eq!(sheet.value_at(500, 500), &CellValue::Empty);
//! ```

pub mod cell;
pub mod datetime;
pub mod error;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;
