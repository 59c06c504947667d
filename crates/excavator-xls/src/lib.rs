//! # excavator-xls
//!
//! XLS (BIFF8, Excel 97-2003) reader for sheet-excavator.
//!
//! The `Workbook` stream is pulled out of the OLE compound file and walked
//! record by record. Only cell values are kept: shared and inline strings,
//! numbers, booleans, error codes and cached formula results. FORMAT and XF
//! records are read solely to tell dates apart from plain numbers.

pub mod biff;
pub mod error;
pub mod reader;

mod formats;

pub use error::{XlsError, XlsResult};
pub use reader::XlsReader;
