//! # excavator-csv
//!
//! CSV reader for sheet-excavator. A CSV file becomes a single-sheet
//! workbook whose sheet is named after the file stem.

mod error;
mod options;
mod reader;

pub use error::{CsvError, CsvResult};
pub use options::CsvReadOptions;
pub use reader::CsvReader;
