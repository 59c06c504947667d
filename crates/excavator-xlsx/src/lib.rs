//! # excavator-xlsx
//!
//! XLSX/XLSM (Office Open XML) reader for sheet-excavator.
//!
//! Only what extraction needs is read: sheet names and order, and every
//! cell's value (shared and inline strings, numbers, booleans, error codes,
//! cached formula results). Number formats are consulted solely to tell
//! dates apart from plain numbers.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
