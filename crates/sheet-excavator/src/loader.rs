//! Workbook loading by file extension

use std::path::Path;

use excavator_core::Workbook;
use excavator_csv::{CsvReadOptions, CsvReader};
use excavator_xls::XlsReader;
use excavator_xlsx::XlsxReader;

use crate::error::FileError;

/// File formats the loader can open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Office Open XML workbook (`.xlsx`, `.xlsm`)
    Xlsx,
    /// Excel 97-2003 binary workbook (`.xls`)
    Xls,
    /// Comma-separated values, read as a single sheet (`.csv`)
    Csv,
}

impl SourceFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(SourceFormat::Xlsx),
            "xls" => Some(SourceFormat::Xls),
            "csv" => Some(SourceFormat::Csv),
            _ => None,
        }
    }
}

/// Open a workbook, choosing the reader by extension
pub fn open_workbook(path: &Path) -> Result<Workbook, FileError> {
    if !path.is_file() {
        return Err(FileError::NotFound(path.to_path_buf()));
    }

    let format = SourceFormat::from_path(path)
        .ok_or_else(|| FileError::UnsupportedFormat(path.to_path_buf()))?;

    let workbook = match format {
        SourceFormat::Xlsx => XlsxReader::read_file(path)?,
        SourceFormat::Xls => XlsReader::read_file(path)?,
        SourceFormat::Csv => CsvReader::read_file(path, &CsvReadOptions::default())?,
    };

    log::debug!(
        "opened {} ({:?}, {} sheets)",
        path.display(),
        format,
        workbook.sheet_count()
    );
    Ok(workbook)
}
