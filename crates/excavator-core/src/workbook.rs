//! Workbook type - an opened spreadsheet file

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;

/// A workbook: the file it was read from plus its worksheets in file order
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Source file path
    path: PathBuf,
    /// Worksheets in the order the file lists them
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create an empty workbook for the given source path
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            worksheets: Vec::new(),
        }
    }

    /// Path of the file this workbook was read from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Iterate over all worksheets in file order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Sheet names in file order
    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.worksheets.iter().map(Worksheet::name)
    }

    /// Append a worksheet, rejecting duplicate names
    pub fn add_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        if self.worksheet_by_name(worksheet.name()).is_some() {
            return Err(Error::DuplicateSheetName(worksheet.name().to_string()));
        }
        let index = self.worksheets.len();
        self.worksheets.push(worksheet);
        Ok(index)
    }
}
