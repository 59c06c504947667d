//! CSV error types

use thiserror::Error;

pub type CsvResult<T> = std::result::Result<T, CsvError>;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed record, or text that is not UTF-8
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// More rows or columns than a sheet can address
    #[error(transparent)]
    Core(#[from] excavator_core::Error),
}
