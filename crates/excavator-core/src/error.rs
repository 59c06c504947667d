//! Error types for excavator-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed A1 reference or column letters
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("row {0} is beyond the last row ({1})")]
    RowOutOfBounds(u32, u32),

    #[error("column {0} is beyond the last column ({1})")]
    ColumnOutOfBounds(u32, u16),

    #[error("a sheet named '{0}' already exists")]
    DuplicateSheetName(String),
}
