//! Errors raised while reading an XLS workbook

use thiserror::Error;

pub type XlsResult<T> = std::result::Result<T, XlsError>;

#[derive(Debug, Error)]
pub enum XlsError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    /// Not an OLE compound file, or one without a workbook stream
    #[error("not an XLS workbook: {0}")]
    InvalidFormat(String),

    /// BIFF5 and older (Excel 95 and before)
    #[error("unsupported BIFF version 0x{0:04X} (only BIFF8 is read)")]
    UnsupportedVersion(u16),

    #[error("workbook is password protected")]
    Encrypted,

    /// Record data that cannot be interpreted
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] excavator_core::Error),
}
