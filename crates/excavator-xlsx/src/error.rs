//! Errors raised while reading an XLSX package

use thiserror::Error;

pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A zip archive that is not an Office Open XML package
    #[error("not a spreadsheet package: {0}")]
    InvalidFormat(String),

    /// A part the workbook needs is absent from the archive
    #[error("package part '{0}' is missing")]
    MissingPart(String),

    /// Cell data that cannot be interpreted
    #[error("{0}")]
    Parse(String),

    #[error(transparent)]
    Core(#[from] excavator_core::Error),
}
