//! Error types
//!
//! Errors are layered by how far they reach. A [`ConfigError`] aborts the
//! whole call before any file is opened. A [`FileError`] replaces one file's
//! document. A [`SheetError`] is recorded under its pattern's key and an
//! [`ExtractError`] under its extraction label; neither stops anything else.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for rule compilation and batch entry points
pub type Result<T> = std::result::Result<T, ConfigError>;

/// An invalid rule set
///
/// `at` locates the offending entry, e.g. `rules[1].extractions[0]`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Rule set text is not valid JSON
    #[error("rule set is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally wrong entry (wrong type, missing key, bad range)
    #[error("{at}: {message}")]
    Malformed { at: String, message: String },

    /// A function kind other than the three supported ones
    #[error("{at}: unknown function '{kind}' (expected single_cells, multirow_patterns or dataframe)")]
    UnknownFunction { at: String, kind: String },

    /// A cell reference or column letter that does not parse
    #[error("{at}: invalid reference '{reference}': {source}")]
    InvalidReference {
        at: String,
        reference: String,
        #[source]
        source: excavator_core::Error,
    },

    /// A pattern, extraction or instruction list with no entries
    #[error("{at}: must not be empty")]
    EmptyList { at: String },

    /// Positional `cells` and `value_name` lists of different lengths
    #[error("{at}: {cells} cells but {names} value names")]
    LengthMismatch {
        at: String,
        cells: usize,
        names: usize,
    },

    /// A sheet pattern with more than one `*`
    #[error("{at}: pattern '{pattern}' has more than one '*'")]
    InvalidPattern { at: String, pattern: String },

    /// Two extractions of one group writing the same label
    #[error("{at}: duplicate label '{label}'")]
    DuplicateLabel { at: String, label: String },

    /// A group using keys of more than one rule shape
    #[error("{at}: '{first}' cannot be combined with '{second}'")]
    MixedShapes {
        at: String,
        first: &'static str,
        second: &'static str,
    },
}

impl ConfigError {
    pub(crate) fn malformed(at: &str, message: impl Into<String>) -> Self {
        ConfigError::Malformed {
            at: at.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn empty(at: &str) -> Self {
        ConfigError::EmptyList { at: at.to_string() }
    }

    pub(crate) fn reference(at: &str, reference: &str, source: excavator_core::Error) -> Self {
        ConfigError::InvalidReference {
            at: at.to_string(),
            reference: reference.to_string(),
            source,
        }
    }
}

/// A file that could not be opened or read
#[derive(Debug, Error)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported file format: {} (expected .xlsx, .xlsm, .xls or .csv)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("failed to read workbook: {0}")]
    Xlsx(#[from] excavator_xlsx::XlsxError),

    #[error("failed to read legacy workbook: {0}")]
    Xls(#[from] excavator_xls::XlsError),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] excavator_csv::CsvError),

    /// The task panicked; the payload message is kept
    #[error("processing panicked: {0}")]
    Panicked(String),
}

/// A sheet pattern that resolved to nothing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("sheet '{0}' not found")]
    NotFound(String),

    #[error("no sheet matches pattern '{0}'")]
    NoMatch(String),
}

/// An extraction that failed on one sheet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("extraction panicked: {0}")]
    Panicked(String),
}

/// Text of a caught panic payload
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
