//! Cell values as read from a workbook

use std::fmt;
use std::sync::Arc;

use crate::datetime;

/// The value held by one cell
///
/// Formulas are not kept; a formula cell carries its cached result.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    String(SharedString),
    /// Excel serial number (1900 date system) in a date-formatted cell
    DateTime(f64),
    Error(CellError),
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        CellValue::String(SharedString::new(s))
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Empty, or a string of nothing but whitespace
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.as_str().trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric payload of number and date cells
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Render a date cell as `YYYY-MM-DD HH:MM:SS`
    ///
    /// Returns `None` for non-date cells and for serials outside the
    /// representable calendar range.
    pub fn as_iso_datetime(&self) -> Option<String> {
        match self {
            CellValue::DateTime(serial) => datetime::format_excel_serial(*serial),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s.as_str()),
            CellValue::DateTime(serial) => match self.as_iso_datetime() {
                Some(text) => f.write_str(&text),
                None => write!(f, "{}", serial),
            },
            CellValue::Error(e) => f.write_str(e.as_str()),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

/// Excel error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    Null,
    Div0,
    Value,
    Ref,
    Name,
    Num,
    Na,
    GettingData,
    Spill,
    Calc,
}

const ERROR_CODES: [(CellError, &str); 10] = [
    (CellError::Null, "#NULL!"),
    (CellError::Div0, "#DIV/0!"),
    (CellError::Value, "#VALUE!"),
    (CellError::Ref, "#REF!"),
    (CellError::Name, "#NAME?"),
    (CellError::Num, "#NUM!"),
    (CellError::Na, "#N/A"),
    (CellError::GettingData, "#GETTING_DATA"),
    (CellError::Spill, "#SPILL!"),
    (CellError::Calc, "#CALC!"),
];

impl CellError {
    /// The code as Excel displays it, e.g. `#DIV/0!`
    pub fn as_str(&self) -> &'static str {
        ERROR_CODES
            .iter()
            .find(|(error, _)| error == self)
            .map(|(_, code)| *code)
            .unwrap_or("#VALUE!")
    }

    /// Parse an error code (case-insensitive, surrounding space ignored)
    pub fn from_code(s: &str) -> Option<Self> {
        let s = s.trim();
        ERROR_CODES
            .iter()
            .find(|(_, code)| code.eq_ignore_ascii_case(s))
            .map(|(error, _)| *error)
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable string shared between cells
///
/// Cells read from the same shared-string table entry point at one allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString(Arc::from(s))
    }
}
