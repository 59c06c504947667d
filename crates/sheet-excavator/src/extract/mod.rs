//! Extraction functions
//!
//! Each function turns one resolved sheet plus its compiled instructions into
//! a JSON value. They never fail at run time: every reference was validated
//! when the rule set was compiled, and an empty or missing cell reads as
//! `null`.

mod dataframe;
mod multirow;
mod single_cells;

pub use dataframe::{Dataframe, Orient};
pub use multirow::{MultirowOutput, MultirowPatterns};
pub use single_cells::SingleCells;

use excavator_core::{CellValue, Worksheet};
use serde_json::Value;

use crate::rules::Extraction;

/// Largest integer a JSON consumer can hold in a double without loss
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Run one extraction against one sheet
pub fn run(extraction: &Extraction, sheet: &Worksheet) -> Value {
    match extraction {
        Extraction::SingleCells(cells) => cells.extract(sheet),
        Extraction::MultirowPatterns(rows) => rows.extract(sheet),
        Extraction::Dataframe(frame) => frame.extract(sheet),
    }
}

/// JSON form of a cell value
///
/// Strings are trimmed and whitespace-only strings count as empty. Integral
/// numbers within the exactly representable range become JSON integers.
/// Dates render as `YYYY-MM-DD HH:MM:SS`; error cells as their code.
pub fn cell_to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => Value::Null,
        CellValue::String(s) => match s.as_str().trim() {
            "" => Value::Null,
            trimmed => Value::String(trimmed.to_string()),
        },
        CellValue::Number(n) => number_to_json(*n),
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::DateTime(serial) => value
            .as_iso_datetime()
            .map(Value::String)
            .unwrap_or_else(|| number_to_json(*serial)),
        CellValue::Error(e) => Value::String(e.as_str().to_string()),
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// Text form of a cell, `None` when it reads as empty
pub(crate) fn cell_text(value: &CellValue) -> Option<String> {
    match cell_to_json(value) {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use excavator_core::CellError;
    use serde_json::json;

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&CellValue::Empty), Value::Null);
        assert_eq!(cell_to_json(&CellValue::string("  Snorre ")), json!("Snorre"));
        assert_eq!(cell_to_json(&CellValue::string(" \t ")), Value::Null);
        assert_eq!(cell_to_json(&CellValue::Number(25.0)), json!(25));
        assert_eq!(cell_to_json(&CellValue::Number(-3.0)), json!(-3));
        assert_eq!(cell_to_json(&CellValue::Number(2.5)), json!(2.5));
        assert_eq!(cell_to_json(&CellValue::Number(1e300)), json!(1e300));
        assert_eq!(cell_to_json(&CellValue::Boolean(false)), json!(false));
        assert_eq!(
            cell_to_json(&CellValue::DateTime(44927.25)),
            json!("2023-01-01 06:00:00")
        );
        assert_eq!(cell_to_json(&CellValue::DateTime(-1.0)), json!(-1));
        assert_eq!(cell_to_json(&CellValue::Error(CellError::Na)), json!("#N/A"));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&CellValue::string(" Oil ")), Some("Oil".into()));
        assert_eq!(cell_text(&CellValue::Number(2021.0)), Some("2021".into()));
        assert_eq!(cell_text(&CellValue::Boolean(true)), Some("true".into()));
        assert_eq!(cell_text(&CellValue::Empty), None);
    }
}
