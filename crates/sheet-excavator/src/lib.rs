//! # sheet-excavator
//!
//! Rule-driven batch extraction from spreadsheet workbooks.
//!
//! A JSON rule set says which sheets to look at (exact names or one-`*`
//! patterns such as `"Profil_*"`) and what to pull from each: named cells
//! (`single_cells`), one record per id-bearing row (`multirow_patterns`), or
//! a headed table (`dataframe`). The rule set is compiled once, then applied
//! to many files in parallel; each file yields one JSON document.
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//!
//! let rules = json!([
//!     {"sheets": ["Generell info"], "cells": ["d7", "m8"], "value_name": ["field", "od-id"]},
//!     {"sheets": ["Profil_*"], "skip_sheets": ["Profil_Total"], "break_if_null": "h7",
//!      "extractions": [
//!         {"function": "single_cells", "label": "project", "instructions": {"name": "h7"}}
//!      ]}
//! ]);
//!
//! let outcomes = sheet_excavator::extract(&["does-not-exist.xlsx"], &rules, 2)?;
//! assert_eq!(outcomes.len(), 1);
//! assert_eq!(outcomes[0].to_json()["error"]["kind"], "FileError");
//!
//! // A bad rule set fails before any file is touched
//! assert!(sheet_excavator::extract(&["a.xlsx"], &json!([{"sheets": ["x"], "cells": {"a": "7d"}}]), 2).is_err());
//! # Ok::<(), sheet_excavator::ConfigError>(())
//! ```
//!
//! ## Errors
//!
//! Only a [`ConfigError`] fails a call. A file that cannot be read becomes a
//! `FileError` marker in its own slot, and a sheet pattern that matches
//! nothing becomes a `SheetError` marker under the pattern's key; everything
//! else still runs.

pub mod batch;
pub mod document;
pub mod error;
pub mod extract;
pub mod loader;
pub mod progress;
pub mod rules;

mod resolve;

use std::path::Path;

pub use batch::{ExtractOptions, Extractor};
pub use document::{outcomes_to_json, Document, ExtractionValue, FileOutcome, SheetEntry};
pub use error::{ConfigError, ExtractError, FileError, Result, SheetError};
pub use progress::{NullProgress, ProgressSink};
pub use rules::RuleSet;

/// Compile `rules` and apply them to every file
///
/// Returns one outcome per file in input order, or the compile error if the
/// rule set is invalid.
pub fn extract<P>(files: &[P], rules: &serde_json::Value, concurrency: usize) -> Result<Vec<FileOutcome>>
where
    P: AsRef<Path> + Sync,
{
    let rules = RuleSet::compile(rules)?;
    Ok(Extractor::with_options(rules, ExtractOptions { concurrency }).run(files))
}

/// [`extract`] with progress messages delivered to `sink`
pub fn extract_with_progress<P, S>(
    sink: S,
    files: &[P],
    rules: &serde_json::Value,
    concurrency: usize,
) -> Result<Vec<FileOutcome>>
where
    P: AsRef<Path> + Sync,
    S: ProgressSink,
{
    let rules = RuleSet::compile(rules)?;
    Ok(Extractor::with_options(rules, ExtractOptions { concurrency }).run_with_progress(files, sink))
}
