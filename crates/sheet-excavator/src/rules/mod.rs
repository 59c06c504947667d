//! Compiled rule sets
//!
//! A rule set arrives as JSON in one of three historical shapes and is
//! compiled once into the types below. Everything downstream (resolver,
//! extraction functions, aggregator) works on the compiled form only.
//!
//! Canonical shape:
//!
//! ```json
//! [
//!   {
//!     "sheets": ["Profil_*"],
//!     "skip_sheets": ["Profil_Total"],
//!     "break_if_null": "h7",
//!     "extractions": [
//!       {"function": "single_cells", "label": "project",
//!        "instructions": {"name": "h7", "partners": ["h9", "h10"]}},
//!       {"function": "multirow_patterns", "label": "wells",
//!        "instructions": {"row_range": [28, 44], "unique_id": "B",
//!                         "columns": {"name": "C", "depths": ["D", "E"]}}},
//!       {"function": "dataframe", "label": "profile",
//!        "instructions": {"row_range": [5, 40], "column_range": ["A", "F"],
//!                         "header_row": [3, 4], "separator": " "}}
//!     ]
//!   }
//! ]
//! ```
//!
//! Legacy groups carry `"cells"` instead of `"extractions"`: either a mapping
//! `{"field": "d7"}` or a list `["d7", "m8"]` paired by position with
//! `"value_name": ["field", "od-id"]`. Both compile to one `single_cells`
//! extraction labelled `single_cells`.

mod compile;
mod instructions;

use std::fmt;
use std::str::FromStr;

use excavator_core::CellAddress;
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::extract::{Dataframe, MultirowPatterns, SingleCells};

/// A validated, immutable rule set
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    groups: Vec<SheetGroup>,
}

impl RuleSet {
    /// Compile a rule set from its JSON form
    pub fn compile(rules: &Value) -> Result<Self> {
        compile::compile_rule_set(rules)
    }

    /// Parse and compile a rule set from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::compile(&value)
    }

    /// Sheet groups in rule order
    pub fn groups(&self) -> &[SheetGroup] {
        &self.groups
    }

    /// Check if the rule set has no groups
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromStr for RuleSet {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_json_str(s)
    }
}

/// Sheet patterns plus the extractions applied to every sheet they resolve to
#[derive(Debug, Clone)]
pub struct SheetGroup {
    pub(crate) patterns: Vec<Pattern>,
    pub(crate) skip_sheets: Vec<String>,
    pub(crate) break_if_null: Option<CellAddress>,
    pub(crate) extractions: Vec<ExtractionSpec>,
}

impl SheetGroup {
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn skip_sheets(&self) -> &[String] {
        &self.skip_sheets
    }

    pub fn break_if_null(&self) -> Option<CellAddress> {
        self.break_if_null
    }

    pub fn extractions(&self) -> &[ExtractionSpec] {
        &self.extractions
    }

    pub(crate) fn is_skipped(&self, sheet_name: &str) -> bool {
        self.skip_sheets.iter().any(|s| s == sheet_name)
    }
}

/// A sheet-name pattern: an exact name or a name with one `*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Literal(String),
    Wildcard(Wildcard),
}

impl Pattern {
    /// Parse a pattern; `None` when it holds more than one `*`
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.splitn(3, '*');
        let prefix = parts.next().unwrap_or_default();
        match (parts.next(), parts.next()) {
            (None, _) => Some(Pattern::Literal(text.to_string())),
            (Some(suffix), None) => Some(Pattern::Wildcard(Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            })),
            (Some(_), Some(_)) => None,
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(name) => f.write_str(name),
            Pattern::Wildcard(w) => write!(f, "{}*{}", w.prefix, w.suffix),
        }
    }
}

/// A single-`*` pattern split around the star
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wildcard {
    prefix: String,
    suffix: String,
}

impl Wildcard {
    /// The part of `name` matched by `*`, if `name` matches at all
    pub fn capture<'n>(&self, name: &'n str) -> Option<&'n str> {
        let fixed = self.prefix.len() + self.suffix.len();
        if name.len() < fixed || !name.starts_with(&self.prefix) || !name.ends_with(&self.suffix)
        {
            return None;
        }
        Some(&name[self.prefix.len()..name.len() - self.suffix.len()])
    }
}

/// One labelled extraction of a group
#[derive(Debug, Clone)]
pub struct ExtractionSpec {
    pub(crate) label: String,
    pub(crate) extraction: Extraction,
}

impl ExtractionSpec {
    /// Output label (defaults to the function kind)
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn extraction(&self) -> &Extraction {
        &self.extraction
    }
}

/// Compiled instructions, one variant per extraction function
#[derive(Debug, Clone)]
pub enum Extraction {
    SingleCells(SingleCells),
    MultirowPatterns(MultirowPatterns),
    Dataframe(Dataframe),
}

impl Extraction {
    /// Function kind as written in rule sets
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::SingleCells(_) => "single_cells",
            Extraction::MultirowPatterns(_) => "multirow_patterns",
            Extraction::Dataframe(_) => "dataframe",
        }
    }
}

/// Field instruction normalized to a list of references
///
/// `scalar` records whether the rule gave one reference (output is a single
/// value) or a list (output is the list of non-empty values).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRefs<T> {
    pub(crate) refs: Vec<T>,
    pub(crate) scalar: bool,
}

impl<T> FieldRefs<T> {
    pub(crate) fn scalar(item: T) -> Self {
        Self {
            refs: vec![item],
            scalar: true,
        }
    }

    pub(crate) fn list(refs: Vec<T>) -> Self {
        Self {
            refs,
            scalar: false,
        }
    }

    pub fn refs(&self) -> &[T] {
        &self.refs
    }

    pub fn is_scalar(&self) -> bool {
        self.scalar
    }
}

/// Inclusive 0-based row span; `start > end` is an empty span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub(crate) start: u32,
    pub(crate) end: u32,
}

impl RowRange {
    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }
}
