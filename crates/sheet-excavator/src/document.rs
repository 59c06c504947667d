//! Per-file result documents
//!
//! A [`Document`] maps sheet (or failed pattern) keys to extraction labels to
//! values, in rule order. Errors sit at the level they occurred, as
//! `{"error": {"kind": ..., "message": ...}}` markers.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use excavator_core::{Workbook, Worksheet};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::error::{panic_message, ExtractError, FileError, SheetError};
use crate::extract;
use crate::resolve::{resolve_group, Resolved};
use crate::rules::{ExtractionSpec, RuleSet};

fn error_marker(kind: &str, message: String) -> Value {
    json!({ "error": { "kind": kind, "message": message } })
}

/// Outcome of one extraction on one sheet
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionValue {
    Value(Value),
    Error(ExtractError),
}

impl ExtractionValue {
    /// The extracted value, `None` for a failed extraction
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            ExtractionValue::Value(value) => Some(value),
            ExtractionValue::Error(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ExtractionValue::Value(value) => value.clone(),
            ExtractionValue::Error(e) => error_marker("ExtractError", e.to_string()),
        }
    }
}

/// Everything recorded under one document key
#[derive(Debug, Clone, PartialEq)]
pub enum SheetEntry {
    /// Extraction label to outcome, in rule order
    Extractions(IndexMap<String, ExtractionValue>),
    /// The pattern under this key resolved to nothing
    Error(SheetError),
}

impl SheetEntry {
    /// Outcome of the extraction stored under `label`
    pub fn get(&self, label: &str) -> Option<&ExtractionValue> {
        match self {
            SheetEntry::Extractions(map) => map.get(label),
            SheetEntry::Error(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            SheetEntry::Extractions(map) => Value::Object(
                map.iter()
                    .map(|(label, value)| (label.clone(), value.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            SheetEntry::Error(e) => error_marker("SheetError", e.to_string()),
        }
    }
}

/// The structured result for one workbook
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    sheets: IndexMap<String, SheetEntry>,
}

impl Document {
    /// Apply a rule set to a workbook
    ///
    /// Groups run in rule order; each resolved sheet gets every extraction of
    /// its group. A label already written on a sheet by an earlier group is
    /// stored as `label_2`, `label_3`, ...
    pub fn build(rules: &RuleSet, workbook: &Workbook) -> Self {
        let mut document = Document::default();

        for group in rules.groups() {
            for step in resolve_group(group, workbook) {
                match step {
                    Resolved::Sheet(sheet) => {
                        log::trace!("extracting from sheet '{}'", sheet.name());
                        for spec in group.extractions() {
                            let value = run_guarded(spec, sheet);
                            document.insert_value(sheet.name(), spec.label(), value);
                        }
                    }
                    Resolved::Failed { key, error } => {
                        log::debug!("{}: {}", workbook.path().display(), error);
                        document.insert_error(key, error);
                    }
                }
            }
        }

        document
    }

    /// Entry recorded under a sheet name or failed pattern
    pub fn get(&self, key: &str) -> Option<&SheetEntry> {
        self.sheets.get(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.sheets
                .iter()
                .map(|(key, entry)| (key.clone(), entry.to_json()))
                .collect::<Map<_, _>>(),
        )
    }

    fn insert_value(&mut self, sheet: &str, label: &str, value: ExtractionValue) {
        if !matches!(self.sheets.get(sheet), Some(SheetEntry::Extractions(_))) {
            // A real sheet outranks an error recorded under the same key
            self.sheets
                .insert(sheet.to_string(), SheetEntry::Extractions(IndexMap::new()));
        }
        if let Some(SheetEntry::Extractions(map)) = self.sheets.get_mut(sheet) {
            let key = unique_label(map, label);
            map.insert(key, value);
        }
    }

    fn insert_error(&mut self, key: String, error: SheetError) {
        if self.sheets.contains_key(&key) {
            log::debug!("'{}' already recorded, dropping: {}", key, error);
            return;
        }
        self.sheets.insert(key, SheetEntry::Error(error));
    }
}

fn unique_label(map: &IndexMap<String, ExtractionValue>, label: &str) -> String {
    if !map.contains_key(label) {
        return label.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", label, n))
        .find(|candidate| !map.contains_key(candidate))
        .unwrap_or_else(|| label.to_string())
}

fn run_guarded(spec: &ExtractionSpec, sheet: &Worksheet) -> ExtractionValue {
    match panic::catch_unwind(AssertUnwindSafe(|| extract::run(spec.extraction(), sheet))) {
        Ok(value) => ExtractionValue::Value(value),
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!(
                "extraction '{}' on sheet '{}' panicked: {}",
                spec.label(),
                sheet.name(),
                message
            );
            ExtractionValue::Error(ExtractError::Panicked(message))
        }
    }
}

/// Result of processing one input file
#[derive(Debug)]
pub enum FileOutcome {
    Extracted { path: PathBuf, document: Document },
    Failed { path: PathBuf, error: FileError },
}

impl FileOutcome {
    /// Input path this outcome belongs to
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Extracted { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            FileOutcome::Extracted { document, .. } => Some(document),
            FileOutcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&FileError> {
        match self {
            FileOutcome::Extracted { .. } => None,
            FileOutcome::Failed { error, .. } => Some(error),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, FileOutcome::Failed { .. })
    }

    /// The document, or a `FileError` marker in its place
    pub fn to_json(&self) -> Value {
        match self {
            FileOutcome::Extracted { document, .. } => document.to_json(),
            FileOutcome::Failed { error, .. } => error_marker("FileError", error.to_string()),
        }
    }
}

impl Serialize for FileOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// JSON array of outcomes, `output[i]` belonging to `files[i]`
pub fn outcomes_to_json(outcomes: &[FileOutcome]) -> Value {
    Value::Array(outcomes.iter().map(FileOutcome::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new("field.xlsx");

        let mut info = Worksheet::new("Generell info");
        info.set_cell_value("D7", "Snorre").unwrap();
        info.set_cell_value("M8", 43718).unwrap();
        wb.add_worksheet(info).unwrap();

        for (name, project) in [("Profil_1", "Vigdis"), ("Profil_2", "Tordis")] {
            let mut ws = Worksheet::new(name);
            ws.set_cell_value("H7", project).unwrap();
            wb.add_worksheet(ws).unwrap();
        }
        wb
    }

    #[test]
    fn test_build_nests_sheet_label_value() {
        let rules = RuleSet::compile(&json!([
            {"sheets": ["Generell info"], "cells": ["d7", "m8"], "value_name": ["field", "od-id"]},
            {"sheets": ["Profil_*"], "extractions": [
                {"function": "single_cells", "label": "project", "instructions": {"name": "h7"}}
            ]}
        ]))
        .unwrap();

        let doc = Document::build(&rules, &workbook());
        assert_eq!(
            doc.to_json(),
            json!({
                "Generell info": {"single_cells": {"field": "Snorre", "od-id": 43718}},
                "Profil_1": {"project": {"name": "Vigdis"}},
                "Profil_2": {"project": {"name": "Tordis"}}
            })
        );
        assert_eq!(
            doc.keys().collect::<Vec<_>>(),
            ["Generell info", "Profil_1", "Profil_2"]
        );
    }

    #[test]
    fn test_sheet_errors_recorded_under_pattern_key() {
        let rules = RuleSet::compile(&json!([
            {"sheets": ["Missing", "Ressurser_*"], "cells": {"a": "A1"}},
            {"sheets": ["Generell info"], "cells": {"field": "d7"}}
        ]))
        .unwrap();

        let doc = Document::build(&rules, &workbook());
        assert_eq!(
            doc.to_json(),
            json!({
                "Missing": {"error": {"kind": "SheetError", "message": "sheet 'Missing' not found"}},
                "Ressurser_*": {"error": {"kind": "SheetError", "message": "no sheet matches pattern 'Ressurser_*'"}},
                "Generell info": {"single_cells": {"field": "Snorre"}}
            })
        );
        assert!(matches!(doc.get("Missing"), Some(SheetEntry::Error(SheetError::NotFound(_)))));
    }

    #[test]
    fn test_label_collisions_across_groups() {
        let rules = RuleSet::compile(&json!([
            {"sheets": ["Generell info"], "cells": {"field": "d7"}},
            {"sheets": ["Generell info"], "cells": {"od-id": "m8"}},
            {"sheets": ["Generell info"], "cells": {"again": "d7"}}
        ]))
        .unwrap();

        let doc = Document::build(&rules, &workbook());
        let entry = doc.get("Generell info").unwrap();
        assert_eq!(
            entry.to_json(),
            json!({
                "single_cells": {"field": "Snorre"},
                "single_cells_2": {"od-id": 43718},
                "single_cells_3": {"again": "Snorre"}
            })
        );
        assert_eq!(
            entry.get("single_cells_2").and_then(ExtractionValue::as_value),
            Some(&json!({"od-id": 43718}))
        );
    }

    #[test]
    fn test_failed_outcome_marker() {
        let outcome = FileOutcome::Failed {
            path: PathBuf::from("gone.xlsx"),
            error: FileError::NotFound(PathBuf::from("gone.xlsx")),
        };

        assert!(outcome.is_failed());
        assert_eq!(outcome.path(), Path::new("gone.xlsx"));
        assert_eq!(
            outcome.to_json(),
            json!({"error": {"kind": "FileError", "message": "file not found: gone.xlsx"}})
        );
        assert_eq!(
            serde_json::to_string(&outcome).unwrap(),
            r#"{"error":{"kind":"FileError","message":"file not found: gone.xlsx"}}"#
        );
    }

    #[test]
    fn test_extract_error_marker() {
        let value = ExtractionValue::Error(ExtractError::Panicked("index out of range".into()));
        assert_eq!(
            value.to_json(),
            json!({"error": {"kind": "ExtractError", "message": "extraction panicked: index out of range"}})
        );
        assert_eq!(value.as_value(), None);
    }
}
