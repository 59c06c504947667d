//! Rule-shape detection and normalization

use std::collections::HashSet;

use serde_json::{Map, Value};

use super::instructions;
use super::{Extraction, ExtractionSpec, FieldRefs, Pattern, RuleSet, SheetGroup};
use crate::error::{ConfigError, Result};
use crate::extract::SingleCells;

const GROUP_KEYS: &[&str] = &[
    "sheets",
    "patterns",
    "skip_sheets",
    "break_if_null",
    "extractions",
    "cells",
    "value_name",
];

const LEGACY_LABEL: &str = "single_cells";

/// The rule shapes a group may be written in
enum Shape<'a> {
    /// `"extractions": [{"function", "label", "instructions"}, ...]`
    Canonical(&'a [Value]),
    /// `"cells": {"field": "d7", ...}`
    CellMap(&'a Map<String, Value>),
    /// `"cells": ["d7", ...], "value_name": ["field", ...]`
    Positional {
        cells: &'a [Value],
        names: &'a Value,
    },
}

pub(super) fn compile_rule_set(rules: &Value) -> Result<RuleSet> {
    let groups = rules
        .as_array()
        .ok_or_else(|| ConfigError::malformed("rules", "expected a list of sheet groups"))?;

    let groups = groups
        .iter()
        .enumerate()
        .map(|(i, group)| compile_group(&format!("rules[{}]", i), group))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "compiled {} sheet groups, {} extractions",
        groups.len(),
        groups.iter().map(|g| g.extractions.len()).sum::<usize>()
    );
    Ok(RuleSet { groups })
}

fn compile_group(at: &str, group: &Value) -> Result<SheetGroup> {
    let group = group
        .as_object()
        .ok_or_else(|| ConfigError::malformed(at, "sheet group must be an object"))?;

    for key in group.keys() {
        if !GROUP_KEYS.contains(&key.as_str()) {
            log::warn!("{}: ignoring unknown key '{}'", at, key);
        }
    }

    let patterns = compile_patterns(at, group)?;
    let skip_sheets = match group.get("skip_sheets") {
        None | Some(Value::Null) => Vec::new(),
        Some(value) => string_list(&format!("{}.skip_sheets", at), value)?
            .into_iter()
            .map(str::to_string)
            .collect(),
    };
    let break_if_null = match group.get("break_if_null") {
        None | Some(Value::Null) => None,
        Some(value) => Some(instructions::cell_reference(
            &format!("{}.break_if_null", at),
            value,
        )?),
    };

    let extractions = match detect_shape(at, group)? {
        Shape::Canonical(specs) => compile_extractions(&format!("{}.extractions", at), specs)?,
        Shape::CellMap(fields) => vec![ExtractionSpec {
            label: LEGACY_LABEL.to_string(),
            extraction: Extraction::SingleCells(instructions::single_cells(
                &format!("{}.cells", at),
                fields,
            )?),
        }],
        Shape::Positional { cells, names } => vec![ExtractionSpec {
            label: LEGACY_LABEL.to_string(),
            extraction: Extraction::SingleCells(compile_positional(at, cells, names)?),
        }],
    };

    Ok(SheetGroup {
        patterns,
        skip_sheets,
        break_if_null,
        extractions,
    })
}

fn detect_shape<'a>(at: &str, group: &'a Map<String, Value>) -> Result<Shape<'a>> {
    let extractions = group.get("extractions");
    let cells = group.get("cells");
    let names = group.get("value_name");

    match (extractions, cells, names) {
        (Some(_), Some(_), _) => Err(ConfigError::MixedShapes {
            at: at.to_string(),
            first: "extractions",
            second: "cells",
        }),
        (Some(_), None, Some(_)) => Err(ConfigError::MixedShapes {
            at: at.to_string(),
            first: "extractions",
            second: "value_name",
        }),
        (Some(Value::Array(specs)), None, None) => Ok(Shape::Canonical(specs)),
        (Some(_), None, None) => Err(ConfigError::malformed(
            &format!("{}.extractions", at),
            "expected a list of extractions",
        )),
        (None, Some(Value::Object(fields)), None) => Ok(Shape::CellMap(fields)),
        (None, Some(Value::Object(_)), Some(_)) => Err(ConfigError::MixedShapes {
            at: at.to_string(),
            first: "cells mapping",
            second: "value_name",
        }),
        (None, Some(Value::Array(cells)), Some(names)) => Ok(Shape::Positional { cells, names }),
        (None, Some(Value::Array(_)), None) => Err(ConfigError::malformed(
            at,
            "a 'cells' list needs a matching 'value_name' list",
        )),
        (None, Some(_), _) => Err(ConfigError::malformed(
            &format!("{}.cells", at),
            "expected a mapping of field to reference or a list of references",
        )),
        (None, None, _) => Err(ConfigError::malformed(
            at,
            "missing 'extractions' (or legacy 'cells')",
        )),
    }
}

fn compile_patterns(at: &str, group: &Map<String, Value>) -> Result<Vec<Pattern>> {
    let (key, value) = match (group.get("sheets"), group.get("patterns")) {
        (Some(_), Some(_)) => {
            return Err(ConfigError::malformed(
                at,
                "'sheets' and 'patterns' are aliases; give only one",
            ))
        }
        (Some(value), None) => ("sheets", value),
        (None, Some(value)) => ("patterns", value),
        (None, None) => return Err(ConfigError::malformed(at, "missing 'sheets'")),
    };

    let at = format!("{}.{}", at, key);
    let texts = string_list(&at, value)?;
    if texts.is_empty() {
        return Err(ConfigError::empty(&at));
    }

    texts
        .into_iter()
        .map(|text| {
            if text.is_empty() {
                return Err(ConfigError::malformed(&at, "sheet pattern must not be empty"));
            }
            Pattern::parse(text).ok_or_else(|| ConfigError::InvalidPattern {
                at: at.clone(),
                pattern: text.to_string(),
            })
        })
        .collect()
}

fn compile_extractions(at: &str, specs: &[Value]) -> Result<Vec<ExtractionSpec>> {
    if specs.is_empty() {
        return Err(ConfigError::empty(at));
    }

    let mut labels = HashSet::new();
    let mut compiled = Vec::with_capacity(specs.len());

    for (i, spec) in specs.iter().enumerate() {
        let at = format!("{}[{}]", at, i);
        let spec = compile_extraction(&at, spec)?;
        if !labels.insert(spec.label.clone()) {
            return Err(ConfigError::DuplicateLabel {
                at,
                label: spec.label,
            });
        }
        compiled.push(spec);
    }

    Ok(compiled)
}

fn compile_extraction(at: &str, spec: &Value) -> Result<ExtractionSpec> {
    let spec = spec
        .as_object()
        .ok_or_else(|| ConfigError::malformed(at, "extraction must be an object"))?;

    for key in spec.keys() {
        if !matches!(key.as_str(), "function" | "label" | "instructions") {
            log::warn!("{}: ignoring unknown key '{}'", at, key);
        }
    }

    let kind = spec
        .get("function")
        .ok_or_else(|| ConfigError::malformed(at, "missing 'function'"))?
        .as_str()
        .ok_or_else(|| ConfigError::malformed(at, "'function' must be a string"))?;

    let instructions_at = format!("{}.instructions", at);
    let body = spec
        .get("instructions")
        .ok_or_else(|| ConfigError::malformed(at, "missing 'instructions'"))?
        .as_object()
        .ok_or_else(|| ConfigError::malformed(&instructions_at, "expected an object"))?;

    let extraction = match kind {
        "single_cells" => {
            Extraction::SingleCells(instructions::single_cells(&instructions_at, body)?)
        }
        "multirow_patterns" => {
            Extraction::MultirowPatterns(instructions::multirow_patterns(&instructions_at, body)?)
        }
        "dataframe" => Extraction::Dataframe(instructions::dataframe(&instructions_at, body)?),
        other => {
            return Err(ConfigError::UnknownFunction {
                at: at.to_string(),
                kind: other.to_string(),
            })
        }
    };

    let label = match spec.get("label") {
        None | Some(Value::Null) => extraction.kind().to_string(),
        Some(Value::String(label)) if !label.is_empty() => label.clone(),
        Some(_) => {
            return Err(ConfigError::malformed(
                at,
                "'label' must be a non-empty string",
            ))
        }
    };

    Ok(ExtractionSpec { label, extraction })
}

fn compile_positional(at: &str, cells: &[Value], names: &Value) -> Result<SingleCells> {
    let names_at = format!("{}.value_name", at);
    let names = string_list(&names_at, names)?;

    if cells.len() != names.len() {
        return Err(ConfigError::LengthMismatch {
            at: at.to_string(),
            cells: cells.len(),
            names: names.len(),
        });
    }
    if cells.is_empty() {
        return Err(ConfigError::empty(&format!("{}.cells", at)));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(cells.len());
    for (i, (cell, name)) in cells.iter().zip(names).enumerate() {
        if !seen.insert(name) {
            return Err(ConfigError::malformed(
                &names_at,
                format!("duplicate value name '{}'", name),
            ));
        }
        let address = instructions::cell_reference(&format!("{}.cells[{}]", at, i), cell)?;
        fields.push((name.to_string(), FieldRefs::scalar(address)));
    }

    Ok(SingleCells { fields })
}

fn string_list<'a>(at: &str, value: &'a Value) -> Result<Vec<&'a str>> {
    value
        .as_array()
        .ok_or_else(|| ConfigError::malformed(at, "expected a list of strings"))?
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| ConfigError::malformed(at, format!("expected a string, got {}", item)))
        })
        .collect()
}
