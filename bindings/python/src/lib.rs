//! Python bindings for sheet-excavator
//!
//! Exposes the batch extractor as two functions taking a list of file paths
//! and a rule set written as Python lists and dicts. Each returns one JSON
//! string per input file, in input order.

use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyList, PyString, PyTuple};

use serde_json::{Map, Number, Value};
use ::sheet_excavator::{ExtractOptions, Extractor, FileOutcome, RuleSet};

// =============================================================================
// Conversion
// =============================================================================

/// Convert a Python rule set (dicts, lists, str, int, float, bool, None) to JSON
fn python_object_to_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Null);
    }
    // bool is a subclass of int: test it first
    if obj.is_instance_of::<PyBool>() {
        return Ok(Value::Bool(obj.extract::<bool>()?));
    }
    if obj.is_instance_of::<PyInt>() {
        if let Ok(n) = obj.extract::<i64>() {
            return Ok(Value::Number(n.into()));
        }
        return float_value(obj.extract::<f64>()?);
    }
    if obj.is_instance_of::<PyFloat>() {
        return float_value(obj.extract::<f64>()?);
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Value::String(obj.extract::<String>()?));
    }
    if let Ok(list) = obj.downcast::<PyList>() {
        return list
            .iter()
            .map(|item| python_object_to_value(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(tuple) = obj.downcast::<PyTuple>() {
        return tuple
            .iter()
            .map(|item| python_object_to_value(&item))
            .collect::<PyResult<Vec<_>>>()
            .map(Value::Array);
    }
    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = Map::new();
        for (key, value) in dict.iter() {
            let key = key
                .extract::<String>()
                .map_err(|_| PyTypeError::new_err("rule set keys must be strings"))?;
            map.insert(key, python_object_to_value(&value)?);
        }
        return Ok(Value::Object(map));
    }

    Err(PyTypeError::new_err(format!(
        "unsupported value in rule set: {}",
        obj.get_type().name()?
    )))
}

fn float_value(n: f64) -> PyResult<Value> {
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| PyValueError::new_err("rule set numbers must be finite"))
}

fn compile_rules(extraction_details: &Bound<'_, PyAny>) -> PyResult<RuleSet> {
    let rules = python_object_to_value(extraction_details)?;
    RuleSet::compile(&rules).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn extractor(rules: RuleSet, max_threads: Option<usize>) -> Extractor {
    let options = match max_threads {
        Some(concurrency) => ExtractOptions { concurrency },
        None => ExtractOptions::default(),
    };
    Extractor::with_options(rules, options)
}

fn to_json_strings(outcomes: &[FileOutcome]) -> PyResult<Vec<String>> {
    outcomes
        .iter()
        .map(|outcome| {
            serde_json::to_string(outcome).map_err(|e| PyRuntimeError::new_err(e.to_string()))
        })
        .collect()
}

// =============================================================================
// Functions
// =============================================================================

/// Extract from every file and return a list of JSON strings
///
/// Raises ValueError if the rule set is invalid. A file that cannot be read
/// gives `{"error": {"kind": "FileError", ...}}` in its place.
#[pyfunction]
#[pyo3(signature = (files, extraction_details, max_threads = None))]
fn excel_extract(
    py: Python<'_>,
    files: Vec<String>,
    extraction_details: &Bound<'_, PyAny>,
    max_threads: Option<usize>,
) -> PyResult<Vec<String>> {
    let extractor = extractor(compile_rules(extraction_details)?, max_threads);
    let outcomes = py.allow_threads(|| extractor.run(&files));
    to_json_strings(&outcomes)
}

/// Like `excel_extract`, calling `callback(message)` as files start and finish
///
/// The callback runs on a background thread holding the GIL; exceptions it
/// raises are printed and otherwise ignored.
#[pyfunction]
#[pyo3(signature = (callback, files, extraction_details, max_threads = None))]
fn excel_extract_with_progress(
    py: Python<'_>,
    callback: PyObject,
    files: Vec<String>,
    extraction_details: &Bound<'_, PyAny>,
    max_threads: Option<usize>,
) -> PyResult<Vec<String>> {
    let extractor = extractor(compile_rules(extraction_details)?, max_threads);
    let outcomes = py.allow_threads(|| {
        extractor.run_with_progress(&files, move |message: &str| {
            Python::with_gil(|py| {
                if let Err(e) = callback.call1(py, (message,)) {
                    e.print(py);
                }
            })
        })
    });
    to_json_strings(&outcomes)
}

// =============================================================================
// Module definition
// =============================================================================

/// sheet_excavator - rule-driven batch extraction from Excel workbooks
///
/// Example:
///     >>> import sheet_excavator, json
///     >>> rules = [
///     ...     {"sheets": ["Generell info"], "cells": ["d7", "m8"], "value_name": ["field", "od-id"]},
///     ...     {"sheets": ["Profil_*"], "skip_sheets": ["Profil_Total"], "cells": {"project": "h7"}},
///     ... ]
///     >>> docs = [json.loads(d) for d in sheet_excavator.excel_extract(["snorre.xlsx"], rules, 4)]
#[pymodule]
#[pyo3(name = "sheet_excavator")]
fn sheet_excavator_module(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(excel_extract, m)?)?;
    m.add_function(wrap_pyfunction!(excel_extract_with_progress, m)?)?;
    Ok(())
}
