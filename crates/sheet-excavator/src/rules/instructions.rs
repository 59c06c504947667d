//! Per-function instruction parsing

use excavator_core::{CellAddress, MAX_COLS, MAX_ROWS};
use serde_json::{Map, Value};

use super::{FieldRefs, RowRange};
use crate::error::{ConfigError, Result};
use crate::extract::{Dataframe, MultirowOutput, MultirowPatterns, Orient, SingleCells};

const DEFAULT_SEPARATOR: &str = " ";

fn required<'a>(at: &str, map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| ConfigError::malformed(at, format!("missing '{}'", key)))
}

fn warn_unknown_keys(at: &str, map: &Map<String, Value>, known: &[&str]) {
    for key in map.keys() {
        if !known.contains(&key.as_str()) {
            log::warn!("{}: ignoring unknown key '{}'", at, key);
        }
    }
}

pub(super) fn cell_reference(at: &str, value: &Value) -> Result<CellAddress> {
    let text = value
        .as_str()
        .ok_or_else(|| ConfigError::malformed(at, "cell reference must be a string"))?;
    CellAddress::parse(text).map_err(|e| ConfigError::reference(at, text, e))
}

fn column_letters(at: &str, value: &Value) -> Result<u16> {
    let text = value
        .as_str()
        .ok_or_else(|| ConfigError::malformed(at, "column must be given as letters"))?;
    CellAddress::letters_to_column(text).map_err(|e| ConfigError::reference(at, text, e))
}

/// Column bound given as letters (`"C"`) or a 1-based number (`3`)
fn column_bound(at: &str, value: &Value) -> Result<u16> {
    match value {
        Value::String(_) => column_letters(at, value),
        Value::Number(n) => n
            .as_u64()
            .filter(|&c| c >= 1 && c <= MAX_COLS as u64)
            .map(|c| (c - 1) as u16)
            .ok_or_else(|| {
                ConfigError::malformed(at, format!("column number {} out of range 1..={}", n, MAX_COLS))
            }),
        _ => Err(ConfigError::malformed(
            at,
            "column must be letters or a 1-based number",
        )),
    }
}

/// 1-based row number to 0-based index
fn row_number(at: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .filter(|&r| r >= 1 && r <= MAX_ROWS as u64)
        .map(|r| (r - 1) as u32)
        .ok_or_else(|| {
            ConfigError::malformed(
                at,
                format!("row must be a whole number in 1..={}, got {}", MAX_ROWS, value),
            )
        })
}

fn pair<'a>(at: &str, value: &'a Value) -> Result<(&'a Value, &'a Value)> {
    match value.as_array().map(Vec::as_slice) {
        Some([first, second]) => Ok((first, second)),
        _ => Err(ConfigError::malformed(at, "expected a [start, end] pair")),
    }
}

fn row_range(at: &str, value: &Value) -> Result<RowRange> {
    let (start, end) = pair(at, value)?;
    Ok(RowRange {
        start: row_number(at, start)?,
        end: row_number(at, end)?,
    })
}

/// Scalar or non-empty list field instruction
fn field_refs<T>(
    at: &str,
    value: &Value,
    parse: impl Fn(&str, &Value) -> Result<T>,
) -> Result<FieldRefs<T>> {
    match value {
        Value::Array(items) if items.is_empty() => Err(ConfigError::empty(at)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| parse(&format!("{}[{}]", at, i), item))
            .collect::<Result<Vec<_>>>()
            .map(FieldRefs::list),
        _ => parse(at, value).map(FieldRefs::scalar),
    }
}

pub(super) fn single_cells(at: &str, fields: &Map<String, Value>) -> Result<SingleCells> {
    if fields.is_empty() {
        return Err(ConfigError::empty(at));
    }

    let fields = fields
        .iter()
        .map(|(name, value)| {
            let refs = field_refs(&format!("{}.{}", at, name), value, cell_reference)?;
            Ok((name.clone(), refs))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SingleCells { fields })
}

pub(super) fn multirow_patterns(at: &str, map: &Map<String, Value>) -> Result<MultirowPatterns> {
    warn_unknown_keys(at, map, &["row_range", "unique_id", "columns", "key_by"]);

    let rows = row_range(
        &format!("{}.row_range", at),
        required(at, map, "row_range")?,
    )?;
    let unique_id = column_letters(
        &format!("{}.unique_id", at),
        required(at, map, "unique_id")?,
    )?;

    let columns_at = format!("{}.columns", at);
    let columns = required(at, map, "columns")?
        .as_object()
        .ok_or_else(|| ConfigError::malformed(&columns_at, "expected a mapping of field to column"))?;
    if columns.is_empty() {
        return Err(ConfigError::empty(&columns_at));
    }
    let columns = columns
        .iter()
        .map(|(name, value)| {
            let refs = field_refs(&format!("{}.{}", columns_at, name), value, column_letters)?;
            Ok((name.clone(), refs))
        })
        .collect::<Result<Vec<_>>>()?;

    let output = match map.get("key_by") {
        None | Some(Value::Null) => MultirowOutput::Records,
        Some(Value::String(s)) if s == "unique_id" => MultirowOutput::KeyedById,
        Some(other) => {
            return Err(ConfigError::malformed(
                &format!("{}.key_by", at),
                format!("expected \"unique_id\", got {}", other),
            ))
        }
    };

    Ok(MultirowPatterns {
        rows,
        unique_id,
        columns,
        output,
    })
}

pub(super) fn dataframe(at: &str, map: &Map<String, Value>) -> Result<Dataframe> {
    warn_unknown_keys(
        at,
        map,
        &["row_range", "column_range", "header_row", "separator", "orient"],
    );

    let rows = row_range(
        &format!("{}.row_range", at),
        required(at, map, "row_range")?,
    )?;

    let columns_at = format!("{}.column_range", at);
    let (first, last) = pair(&columns_at, required(at, map, "column_range")?)?;
    let (first_col, last_col) = (column_bound(&columns_at, first)?, column_bound(&columns_at, last)?);
    if first_col > last_col {
        return Err(ConfigError::malformed(
            &columns_at,
            "start column is after end column",
        ));
    }

    let header_at = format!("{}.header_row", at);
    let header_rows = match required(at, map, "header_row")? {
        Value::Array(items) if (1..=2).contains(&items.len()) => items
            .iter()
            .map(|item| row_number(&header_at, item))
            .collect::<Result<Vec<_>>>()?,
        Value::Array(_) => {
            return Err(ConfigError::malformed(
                &header_at,
                "expected one or two header rows",
            ))
        }
        single => vec![row_number(&header_at, single)?],
    };

    let separator = match map.get("separator") {
        None | Some(Value::Null) => DEFAULT_SEPARATOR.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => {
            return Err(ConfigError::malformed(
                &format!("{}.separator", at),
                "separator must be a string",
            ))
        }
    };

    let orient_at = format!("{}.orient", at);
    let orient = match map.get("orient") {
        None | Some(Value::Null) => Orient::Records,
        Some(Value::String(s)) if s == "records" => Orient::Records,
        Some(Value::String(s)) if s == "columns" => Orient::Columns,
        Some(Value::String(other)) => {
            return Err(ConfigError::malformed(
                &orient_at,
                format!("expected \"records\" or \"columns\", got \"{}\"", other),
            ))
        }
        Some(_) => return Err(ConfigError::malformed(&orient_at, "orient must be a string")),
    };

    Ok(Dataframe {
        rows,
        first_col,
        last_col,
        header_rows,
        separator,
        orient,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_single_cells_keeps_field_order() {
        let cells = single_cells(
            "x",
            &object(json!({"zeta": "d7", "alpha": ["m8", "$M$9"], "mid": "AA1"})),
        )
        .unwrap();

        let names: Vec<_> = cells.fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
        assert_eq!(cells.fields[0].1, FieldRefs::scalar(CellAddress::new(6, 3)));
        assert_eq!(
            cells.fields[1].1,
            FieldRefs::list(vec![CellAddress::new(7, 12), CellAddress::new(8, 12)])
        );
    }

    #[test]
    fn test_single_cells_rejects_bad_references() {
        let err = single_cells("rules[0]", &object(json!({"field": "7d"}))).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidReference { ref reference, .. } if reference == "7d"));

        let err = single_cells("rules[0]", &object(json!({"field": []}))).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyList { ref at } if at == "rules[0].field"));

        let err = single_cells("rules[0]", &object(json!({}))).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyList { .. }));

        let err = single_cells("rules[0]", &object(json!({"field": 7}))).unwrap_err();
        assert!(matches!(err, ConfigError::Malformed { .. }));
    }

    #[test]
    fn test_multirow_patterns() {
        let rows = multirow_patterns(
            "x",
            &object(json!({
                "row_range": [28, 44],
                "unique_id": "B",
                "columns": {"name": "C", "depths": ["D", "e"]}
            })),
        )
        .unwrap();

        assert_eq!(rows.rows, RowRange { start: 27, end: 43 });
        assert_eq!(rows.unique_id, 1);
        assert_eq!(rows.columns[1].1, FieldRefs::list(vec![3, 4]));
        assert_eq!(rows.output, MultirowOutput::Records);
    }

    #[test]
    fn test_multirow_patterns_errors() {
        let base = json!({"row_range": [1, 2], "unique_id": "B", "columns": {"a": "C"}});

        let mut bad = base.clone();
        bad["row_range"] = json!([0, 2]);
        assert!(matches!(
            multirow_patterns("x", &object(bad)),
            Err(ConfigError::Malformed { .. })
        ));

        let mut bad = base.clone();
        bad["unique_id"] = json!("B2");
        assert!(matches!(
            multirow_patterns("x", &object(bad)),
            Err(ConfigError::InvalidReference { .. })
        ));

        let mut bad = base.clone();
        bad["key_by"] = json!("name");
        assert!(matches!(
            multirow_patterns("x", &object(bad)),
            Err(ConfigError::Malformed { .. })
        ));

        let mut keyed = base;
        keyed["key_by"] = json!("unique_id");
        assert_eq!(
            multirow_patterns("x", &object(keyed)).unwrap().output,
            MultirowOutput::KeyedById
        );
    }

    #[test]
    fn test_reversed_row_range_is_allowed() {
        let rows = multirow_patterns(
            "x",
            &object(json!({"row_range": [44, 28], "unique_id": "B", "columns": {"a": "C"}})),
        )
        .unwrap();
        assert!(rows.rows.is_empty());
    }

    #[test]
    fn test_dataframe() {
        let frame = dataframe(
            "x",
            &object(json!({
                "row_range": [5, 40],
                "column_range": ["B", 6],
                "header_row": [3, 4],
                "separator": "_",
                "orient": "columns"
            })),
        )
        .unwrap();

        assert_eq!(frame.rows, RowRange { start: 4, end: 39 });
        assert_eq!((frame.first_col, frame.last_col), (1, 5));
        assert_eq!(frame.header_rows, [2, 3]);
        assert_eq!(frame.separator, "_");
        assert_eq!(frame.orient, Orient::Columns);
    }

    #[test]
    fn test_dataframe_defaults() {
        let frame = dataframe(
            "x",
            &object(json!({"row_range": [2, 3], "column_range": ["A", "C"], "header_row": 1})),
        )
        .unwrap();

        assert_eq!(frame.header_rows, [0]);
        assert_eq!(frame.separator, " ");
        assert_eq!(frame.orient, Orient::Records);
    }

    #[test]
    fn test_dataframe_errors() {
        let base = json!({"row_range": [2, 3], "column_range": ["A", "C"], "header_row": 1});

        let mut bad = base.clone();
        bad["column_range"] = json!(["D", "A"]);
        assert!(matches!(dataframe("x", &object(bad)), Err(ConfigError::Malformed { .. })));

        let mut bad = base.clone();
        bad["header_row"] = json!([1, 2, 3]);
        assert!(matches!(dataframe("x", &object(bad)), Err(ConfigError::Malformed { .. })));

        let mut bad = base.clone();
        bad["column_range"] = json!(["A", 0]);
        assert!(matches!(dataframe("x", &object(bad)), Err(ConfigError::Malformed { .. })));

        let mut bad = base.clone();
        bad["orient"] = json!("rows");
        assert!(matches!(dataframe("x", &object(bad)), Err(ConfigError::Malformed { .. })));

        for wrong_type in [json!(1), json!(true), json!(["columns"])] {
            let mut bad = base.clone();
            bad["orient"] = wrong_type;
            let err = dataframe("x", &object(bad)).unwrap_err();
            assert_eq!(err.to_string(), "x.orient: orient must be a string");
        }

        let mut bad = base;
        bad.as_object_mut().unwrap().remove("header_row");
        let err = dataframe("x", &object(bad)).unwrap_err();
        assert_eq!(err.to_string(), "x: missing 'header_row'");
    }
}
