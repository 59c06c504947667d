//! `dataframe`: a rectangular table under one or two header rows

use std::collections::HashSet;

use excavator_core::{CellAddress, Worksheet};
use serde_json::{Map, Value};

use super::{cell_text, cell_to_json};
use crate::rules::RowRange;

/// Output orientation of a `dataframe` extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    /// `[{column: value, ...}, ...]`, one record per row
    Records,
    /// `{column: [value, ...], ...}`, one array per column
    Columns,
}

/// Compiled `dataframe` instructions
#[derive(Debug, Clone, PartialEq)]
pub struct Dataframe {
    pub(crate) rows: RowRange,
    pub(crate) first_col: u16,
    pub(crate) last_col: u16,
    /// One or two 0-based header rows, top level first
    pub(crate) header_rows: Vec<u32>,
    pub(crate) separator: String,
    pub(crate) orient: Orient,
}

impl Dataframe {
    pub fn extract(&self, sheet: &Worksheet) -> Value {
        let names = self.column_names(sheet);

        match self.orient {
            Orient::Records => Value::Array(
                self.rows
                    .rows()
                    .map(|row| {
                        let mut record = Map::new();
                        for (name, col) in names.iter().zip(self.first_col..=self.last_col) {
                            record.insert(name.clone(), cell_to_json(sheet.value_at(row, col)));
                        }
                        Value::Object(record)
                    })
                    .collect(),
            ),
            Orient::Columns => {
                let mut columns = Map::new();
                for (name, col) in names.iter().zip(self.first_col..=self.last_col) {
                    let values = self
                        .rows
                        .rows()
                        .map(|row| cell_to_json(sheet.value_at(row, col)))
                        .collect();
                    columns.insert(name.clone(), Value::Array(values));
                }
                Value::Object(columns)
            }
        }
    }

    /// Composite, unique column names over the column range
    ///
    /// With two header rows the top level is carried forward across blank
    /// cells (merged headers are stored in their first cell only) and joined
    /// to the second level with the separator.
    fn column_names(&self, sheet: &Worksheet) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut carried: Option<String> = None;

        (self.first_col..=self.last_col)
            .map(|col| {
                let parts: Vec<String> = match self.header_rows.as_slice() {
                    [top, sub] => {
                        if let Some(text) = cell_text(sheet.value_at(*top, col)) {
                            carried = Some(text);
                        }
                        carried
                            .iter()
                            .cloned()
                            .chain(cell_text(sheet.value_at(*sub, col)))
                            .collect()
                    }
                    rows => rows
                        .iter()
                        .filter_map(|&row| cell_text(sheet.value_at(row, col)))
                        .collect(),
                };

                let name = if parts.is_empty() {
                    CellAddress::column_to_letters(col)
                } else {
                    parts.join(&self.separator)
                };
                dedupe(&mut seen, name)
            })
            .collect()
    }
}

fn dedupe(seen: &mut HashSet<String>, name: String) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", name, n);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    /// Rows 3-4 hold a two-level header over B:E, rows 5-7 the data
    fn profile_sheet() -> Worksheet {
        let mut ws = Worksheet::new("Profil_1");
        ws.set_cell_value("B3", "Year").unwrap();
        ws.set_cell_value("C3", "Oil").unwrap();
        ws.set_cell_value("E3", "Gas").unwrap();
        ws.set_cell_value("C4", "Sm3").unwrap();
        ws.set_cell_value("D4", "boe").unwrap();
        ws.set_cell_value("E4", "Sm3").unwrap();

        ws.set_cell_value("B5", 2023).unwrap();
        ws.set_cell_value("C5", 1.5).unwrap();
        ws.set_cell_value("D5", 2.0).unwrap();
        ws.set_cell_value("E5", 0.25).unwrap();
        ws.set_cell_value("B7", 2025).unwrap();
        ws.set_cell_value("E7", 0.5).unwrap();
        ws
    }

    fn frame(header_rows: Vec<u32>, orient: Orient) -> Dataframe {
        Dataframe {
            rows: RowRange { start: 4, end: 6 },
            first_col: 1,
            last_col: 4,
            header_rows,
            separator: " ".into(),
            orient,
        }
    }

    #[test]
    fn test_two_level_header_records() {
        let out = frame(vec![2, 3], Orient::Records).extract(&profile_sheet());

        assert_eq!(
            out,
            json!([
                {"Year": 2023, "Oil Sm3": 1.5, "Oil boe": 2, "Gas Sm3": 0.25},
                {"Year": null, "Oil Sm3": null, "Oil boe": null, "Gas Sm3": null},
                {"Year": 2025, "Oil Sm3": null, "Oil boe": null, "Gas Sm3": 0.5}
            ])
        );
        let keys: Vec<_> = out[0].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["Year", "Oil Sm3", "Oil boe", "Gas Sm3"]);
    }

    #[test]
    fn test_column_orientation() {
        let out = frame(vec![2, 3], Orient::Columns).extract(&profile_sheet());

        assert_eq!(out["Year"], json!([2023, null, 2025]));
        assert_eq!(out["Gas Sm3"], json!([0.25, null, 0.5]));
    }

    #[test]
    fn test_single_header_falls_back_and_dedupes() {
        let out = frame(vec![3], Orient::Columns).extract(&profile_sheet());

        // B4 is empty, C4 and E4 are both "Sm3"
        let keys: Vec<_> = out.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, ["B", "Sm3", "boe", "Sm3_2"]);
    }

    #[test]
    fn test_custom_separator() {
        let mut df = frame(vec![2, 3], Orient::Columns);
        df.separator = "|".into();
        let out = df.extract(&profile_sheet());

        assert!(out.get("Oil|boe").is_some());
    }

    #[test]
    fn test_empty_row_range() {
        let mut df = frame(vec![2], Orient::Records);
        df.rows = RowRange { start: 6, end: 4 };
        assert_eq!(df.extract(&profile_sheet()), json!([]));
    }
}
