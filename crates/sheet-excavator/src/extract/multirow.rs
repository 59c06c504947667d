//! `multirow_patterns`: one record per row that carries a unique id

use excavator_core::{CellValue, Worksheet};
use serde_json::{Map, Value};

use super::{cell_text, cell_to_json};
use crate::rules::{FieldRefs, RowRange};

/// Output shape of a `multirow_patterns` extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultirowOutput {
    /// List of records in row order
    Records,
    /// Object keyed by unique-id text; repeated ids become `id_1`, `id_2`, ...
    KeyedById,
}

/// Compiled `multirow_patterns` instructions
#[derive(Debug, Clone, PartialEq)]
pub struct MultirowPatterns {
    pub(crate) rows: RowRange,
    pub(crate) unique_id: u16,
    pub(crate) columns: Vec<(String, FieldRefs<u16>)>,
    pub(crate) output: MultirowOutput,
}

impl MultirowPatterns {
    pub fn extract(&self, sheet: &Worksheet) -> Value {
        let rows = self
            .rows
            .rows()
            .filter_map(|row| {
                let id = sheet.value_at(row, self.unique_id);
                (!cell_to_json(id).is_null()).then(|| (id, self.record(sheet, row)))
            });

        match self.output {
            MultirowOutput::Records => Value::Array(rows.map(|(_, record)| record).collect()),
            MultirowOutput::KeyedById => {
                let mut keyed = Map::new();
                for (id, record) in rows {
                    keyed.insert(unique_key(&keyed, id), record);
                }
                Value::Object(keyed)
            }
        }
    }

    fn record(&self, sheet: &Worksheet, row: u32) -> Value {
        let mut record = Map::new();
        for (name, field) in &self.columns {
            let value = if field.scalar {
                field
                    .refs
                    .first()
                    .map(|&col| cell_to_json(sheet.value_at(row, col)))
                    .unwrap_or(Value::Null)
            } else {
                Value::Array(
                    field
                        .refs
                        .iter()
                        .map(|&col| cell_to_json(sheet.value_at(row, col)))
                        .filter(|value| !value.is_null())
                        .collect(),
                )
            };
            record.insert(name.clone(), value);
        }
        Value::Object(record)
    }
}

fn unique_key(existing: &Map<String, Value>, id: &CellValue) -> String {
    let base = cell_text(id).unwrap_or_default();
    let mut key = base.clone();
    let mut counter = 1;
    while existing.contains_key(&key) {
        key = format!("{}_{}", base, counter);
        counter += 1;
    }
    key
}
