//! `single_cells`: named values read from fixed cells

use excavator_core::{CellAddress, Worksheet};
use serde_json::{Map, Value};

use super::cell_to_json;
use crate::rules::FieldRefs;

/// Compiled `single_cells` instructions: output field to cell reference(s)
#[derive(Debug, Clone, PartialEq)]
pub struct SingleCells {
    pub(crate) fields: Vec<(String, FieldRefs<CellAddress>)>,
}

impl SingleCells {
    /// Field names in output order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Read every field into a mapping in instruction order
    ///
    /// A single reference yields its value or `null`; a list yields every
    /// non-empty value in list order.
    pub fn extract(&self, sheet: &Worksheet) -> Value {
        let mut out = Map::new();
        for (name, field) in &self.fields {
            out.insert(name.clone(), read_field(sheet, field));
        }
        Value::Object(out)
    }
}

fn read_field(sheet: &Worksheet, field: &FieldRefs<CellAddress>) -> Value {
    if field.scalar {
        return field
            .refs
            .first()
            .map(|&addr| cell_to_json(sheet.value(addr)))
            .unwrap_or(Value::Null);
    }

    Value::Array(
        field
            .refs
            .iter()
            .map(|&addr| cell_to_json(sheet.value(addr)))
            .filter(|value| !value.is_null())
            .collect(),
    )
}
