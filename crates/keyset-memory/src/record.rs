//! Record data type for in-memory tables.

use std::collections::BTreeMap;

use keyset_pagination::{Row, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};

use crate::{MemoryError, Result};

/// A record representing a row in a [`MemoryTable`].
///
/// [`MemoryTable`]: crate::MemoryTable
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    /// Column values keyed by column name.
    pub columns: BTreeMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from columns.
    pub fn from_columns(columns: BTreeMap<String, Value>) -> Self {
        Self { columns }
    }

    /// Sets a column value.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Gets a column value.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Converts a plain JSON object into a record.
    ///
    /// Integers that fit in `i64` become `Int`, other numbers become `Float`.
    /// Strings stay text: nothing is guessed from their contents.
    pub fn from_json(json: JsonValue) -> Result<Self> {
        let JsonValue::Object(object) = json else {
            return Err(MemoryError::NotAnObject(json_kind(&json)));
        };

        let columns = object
            .into_iter()
            .map(|(column, value)| {
                let value = scalar_from_json(&column, value)?;
                Ok((column, value))
            })
            .collect::<Result<_>>()?;

        Ok(Self { columns })
    }

    /// Parses a JSON array of plain objects.
    pub fn parse_many(json: &str) -> Result<Vec<Self>> {
        let documents: Vec<JsonValue> = serde_json::from_str(json)?;
        documents.into_iter().map(Self::from_json).collect()
    }

    /// Converts the record into a plain JSON object.
    ///
    /// Timestamps and UUIDs are rendered as strings. Non-finite floats
    /// have no JSON form and become `null`.
    pub fn to_json(&self) -> JsonValue {
        let object: Map<String, JsonValue> = self
            .columns
            .iter()
            .map(|(column, value)| (column.clone(), scalar_to_json(value)))
            .collect();
        JsonValue::Object(object)
    }
}

impl Row for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.columns.get(name).cloned()
    }

    fn project(&mut self, fields: &[String]) {
        self.columns.retain(|column, _| fields.contains(column));
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(column, value)| (column.into(), value.into()))
                .collect(),
        }
    }
}

fn scalar_from_json(column: &str, value: JsonValue) -> Result<Value> {
    Ok(match value {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(value) => Value::Bool(value),
        JsonValue::Number(number) => match number.as_i64() {
            Some(int) => Value::Int(int),
            None => Value::Float(number.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(text) => Value::Text(text),
        other => {
            return Err(MemoryError::UnsupportedValue {
                column: column.to_owned(),
                kind: json_kind(&other),
            });
        }
    })
}

fn scalar_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(value) => JsonValue::Bool(*value),
        Value::Int(value) => JsonValue::Number((*value).into()),
        Value::Float(value) => Number::from_f64(*value).map_or(JsonValue::Null, JsonValue::Number),
        Value::Text(value) => JsonValue::String(value.clone()),
        Value::Timestamp(value) => JsonValue::String(value.to_string()),
        Value::Uuid(value) => JsonValue::String(value.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
