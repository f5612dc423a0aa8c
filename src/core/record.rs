use super::{JsonDbError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Name of the mandatory identity field.
pub const ID_FIELD: &str = "id";

/// A loosely typed document. Every persisted record carries a string `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a record from an arbitrary JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(JsonDbError::InvalidRecord(format!(
                "expected a JSON object, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// The record id. Empty strings count as absent.
    pub fn id(&self) -> Option<&str> {
        match self.0.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Returns the existing id, assigning a fresh one when none is set.
    ///
    /// Fails when `id` holds something other than a string.
    pub fn ensure_id(&mut self) -> Result<String> {
        match self.0.get(ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => return Ok(id.clone()),
            None | Some(Value::Null) | Some(Value::String(_)) => {}
            Some(other) => {
                return Err(JsonDbError::InvalidRecord(format!(
                    "field 'id' must be a string, got {}",
                    type_name(other)
                )));
            }
        }
        let id = generate_id();
        self.0.insert(ID_FIELD.to_string(), Value::String(id.clone()));
        Ok(id)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut Value> {
        self.0.get_mut(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Overwrites fields that already exist on this record. Keys that are
    /// absent here are ignored, so a patch never grows the record.
    /// Returns whether any field was written.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> bool {
        let mut touched = false;
        for (key, value) in patch {
            if key == ID_FIELD {
                continue;
            }
            if let Some(slot) = self.0.get_mut(key) {
                *slot = value.clone();
                touched = true;
            }
        }
        touched
    }

    /// New record holding `id` plus whichever of `fields` are present.
    pub fn project(&self, fields: &[String]) -> Record {
        let mut out = Map::new();
        if let Some(id) = self.0.get(ID_FIELD) {
            out.insert(ID_FIELD.to_string(), id.clone());
        }
        for field in fields {
            if let Some(value) = self.0.get(field) {
                out.insert(field.clone(), value.clone());
            }
        }
        Record(out)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Record {
    type Error = JsonDbError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

/// Random v4 UUID in canonical `8-4-4-4-12` lowercase hex form.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
