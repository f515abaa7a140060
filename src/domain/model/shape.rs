//! Declared field layout of a registered model.
//!
//! A shape plays the role of the "struct" a record is deserialized into before it
//! reaches the validator: known fields are type-checked and copied over a
//! zero-value instance, unknown fields are dropped, missing fields keep their
//! zero value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Bool,
    Object,
    Array,
    Any,
}

impl FieldType {
    fn zero_value(self) -> JsonValue {
        match self {
            FieldType::String => JsonValue::from(""),
            FieldType::Integer => JsonValue::from(0),
            FieldType::Number => JsonValue::from(0.0),
            FieldType::Bool => JsonValue::from(false),
            FieldType::Object => JsonValue::Object(Map::new()),
            FieldType::Array => JsonValue::Array(Vec::new()),
            FieldType::Any => JsonValue::Null,
        }
    }

    fn accepts(self, v: &JsonValue) -> bool {
        match self {
            FieldType::String => v.is_string(),
            FieldType::Integer => v.is_i64() || v.is_u64(),
            FieldType::Number => v.is_number(),
            FieldType::Bool => v.is_boolean(),
            FieldType::Object => v.is_object(),
            FieldType::Array => v.is_array(),
            FieldType::Any => true,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub nullable: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("field '{field}' expected {expected}, got {got}")]
    FieldType {
        field: String,
        expected: &'static str,
        got: &'static str,
    },
    #[error("field '{0}' must not be null")]
    NullField(String),
}

fn json_kind(v: &JsonValue) -> &'static str {
    match v {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Field layout of a model; an empty field list means "accept any object as is".
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelShape {
    pub fields: Vec<FieldSpec>,
}

impl ModelShape {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    pub fn dynamic() -> Self {
        Self::default()
    }

    pub fn is_dynamic(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Zero-value instance of this shape.
    pub fn create_instance(&self) -> JsonValue {
        let obj: Map<String, JsonValue> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.field_type.zero_value()))
            .collect();
        JsonValue::Object(obj)
    }

    /// Deserializes `record` into this shape.
    pub fn conform(&self, record: &JsonValue) -> Result<JsonValue, ShapeError> {
        let obj = record
            .as_object()
            .ok_or_else(|| ShapeError::NotAnObject(json_kind(record)))?;

        if self.is_dynamic() {
            return Ok(record.clone());
        }

        let mut instance = self.create_instance();
        let out = instance
            .as_object_mut()
            .ok_or(ShapeError::NotAnObject("null"))?;

        for spec in &self.fields {
            let Some(v) = obj.get(&spec.name) else {
                continue;
            };
            if v.is_null() {
                if !spec.nullable && spec.field_type != FieldType::Any {
                    return Err(ShapeError::NullField(spec.name.clone()));
                }
                out.insert(spec.name.clone(), JsonValue::Null);
                continue;
            }
            if !spec.field_type.accepts(v) {
                return Err(ShapeError::FieldType {
                    field: spec.name.clone(),
                    expected: spec.field_type.as_str(),
                    got: json_kind(v),
                });
            }
            out.insert(spec.name.clone(), v.clone());
        }

        Ok(instance)
    }
}
