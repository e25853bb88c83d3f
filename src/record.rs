//! Entity records and remote parameter maps.
//!
//! A [`Record`] is an ordered field/value sequence: ordering matters because
//! read results place the key field first. The canonical byte serialization
//! (sorted field names, length-prefixed) feeds the derived-key digest for
//! records with no natural stable key.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{ConnectorError, ConnectorResult};

/// A single field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    /// Multi-valued field (e.g. `EmailAddresses`, `AccessRights`).
    List(Vec<String>),
}

impl FieldValue {
    /// Single text value, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON value from the orchestrator payload.
    pub fn from_json(value: &Value) -> ConnectorResult<Self> {
        match value {
            Value::Null => Ok(FieldValue::Null),
            Value::Bool(b) => Ok(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .ok_or_else(|| ConnectorError::invalid_input(format!("non-integer number {n}"))),
            Value::String(s) => Ok(FieldValue::Text(s.clone())),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::String(s) => out.push(s.clone()),
                        other => {
                            return Err(ConnectorError::invalid_input(format!(
                                "list fields must hold strings, got {other}"
                            )))
                        }
                    }
                }
                Ok(FieldValue::List(out))
            }
            Value::Object(_) => Err(ConnectorError::invalid_input(
                "nested objects are not valid field values",
            )),
        }
    }

    /// Canonical textual rendering used by [`Record::canonical_bytes`].
    fn canonical(&self) -> String {
        match self {
            FieldValue::Null => "~null".to_string(),
            FieldValue::Bool(b) => format!("b:{b}"),
            FieldValue::Int(i) => format!("i:{i}"),
            FieldValue::Text(s) => format!("t:{s}"),
            FieldValue::List(items) => format!("l:{}", items.join("\u{1f}")),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        FieldValue::List(items)
    }
}

/// An ordered field/value sequence representing one directory entity, or the
/// parameter map of one remote call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any existing value but keeping its position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Builder-style [`Record::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a single text field.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    /// Whether a field is present.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(idx).1)
    }

    /// Field names in record order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate fields in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse an orchestrator JSON object payload into a record.
    pub fn from_json_object(value: &Value) -> ConnectorResult<Self> {
        let map = value.as_object().ok_or_else(|| {
            ConnectorError::invalid_input("function parameters must be a JSON object")
        })?;
        let mut record = Record::new();
        for (name, raw) in map {
            record.set(name.clone(), FieldValue::from_json(raw)?);
        }
        Ok(record)
    }

    /// Canonical byte serialization: fields sorted by name, each rendered as
    /// `name=value` with length prefixes so adjacent fields cannot collide.
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut sorted: Vec<(&str, &FieldValue)> = self.iter().collect();
        sorted.sort_unstable_by_key(|(n, _)| *n);

        let mut out = Vec::new();
        for (name, value) in sorted {
            let rendered = value.canonical();
            out.extend_from_slice(&(name.len() as u32).to_be_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&(rendered.len() as u32).to_be_bytes());
            out.extend_from_slice(rendered.as_bytes());
        }
        out
    }

    /// Deterministic synthetic key for records with no natural identifier.
    ///
    /// SHA-256 over [`Record::canonical_bytes`], hex-encoded. An opaque
    /// correlation key only, never a remote identity.
    #[must_use]
    pub fn derived_key(&self) -> String {
        let digest = Sha256::digest(self.canonical_bytes());
        hex::encode(digest)
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}
