//! Normalisation of the response shapes the resource store uses.
//!
//! Bodies are inspected once here; anything that matches none of the known
//! shapes is a [`ClientError::Decode`], never an empty result.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// List body: a bare array or `{ "items": [...] }`.
#[derive(Debug, PartialEq)]
pub enum ListEnvelope<R> {
    Bare(Vec<R>),
    Wrapped(Vec<R>),
}

impl<R: DeserializeOwned> ListEnvelope<R> {
    /// Classify a list body. `{ "items": null }` is an empty collection;
    /// an object without an `items` key is rejected.
    pub fn from_value(value: Value) -> Result<Self, ClientError> {
        match value {
            Value::Array(_) => decode_value(value).map(ListEnvelope::Bare),
            Value::Object(mut body) => match body.remove("items") {
                Some(Value::Null) => Ok(ListEnvelope::Wrapped(Vec::new())),
                Some(items) => decode_value(items).map(ListEnvelope::Wrapped),
                None => Err(unexpected("a list", &Value::Object(body))),
            },
            other => Err(unexpected("a list", &other)),
        }
    }
}

impl<R> ListEnvelope<R> {
    pub fn into_items(self) -> Vec<R> {
        match self {
            ListEnvelope::Bare(items) | ListEnvelope::Wrapped(items) => items,
        }
    }
}

/// Create/update body: `{ "item": R, ... }`, a flat `R`, or an
/// acknowledgement without a record.
#[derive(Debug, PartialEq)]
pub enum RecordEnvelope<R> {
    Wrapped(R),
    Flat(R),
    Acknowledged,
}

impl<R: DeserializeOwned> RecordEnvelope<R> {
    /// Classify a record body.
    ///
    /// An `item` key must hold a valid record, and an object carrying
    /// `id_field` must itself be one. Only an object with neither counts as
    /// an acknowledgement.
    pub fn from_value(value: Value, id_field: &str) -> Result<Self, ClientError> {
        let mut body = match value {
            Value::Object(body) => body,
            other => return Err(unexpected("a record", &other)),
        };

        if let Some(item) = body.remove("item") {
            return decode_value(item).map(RecordEnvelope::Wrapped);
        }

        if body.contains_key(id_field) {
            return decode_value(Value::Object(body)).map(RecordEnvelope::Flat);
        }

        Ok(RecordEnvelope::Acknowledged)
    }
}

impl<R> RecordEnvelope<R> {
    pub fn into_record(self) -> Option<R> {
        match self {
            RecordEnvelope::Wrapped(record) | RecordEnvelope::Flat(record) => Some(record),
            RecordEnvelope::Acknowledged => None,
        }
    }
}

pub(crate) fn decode_value<T: DeserializeOwned>(value: Value) -> Result<T, ClientError> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

fn unexpected(expected: &str, value: &Value) -> ClientError {
    let found = match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(body) => format!(
            "an object with keys [{}]",
            body.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
    };

    ClientError::Decode(format!("Expected {}, got {}", expected, found))
}
