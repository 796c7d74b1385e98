//! Payload validation against a [`Schema`].
//!
//! Every descriptor is checked in schema order and all problems are collected,
//! so a caller can report them in one round trip. Keys the schema does not know
//! are ignored.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::schema::{FieldDescriptor, FieldKind, Schema, STATUS_KEY};

/// Raw field-name-to-value mapping as decoded from a request body.
pub type Payload = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Required,
    Type,
    MinLength,
    MaxLength,
    Range,
    Enum,
    Format,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::Required => "required",
            Reason::Type => "type",
            Reason::MinLength => "min_length",
            Reason::MaxLength => "max_length",
            Reason::Range => "range",
            Reason::Enum => "enum",
            Reason::Format => "format",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: Reason,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: Reason) -> Self {
        Self { field: field.into(), reason }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Fields that passed validation, normalised (trimmed strings, RFC 3339 dates).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub fields: Map<String, Value>,
    /// Present only when the payload carried a status.
    pub status: Option<String>,
}

impl ValidatedFields {
    /// Value of the schema's uniqueness key, if it has one and the field is set.
    pub fn unique_value(&self, schema: &Schema) -> Option<String> {
        let key = schema.unique_key.as_deref()?;
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

pub fn validate(payload: &Payload, schema: &Schema) -> Result<ValidatedFields, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut fields = Map::new();

    for descriptor in &schema.fields {
        match present(payload.get(&descriptor.name)) {
            None => {
                if descriptor.required {
                    errors.push(FieldError::new(&descriptor.name, Reason::Required));
                }
            }
            Some(raw) => match check(descriptor, raw) {
                Ok(value) => {
                    fields.insert(descriptor.name.clone(), value);
                }
                Err(reason) => errors.push(FieldError::new(&descriptor.name, reason)),
            },
        }
    }

    let status = match present(payload.get(STATUS_KEY)) {
        None => None,
        Some(Value::String(s)) if schema.statuses.contains(s.trim()) => Some(s.trim().to_string()),
        Some(Value::String(_)) => {
            errors.push(FieldError::new(STATUS_KEY, Reason::Enum));
            None
        }
        Some(_) => {
            errors.push(FieldError::new(STATUS_KEY, Reason::Type));
            None
        }
    };

    if errors.is_empty() {
        Ok(ValidatedFields { fields, status })
    } else {
        Err(errors)
    }
}

/// Overlay a partial payload onto stored fields. An explicit `null` in the
/// patch survives the merge, which validation then treats as absent.
pub fn merge(stored: &Map<String, Value>, patch: &Payload) -> Payload {
    let mut merged = stored.clone();
    for (k, v) in patch {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

/// `None` for absent, null and blank-string values.
fn present(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(v) => Some(v),
    }
}

fn check(descriptor: &FieldDescriptor, raw: &Value) -> Result<Value, Reason> {
    let c = &descriptor.constraints;
    match &descriptor.kind {
        FieldKind::String => {
            let s = raw.as_str().ok_or(Reason::Type)?.trim();
            let len = s.chars().count();
            if c.min_length.is_some_and(|min| len < min) {
                return Err(Reason::MinLength);
            }
            if c.max_length.is_some_and(|max| len > max) {
                return Err(Reason::MaxLength);
            }
            Ok(Value::String(s.to_string()))
        }
        FieldKind::Number => {
            let n = coerce_number(raw).ok_or(Reason::Type)?;
            let v = n.as_f64().ok_or(Reason::Type)?;
            if c.min.is_some_and(|min| v < min) || c.max.is_some_and(|max| v > max) {
                return Err(Reason::Range);
            }
            Ok(Value::Number(n))
        }
        FieldKind::Date => {
            let s = raw.as_str().ok_or(Reason::Type)?.trim();
            let parsed = parse_date(s).ok_or(Reason::Format)?;
            Ok(Value::String(parsed.to_rfc3339_opts(SecondsFormat::Millis, true)))
        }
        FieldKind::Enum(values) => {
            let s = raw.as_str().ok_or(Reason::Type)?.trim();
            if values.iter().any(|v| v == s) {
                Ok(Value::String(s.to_string()))
            } else {
                Err(Reason::Enum)
            }
        }
    }
}

fn coerce_number(raw: &Value) -> Option<Number> {
    match raw {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Number::from(i));
            }
            s.parse::<f64>().ok().and_then(Number::from_f64)
        }
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let day = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc())
}
