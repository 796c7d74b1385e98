//! Backend-agnostic entity schema.
//!
//! A [`Schema`] lists typed field descriptors in declaration order, the status
//! set an entity moves through, and an optional per-owner uniqueness key. The
//! validator walks descriptors in this order, so error lists come back in it too.

use serde::Serialize;

/// Payload keys owned by the resource envelope rather than the schema.
pub const ID_KEY: &str = "id";
pub const OWNER_KEY: &str = "owner";
pub const STATUS_KEY: &str = "status";
pub const CREATED_AT_KEY: &str = "created_at";
pub const UPDATED_AT_KEY: &str = "updated_at";

pub const RESERVED_KEYS: [&str; 5] = [ID_KEY, OWNER_KEY, STATUS_KEY, CREATED_AT_KEY, UPDATED_AT_KEY];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    Date,
    Enum(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub constraints: Constraints,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self { name: name.into(), kind, required: false, constraints: Constraints::default() }
    }

    pub fn string(name: impl Into<String>) -> Self { Self::new(name, FieldKind::String) }
    pub fn number(name: impl Into<String>) -> Self { Self::new(name, FieldKind::Number) }
    pub fn date(name: impl Into<String>) -> Self { Self::new(name, FieldKind::Date) }

    pub fn one_of<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(name, FieldKind::Enum(values.into_iter().map(Into::into).collect()))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.constraints.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.constraints.max_length = Some(n);
        self
    }

    pub fn min(mut self, v: f64) -> Self {
        self.constraints.min = Some(v);
        self
    }

    pub fn max(mut self, v: f64) -> Self {
        self.constraints.max = Some(v);
        self
    }
}

/// Closed set of lifecycle values with a designated initial one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSet {
    initial: String,
    values: Vec<String>,
}

impl StatusSet {
    /// `initial` is always a member, listed first.
    pub fn new<I, S>(initial: impl Into<String>, others: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let initial = initial.into();
        let mut values = vec![initial.clone()];
        for v in others {
            let v = v.into();
            if !values.contains(&v) {
                values.push(v);
            }
        }
        Self { initial, values }
    }

    pub fn initial(&self) -> &str { &self.initial }

    pub fn values(&self) -> &[String] { &self.values }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub entity: String,
    pub fields: Vec<FieldDescriptor>,
    pub statuses: StatusSet,
    /// Field whose value must be unique among one owner's resources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_key: Option<String>,
}

impl Schema {
    pub fn new(entity: impl Into<String>, statuses: StatusSet) -> Self {
        Self { entity: entity.into(), fields: Vec::new(), statuses, unique_key: None }
    }

    /// Append a field. Reserved envelope keys are not schema fields and are skipped.
    pub fn field(mut self, descriptor: FieldDescriptor) -> Self {
        if !RESERVED_KEYS.contains(&descriptor.name.as_str()) {
            self.fields.retain(|f| f.name != descriptor.name);
            self.fields.push(descriptor);
        }
        self
    }

    pub fn unique_per_owner(mut self, field: impl Into<String>) -> Self {
        self.unique_key = Some(field.into());
        self
    }

    pub fn descriptor(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}
