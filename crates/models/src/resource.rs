//! Resource domain model and the inputs repositories accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// A persisted entity. Schema fields are flattened next to the envelope keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub owner: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Resource {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Validated input for a create. Id and timestamps are assigned by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub owner: Uuid,
    pub status: String,
    pub fields: Map<String, Value>,
    pub unique_value: Option<String>,
}

/// Full replacement of the mutable parts of a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceUpdate {
    pub status: String,
    pub fields: Map<String, Value>,
    pub unique_value: Option<String>,
}

/// `updated_at` for a mutation at `now`; never earlier than the previous value.
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    now.max(previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn serialises_flat_with_envelope_keys_first() {
        let now = Utc::now();
        let mut fields = Map::new();
        fields.insert("title".into(), json!("Launch"));
        fields.insert("budget".into(), json!(500));
        let r = Resource { id: Uuid::new_v4(), owner: Uuid::new_v4(), status: "active".into(), created_at: now, updated_at: now, fields };

        let v = serde_json::to_value(&r).unwrap();
        let keys: Vec<&String> = v.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["id", "owner", "status", "created_at", "updated_at", "title", "budget"]);

        let back: Resource = serde_json::from_value(v).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn updated_at_never_moves_backwards() {
        let t = Utc::now();
        assert_eq!(next_updated_at(t, t - Duration::seconds(5)), t);
        assert_eq!(next_updated_at(t, t + Duration::seconds(5)), t + Duration::seconds(5));
    }
}
