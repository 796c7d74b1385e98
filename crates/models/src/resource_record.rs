//! SeaORM entity backing resources in PostgreSQL.
//!
//! Schema fields are stored as serialized JSON text. Binding a `serde_json::Value`
//! goes through `jsonb`, which reorders keys, so the text form is what keeps
//! schema order on the way in and out.
//! `unique_value` carries the schema's uniqueness key so the database can enforce
//! it with a `(entity, owner, unique_value)` unique index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use chrono::Utc;

use serde_json::{Map, Value as JsonValue};

use crate::errors::ModelError;
use crate::resource::Resource;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "resource")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity: String,
    pub owner: Uuid,
    pub status: String,
    #[sea_orm(column_type = "Text")]
    pub fields: String,
    pub unique_value: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Text form of a field map for the `fields` column.
pub fn encode_fields(fields: &Map<String, JsonValue>) -> Result<String, ModelError> {
    Ok(serde_json::to_string(fields)?)
}

impl TryFrom<Model> for Resource {
    type Error = ModelError;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let parsed: JsonValue = serde_json::from_str(&m.fields).map_err(|e| ModelError::Corrupt {
            id: m.id.to_string(),
            reason: format!("fields column is not JSON: {e}"),
        })?;
        let fields = match parsed {
            JsonValue::Object(map) => map,
            other => {
                return Err(ModelError::Corrupt {
                    id: m.id.to_string(),
                    reason: format!("fields column is not an object: {other}"),
                })
            }
        };
        Ok(Resource {
            id: m.id,
            owner: m.owner,
            status: m.status,
            created_at: m.created_at.with_timezone(&Utc),
            updated_at: m.updated_at.with_timezone(&Utc),
            fields,
        })
    }
}
