//! The project entity: the schema the server exposes under `/api/projects`.

use crate::schema::{FieldDescriptor, Schema, StatusSet};

pub const ENTITY: &str = "project";

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_ARCHIVED: &str = "archived";

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

pub fn schema(unique_title_per_owner: bool) -> Schema {
    let schema = Schema::new(ENTITY, StatusSet::new(STATUS_ACTIVE, [STATUS_COMPLETED, STATUS_ARCHIVED]))
        .field(FieldDescriptor::string("title").required().max_length(TITLE_MAX_LEN))
        .field(FieldDescriptor::string("description").max_length(DESCRIPTION_MAX_LEN))
        .field(FieldDescriptor::number("budget").required().min(0.0))
        .field(FieldDescriptor::date("deadline"));
    if unique_title_per_owner {
        schema.unique_per_owner("title")
    } else {
        schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{validate, FieldError, Reason};
    use serde_json::json;

    #[test]
    fn project_schema_shape() {
        let s = schema(false);
        let names: Vec<&str> = s.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["title", "description", "budget", "deadline"]);
        assert_eq!(s.statuses.initial(), STATUS_ACTIVE);
        assert!(s.unique_key.is_none());
        assert_eq!(schema(true).unique_key.as_deref(), Some("title"));
    }

    #[test]
    fn description_limit_applies() {
        let long = "x".repeat(DESCRIPTION_MAX_LEN + 1);
        let p = json!({"title": "t", "budget": 1, "description": long});
        let errs = validate(p.as_object().unwrap(), &schema(false)).unwrap_err();
        assert_eq!(errs, vec![FieldError::new("description", Reason::MaxLength)]);
    }
}
