use models::validation::FieldError;
use thiserror::Error;
use uuid::Uuid;

/// Failures a repository backend reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(Uuid),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Unknown(String),
}

impl From<models::errors::ModelError> for StorageError {
    fn from(e: models::errors::ModelError) -> Self {
        Self::Unknown(e.to_string())
    }
}

/// Errors surfaced by [`crate::resource_service::ResourceService`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("validation failed: {}", join(.0))]
    Validation(Vec<FieldError>),
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: Uuid },
    #[error("{entity} conflict: {detail}")]
    Conflict { entity: String, detail: String },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("internal error: {0}")]
    Unknown(String),
}

fn join(errors: &[FieldError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl ServiceError {
    pub fn from_storage(entity: &str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => Self::NotFound { entity: entity.to_string(), id },
            StorageError::Conflict(detail) => Self::Conflict { entity: entity.to_string(), detail },
            StorageError::Unavailable(msg) => Self::Unavailable(msg),
            StorageError::Unknown(msg) => Self::Unknown(msg),
        }
    }

    /// Stable, caller-facing message. Backend detail stays in logs.
    pub fn message(&self) -> String {
        match self {
            Self::Validation(_) => "Validation failed".to_string(),
            Self::NotFound { entity, .. } => format!("{} not found", capitalize(entity)),
            Self::Conflict { entity, .. } => format!("{} already exists", capitalize(entity)),
            Self::Unavailable(_) => "Storage unavailable".to_string(),
            Self::Unknown(_) => "Internal error".to_string(),
        }
    }

    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Unavailable(_) => "unavailable",
            Self::Unknown(_) => "unknown",
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::validation::Reason;

    #[test]
    fn storage_errors_map_with_entity() {
        let id = Uuid::new_v4();
        let e = ServiceError::from_storage("project", StorageError::NotFound(id));
        assert_eq!(e, ServiceError::NotFound { entity: "project".into(), id });
        assert_eq!(e.message(), "Project not found");
        assert_eq!(e.kind(), "not_found");

        let e = ServiceError::from_storage("project", StorageError::Conflict("title".into()));
        assert_eq!(e.message(), "Project already exists");
        assert_eq!(ServiceError::Unavailable("x".into()).message(), "Storage unavailable");
        assert_eq!(ServiceError::Unknown("x".into()).message(), "Internal error");
    }

    #[test]
    fn validation_display_lists_fields() {
        let e = ServiceError::Validation(vec![
            FieldError::new("title", Reason::Required),
            FieldError::new("budget", Reason::Range),
        ]);
        assert_eq!(e.to_string(), "validation failed: title: required, budget: range");
        assert_eq!(e.field_errors().map(|f| f.len()), Some(2));
    }
}
