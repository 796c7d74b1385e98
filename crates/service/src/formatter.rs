//! Transport-agnostic response envelope.
//!
//! `{ "success": true, "data": ... }` on success, or
//! `{ "success": false, "message": ..., "details": [...] }` on failure. Status
//! codes are the HTTP layer's business.

use models::validation::FieldError;
use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None, details: None }
    }

    /// Success carrying no payload (e.g. delete).
    pub fn done() -> Self {
        Self { success: true, data: None, message: None, details: None }
    }

    /// Failure with a message and no field details.
    pub fn failure(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()), details: None }
    }

    pub fn error(err: &ServiceError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(err.message()),
            details: err.field_errors().map(<[FieldError]>::to_vec),
        }
    }

    pub fn from_result(result: Result<T, ServiceError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::error(&e),
        }
    }
}

impl Envelope<()> {
    /// Unit results format as a bare `{ "success": true }`.
    pub fn from_unit(result: Result<(), ServiceError>) -> Self {
        match result {
            Ok(()) => Self::done(),
            Err(e) => Self::error(&e),
        }
    }
}
