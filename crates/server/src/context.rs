//! Principal extraction.
//!
//! Callers identify themselves with an `X-Principal-Id` header carrying a UUID.
//! Authentication happens upstream; this layer only turns the header into a
//! [`RequestContext`] for the call.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use models::schema::OWNER_KEY;
use models::validation::{FieldError, Reason};
use service::{RequestContext, ServiceError};
use uuid::Uuid;

pub const PRINCIPAL_HEADER: &str = "x-principal-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal {
    Missing,
    Invalid,
    Known(Uuid),
}

impl Principal {
    pub fn from_header(value: Option<&str>) -> Self {
        match value {
            None => Principal::Missing,
            Some(raw) => Uuid::parse_str(raw.trim()).map_or(Principal::Invalid, Principal::Known),
        }
    }

    /// Context for an owner-stamping call; a missing or malformed header is an
    /// `owner` field error.
    pub fn require(self) -> Result<RequestContext, ServiceError> {
        match self {
            Principal::Known(id) => Ok(RequestContext::new(id)),
            Principal::Missing => Err(ServiceError::Validation(vec![FieldError::new(OWNER_KEY, Reason::Required)])),
            Principal::Invalid => Err(ServiceError::Validation(vec![FieldError::new(OWNER_KEY, Reason::Format)])),
        }
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts.headers.get(PRINCIPAL_HEADER).map(|v| v.to_str().unwrap_or(""));
        Ok(Principal::from_header(value))
    }
}
