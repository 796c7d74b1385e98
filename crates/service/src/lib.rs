//! Service layer providing the generic resource CRUD operations on top of models.
//! - `repository`: persistence capability and its memory/SeaORM backends.
//! - `resource_service`: validation, repository dispatch and error classification.
//! - `formatter`: the success/error envelope handed to transports.

pub mod errors;
pub mod context;
pub mod pagination;
pub mod repository;
pub mod resource_service;
pub mod formatter;
pub mod observability;
#[cfg(test)]
pub mod test_support;

pub use context::RequestContext;
pub use errors::{ServiceError, StorageError};
pub use formatter::Envelope;
pub use resource_service::ResourceService;
