//! Entity definitions shared by the service and server crates.
//! - `schema` / `validation`: backend-agnostic field descriptors and the validator.
//! - `resource`: the persisted entity and repository inputs.
//! - `resource_record`: SeaORM mapping for the PostgreSQL backend.

pub mod errors;
pub mod db;
pub mod schema;
pub mod validation;
pub mod resource;
pub mod resource_record;
pub mod project;
