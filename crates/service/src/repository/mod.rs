//! Repository capability: persistence of resources behind an async trait.
//!
//! Backends own atomicity for single-resource operations. Concurrent writers to
//! the same id race at the backend and the last write wins.

use async_trait::async_trait;
use models::resource::{NewResource, Resource, ResourceUpdate};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::pagination::{Page, Pagination};

pub mod memory;
pub mod seaorm;

pub use memory::MemoryResourceRepository;
pub use seaorm::SeaOrmResourceRepository;

/// Narrow a listing. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub owner: Option<Uuid>,
    pub status: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, r: &Resource) -> bool {
        self.owner.map_or(true, |o| r.owner == o) && self.status.as_deref().map_or(true, |s| r.status == s)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Listing order; defaults to newest first. Ties break on id so repeated
/// queries return identical sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl ListOrder {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Compare two resources according to this order.
    pub fn compare(&self, a: &Resource, b: &Resource) -> std::cmp::Ordering {
        let key = |r: &Resource| match self.field {
            SortField::CreatedAt => r.created_at,
            SortField::UpdatedAt => r.updated_at,
        };
        let ord = key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    /// Assign id and timestamps, then persist.
    async fn create(&self, input: NewResource) -> Result<Resource, StorageError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Resource, StorageError>;
    async fn list(&self, filter: &ListFilter, order: ListOrder, pagination: Pagination) -> Result<Page<Resource>, StorageError>;
    /// Replace fields and status, refreshing `updated_at`.
    async fn update(&self, id: Uuid, input: ResourceUpdate) -> Result<Resource, StorageError>;
    /// Permanent removal; no tombstone is kept.
    async fn delete(&self, id: Uuid) -> Result<(), StorageError>;
}
