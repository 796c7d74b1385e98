#![cfg(test)]
use std::sync::Arc;

use async_trait::async_trait;
use models::resource::{NewResource, Resource, ResourceUpdate};
use models::validation::Payload;
use serde_json::Value;
use uuid::Uuid;

use crate::errors::StorageError;
use crate::pagination::{Page, Pagination};
use crate::repository::{ListFilter, ListOrder, MemoryResourceRepository, ResourceRepository};
use crate::resource_service::ResourceService;

pub fn payload(v: Value) -> Payload {
    match v {
        Value::Object(m) => m,
        other => panic!("payload must be a JSON object, got {other}"),
    }
}

/// Project service over a fresh in-memory repository; the repository is
/// returned too so tests can inspect what was persisted.
pub fn project_service(unique_title_per_owner: bool) -> (ResourceService<MemoryResourceRepository>, Arc<MemoryResourceRepository>) {
    let repo = Arc::new(MemoryResourceRepository::new());
    let svc = ResourceService::new(Arc::clone(&repo), models::project::schema(unique_title_per_owner));
    (svc, repo)
}

/// Repository whose every call fails with the given error.
pub struct FailingRepository(pub StorageError);

#[async_trait]
impl ResourceRepository for FailingRepository {
    async fn create(&self, _input: NewResource) -> Result<Resource, StorageError> {
        Err(self.0.clone())
    }

    async fn get_by_id(&self, _id: Uuid) -> Result<Resource, StorageError> {
        Err(self.0.clone())
    }

    async fn list(&self, _filter: &ListFilter, _order: ListOrder, _pagination: Pagination) -> Result<Page<Resource>, StorageError> {
        Err(self.0.clone())
    }

    async fn update(&self, _id: Uuid, _input: ResourceUpdate) -> Result<Resource, StorageError> {
        Err(self.0.clone())
    }

    async fn delete(&self, _id: Uuid) -> Result<(), StorageError> {
        Err(self.0.clone())
    }
}

pub fn failing_service(err: StorageError) -> ResourceService<dyn ResourceRepository> {
    let repo: Arc<dyn ResourceRepository> = Arc::new(FailingRepository(err));
    ResourceService::new(repo, models::project::schema(false))
}
