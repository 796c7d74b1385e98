use std::{collections::HashMap, path::{Path, PathBuf}};

use async_trait::async_trait;
use chrono::Utc;
use models::resource::{next_updated_at, NewResource, Resource, ResourceUpdate};
use serde::{Deserialize, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ListFilter, ListOrder, ResourceRepository};
use crate::errors::StorageError;
use crate::pagination::{Page, Pagination};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredResource {
    #[serde(flatten)]
    resource: Resource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unique_value: Option<String>,
}

type Records = HashMap<Uuid, StoredResource>;

/// Map-backed repository, optionally persisted to a JSON snapshot file.
///
/// Every mutation runs under the write lock. With a snapshot configured, the
/// mutated map is written out before it replaces the live one, so a failed
/// write leaves memory and disk unchanged.
pub struct MemoryResourceRepository {
    records: RwLock<Records>,
    snapshot: Option<PathBuf>,
}

impl Default for MemoryResourceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryResourceRepository {
    /// Process-local store; contents are lost when it is dropped.
    pub fn new() -> Self {
        Self { records: RwLock::new(HashMap::new()), snapshot: None }
    }

    /// Load from `path`, creating the file with an empty list if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| StorageError::Unavailable(e.to_string()))?;
            }
        }

        let records = match fs::read(&path).await {
            Ok(bytes) => {
                let list: Vec<StoredResource> = serde_json::from_slice(&bytes)
                    .map_err(|e| StorageError::Unknown(format!("corrupt snapshot {}: {e}", path.display())))?;
                list.into_iter().map(|s| (s.resource.id, s)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = Records::new();
                write_snapshot(&path, &empty).await?;
                empty
            }
            Err(e) => return Err(StorageError::Unavailable(e.to_string())),
        };
        info!(path = %path.display(), count = records.len(), "snapshot loaded");
        Ok(Self { records: RwLock::new(records), snapshot: Some(path) })
    }

    async fn mutate<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Records) -> Result<T, StorageError>,
    {
        let mut records = self.records.write().await;
        match &self.snapshot {
            None => f(&mut *records),
            Some(path) => {
                let mut next = records.clone();
                let out = f(&mut next)?;
                write_snapshot(path, &next).await?;
                *records = next;
                Ok(out)
            }
        }
    }
}

async fn write_snapshot(path: &Path, records: &Records) -> Result<(), StorageError> {
    let mut list: Vec<&StoredResource> = records.values().collect();
    list.sort_by(|a, b| a.resource.created_at.cmp(&b.resource.created_at).then(a.resource.id.cmp(&b.resource.id)));
    let data = serde_json::to_vec_pretty(&list).map_err(|e| StorageError::Unknown(e.to_string()))?;
    fs::write(path, data).await.map_err(|e| StorageError::Unavailable(e.to_string()))?;
    debug!(path = %path.display(), count = list.len(), "snapshot written");
    Ok(())
}

fn ensure_unique(records: &Records, skip: Option<Uuid>, owner: Uuid, value: Option<&str>) -> Result<(), StorageError> {
    let Some(value) = value else { return Ok(()) };
    let taken = records.values().any(|s| {
        Some(s.resource.id) != skip && s.resource.owner == owner && s.unique_value.as_deref() == Some(value)
    });
    if taken {
        return Err(StorageError::Conflict(format!("'{value}' already used by this owner")));
    }
    Ok(())
}

#[async_trait]
impl ResourceRepository for MemoryResourceRepository {
    async fn create(&self, input: NewResource) -> Result<Resource, StorageError> {
        self.mutate(|records| {
            ensure_unique(records, None, input.owner, input.unique_value.as_deref())?;
            let now = Utc::now();
            let mut id = Uuid::new_v4();
            while records.contains_key(&id) {
                id = Uuid::new_v4();
            }
            let resource = Resource {
                id,
                owner: input.owner,
                status: input.status,
                created_at: now,
                updated_at: now,
                fields: input.fields,
            };
            records.insert(id, StoredResource { resource: resource.clone(), unique_value: input.unique_value });
            Ok(resource)
        })
        .await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Resource, StorageError> {
        let records = self.records.read().await;
        records.get(&id).map(|s| s.resource.clone()).ok_or(StorageError::NotFound(id))
    }

    async fn list(&self, filter: &ListFilter, order: ListOrder, pagination: Pagination) -> Result<Page<Resource>, StorageError> {
        let records = self.records.read().await;
        let mut matching: Vec<&Resource> = records.values().map(|s| &s.resource).filter(|r| filter.matches(r)).collect();
        matching.sort_by(|a, b| order.compare(a, b));
        let total = matching.len() as u64;
        let (_, per_page) = pagination.normalize();
        let items = matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, total, pagination))
    }

    async fn update(&self, id: Uuid, input: ResourceUpdate) -> Result<Resource, StorageError> {
        self.mutate(|records| {
            let owner = records.get(&id).map(|s| s.resource.owner).ok_or(StorageError::NotFound(id))?;
            ensure_unique(records, Some(id), owner, input.unique_value.as_deref())?;
            let stored = records.get_mut(&id).ok_or(StorageError::NotFound(id))?;
            stored.resource.fields = input.fields;
            stored.resource.status = input.status;
            stored.resource.updated_at = next_updated_at(stored.resource.updated_at, Utc::now());
            stored.unique_value = input.unique_value;
            Ok(stored.resource.clone())
        })
        .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        self.mutate(|records| records.remove(&id).map(|_| ()).ok_or(StorageError::NotFound(id))).await
    }
}
