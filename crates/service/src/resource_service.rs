use std::{sync::Arc, time::Instant};

use futures::stream::{self, Stream, TryStreamExt};
use models::resource::{NewResource, Resource, ResourceUpdate};
use models::schema::Schema;
use models::validation::{merge, validate, Payload};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::context::RequestContext;
use crate::errors::{ServiceError, StorageError};
use crate::observability;
use crate::pagination::{Page, Pagination};
use crate::repository::{ListFilter, ListOrder, ResourceRepository};

/// Application service for one entity type: validate, dispatch to the
/// repository, classify failures.
///
/// Invalid payloads are rejected before any write reaches the repository.
/// Nothing is retried; a repeated `create` may persist a duplicate unless the
/// schema declares a uniqueness key.
pub struct ResourceService<R: ResourceRepository + ?Sized> {
    repo: Arc<R>,
    schema: Arc<Schema>,
}

impl<R: ResourceRepository + ?Sized> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self { repo: Arc::clone(&self.repo), schema: Arc::clone(&self.schema) }
    }
}

impl<R: ResourceRepository + ?Sized> ResourceService<R> {
    pub fn new(repo: Arc<R>, schema: Schema) -> Self {
        Self { repo, schema: Arc::new(schema) }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn entity(&self) -> &str {
        &self.schema.entity
    }

    fn storage_error(&self, err: StorageError) -> ServiceError {
        ServiceError::from_storage(&self.schema.entity, err)
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &Result<T, ServiceError>) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        observability::record(&self.schema.entity, operation, outcome, started.elapsed().as_secs_f64());
        if let Err(e) = result {
            match e {
                ServiceError::Validation(errors) => debug!(operation, count = errors.len(), "rejected invalid payload"),
                ServiceError::NotFound { .. } | ServiceError::Conflict { .. } => debug!(operation, error = %e, "request failed"),
                ServiceError::Unavailable(_) | ServiceError::Unknown(_) => warn!(operation, error = %e, "storage failure"),
            }
        }
    }

    #[instrument(skip(self, payload), fields(entity = %self.schema.entity, principal = %ctx.principal))]
    pub async fn create(&self, ctx: &RequestContext, payload: &Payload) -> Result<Resource, ServiceError> {
        let started = Instant::now();
        let result = self.create_inner(ctx, payload).await;
        self.observe("create", started, &result);
        if let Ok(r) = &result {
            info!(id = %r.id, "resource created");
        }
        result
    }

    async fn create_inner(&self, ctx: &RequestContext, payload: &Payload) -> Result<Resource, ServiceError> {
        let validated = validate(payload, &self.schema).map_err(ServiceError::Validation)?;
        let unique_value = validated.unique_value(&self.schema);
        let input = NewResource {
            owner: ctx.principal,
            status: validated.status.unwrap_or_else(|| self.schema.statuses.initial().to_string()),
            fields: validated.fields,
            unique_value,
        };
        self.repo.create(input).await.map_err(|e| self.storage_error(e))
    }

    #[instrument(skip(self), fields(entity = %self.schema.entity))]
    pub async fn read(&self, id: Uuid) -> Result<Resource, ServiceError> {
        let started = Instant::now();
        let result = self.repo.get_by_id(id).await.map_err(|e| self.storage_error(e));
        self.observe("read", started, &result);
        result
    }

    #[instrument(skip(self), fields(entity = %self.schema.entity))]
    pub async fn list(&self, filter: &ListFilter, order: ListOrder, pagination: Pagination) -> Result<Page<Resource>, ServiceError> {
        let started = Instant::now();
        let result = self.repo.list(filter, order, pagination).await.map_err(|e| self.storage_error(e));
        self.observe("list", started, &result);
        if let Ok(page) = &result {
            debug!(count = page.items.len(), total = page.total, "listed resources");
        }
        result
    }

    /// Lazily walk every matching resource, fetching `per_page` at a time.
    ///
    /// Finite and restartable: calling again re-queries from the first page.
    /// Pages are read independently, so writes made while the stream is being
    /// consumed may shift items between pages.
    pub fn stream(
        &self,
        filter: ListFilter,
        order: ListOrder,
        per_page: u32,
    ) -> impl Stream<Item = Result<Resource, ServiceError>> + '_ {
        stream::try_unfold(Some(1u32), move |next| {
            let filter = filter.clone();
            async move {
                let Some(page) = next else { return Ok(None) };
                let result = self.list(&filter, order, Pagination { page, per_page }).await?;
                let more = result.has_more() && !result.items.is_empty();
                Ok::<_, ServiceError>(Some((result.items, more.then_some(page + 1))))
            }
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<Resource, ServiceError>)))
        .try_flatten()
    }

    /// Collect the whole [`ResourceService::stream`] into memory.
    pub async fn list_all(&self, filter: ListFilter, order: ListOrder) -> Result<Vec<Resource>, ServiceError> {
        self.stream(filter, order, crate::pagination::MAX_PER_PAGE).try_collect().await
    }

    /// Merge `patch` into the stored fields, re-validate the result and
    /// replace. An empty patch only refreshes `updated_at`.
    #[instrument(skip(self, patch), fields(entity = %self.schema.entity))]
    pub async fn update(&self, id: Uuid, patch: &Payload) -> Result<Resource, ServiceError> {
        let started = Instant::now();
        let result = self.update_inner(id, patch).await;
        self.observe("update", started, &result);
        if let Ok(r) = &result {
            info!(id = %r.id, status = %r.status, "resource updated");
        }
        result
    }

    async fn update_inner(&self, id: Uuid, patch: &Payload) -> Result<Resource, ServiceError> {
        let current = self.repo.get_by_id(id).await.map_err(|e| self.storage_error(e))?;
        let merged = merge(&current.fields, patch);
        let validated = validate(&merged, &self.schema).map_err(ServiceError::Validation)?;
        let unique_value = validated.unique_value(&self.schema);
        let input = ResourceUpdate {
            status: validated.status.unwrap_or(current.status),
            fields: validated.fields,
            unique_value,
        };
        self.repo.update(id, input).await.map_err(|e| self.storage_error(e))
    }

    #[instrument(skip(self), fields(entity = %self.schema.entity))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let started = Instant::now();
        let result = self.repo.delete(id).await.map_err(|e| self.storage_error(e));
        self.observe("delete", started, &result);
        if result.is_ok() {
            info!(id = %id, "resource deleted");
        }
        result
    }
}
