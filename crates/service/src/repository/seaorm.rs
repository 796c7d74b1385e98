use async_trait::async_trait;
use chrono::Utc;
use models::resource::{next_updated_at, NewResource, Resource, ResourceUpdate};
use models::resource_record::{self, encode_fields, ActiveModel, Column, Entity};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use tracing::warn;
use uuid::Uuid;

use super::{ListFilter, ListOrder, ResourceRepository, SortDirection, SortField};
use crate::errors::StorageError;
use crate::pagination::{Page, Pagination};

/// SeaORM-backed repository over the shared `resource` table, scoped to one entity type.
pub struct SeaOrmResourceRepository {
    db: DatabaseConnection,
    entity: String,
}

impl SeaOrmResourceRepository {
    pub fn new(db: DatabaseConnection, entity: impl Into<String>) -> Self {
        Self { db, entity: entity.into() }
    }

    async fn find(&self, id: Uuid) -> Result<resource_record::Model, StorageError> {
        Entity::find_by_id(id)
            .filter(Column::Entity.eq(self.entity.as_str()))
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(StorageError::NotFound(id))
    }
}

/// Classify a driver error into the storage taxonomy.
pub fn map_db_err(err: DbErr) -> StorageError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return StorageError::Conflict(detail);
    }
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => {
            warn!(error = %err, "database unreachable");
            StorageError::Unavailable(err.to_string())
        }
        other => StorageError::Unknown(other.to_string()),
    }
}

#[async_trait]
impl ResourceRepository for SeaOrmResourceRepository {
    async fn create(&self, input: NewResource) -> Result<Resource, StorageError> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let am = ActiveModel {
            id: Set(Uuid::new_v4()),
            entity: Set(self.entity.clone()),
            owner: Set(input.owner),
            status: Set(input.status),
            fields: Set(encode_fields(&input.fields)?),
            unique_value: Set(input.unique_value),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let row = am.insert(&self.db).await.map_err(map_db_err)?;
        Ok(Resource::try_from(row)?)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Resource, StorageError> {
        let row = self.find(id).await?;
        Ok(Resource::try_from(row)?)
    }

    async fn list(&self, filter: &ListFilter, order: ListOrder, pagination: Pagination) -> Result<Page<Resource>, StorageError> {
        let mut query = Entity::find().filter(Column::Entity.eq(self.entity.as_str()));
        if let Some(owner) = filter.owner {
            query = query.filter(Column::Owner.eq(owner));
        }
        if let Some(status) = &filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        let column = match order.field {
            SortField::CreatedAt => Column::CreatedAt,
            SortField::UpdatedAt => Column::UpdatedAt,
        };
        let direction = match order.direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        };
        let query = query.order_by(column, direction.clone()).order_by(Column::Id, direction);

        let (page_idx, per_page) = pagination.normalize();
        let paginator = query.paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let rows = paginator.fetch_page(page_idx).await.map_err(map_db_err)?;
        let items = rows.into_iter().map(Resource::try_from).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total, pagination))
    }

    async fn update(&self, id: Uuid, input: ResourceUpdate) -> Result<Resource, StorageError> {
        let row = self.find(id).await?;
        let previous = row.updated_at;
        let mut am = row.into_active_model();
        am.status = Set(input.status);
        am.fields = Set(encode_fields(&input.fields)?);
        am.unique_value = Set(input.unique_value);
        am.updated_at = Set(next_updated_at(previous.with_timezone(&Utc), Utc::now()).into());
        let row = am.update(&self.db).await.map_err(|e| match e {
            // deleted between the read and the write
            DbErr::RecordNotUpdated => StorageError::NotFound(id),
            other => map_db_err(other),
        })?;
        Ok(Resource::try_from(row)?)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let res = Entity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::Entity.eq(self.entity.as_str()))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        if res.rows_affected == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }
}
