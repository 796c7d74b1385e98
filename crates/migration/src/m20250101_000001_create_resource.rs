//! Create `resource` table.
//! One row per resource of any entity type; schema fields are stored as JSON text so key order survives.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(uuid(Resource::Id).primary_key())
                    .col(string_len(Resource::Entity, 64).not_null())
                    .col(uuid(Resource::Owner).not_null())
                    .col(string_len(Resource::Status, 32).not_null())
                    .col(text(Resource::Fields).not_null())
                    .col(text_null(Resource::UniqueValue))
                    .col(timestamp_with_time_zone(Resource::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Resource::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        // NULL unique values never collide, so only configured keys are enforced
        manager
            .create_index(
                Index::create()
                    .name("idx_resource_unique_per_owner")
                    .table(Resource::Table)
                    .col(Resource::Entity)
                    .col(Resource::Owner)
                    .col(Resource::UniqueValue)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resource_entity_created_at")
                    .table(Resource::Table)
                    .col(Resource::Entity)
                    .col(Resource::CreatedAt)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_resource_entity_status")
                    .table(Resource::Table)
                    .col(Resource::Entity)
                    .col(Resource::Status)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Resource::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
    Entity,
    Owner,
    Status,
    Fields,
    UniqueValue,
    CreatedAt,
    UpdatedAt,
}
