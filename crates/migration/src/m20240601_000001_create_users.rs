//! Create `users` table.
//!
//! `place_ids` is the JSONB back-reference to `places.creator_id`; it is only
//! written inside the same transaction that inserts or deletes a place.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(uuid(Users::Id).primary_key())
                    .col(small_integer(Users::SchemaVersion).default(1))
                    .col(string_len(Users::Name, 128))
                    .col(string_len(Users::Email, 255).unique_key())
                    .col(string_len(Users::PasswordHash, 255))
                    .col(ColumnDef::new(Users::ImageId).string_len(255).null())
                    .col(ColumnDef::new(Users::ImageUrl).text().null())
                    .col(json_binary(Users::PlaceIds).default(Expr::cust("'[]'::jsonb")))
                    .col(timestamp_with_time_zone(Users::CreatedAt))
                    .col(timestamp_with_time_zone(Users::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Users { Table, Id, SchemaVersion, Name, Email, PasswordHash, ImageId, ImageUrl, PlaceIds, CreatedAt, UpdatedAt }
