//! Create `places` table with FK to `users`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Places::Table)
                    .if_not_exists()
                    .col(uuid(Places::Id).primary_key())
                    .col(small_integer(Places::SchemaVersion).default(1))
                    .col(string_len(Places::Title, 255))
                    .col(text(Places::Description))
                    .col(text(Places::Address))
                    .col(string_len(Places::ImageId, 255))
                    .col(text(Places::ImageUrl))
                    .col(double(Places::Lat))
                    .col(double(Places::Lng))
                    .col(uuid(Places::CreatorId))
                    .col(timestamp_with_time_zone(Places::CreatedAt))
                    .col(timestamp_with_time_zone(Places::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_places_creator")
                            .from(Places::Table, Places::CreatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Places::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Places { Table, Id, SchemaVersion, Title, Description, Address, ImageId, ImageUrl, Lat, Lng, CreatorId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
