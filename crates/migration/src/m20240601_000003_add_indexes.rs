use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Places: lookup by creator backs the read path
        manager
            .create_index(
                Index::create()
                    .name("idx_places_creator")
                    .table(Places::Table)
                    .col(Places::CreatorId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_places_creator").table(Places::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Places { Table, CreatorId }
