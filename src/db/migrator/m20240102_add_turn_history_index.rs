use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // History reads filter by identity and sort by timestamp
        manager
            .create_index(
                Index::create()
                    .name("idx_turns_identity_timestamp")
                    .table(Turns::Table)
                    .col(Turns::IdentityId)
                    .col(Turns::Timestamp)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_turns_identity_timestamp")
                    .table(Turns::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Turns {
    Table,
    IdentityId,
    Timestamp,
}
