//! Create `organizer` profile table (one per user).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organizer::Table)
                    .if_not_exists()
                    .col(uuid(Organizer::Id).primary_key())
                    .col(uuid(Organizer::UserId).unique_key().not_null())
                    .col(string_len(Organizer::CompanyName, 255).not_null())
                    .col(ColumnDef::new(Organizer::ContactEmail).string_len(255).null())
                    .col(timestamp_with_time_zone(Organizer::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organizer_user")
                            .from(Organizer::Table, Organizer::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Organizer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Organizer {
    Table,
    Id,
    UserId,
    CompanyName,
    ContactEmail,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
