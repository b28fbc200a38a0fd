//! Create `partner` and `event_collaboration` tables.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partner::Table)
                    .if_not_exists()
                    .col(uuid(Partner::Id).primary_key())
                    .col(uuid(Partner::OrganizerId).not_null())
                    .col(string_len(Partner::CompanyName, 255).not_null())
                    .col(ColumnDef::new(Partner::CompanyDescription).text().null())
                    .col(ColumnDef::new(Partner::WebsiteUrl).string_len(512).null())
                    .col(ColumnDef::new(Partner::ContactEmail).string_len(255).null())
                    .col(ColumnDef::new(Partner::ContactPerson).string_len(255).null())
                    .col(boolean(Partner::IsActive).default(true))
                    .col(timestamp_with_time_zone(Partner::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Partner::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_partner_organizer")
                            .from(Partner::Table, Partner::OrganizerId)
                            .to(Organizer::Table, Organizer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventCollaboration::Table)
                    .if_not_exists()
                    .col(uuid(EventCollaboration::Id).primary_key())
                    .col(uuid(EventCollaboration::EventId).not_null())
                    .col(uuid(EventCollaboration::PartnerId).not_null())
                    .col(string_len(EventCollaboration::CollaborationType, 32).not_null())
                    .col(ColumnDef::new(EventCollaboration::Description).text().null())
                    .col(integer(EventCollaboration::DisplayOrder).default(0))
                    .col(boolean(EventCollaboration::IsActive).default(true))
                    .col(timestamp_with_time_zone(EventCollaboration::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaboration_event")
                            .from(EventCollaboration::Table, EventCollaboration::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_collaboration_partner")
                            .from(EventCollaboration::Table, EventCollaboration::PartnerId)
                            .to(Partner::Table, Partner::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EventCollaboration::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Partner::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Partner {
    Table,
    Id,
    OrganizerId,
    CompanyName,
    CompanyDescription,
    WebsiteUrl,
    ContactEmail,
    ContactPerson,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EventCollaboration {
    Table,
    Id,
    EventId,
    PartnerId,
    CollaborationType,
    Description,
    DisplayOrder,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizer {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}
