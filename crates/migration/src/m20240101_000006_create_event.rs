//! Create `event` and `event_like` tables.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(uuid(Event::Id).primary_key())
                    .col(uuid(Event::OrganizerId).not_null())
                    .col(ColumnDef::new(Event::CategoryId).uuid().null())
                    .col(string_len(Event::Name, 255).not_null())
                    .col(text(Event::Description).not_null())
                    .col(date(Event::Date).not_null())
                    .col(time(Event::StartTime).not_null())
                    .col(ColumnDef::new(Event::EndTime).time().null())
                    .col(string_len(Event::City, 100).not_null())
                    .col(string_len(Event::Location, 255).not_null())
                    .col(json_binary(Event::Amenities).not_null())
                    .col(ColumnDef::new(Event::Image).string_len(512).null())
                    .col(ColumnDef::new(Event::BaseCurrencyId).uuid().null())
                    .col(timestamp_with_time_zone(Event::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Event::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_organizer")
                            .from(Event::Table, Event::OrganizerId)
                            .to(Organizer::Table, Organizer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_category")
                            .from(Event::Table, Event::CategoryId)
                            .to(Category::Table, Category::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_base_currency")
                            .from(Event::Table, Event::BaseCurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EventLike::Table)
                    .if_not_exists()
                    .col(uuid(EventLike::UserId).not_null())
                    .col(uuid(EventLike::EventId).not_null())
                    .col(timestamp_with_time_zone(EventLike::CreatedAt).not_null())
                    .primary_key(Index::create().col(EventLike::UserId).col(EventLike::EventId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_like_user")
                            .from(EventLike::Table, EventLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_like_event")
                            .from(EventLike::Table, EventLike::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(EventLike::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Event::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
    OrganizerId,
    CategoryId,
    Name,
    Description,
    Date,
    StartTime,
    EndTime,
    City,
    Location,
    Amenities,
    Image,
    BaseCurrencyId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EventLike {
    Table,
    UserId,
    EventId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizer {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Category {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Currency {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
