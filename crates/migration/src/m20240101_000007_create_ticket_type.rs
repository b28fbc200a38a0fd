use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TicketType::Table)
                    .if_not_exists()
                    .col(uuid(TicketType::Id).primary_key())
                    .col(uuid(TicketType::EventId).not_null())
                    .col(string_len(TicketType::TypeName, 16).not_null())
                    .col(decimal_len(TicketType::Price, 12, 2).not_null())
                    .col(integer(TicketType::Quantity).not_null())
                    .col(timestamp_with_time_zone(TicketType::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_type_event")
                            .from(TicketType::Table, TicketType::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TicketType::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TicketType {
    Table,
    Id,
    EventId,
    TypeName,
    Price,
    Quantity,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}
