use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(uuid(Ticket::Id).primary_key())
                    .col(uuid(Ticket::UserId).not_null())
                    .col(uuid(Ticket::EventId).not_null())
                    .col(uuid(Ticket::TicketTypeId).not_null())
                    .col(uuid(Ticket::TransactionId).not_null())
                    .col(integer(Ticket::Quantity).not_null())
                    .col(boolean(Ticket::Scanned).default(false))
                    .col(ColumnDef::new(Ticket::ScannedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Ticket::ScannedBy).uuid().null())
                    .col(timestamp_with_time_zone(Ticket::PurchaseDate).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_user")
                            .from(Ticket::Table, Ticket::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_event")
                            .from(Ticket::Table, Ticket::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_ticket_type")
                            .from(Ticket::Table, Ticket::TicketTypeId)
                            .to(TicketType::Table, TicketType::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_transaction")
                            .from(Ticket::Table, Ticket::TransactionId)
                            .to(Transaction::Table, Transaction::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Ticket::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Ticket {
    Table,
    Id,
    UserId,
    EventId,
    TicketTypeId,
    TransactionId,
    Quantity,
    Scanned,
    ScannedAt,
    ScannedBy,
    PurchaseDate,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Event {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum TicketType {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Transaction {
    Table,
    Id,
}
