use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Event: listing by organizer and by date
        manager
            .create_index(
                Index::create()
                    .name("idx_event_organizer")
                    .table(Event::Table)
                    .col(Event::OrganizerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_event_date")
                    .table(Event::Table)
                    .col(Event::Date)
                    .to_owned(),
            )
            .await?;

        // TicketType: one row per (event, type)
        manager
            .create_index(
                Index::create()
                    .name("uniq_ticket_type_event_type")
                    .table(TicketType::Table)
                    .col(TicketType::EventId)
                    .col(TicketType::TypeName)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ticket_event")
                    .table(Ticket::Table)
                    .col(Ticket::EventId)
                    .to_owned(),
            )
            .await?;

        // Ticket: a payment issues at most one ticket row
        manager
            .create_index(
                Index::create()
                    .name("uniq_ticket_transaction")
                    .table(Ticket::Table)
                    .col(Ticket::TransactionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ExchangeRate: latest active lookup per pair
        manager
            .create_index(
                Index::create()
                    .name("idx_exchange_rate_pair_date")
                    .table(ExchangeRate::Table)
                    .col(ExchangeRate::FromCurrencyId)
                    .col(ExchangeRate::ToCurrencyId)
                    .col(ExchangeRate::EffectiveDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_report_timestamp")
                    .table(Report::Table)
                    .col(Report::Timestamp)
                    .to_owned(),
            )
            .await?;

        // AiActionLog: pending list per user
        manager
            .create_index(
                Index::create()
                    .name("idx_ai_action_user_status")
                    .table(AiActionLog::Table)
                    .col(AiActionLog::UserId)
                    .col(AiActionLog::ActionStatus)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_event_organizer").table(Event::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_event_date").table(Event::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_ticket_type_event_type").table(TicketType::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ticket_event").table(Ticket::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_ticket_transaction").table(Ticket::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_exchange_rate_pair_date").table(ExchangeRate::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_report_timestamp").table(Report::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_ai_action_user_status").table(AiActionLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Event {
    Table,
    OrganizerId,
    Date,
}

#[derive(DeriveIden)]
enum TicketType {
    Table,
    EventId,
    TypeName,
}

#[derive(DeriveIden)]
enum Ticket {
    Table,
    EventId,
    TransactionId,
}

#[derive(DeriveIden)]
enum ExchangeRate {
    Table,
    FromCurrencyId,
    ToCurrencyId,
    EffectiveDate,
}

#[derive(DeriveIden)]
enum Report {
    Table,
    Timestamp,
}

#[derive(DeriveIden)]
enum AiActionLog {
    Table,
    UserId,
    ActionStatus,
}
