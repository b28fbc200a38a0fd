//! Create `report` table.
//!
//! `converted_currency_id`/`converted_revenue` are filled by the revenue
//! conversion endpoints and cleared on demand.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(uuid(Report::Id).primary_key())
                    .col(uuid(Report::OrganizerId).not_null())
                    .col(uuid(Report::EventId).not_null())
                    .col(ColumnDef::new(Report::TicketTypeId).uuid().null())
                    .col(ColumnDef::new(Report::BaseCurrencyId).uuid().null())
                    .col(ColumnDef::new(Report::ConvertedCurrencyId).uuid().null())
                    .col(ColumnDef::new(Report::ConvertedRevenue).decimal_len(14, 2).null())
                    .col(string_len(Report::ReportScope, 32).not_null())
                    .col(integer(Report::TotalTicketsSold).not_null())
                    .col(decimal_len(Report::TotalRevenue, 14, 2).not_null())
                    .col(integer(Report::NumberOfAttendees).not_null())
                    .col(json_binary(Report::ReportData).not_null())
                    .col(timestamp_with_time_zone(Report::Timestamp).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_organizer")
                            .from(Report::Table, Report::OrganizerId)
                            .to(Organizer::Table, Organizer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_event")
                            .from(Report::Table, Report::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_ticket_type")
                            .from(Report::Table, Report::TicketTypeId)
                            .to(TicketType::Table, TicketType::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_base_currency")
                            .from(Report::Table, Report::BaseCurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_converted_currency")
                            .from(Report::Table, Report::ConvertedCurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Report::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Report {
    Table,
    Id,
    OrganizerId,
    EventId,
    TicketTypeId,
    BaseCurrencyId,
    ConvertedCurrencyId,
    ConvertedRevenue,
    ReportScope,
    TotalTicketsSold,
    TotalRevenue,
    NumberOfAttendees,
    ReportData,
    Timestamp,
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

#[derive(DeriveIden)]
enum TicketType {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Currency {
    Table,
    Id,
}
