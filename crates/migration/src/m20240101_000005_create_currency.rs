//! Create `currency` and `exchange_rate` tables.
//!
//! `exchange_rate` keeps history; the active row with the newest
//! `effective_date` is the one used for conversions.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currency::Table)
                    .if_not_exists()
                    .col(uuid(Currency::Id).primary_key())
                    .col(string_len(Currency::Code, 3).unique_key().not_null())
                    .col(string_len(Currency::Name, 64).not_null())
                    .col(string_len(Currency::Symbol, 8).not_null())
                    .col(boolean(Currency::IsActive).default(true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExchangeRate::Table)
                    .if_not_exists()
                    .col(uuid(ExchangeRate::Id).primary_key())
                    .col(uuid(ExchangeRate::FromCurrencyId).not_null())
                    .col(uuid(ExchangeRate::ToCurrencyId).not_null())
                    .col(decimal_len(ExchangeRate::Rate, 18, 6).not_null())
                    .col(timestamp_with_time_zone(ExchangeRate::EffectiveDate).not_null())
                    .col(boolean(ExchangeRate::IsActive).default(true))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_rate_from")
                            .from(ExchangeRate::Table, ExchangeRate::FromCurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exchange_rate_to")
                            .from(ExchangeRate::Table, ExchangeRate::ToCurrencyId)
                            .to(Currency::Table, Currency::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ExchangeRate::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Currency::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Currency {
    Table,
    Id,
    Code,
    Name,
    Symbol,
    IsActive,
}

#[derive(DeriveIden)]
enum ExchangeRate {
    Table,
    Id,
    FromCurrencyId,
    ToCurrencyId,
    Rate,
    EffectiveDate,
    IsActive,
}
