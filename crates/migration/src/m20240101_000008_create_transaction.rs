//! Create `transaction` table. Rows are written by payment callbacks.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(uuid(Transaction::Id).primary_key())
                    .col(uuid(Transaction::UserId).not_null())
                    .col(decimal_len(Transaction::AmountPaid, 12, 2).not_null())
                    .col(string_len(Transaction::PaymentStatus, 16).not_null())
                    .col(string_len(Transaction::PaymentMethod, 16).not_null())
                    .col(string_len(Transaction::PaymentReference, 128).unique_key().not_null())
                    .col(timestamp_with_time_zone(Transaction::Timestamp).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_user")
                            .from(Transaction::Table, Transaction::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Transaction::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Transaction {
    Table,
    Id,
    UserId,
    AmountPaid,
    PaymentStatus,
    PaymentMethod,
    PaymentReference,
    Timestamp,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
