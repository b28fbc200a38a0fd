//! Create `ai_action_log`, the audit trail of assistant-proposed mutations.
//!
//! Links to the rows an action touched are nullable and survive deletion of
//! the target (SET NULL).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiActionLog::Table)
                    .if_not_exists()
                    .col(uuid(AiActionLog::Id).primary_key())
                    .col(uuid(AiActionLog::UserId).not_null())
                    .col(string_len(AiActionLog::ActionType, 32).not_null())
                    .col(string_len(AiActionLog::ActionStatus, 32).not_null())
                    .col(json_binary(AiActionLog::RequestData).not_null())
                    .col(boolean(AiActionLog::RequiresConfirmation).default(true))
                    .col(ColumnDef::new(AiActionLog::EventId).uuid().null())
                    .col(ColumnDef::new(AiActionLog::TicketTypeId).uuid().null())
                    .col(ColumnDef::new(AiActionLog::PartnerId).uuid().null())
                    .col(ColumnDef::new(AiActionLog::TargetTable).string_len(64).null())
                    .col(ColumnDef::new(AiActionLog::TargetId).uuid().null())
                    .col(ColumnDef::new(AiActionLog::ResultMessage).text().null())
                    .col(ColumnDef::new(AiActionLog::ErrorMessage).text().null())
                    .col(ColumnDef::new(AiActionLog::ExecutedData).json_binary().null())
                    .col(timestamp_with_time_zone(AiActionLog::CreatedAt).not_null())
                    .col(ColumnDef::new(AiActionLog::ExecutedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_action_user")
                            .from(AiActionLog::Table, AiActionLog::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_action_event")
                            .from(AiActionLog::Table, AiActionLog::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_action_ticket_type")
                            .from(AiActionLog::Table, AiActionLog::TicketTypeId)
                            .to(TicketType::Table, TicketType::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ai_action_partner")
                            .from(AiActionLog::Table, AiActionLog::PartnerId)
                            .to(Partner::Table, Partner::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AiActionLog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AiActionLog {
    Table,
    Id,
    UserId,
    ActionType,
    ActionStatus,
    RequestData,
    RequiresConfirmation,
    EventId,
    TicketTypeId,
    PartnerId,
    TargetTable,
    TargetId,
    ResultMessage,
    ErrorMessage,
    ExecutedData,
    CreatedAt,
    ExecutedAt,
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
enum Partner {
    Table,
    Id,
}
