//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_organizer;
mod m20240101_000004_create_category;
mod m20240101_000005_create_currency;
mod m20240101_000006_create_event;
mod m20240101_000007_create_ticket_type;
mod m20240101_000008_create_transaction;
mod m20240101_000009_create_ticket;
mod m20240101_000010_create_report;
mod m20240101_000011_create_partner;
mod m20240101_000012_create_ai_action_log;
mod m20240101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_organizer::Migration),
            Box::new(m20240101_000004_create_category::Migration),
            Box::new(m20240101_000005_create_currency::Migration),
            Box::new(m20240101_000006_create_event::Migration),
            Box::new(m20240101_000007_create_ticket_type::Migration),
            Box::new(m20240101_000008_create_transaction::Migration),
            Box::new(m20240101_000009_create_ticket::Migration),
            Box::new(m20240101_000010_create_report::Migration),
            Box::new(m20240101_000011_create_partner::Migration),
            Box::new(m20240101_000012_create_ai_action_log::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000099_add_indexes::Migration),
        ]
    }
}
