//! Business services for the eventhub backend, independent of the web layer.
//! - Reuses entities and field validators from the `models` crate.
//! - Each area has its own error type; cross-cutting CRUD uses `ServiceError`.

pub mod errors;
pub mod auth;
pub mod metrics;
pub mod pagination;
pub mod currency;
pub mod ai;
pub mod events;
pub mod categories;
pub mod ticket_types;
pub mod tickets;
pub mod partners;
pub mod reports;
#[cfg(test)]
pub mod test_support;
