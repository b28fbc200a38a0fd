pub mod errors;
pub mod db;
pub mod enums;
pub mod user;
pub mod user_credentials;
pub mod organizer;
pub mod category;
pub mod currency;
pub mod exchange_rate;
pub mod event;
pub mod event_like;
pub mod ticket_type;
pub mod transaction;
pub mod ticket;
pub mod report;
pub mod partner;
pub mod event_collaboration;
pub mod ai_action_log;

#[cfg(test)]
mod tests;
