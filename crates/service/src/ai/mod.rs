//! Assistant-proposed actions.
//!
//! A proposal is stored as a pending `ai_action_log` row. Once the user
//! confirms it, [`ActionExecutor`] runs the matching handler and records the
//! outcome on the same row:
//!
//! `pending -> in_progress -> (completed | failed)`, or `pending -> cancelled`
//! when the user declines.

pub mod drafts;
pub mod errors;
pub mod executor;
pub mod params;
pub mod repo;
pub mod store;
pub mod target;

pub use drafts::{ActionDrafts, ActionRefs, Confirmation};
pub use errors::ActionError;
pub use executor::{ActionExecutor, ExecutionResult};
pub use store::ActionStore;
pub use target::ActionTarget;
