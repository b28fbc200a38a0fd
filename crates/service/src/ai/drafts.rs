use std::sync::Arc;

use chrono::Utc;
use models::ai_action_log::Model as ActionLog;
use models::enums::{ActionStatus, ActionType, ParseLoose};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument};
use uuid::Uuid;

use super::errors::ActionError;
use super::executor::{ActionExecutor, ExecutionResult};
use super::store::ActionStore;
use super::target::ActionTarget;
use crate::metrics;

pub const PENDING_LIMIT: u64 = 10;

/// Rows an action refers to before it runs.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct ActionRefs {
    pub event_id: Option<Uuid>,
    pub ticket_type_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Confirmation {
    pub action: ActionLog,
    pub result: ExecutionResult,
}

/// Proposal, listing and confirmation of actions awaiting the user's approval.
pub struct ActionDrafts<S: ActionStore, T: ActionTarget> {
    store: Arc<S>,
    executor: ActionExecutor<S, T>,
}

impl<S: ActionStore, T: ActionTarget> ActionDrafts<S, T> {
    pub fn new(store: Arc<S>, target: Arc<T>) -> Self {
        let executor = ActionExecutor::new(store.clone(), target);
        Self { store, executor }
    }

    pub fn executor(&self) -> &ActionExecutor<S, T> {
        &self.executor
    }

    /// Store a new pending action that needs the user's confirmation.
    #[instrument(skip(self, request_data), fields(user_id = %user_id, action_type = ?action_type))]
    pub async fn propose(
        &self,
        user_id: Uuid,
        action_type: ActionType,
        request_data: Value,
        refs: ActionRefs,
    ) -> Result<ActionLog, ActionError> {
        if !request_data.is_object() {
            return Err(ActionError::invalid("request_data must be a JSON object"));
        }
        let row = ActionLog {
            id: Uuid::new_v4(),
            user_id,
            action_type,
            action_status: ActionStatus::Pending,
            request_data,
            requires_confirmation: true,
            event_id: refs.event_id,
            ticket_type_id: refs.ticket_type_id,
            partner_id: refs.partner_id,
            target_table: None,
            target_id: None,
            result_message: None,
            error_message: None,
            executed_data: None,
            created_at: Utc::now().into(),
            executed_at: None,
        };
        let saved = self.store.insert(row).await?;
        info!(event = "ai_action_proposed", action_id = %saved.id);
        Ok(saved)
    }

    /// Parse a wire name such as `create_event`.
    pub fn parse_type(raw: &str) -> Result<ActionType, ActionError> {
        ActionType::parse_loose(raw).ok_or_else(|| ActionError::invalid(format!("Unknown action type: {raw}")))
    }

    pub async fn pending(&self, user_id: Uuid) -> Result<Vec<ActionLog>, ActionError> {
        self.store.pending_for_user(user_id, PENDING_LIMIT).await
    }

    /// Approve or decline a pending action owned by `user_id`.
    #[instrument(skip(self), fields(user_id = %user_id, action_id = %action_id))]
    pub async fn confirm(
        &self,
        user_id: Uuid,
        action_id: Uuid,
        confirmed: bool,
    ) -> Result<Confirmation, ActionError> {
        let mut action = self
            .store
            .get(action_id)
            .await?
            .filter(|a| a.user_id == user_id && a.requires_confirmation)
            .ok_or(ActionError::NotFound)?;
        if action.action_status != ActionStatus::Pending {
            return Err(ActionError::AlreadyProcessed);
        }

        if !confirmed {
            action.action_status = ActionStatus::Cancelled;
            action.result_message = Some("User declined the action".into());
            let action = self.store.save(action).await?;
            metrics::AI_ACTIONS_TOTAL
                .with_label_values(&[action.action_type.as_db_str().as_str(), "cancelled"])
                .inc();
            info!(event = "ai_action_cancelled");
            return Ok(Confirmation {
                action,
                result: ExecutionResult::ok("Action cancelled successfully", None),
            });
        }

        let result = self.executor.execute(action).await?;
        let action = self.store.get(action_id).await?.ok_or(ActionError::NotFound)?;
        Ok(Confirmation { action, result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::store::mock::MockActionStore;
    use crate::ai::target::mock::MockActionTarget;
    use serde_json::json;

    fn drafts() -> (ActionDrafts<MockActionStore, MockActionTarget>, Arc<MockActionTarget>) {
        let target = Arc::new(MockActionTarget::default());
        (ActionDrafts::new(Arc::new(MockActionStore::default()), target.clone()), target)
    }

    #[tokio::test]
    async fn propose_rejects_non_object() {
        let (d, _) = drafts();
        let err = d.propose(Uuid::new_v4(), ActionType::CreateEvent, json!("hi"), ActionRefs::default()).await.unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
    }

    #[tokio::test]
    async fn decline_cancels_and_blocks_reconfirm() {
        let (d, _) = drafts();
        let user = Uuid::new_v4();
        let a = d.propose(user, ActionType::DeleteEvent, json!({}), ActionRefs::default()).await.unwrap();

        let c = d.confirm(user, a.id, false).await.unwrap();
        assert_eq!(c.action.action_status, ActionStatus::Cancelled);
        assert_eq!(c.action.result_message.as_deref(), Some("User declined the action"));
        assert_eq!(c.result.message.as_deref(), Some("Action cancelled successfully"));

        let err = d.confirm(user, a.id, true).await.unwrap_err();
        assert_eq!(err.to_string(), "Action has already been processed");
    }

    #[tokio::test]
    async fn other_users_cannot_confirm() {
        let (d, _) = drafts();
        let a = d.propose(Uuid::new_v4(), ActionType::DeleteEvent, json!({}), ActionRefs::default()).await.unwrap();
        let err = d.confirm(Uuid::new_v4(), a.id, true).await.unwrap_err();
        assert!(matches!(err, ActionError::NotFound));
    }

    #[tokio::test]
    async fn confirm_runs_executor() {
        let (d, target) = drafts();
        let user = Uuid::new_v4();
        let org = target.add_organizer(user);
        let event_id = target.add_event(org, "Launch");
        let refs = ActionRefs { event_id: Some(event_id), ..Default::default() };
        let a = d.propose(user, ActionType::DeleteEvent, json!({}), refs).await.unwrap();

        let c = d.confirm(user, a.id, true).await.unwrap();
        assert!(c.result.success);
        assert_eq!(c.action.action_status, ActionStatus::Completed);
        assert!(d.pending(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pending_is_newest_ten() {
        let (d, _) = drafts();
        let user = Uuid::new_v4();
        for i in 0..12 {
            d.propose(user, ActionType::UpdateEvent, json!({ "n": i }), ActionRefs::default()).await.unwrap();
        }
        d.propose(Uuid::new_v4(), ActionType::UpdateEvent, json!({}), ActionRefs::default()).await.unwrap();
        let pending = d.pending(user).await.unwrap();
        assert_eq!(pending.len(), 10);
        assert!(pending.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[test]
    fn parses_wire_names() {
        assert_eq!(ActionDrafts::<MockActionStore, MockActionTarget>::parse_type("CREATE_EVENT").unwrap(), ActionType::CreateEvent);
        assert!(ActionDrafts::<MockActionStore, MockActionTarget>::parse_type("launch_rocket").is_err());
    }
}
