use async_trait::async_trait;
use models::ai_action_log::Model as ActionLog;
use uuid::Uuid;

use super::errors::ActionError;

/// Persistence for `ai_action_log` rows.
#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ActionLog>, ActionError>;
    async fn insert(&self, action: ActionLog) -> Result<ActionLog, ActionError>;
    /// Overwrite every column of an existing row.
    async fn save(&self, action: ActionLog) -> Result<ActionLog, ActionError>;
    /// Newest pending actions awaiting this user's confirmation.
    async fn pending_for_user(&self, user_id: Uuid, limit: u64) -> Result<Vec<ActionLog>, ActionError>;
}

/// In-memory store for tests.
pub mod mock {
    use super::*;
    use models::enums::ActionStatus;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockActionStore {
        rows: Mutex<HashMap<Uuid, ActionLog>>,
    }

    impl MockActionStore {
        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    #[async_trait]
    impl ActionStore for MockActionStore {
        async fn get(&self, id: Uuid) -> Result<Option<ActionLog>, ActionError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn insert(&self, action: ActionLog) -> Result<ActionLog, ActionError> {
            let mut rows = self.rows.lock().unwrap();
            if rows.contains_key(&action.id) {
                return Err(ActionError::Store(format!("duplicate action id {}", action.id)));
            }
            rows.insert(action.id, action.clone());
            Ok(action)
        }

        async fn save(&self, action: ActionLog) -> Result<ActionLog, ActionError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get_mut(&action.id) {
                Some(slot) => {
                    *slot = action.clone();
                    Ok(action)
                }
                None => Err(ActionError::Store(format!("action {} does not exist", action.id))),
            }
        }

        async fn pending_for_user(
            &self,
            user_id: Uuid,
            limit: u64,
        ) -> Result<Vec<ActionLog>, ActionError> {
            let rows = self.rows.lock().unwrap();
            let mut out: Vec<ActionLog> = rows
                .values()
                .filter(|a| a.user_id == user_id && a.requires_confirmation && a.action_status == ActionStatus::Pending)
                .cloned()
                .collect();
            out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            out.truncate(limit as usize);
            Ok(out)
        }
    }
}
