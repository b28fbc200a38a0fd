use std::sync::Arc;

use chrono::Utc;
use models::ai_action_log::Model as ActionLog;
use models::enums::{ActionStatus, ActionType, CollaborationType, ParseLoose, TicketTypeName};
use models::event::NewEvent;
use models::partner::NewPartner;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::errors::ActionError;
use super::params::Params;
use super::store::ActionStore;
use super::target::{ActionTarget, EventChanges};
use crate::metrics;

pub const DEFAULT_TICKET_PRICE: i64 = 1000;
pub const DEFAULT_TICKET_QUANTITY: i32 = 100;

/// What the caller sees after an execution attempt.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ExecutionResult {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self { success: true, message: Some(message.into()), error: None, data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self { success: false, message: None, error: Some(error.into()), data: None }
    }
}

struct Executed {
    message: String,
    data: Option<Value>,
}

impl Executed {
    fn new(message: impl Into<String>, data: Value) -> Self {
        Self { message: message.into(), data: Some(data) }
    }
}

/// Runs confirmed actions against the domain and records the outcome.
pub struct ActionExecutor<S: ActionStore, T: ActionTarget> {
    store: Arc<S>,
    target: Arc<T>,
}

impl<S: ActionStore, T: ActionTarget> Clone for ActionExecutor<S, T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), target: self.target.clone() }
    }
}

impl<S: ActionStore, T: ActionTarget> ActionExecutor<S, T> {
    pub fn new(store: Arc<S>, target: Arc<T>) -> Self {
        Self { store, target }
    }

    /// Execute a pending action.
    ///
    /// Anything other than `pending` is refused without touching the row.
    /// Otherwise the row moves to `in_progress`, the handler runs, and the row
    /// ends `completed` or `failed`. Only storage errors while persisting the
    /// row itself surface as `Err`.
    #[instrument(skip(self, action), fields(action_id = %action.id, action_type = ?action.action_type))]
    pub async fn execute(&self, mut action: ActionLog) -> Result<ExecutionResult, ActionError> {
        if action.action_status != ActionStatus::Pending {
            return Ok(ExecutionResult::failure(ActionError::AlreadyProcessed.to_string()));
        }

        action.action_status = ActionStatus::InProgress;
        action = self.store.save(action).await?;

        let outcome = match action.action_type {
            ActionType::CreateEvent => self.create_event(&mut action).await,
            ActionType::UpdateEvent => self.update_event(&action).await,
            ActionType::DeleteEvent => self.delete_event(&action).await,
            ActionType::CreateTickets => self.create_tickets(&mut action).await,
            ActionType::UpdateTickets => self.update_tickets(&action).await,
            ActionType::ManagePartners => self.manage_partners(&mut action).await,
            other => Err(ActionError::NoExecutor(other.as_db_str())),
        };

        let result = match outcome {
            Ok(done) => {
                action.action_status = ActionStatus::Completed;
                action.result_message = Some(done.message.clone());
                action.executed_data = done.data.clone();
                action.executed_at = Some(Utc::now().into());
                info!(event = "ai_action_completed", message = %done.message);
                ExecutionResult::ok(done.message, done.data)
            }
            Err(e) => {
                let msg = e.to_string();
                action.action_status = ActionStatus::Failed;
                action.error_message = Some(msg.clone());
                warn!(event = "ai_action_failed", error = %msg);
                ExecutionResult::failure(msg)
            }
        };

        let saved = self.store.save(action).await?;
        let (kind, status) = (saved.action_type.as_db_str(), saved.action_status.as_db_str());
        metrics::AI_ACTIONS_TOTAL.with_label_values(&[kind.as_str(), status.as_str()]).inc();
        Ok(result)
    }

    async fn require_organizer(
        &self,
        action: &ActionLog,
        missing_msg: &str,
    ) -> Result<uuid::Uuid, ActionError> {
        self.target
            .organizer_for(action.user_id)
            .await?
            .ok_or_else(|| ActionError::Unauthorized(missing_msg.to_string()))
    }

    async fn create_event(&self, action: &mut ActionLog) -> Result<Executed, ActionError> {
        let organizer_id = self.require_organizer(action, "Organizer profile not found").await?;
        let p = Params::new(&action.request_data);
        p.require(&["name", "description", "date", "start_time", "city", "location"])?;

        let date = p.date("date")?.ok_or_else(|| ActionError::invalid("Missing required fields: date"))?;
        let start_time = p.time("start_time")?.ok_or_else(|| ActionError::invalid("Missing required fields: start_time"))?;
        let end_time = p.time("end_time")?;
        models::event::validate_schedule(date, start_time, end_time, Utc::now().date_naive())?;

        let mut category_id = p.uuid("category_id")?;
        if category_id.is_none() {
            if let Some(name) = p.str("category_name") {
                category_id = self.target.category_by_name(name).await?;
            }
        }

        let input = NewEvent {
            organizer_id,
            category_id,
            name: p.string("name").unwrap_or_default(),
            description: p.string("description").unwrap_or_default(),
            date,
            start_time,
            end_time,
            city: p.string("city").unwrap_or_default(),
            location: p.string("location").unwrap_or_default(),
            amenities: p.string_list("amenities"),
            image: p.string("image"),
        };
        models::event::validate_text_fields(&input.name, &input.description, &input.city, &input.location)?;

        let event = self.target.insert_event(input).await?;
        action.event_id = Some(event.id);
        action.target_table = Some("event".into());
        action.target_id = Some(event.id);
        Ok(Executed::new(
            format!("Event '{}' created successfully!", event.name),
            json!({ "event_id": event.id, "event": event }),
        ))
    }

    async fn owned_event(
        &self,
        action: &ActionLog,
        denied: &str,
    ) -> Result<models::event::Model, ActionError> {
        let event_id = action.event_id.ok_or_else(|| ActionError::Missing("Event not found".into()))?;
        let event = self
            .target
            .find_event(event_id)
            .await?
            .ok_or_else(|| ActionError::Missing("Event not found".into()))?;
        match self.target.organizer_for(action.user_id).await? {
            Some(org) if org == event.organizer_id => Ok(event),
            _ => Err(ActionError::Unauthorized(denied.to_string())),
        }
    }

    async fn update_event(&self, action: &ActionLog) -> Result<Executed, ActionError> {
        let event = self.owned_event(action, "Unauthorized to update this event").await?;
        let p = Params::new(&action.request_data);
        let changes = EventChanges {
            name: p.string("name"),
            description: p.string("description"),
            location: p.string("location"),
            city: p.string("city"),
            date: p.date("date")?,
        };
        if let Some(date) = changes.date {
            models::event::validate_schedule(date, event.start_time, event.end_time, Utc::now().date_naive())?;
        }
        let fields = changes.fields();
        let updated = self.target.update_event(event.id, &changes).await?;
        Ok(Executed::new(
            format!("Event updated successfully. Changed: {}", fields.join(", ")),
            json!({ "event": updated }),
        ))
    }

    async fn delete_event(&self, action: &ActionLog) -> Result<Executed, ActionError> {
        let event = self.owned_event(action, "Unauthorized").await?;
        self.target.delete_event(event.id).await?;
        Ok(Executed {
            message: format!("Event '{}' deleted successfully", event.name),
            data: None,
        })
    }

    async fn create_tickets(&self, action: &mut ActionLog) -> Result<Executed, ActionError> {
        let p = Params::new(&action.request_data);
        let event = match p.uuid("event_id")? {
            Some(id) => self.target.find_event(id).await?,
            None => None,
        }
        .ok_or_else(|| ActionError::Missing("Event not found".into()))?;

        let raw_type = p.str("type_name").unwrap_or("REGULAR").to_uppercase();
        let type_name = TicketTypeName::parse_loose(&raw_type)
            .ok_or_else(|| ActionError::invalid(format!("Invalid ticket type: {raw_type}")))?;
        let price = p.decimal("price")?.unwrap_or(Decimal::from(DEFAULT_TICKET_PRICE));
        let quantity = p.int("quantity")?.unwrap_or(DEFAULT_TICKET_QUANTITY);
        models::ticket_type::validate_price_quantity(price, quantity)?;

        let ticket_type = self.target.insert_ticket_type(event.id, type_name, price, quantity).await?;
        action.ticket_type_id = Some(ticket_type.id);
        Ok(Executed::new(
            format!("Ticket type '{raw_type}' created successfully"),
            json!({ "ticket_type": ticket_type }),
        ))
    }

    async fn update_tickets(&self, action: &ActionLog) -> Result<Executed, ActionError> {
        let not_found = || ActionError::Missing("Ticket type not found".into());
        let id = action.ticket_type_id.ok_or_else(not_found)?;
        let current = self.target.find_ticket_type(id).await?.ok_or_else(not_found)?;

        let p = Params::new(&action.request_data);
        let price = p.decimal("price")?;
        let quantity = p.int("quantity")?;
        models::ticket_type::validate_price_quantity(
            price.unwrap_or(current.price),
            quantity.unwrap_or(current.quantity),
        )?;

        let mut changed = Vec::new();
        if let Some(v) = price {
            changed.push(format!("price to {v}"));
        }
        if let Some(v) = quantity {
            changed.push(format!("quantity to {v}"));
        }
        let updated = self.target.update_ticket_type(id, price, quantity).await?;
        Ok(Executed::new(
            format!("Ticket updated: {}", changed.join(", ")),
            json!({ "ticket_type": updated }),
        ))
    }

    async fn manage_partners(&self, action: &mut ActionLog) -> Result<Executed, ActionError> {
        let operation = Params::new(&action.request_data).str("operation").unwrap_or("create").to_string();
        match operation.as_str() {
            "create" => self.create_partner(action).await,
            "add_collaboration" => self.add_collaboration(action).await,
            other => Err(ActionError::invalid(format!("Unknown operation: {other}"))),
        }
    }

    async fn create_partner(&self, action: &mut ActionLog) -> Result<Executed, ActionError> {
        let organizer_id = self.require_organizer(action, "Organizer profile required").await?;
        let p = Params::new(&action.request_data);
        let input = NewPartner {
            company_name: p.string("company_name").unwrap_or_default(),
            company_description: p.string("company_description"),
            website_url: p.string("website_url"),
            contact_email: p.string("contact_email"),
            contact_person: p.string("contact_person"),
        };
        models::partner::validate(&input)?;

        let partner = self.target.insert_partner(organizer_id, input).await?;
        action.partner_id = Some(partner.id);
        Ok(Executed::new(
            format!("Partner '{}' created successfully", partner.company_name),
            json!({ "partner": partner }),
        ))
    }

    async fn add_collaboration(&self, action: &ActionLog) -> Result<Executed, ActionError> {
        let p = Params::new(&action.request_data);
        p.require(&["event_id", "partner_id"])?;
        let event_id = p.uuid("event_id")?.ok_or_else(|| ActionError::invalid("Missing required fields: event_id"))?;
        let partner_id = p.uuid("partner_id")?.ok_or_else(|| ActionError::invalid("Missing required fields: partner_id"))?;
        let collaboration_type = match p.str("collaboration_type") {
            None => CollaborationType::Partner,
            Some(raw) => CollaborationType::parse_loose(raw)
                .ok_or_else(|| ActionError::invalid(format!("Invalid collaboration type: {raw}")))?,
        };

        let collaboration = self
            .target
            .insert_collaboration(event_id, partner_id, collaboration_type, p.string("description"))
            .await?;
        Ok(Executed::new("Collaboration added successfully", json!({ "collaboration": collaboration })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::store::mock::MockActionStore;
    use crate::ai::target::mock::MockActionTarget;
    use chrono::Duration;
    use uuid::Uuid;

    struct Fixture {
        store: Arc<MockActionStore>,
        target: Arc<MockActionTarget>,
        exec: ActionExecutor<MockActionStore, MockActionTarget>,
        user: Uuid,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MockActionStore::default());
        let target = Arc::new(MockActionTarget::default());
        let exec = ActionExecutor::new(store.clone(), target.clone());
        Fixture { store, target, exec, user: Uuid::new_v4() }
    }

    fn future_date() -> String {
        (Utc::now().date_naive() + Duration::days(30)).format("%Y-%m-%d").to_string()
    }

    impl Fixture {
        async fn stage(&self, action_type: ActionType, request_data: Value) -> ActionLog {
            let row = ActionLog {
                id: Uuid::new_v4(),
                user_id: self.user,
                action_type,
                action_status: ActionStatus::Pending,
                request_data,
                requires_confirmation: true,
                event_id: None,
                ticket_type_id: None,
                partner_id: None,
                target_table: None,
                target_id: None,
                result_message: None,
                error_message: None,
                executed_data: None,
                created_at: Utc::now().into(),
                executed_at: None,
            };
            self.store.insert(row).await.unwrap()
        }

        async fn reload(&self, id: Uuid) -> ActionLog {
            self.store.get(id).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn create_event_links_action_and_completes() {
        let f = fixture();
        f.target.add_organizer(f.user);
        let music = f.target.add_category("Music");
        let action = f
            .stage(
                ActionType::CreateEvent,
                json!({
                    "name": "Jazz Night", "description": "Live jazz", "date": future_date(),
                    "start_time": "19:00", "end_time": "23:00", "city": "Nairobi",
                    "location": "Alliance Francaise", "category_name": "music", "amenities": ["parking"]
                }),
            )
            .await;

        let res = f.exec.execute(action.clone()).await.unwrap();
        assert!(res.success, "{res:?}");
        assert_eq!(res.message.as_deref(), Some("Event 'Jazz Night' created successfully!"));

        let row = f.reload(action.id).await;
        assert_eq!(row.action_status, ActionStatus::Completed);
        assert!(row.executed_at.is_some());
        assert_eq!(row.target_table.as_deref(), Some("event"));
        let event_id = row.event_id.unwrap();
        assert_eq!(row.target_id, Some(event_id));
        let events = f.target.events.lock().unwrap();
        assert_eq!(events[&event_id].category_id, Some(music));
    }

    #[tokio::test]
    async fn create_event_lists_missing_fields() {
        let f = fixture();
        f.target.add_organizer(f.user);
        let action = f.stage(ActionType::CreateEvent, json!({"name": "X", "city": "Mombasa"})).await;
        let res = f.exec.execute(action.clone()).await.unwrap();
        assert!(!res.success);
        assert_eq!(res.error.as_deref(), Some("Missing required fields: description, date, start_time, location"));
        let row = f.reload(action.id).await;
        assert_eq!(row.action_status, ActionStatus::Failed);
        assert_eq!(row.error_message, res.error);
    }

    #[tokio::test]
    async fn create_event_requires_organizer_profile() {
        let f = fixture();
        let action = f.stage(ActionType::CreateEvent, json!({})).await;
        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.error.as_deref(), Some("Organizer profile not found"));
    }

    #[tokio::test]
    async fn bad_time_format_fails() {
        let f = fixture();
        f.target.add_organizer(f.user);
        let action = f
            .stage(
                ActionType::CreateEvent,
                json!({"name": "n", "description": "d", "date": future_date(), "start_time": "7pm", "city": "c", "location": "l"}),
            )
            .await;
        let res = f.exec.execute(action).await.unwrap();
        assert!(res.error.unwrap().starts_with("Invalid date/time format"));
    }

    #[tokio::test]
    async fn processed_action_is_left_untouched() {
        let f = fixture();
        let mut action = f.stage(ActionType::DeleteEvent, json!({})).await;
        action.action_status = ActionStatus::Completed;
        f.store.save(action.clone()).await.unwrap();

        let res = f.exec.execute(action.clone()).await.unwrap();
        assert_eq!(res.error.as_deref(), Some("Action has already been processed"));
        assert_eq!(f.reload(action.id).await, action);
    }

    #[tokio::test]
    async fn unsupported_type_fails_with_name() {
        let f = fixture();
        let action = f.stage(ActionType::AnalyzeSales, json!({})).await;
        let res = f.exec.execute(action.clone()).await.unwrap();
        assert_eq!(res.error.as_deref(), Some("No executor for action type: analyze_sales"));
        assert_eq!(f.reload(action.id).await.action_status, ActionStatus::Failed);
    }

    #[tokio::test]
    async fn update_event_checks_ownership() {
        let f = fixture();
        let other_org = f.target.add_organizer(Uuid::new_v4());
        f.target.add_organizer(f.user);
        let event_id = f.target.add_event(other_org, "Not mine");

        let mut action = f.stage(ActionType::UpdateEvent, json!({"name": "Mine now"})).await;
        action.event_id = Some(event_id);
        f.store.save(action.clone()).await.unwrap();

        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.error.as_deref(), Some("Unauthorized to update this event"));
        assert_eq!(f.target.events.lock().unwrap()[&event_id].name, "Not mine");
    }

    #[tokio::test]
    async fn update_event_reports_changed_fields() {
        let f = fixture();
        let org = f.target.add_organizer(f.user);
        let event_id = f.target.add_event(org, "Expo");

        let mut action = f.stage(ActionType::UpdateEvent, json!({"city": "Kisumu", "name": "Expo 2"})).await;
        action.event_id = Some(event_id);
        f.store.save(action.clone()).await.unwrap();

        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Event updated successfully. Changed: name, city"));
        assert_eq!(f.target.events.lock().unwrap()[&event_id].city, "Kisumu");
    }

    #[tokio::test]
    async fn delete_event_by_owner() {
        let f = fixture();
        let org = f.target.add_organizer(f.user);
        let event_id = f.target.add_event(org, "Gone");
        let mut action = f.stage(ActionType::DeleteEvent, json!({})).await;
        action.event_id = Some(event_id);
        f.store.save(action.clone()).await.unwrap();

        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Event 'Gone' deleted successfully"));
        assert!(f.target.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_tickets_defaults_and_validation() {
        let f = fixture();
        let org = f.target.add_organizer(f.user);
        let event_id = f.target.add_event(org, "Fest");

        let action = f.stage(ActionType::CreateTickets, json!({"event_id": event_id.to_string(), "type_name": "vip"})).await;
        let res = f.exec.execute(action.clone()).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Ticket type 'VIP' created successfully"));
        let row = f.reload(action.id).await;
        let tt = f.target.ticket_types.lock().unwrap()[&row.ticket_type_id.unwrap()].clone();
        assert_eq!(tt.type_name, TicketTypeName::Vip);
        assert_eq!(tt.price, Decimal::from(DEFAULT_TICKET_PRICE));
        assert_eq!(tt.quantity, DEFAULT_TICKET_QUANTITY);

        let action = f.stage(ActionType::CreateTickets, json!({"event_id": event_id.to_string(), "type_name": "balcony"})).await;
        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.error.as_deref(), Some("Invalid ticket type: BALCONY"));

        let action = f.stage(ActionType::CreateTickets, json!({"event_id": Uuid::new_v4().to_string()})).await;
        assert_eq!(f.exec.execute(action).await.unwrap().error.as_deref(), Some("Event not found"));
    }

    #[tokio::test]
    async fn update_tickets_uses_linked_ticket_type() {
        let f = fixture();
        let org = f.target.add_organizer(f.user);
        let event_id = f.target.add_event(org, "Fest");
        let tt = f.target.add_ticket_type(event_id, Decimal::from(500), 50);

        let mut action = f.stage(ActionType::UpdateTickets, json!({"price": 750, "quantity": 80})).await;
        action.ticket_type_id = Some(tt);
        f.store.save(action.clone()).await.unwrap();
        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Ticket updated: price to 750, quantity to 80"));
        assert_eq!(f.target.ticket_types.lock().unwrap()[&tt].quantity, 80);

        let action = f.stage(ActionType::UpdateTickets, json!({"price": 10})).await;
        assert_eq!(f.exec.execute(action).await.unwrap().error.as_deref(), Some("Ticket type not found"));
    }

    #[tokio::test]
    async fn partners_and_collaborations() {
        let f = fixture();
        let org = f.target.add_organizer(f.user);
        let event_id = f.target.add_event(org, "Summit");

        let action = f.stage(ActionType::ManagePartners, json!({"company_name": "Acme Media"})).await;
        let res = f.exec.execute(action.clone()).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Partner 'Acme Media' created successfully"));
        let partner_id = f.reload(action.id).await.partner_id.unwrap();

        let action = f
            .stage(
                ActionType::ManagePartners,
                json!({"operation": "add_collaboration", "event_id": event_id.to_string(),
                       "partner_id": partner_id.to_string(), "collaboration_type": "media partner"}),
            )
            .await;
        let res = f.exec.execute(action).await.unwrap();
        assert_eq!(res.message.as_deref(), Some("Collaboration added successfully"));
        let collabs = f.target.collaborations.lock().unwrap();
        assert_eq!(collabs[0].collaboration_type, CollaborationType::MediaPartner);
        drop(collabs);

        let action = f.stage(ActionType::ManagePartners, json!({"operation": "remove"})).await;
        assert_eq!(f.exec.execute(action).await.unwrap().error.as_deref(), Some("Unknown operation: remove"));

        let action = f.stage(ActionType::ManagePartners, json!({"operation": "create"})).await;
        assert_eq!(f.exec.execute(action).await.unwrap().error.as_deref(), Some("Company name is required"));
    }
}
