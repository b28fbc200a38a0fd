use async_trait::async_trait;
use chrono::Utc;
use models::ai_action_log::{self, Model as ActionLog};
use models::enums::{ActionStatus, CollaborationType, TicketTypeName};
use models::event::NewEvent;
use models::partner::NewPartner;
use models::{category, event, event_collaboration, organizer, partner, ticket_type};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::ai::errors::ActionError;
use crate::ai::store::ActionStore;
use crate::ai::target::{ActionTarget, EventChanges};

pub struct SeaOrmActionStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ActionStore for SeaOrmActionStore {
    async fn get(&self, id: Uuid) -> Result<Option<ActionLog>, ActionError> {
        Ok(ai_action_log::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert(&self, action: ActionLog) -> Result<ActionLog, ActionError> {
        let am: ai_action_log::ActiveModel = action.into();
        Ok(am.reset_all().insert(&self.db).await?)
    }

    async fn save(&self, action: ActionLog) -> Result<ActionLog, ActionError> {
        let am: ai_action_log::ActiveModel = action.into();
        Ok(am.reset_all().update(&self.db).await?)
    }

    async fn pending_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<ActionLog>, ActionError> {
        Ok(ai_action_log::Entity::find()
            .filter(ai_action_log::Column::UserId.eq(user_id))
            .filter(ai_action_log::Column::RequiresConfirmation.eq(true))
            .filter(ai_action_log::Column::ActionStatus.eq(ActionStatus::Pending))
            .order_by_desc(ai_action_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await?)
    }
}

pub struct SeaOrmActionTarget {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ActionTarget for SeaOrmActionTarget {
    async fn organizer_for(&self, user_id: Uuid) -> Result<Option<Uuid>, ActionError> {
        Ok(organizer::find_by_user(&self.db, user_id).await?.map(|o| o.id))
    }

    async fn category_by_name(&self, name: &str) -> Result<Option<Uuid>, ActionError> {
        Ok(category::find_by_name(&self.db, name).await?.map(|c| c.id))
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<event::Model>, ActionError> {
        Ok(event::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_event(&self, input: NewEvent) -> Result<event::Model, ActionError> {
        Ok(event::create(&self.db, input).await?)
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: &EventChanges,
    ) -> Result<event::Model, ActionError> {
        let mut current = event::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ActionError::Missing("Event not found".into()))?;
        changes.apply(&mut current);
        current.updated_at = Utc::now().into();
        let am: event::ActiveModel = current.into();
        Ok(am.reset_all().update(&self.db).await?)
    }

    async fn delete_event(&self, id: Uuid) -> Result<(), ActionError> {
        event::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    async fn find_ticket_type(&self, id: Uuid) -> Result<Option<ticket_type::Model>, ActionError> {
        Ok(ticket_type::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn insert_ticket_type(
        &self,
        event_id: Uuid,
        type_name: TicketTypeName,
        price: Decimal,
        quantity: i32,
    ) -> Result<ticket_type::Model, ActionError> {
        Ok(ticket_type::create(&self.db, event_id, type_name, price, quantity).await?)
    }

    async fn update_ticket_type(
        &self,
        id: Uuid,
        price: Option<Decimal>,
        quantity: Option<i32>,
    ) -> Result<ticket_type::Model, ActionError> {
        let mut am = ticket_type::ActiveModel { id: Set(id), ..Default::default() };
        if let Some(p) = price {
            am.price = Set(p.round_dp(2));
        }
        if let Some(q) = quantity {
            am.quantity = Set(q);
        }
        if price.is_none() && quantity.is_none() {
            return ticket_type::Entity::find_by_id(id)
                .one(&self.db)
                .await?
                .ok_or_else(|| ActionError::Missing("Ticket type not found".into()));
        }
        Ok(am.update(&self.db).await?)
    }

    async fn insert_partner(
        &self,
        organizer_id: Uuid,
        input: NewPartner,
    ) -> Result<partner::Model, ActionError> {
        Ok(partner::create(&self.db, organizer_id, input).await?)
    }

    async fn insert_collaboration(
        &self,
        event_id: Uuid,
        partner_id: Uuid,
        collaboration_type: CollaborationType,
        description: Option<String>,
    ) -> Result<event_collaboration::Model, ActionError> {
        Ok(event_collaboration::create(&self.db, event_id, partner_id, collaboration_type, description).await?)
    }
}
