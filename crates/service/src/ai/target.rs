use async_trait::async_trait;
use chrono::NaiveDate;
use models::enums::{CollaborationType, TicketTypeName};
use models::event::NewEvent;
use models::partner::NewPartner;
use models::{event, event_collaboration, partner, ticket_type};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::errors::ActionError;

/// Event columns an action may change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub date: Option<NaiveDate>,
}

impl EventChanges {
    /// Names of the changed columns, in a stable order.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.name.is_some() {
            out.push("name");
        }
        if self.description.is_some() {
            out.push("description");
        }
        if self.location.is_some() {
            out.push("location");
        }
        if self.city.is_some() {
            out.push("city");
        }
        if self.date.is_some() {
            out.push("date");
        }
        out
    }

    pub fn apply(&self, e: &mut event::Model) {
        if let Some(v) = &self.name {
            e.name = v.clone();
        }
        if let Some(v) = &self.description {
            e.description = v.clone();
        }
        if let Some(v) = &self.location {
            e.location = v.clone();
        }
        if let Some(v) = &self.city {
            e.city = v.clone();
        }
        if let Some(v) = self.date {
            e.date = v;
        }
    }
}

/// Domain writes performed by action handlers.
#[async_trait]
pub trait ActionTarget: Send + Sync {
    async fn organizer_for(&self, user_id: Uuid) -> Result<Option<Uuid>, ActionError>;
    async fn category_by_name(&self, name: &str) -> Result<Option<Uuid>, ActionError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<event::Model>, ActionError>;
    async fn insert_event(&self, input: NewEvent) -> Result<event::Model, ActionError>;
    async fn update_event(&self, id: Uuid, changes: &EventChanges) -> Result<event::Model, ActionError>;
    async fn delete_event(&self, id: Uuid) -> Result<(), ActionError>;

    async fn find_ticket_type(&self, id: Uuid) -> Result<Option<ticket_type::Model>, ActionError>;
    async fn insert_ticket_type(
        &self,
        event_id: Uuid,
        type_name: TicketTypeName,
        price: Decimal,
        quantity: i32,
    ) -> Result<ticket_type::Model, ActionError>;
    async fn update_ticket_type(
        &self,
        id: Uuid,
        price: Option<Decimal>,
        quantity: Option<i32>,
    ) -> Result<ticket_type::Model, ActionError>;

    async fn insert_partner(&self, organizer_id: Uuid, input: NewPartner) -> Result<partner::Model, ActionError>;
    async fn insert_collaboration(
        &self,
        event_id: Uuid,
        partner_id: Uuid,
        collaboration_type: CollaborationType,
        description: Option<String>,
    ) -> Result<event_collaboration::Model, ActionError>;
}

/// In-memory target for executor tests.
pub mod mock {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockActionTarget {
        organizers: Mutex<HashMap<Uuid, Uuid>>, // user_id -> organizer_id
        categories: Mutex<HashMap<String, Uuid>>, // lower-cased name
        pub events: Mutex<HashMap<Uuid, event::Model>>,
        pub ticket_types: Mutex<HashMap<Uuid, ticket_type::Model>>,
        pub partners: Mutex<HashMap<Uuid, partner::Model>>,
        pub collaborations: Mutex<Vec<event_collaboration::Model>>,
    }

    impl MockActionTarget {
        pub fn add_organizer(&self, user_id: Uuid) -> Uuid {
            let id = Uuid::new_v4();
            self.organizers.lock().unwrap().insert(user_id, id);
            id
        }

        pub fn add_category(&self, name: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.categories.lock().unwrap().insert(name.to_lowercase(), id);
            id
        }

        pub fn add_event(&self, organizer_id: Uuid, name: &str) -> Uuid {
            let now = Utc::now();
            let e = event::Model {
                id: Uuid::new_v4(),
                organizer_id,
                category_id: None,
                name: name.to_string(),
                description: format!("{name} description"),
                date: now.date_naive(),
                start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
                end_time: None,
                city: "Nairobi".into(),
                location: "KICC".into(),
                amenities: serde_json::json!([]),
                image: None,
                base_currency_id: None,
                created_at: now.into(),
                updated_at: now.into(),
            };
            let id = e.id;
            self.events.lock().unwrap().insert(id, e);
            id
        }

        pub fn add_ticket_type(&self, event_id: Uuid, price: Decimal, quantity: i32) -> Uuid {
            let t = ticket_type::Model {
                id: Uuid::new_v4(),
                event_id,
                type_name: TicketTypeName::Regular,
                price,
                quantity,
                created_at: Utc::now().into(),
            };
            let id = t.id;
            self.ticket_types.lock().unwrap().insert(id, t);
            id
        }
    }

    #[async_trait]
    impl ActionTarget for MockActionTarget {
        async fn organizer_for(&self, user_id: Uuid) -> Result<Option<Uuid>, ActionError> {
            Ok(self.organizers.lock().unwrap().get(&user_id).copied())
        }

        async fn category_by_name(&self, name: &str) -> Result<Option<Uuid>, ActionError> {
            Ok(self.categories.lock().unwrap().get(&name.trim().to_lowercase()).copied())
        }

        async fn find_event(&self, id: Uuid) -> Result<Option<event::Model>, ActionError> {
            Ok(self.events.lock().unwrap().get(&id).cloned())
        }

        async fn insert_event(&self, input: NewEvent) -> Result<event::Model, ActionError> {
            let now = Utc::now();
            let e = event::Model {
                id: Uuid::new_v4(),
                organizer_id: input.organizer_id,
                category_id: input.category_id,
                name: input.name,
                description: input.description,
                date: input.date,
                start_time: input.start_time,
                end_time: input.end_time,
                city: input.city,
                location: input.location,
                amenities: serde_json::json!(input.amenities),
                image: input.image,
                base_currency_id: None,
                created_at: now.into(),
                updated_at: now.into(),
            };
            self.events.lock().unwrap().insert(e.id, e.clone());
            Ok(e)
        }

        async fn update_event(
            &self,
            id: Uuid,
            changes: &EventChanges,
        ) -> Result<event::Model, ActionError> {
            let mut events = self.events.lock().unwrap();
            let e = events.get_mut(&id).ok_or_else(|| ActionError::Missing("Event not found".into()))?;
            changes.apply(e);
            Ok(e.clone())
        }

        async fn delete_event(&self, id: Uuid) -> Result<(), ActionError> {
            self.events.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn find_ticket_type(
            &self,
            id: Uuid,
        ) -> Result<Option<ticket_type::Model>, ActionError> {
            Ok(self.ticket_types.lock().unwrap().get(&id).cloned())
        }

        async fn insert_ticket_type(
            &self,
            event_id: Uuid,
            type_name: TicketTypeName,
            price: Decimal,
            quantity: i32,
        ) -> Result<ticket_type::Model, ActionError> {
            let t = ticket_type::Model { id: Uuid::new_v4(), event_id, type_name, price, quantity, created_at: Utc::now().into() };
            self.ticket_types.lock().unwrap().insert(t.id, t.clone());
            Ok(t)
        }

        async fn update_ticket_type(
            &self,
            id: Uuid,
            price: Option<Decimal>,
            quantity: Option<i32>,
        ) -> Result<ticket_type::Model, ActionError> {
            let mut all = self.ticket_types.lock().unwrap();
            let t = all.get_mut(&id).ok_or_else(|| ActionError::Missing("Ticket type not found".into()))?;
            if let Some(p) = price {
                t.price = p;
            }
            if let Some(q) = quantity {
                t.quantity = q;
            }
            Ok(t.clone())
        }

        async fn insert_partner(
            &self,
            organizer_id: Uuid,
            input: NewPartner,
        ) -> Result<partner::Model, ActionError> {
            let p = partner::Model {
                id: Uuid::new_v4(),
                organizer_id,
                company_name: input.company_name,
                company_description: input.company_description,
                website_url: input.website_url,
                contact_email: input.contact_email,
                contact_person: input.contact_person,
                is_active: true,
                created_at: Utc::now().into(),
                updated_at: Utc::now().into(),
            };
            self.partners.lock().unwrap().insert(p.id, p.clone());
            Ok(p)
        }

        async fn insert_collaboration(
            &self,
            event_id: Uuid,
            partner_id: Uuid,
            collaboration_type: CollaborationType,
            description: Option<String>,
        ) -> Result<event_collaboration::Model, ActionError> {
            let c = event_collaboration::Model {
                id: Uuid::new_v4(),
                event_id,
                partner_id,
                collaboration_type,
                description,
                display_order: 0,
                is_active: true,
                created_at: Utc::now().into(),
            };
            self.collaborations.lock().unwrap().push(c.clone());
            Ok(c)
        }
    }
}
