//! Ticket types of an event, managed by the event's organizer.

use models::enums::{ParseLoose, TicketTypeName};
use models::{event, organizer, ticket_type, user};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct TicketTypeInput {
    pub event_id: Uuid,
    pub type_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketTypeUpdate {
    pub type_name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i32>,
}

pub fn parse_type_name(raw: &str) -> Result<TicketTypeName, ServiceError> {
    TicketTypeName::parse_loose(raw)
        .ok_or_else(|| ServiceError::Validation(format!("Invalid ticket type: {}", raw.trim().to_uppercase())))
}

async fn ensure_owner(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
) -> Result<event::Model, ServiceError> {
    let ev = event::Entity::find_by_id(event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;
    match organizer::find_by_user(db, caller.id).await? {
        Some(o) if o.id == ev.organizer_id => Ok(ev),
        _ => Err(ServiceError::Forbidden("Only the event organizer can manage its ticket types".into())),
    }
}

/// Refuses a type name already used by another ticket type of the event.
async fn ensure_type_free(
    db: &DatabaseConnection,
    event_id: Uuid,
    type_name: TicketTypeName,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut q = ticket_type::Entity::find()
        .filter(ticket_type::Column::EventId.eq(event_id))
        .filter(ticket_type::Column::TypeName.eq(type_name));
    if let Some(id) = except {
        q = q.filter(ticket_type::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::Conflict(format!("Ticket type {} already exists for this event", type_name.as_db_str())));
    }
    Ok(())
}

pub async fn create_ticket_type(
    db: &DatabaseConnection,
    caller: &user::Model,
    input: TicketTypeInput,
) -> Result<ticket_type::Model, ServiceError> {
    let type_name = parse_type_name(&input.type_name)?;
    ticket_type::validate_price_quantity(input.price, input.quantity)?;
    let ev = ensure_owner(db, caller, input.event_id).await?;
    ensure_type_free(db, ev.id, type_name, None).await?;
    let created = ticket_type::create(db, ev.id, type_name, input.price, input.quantity).await?;
    info!(event = "ticket_type_created", ticket_type_id = %created.id, event_id = %ev.id);
    Ok(created)
}

pub async fn list_ticket_types(
    db: &DatabaseConnection,
    event_id: Option<Uuid>,
) -> Result<Vec<ticket_type::Model>, ServiceError> {
    let mut q = ticket_type::Entity::find();
    if let Some(id) = event_id {
        q = q.filter(ticket_type::Column::EventId.eq(id));
    }
    Ok(q.order_by_asc(ticket_type::Column::Price).all(db).await?)
}

pub async fn get_ticket_type(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<ticket_type::Model, ServiceError> {
    ticket_type::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Ticket type"))
}

pub async fn update_ticket_type(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
    input: TicketTypeUpdate,
) -> Result<ticket_type::Model, ServiceError> {
    let current = get_ticket_type(db, id).await?;
    ensure_owner(db, caller, current.event_id).await?;
    let price = input.price.unwrap_or(current.price);
    let quantity = input.quantity.unwrap_or(current.quantity);
    ticket_type::validate_price_quantity(price, quantity)?;
    let type_name = input.type_name.as_deref().map(parse_type_name).transpose()?;
    if let Some(t) = type_name {
        ensure_type_free(db, current.event_id, t, Some(current.id)).await?;
    }

    let mut am: ticket_type::ActiveModel = current.into();
    am.price = Set(price.round_dp(2));
    am.quantity = Set(quantity);
    if let Some(t) = type_name {
        am.type_name = Set(t);
    }
    Ok(am.update(db).await?)
}

pub async fn delete_ticket_type(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<(), ServiceError> {
    let current = get_ticket_type(db, id).await?;
    ensure_owner(db, caller, current.event_id).await?;
    ticket_type::Entity::delete_by_id(id).exec(db).await?;
    info!(event = "ticket_type_deleted", ticket_type_id = %id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::Utc;
    use models::enums::UserRole;

    #[test]
    fn type_names_are_case_insensitive() {
        assert_eq!(parse_type_name("early_bird").unwrap(), TicketTypeName::EarlyBird);
        assert_eq!(parse_type_name("balcony").unwrap_err().to_string(), "validation error: Invalid ticket type: BALCONY");
    }

    #[tokio::test]
    async fn renaming_onto_existing_type_conflicts() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let owner = models::user::create(&db, &format!("tt_{}@example.com", Uuid::new_v4()), "Owner", None, UserRole::Organizer).await?;
        let org = organizer::get_or_create(&db, &owner).await?;
        let ev = event::create(&db, event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Types".into(),
            description: "d".into(),
            date: Utc::now().date_naive(),
            start_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: None,
            city: "Nairobi".into(),
            location: "Hall".into(),
            amenities: vec![],
            image: None,
        })
        .await?;
        let input = |type_name: &str| TicketTypeInput {
            event_id: ev.id,
            type_name: type_name.into(),
            price: Decimal::new(1000, 0),
            quantity: 10,
        };
        create_ticket_type(&db, &owner, input("vip")).await?;
        let regular = create_ticket_type(&db, &owner, input("regular")).await?;

        let rename = TicketTypeUpdate { type_name: Some("VIP".into()), ..Default::default() };
        assert!(matches!(update_ticket_type(&db, &owner, regular.id, rename).await, Err(ServiceError::Conflict(_))));

        // keeping its own name is not a conflict
        let same = TicketTypeUpdate { type_name: Some("regular".into()), price: Some(Decimal::new(1200, 0)), ..Default::default() };
        assert_eq!(update_ticket_type(&db, &owner, regular.id, same).await?.price, Decimal::new(1200, 0));
        Ok(())
    }
}
