//! Event CRUD, likes and the admin listing.

use chrono::{NaiveDate, NaiveTime, Utc};
use models::enums::UserRole;
use models::event::NewEvent;
use models::{category, event, event_like, organizer, user};
use sea_orm::sea_query::{Condition, Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::{Page, Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub city: Option<String>,
    /// Free text matched against name, description, location and city.
    pub q: Option<String>,
}

/// Create/update payload. Dates are `YYYY-MM-DD`, times `HH:MM` (seconds optional).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EventInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ServiceError::Validation("Invalid date format. Use YYYY-MM-DD".into()))
}

pub fn parse_time(value: &str) -> Result<NaiveTime, ServiceError> {
    let v = value.trim();
    NaiveTime::parse_from_str(v, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M:%S"))
        .map_err(|_| ServiceError::Validation("Invalid time format. Use HH:MM".into()))
}

fn required<'a>(input: &'a EventInput) -> Result<[&'a str; 6], ServiceError> {
    let fields = [
        ("name", input.name.as_deref()),
        ("description", input.description.as_deref()),
        ("date", input.date.as_deref()),
        ("start_time", input.start_time.as_deref()),
        ("city", input.city.as_deref()),
        ("location", input.location.as_deref()),
    ];
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, v)| v.map_or(true, |s| s.trim().is_empty()))
        .map(|(k, _)| *k)
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::Validation(format!("Missing required fields: {}", missing.join(", "))));
    }
    Ok(fields.map(|(_, v)| v.unwrap_or_default()))
}

async fn resolve_category(
    db: &DatabaseConnection,
    input: &EventInput,
) -> Result<Option<Uuid>, ServiceError> {
    if let Some(id) = input.category_id {
        return match category::Entity::find_by_id(id).one(db).await? {
            Some(c) => Ok(Some(c.id)),
            None => Err(ServiceError::not_found("Category")),
        };
    }
    match input.category_name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => Ok(category::find_by_name(db, name).await?.map(|c| c.id)),
        None => Ok(None),
    }
}

pub async fn list_events(
    db: &DatabaseConnection,
    filter: &EventFilter,
    opts: Pagination,
) -> Result<Page<event::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let mut query = event::Entity::find();
    if let Some(city) = filter.city.as_deref().filter(|c| !c.trim().is_empty()) {
        query = query.filter(Expr::expr(Func::lower(Expr::col(event::Column::City))).eq(city.trim().to_lowercase()));
    }
    if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let pattern = format!("%{}%", q.trim().to_lowercase());
        let like = |col: event::Column| Expr::expr(Func::lower(Expr::col(col))).like(pattern.clone());
        query = query.filter(
            Condition::any()
                .add(like(event::Column::Name))
                .add(like(event::Column::Description))
                .add(like(event::Column::Location))
                .add(like(event::Column::City)),
        );
    }
    let paginator = query
        .order_by_asc(event::Column::Date)
        .order_by_asc(event::Column::StartTime)
        .paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, page_idx, per_page, total))
}

pub async fn get_event(db: &DatabaseConnection, id: Uuid) -> Result<event::Model, ServiceError> {
    event::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Event"))
}

/// Create an event for an organizer; their organizer profile is created on first use.
#[instrument(skip(db, caller, input), fields(user_id = %caller.id))]
pub async fn create_event(
    db: &DatabaseConnection,
    caller: &user::Model,
    input: EventInput,
) -> Result<event::Model, ServiceError> {
    if caller.role != UserRole::Organizer {
        return Err(ServiceError::Forbidden("Only organizers can create events".into()));
    }
    let [name, description, date, start_time, city, location] = required(&input)?;
    let new = NewEvent {
        organizer_id: Uuid::nil(),
        category_id: resolve_category(db, &input).await?,
        name: name.to_string(),
        description: description.to_string(),
        date: parse_date(date)?,
        start_time: parse_time(start_time)?,
        end_time: input.end_time.as_deref().filter(|s| !s.trim().is_empty()).map(parse_time).transpose()?,
        city: city.to_string(),
        location: location.to_string(),
        amenities: input.amenities.clone().unwrap_or_default(),
        image: input.image.clone(),
    };
    event::validate_text_fields(&new.name, &new.description, &new.city, &new.location)?;
    event::validate_schedule(new.date, new.start_time, new.end_time, Utc::now().date_naive())?;

    let txn = db.begin().await?;
    let org = organizer::get_or_create(&txn, caller).await?;
    let created = event::create(&txn, NewEvent { organizer_id: org.id, ..new }).await?;
    txn.commit().await?;
    info!(event = "event_created", event_id = %created.id, organizer_id = %org.id);
    Ok(created)
}

pub(crate) async fn owned_event(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<event::Model, ServiceError> {
    let ev = get_event(db, id).await?;
    let org = organizer::find_by_user(db, caller.id).await?;
    match org {
        Some(o) if o.id == ev.organizer_id => Ok(ev),
        _ => Err(ServiceError::Forbidden("You are not the organizer of this event".into())),
    }
}

/// Partial update by the owning organizer.
#[instrument(skip(db, caller, input), fields(user_id = %caller.id, event_id = %id))]
pub async fn update_event(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
    input: EventInput,
) -> Result<event::Model, ServiceError> {
    let current = owned_event(db, caller, id).await?;

    let name = input.name.clone().unwrap_or_else(|| current.name.clone());
    let description = input.description.clone().unwrap_or_else(|| current.description.clone());
    let city = input.city.clone().unwrap_or_else(|| current.city.clone());
    let location = input.location.clone().unwrap_or_else(|| current.location.clone());
    event::validate_text_fields(&name, &description, &city, &location)?;

    let date = input.date.as_deref().map(parse_date).transpose()?.unwrap_or(current.date);
    let start_time = input.start_time.as_deref().map(parse_time).transpose()?.unwrap_or(current.start_time);
    let end_time = match input.end_time.as_deref() {
        Some(s) if s.trim().is_empty() => None,
        Some(s) => Some(parse_time(s)?),
        None => current.end_time,
    };
    if input.date.is_some() || input.start_time.is_some() || input.end_time.is_some() {
        event::validate_schedule(date, start_time, end_time, Utc::now().date_naive())?;
    }
    let category_id = if input.category_id.is_some() || input.category_name.is_some() {
        resolve_category(db, &input).await?
    } else {
        current.category_id
    };

    let mut am: event::ActiveModel = current.into();
    am.name = Set(name.trim().to_string());
    am.description = Set(description);
    am.city = Set(city.trim().to_string());
    am.location = Set(location.trim().to_string());
    am.date = Set(date);
    am.start_time = Set(start_time);
    am.end_time = Set(end_time);
    am.category_id = Set(category_id);
    if let Some(a) = input.amenities {
        am.amenities = Set(serde_json::json!(a));
    }
    if let Some(img) = input.image {
        am.image = Set(Some(img));
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete_event(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<(), ServiceError> {
    let ev = owned_event(db, caller, id).await?;
    event::Entity::delete_by_id(ev.id).exec(db).await?;
    info!(event = "event_deleted", event_id = %id, user_id = %caller.id);
    Ok(())
}

pub async fn like_event(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<u64, ServiceError> {
    get_event(db, event_id).await?;
    if event_like::Entity::find_by_id((user_id, event_id)).one(db).await?.is_some() {
        return Err(ServiceError::Validation("You have already liked this event".into()));
    }
    event_like::ActiveModel {
        user_id: Set(user_id),
        event_id: Set(event_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    like_count(db, event_id).await
}

pub async fn unlike_event(
    db: &DatabaseConnection,
    user_id: Uuid,
    event_id: Uuid,
) -> Result<u64, ServiceError> {
    let res = event_like::Entity::delete_by_id((user_id, event_id)).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::Validation("You have not liked this event".into()));
    }
    like_count(db, event_id).await
}

pub async fn like_count(db: &DatabaseConnection, event_id: Uuid) -> Result<u64, ServiceError> {
    Ok(event_like::Entity::find().filter(event_like::Column::EventId.eq(event_id)).count(db).await?)
}

/// Every event, newest first; admin only at the HTTP layer.
pub async fn admin_list_events(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Page<event::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let paginator = event::Entity::find().order_by_desc(event::Column::CreatedAt).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, page_idx, per_page, total))
}

pub async fn admin_delete_event(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = event::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("Event"));
    }
    info!(event = "event_deleted_by_admin", event_id = %id);
    Ok(())
}
