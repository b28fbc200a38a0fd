use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use chrono::{NaiveDate, NaiveTime, Utc};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::{category, currency, errors, organizer};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub date: Date,
    pub start_time: Time,
    pub end_time: Option<Time>,
    pub city: String,
    pub location: String,
    pub amenities: Json,
    pub image: Option<String>,
    pub base_currency_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organizer,
    Category,
    BaseCurrency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organizer => Entity::belongs_to(organizer::Entity).from(Column::OrganizerId).to(organizer::Column::Id).into(),
            Relation::Category => Entity::belongs_to(category::Entity).from(Column::CategoryId).to(category::Column::Id).into(),
            Relation::BaseCurrency => Entity::belongs_to(currency::Entity).from(Column::BaseCurrencyId).to(currency::Column::Id).into(),
        }
    }
}

impl Related<organizer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organizer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Fields accepted when creating an event.
#[derive(Clone, Debug)]
pub struct NewEvent {
    pub organizer_id: Uuid,
    pub category_id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: Option<NaiveTime>,
    pub city: String,
    pub location: String,
    pub amenities: Vec<String>,
    pub image: Option<String>,
}

/// Date may not be in the past; when an end time is given it must follow the start.
pub fn validate_schedule(
    date: NaiveDate,
    start: NaiveTime,
    end: Option<NaiveTime>,
    today: NaiveDate,
) -> Result<(), errors::ModelError> {
    if date < today {
        return Err(errors::ModelError::Validation("Event date cannot be in the past".into()));
    }
    if let Some(end) = end {
        if start >= end {
            return Err(errors::ModelError::Validation("Start time must be before end time".into()));
        }
    }
    Ok(())
}

pub fn validate_text_fields(
    name: &str,
    description: &str,
    city: &str,
    location: &str,
) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if name.len() > 255 {
        return Err(errors::ModelError::Validation("name too long".into()));
    }
    if description.trim().is_empty() {
        return Err(errors::ModelError::Validation("description required".into()));
    }
    if city.trim().is_empty() {
        return Err(errors::ModelError::Validation("city required".into()));
    }
    if location.trim().is_empty() {
        return Err(errors::ModelError::Validation("location required".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewEvent,
) -> Result<Model, errors::ModelError> {
    validate_text_fields(&input.name, &input.description, &input.city, &input.location)?;
    validate_schedule(input.date, input.start_time, input.end_time, Utc::now().date_naive())?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        organizer_id: Set(input.organizer_id),
        category_id: Set(input.category_id),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        date: Set(input.date),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        city: Set(input.city.trim().to_string()),
        location: Set(input.location.trim().to_string()),
        amenities: Set(serde_json::json!(input.amenities)),
        image: Set(input.image),
        base_currency_id: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }
    fn t(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn past_dates_rejected() {
        let err = validate_schedule(d("2024-01-01"), t("10:00"), None, d("2024-01-02")).unwrap_err();
        assert!(err.to_string().contains("past"));
        assert!(validate_schedule(d("2024-01-02"), t("10:00"), None, d("2024-01-02")).is_ok());
    }

    #[test]
    fn end_must_follow_start() {
        let today = d("2024-01-01");
        assert!(validate_schedule(today, t("18:00"), Some(t("17:00")), today).is_err());
        assert!(validate_schedule(today, t("18:00"), Some(t("18:00")), today).is_err());
        assert!(validate_schedule(today, t("18:00"), Some(t("22:30")), today).is_ok());
    }

    #[test]
    fn blank_fields_rejected() {
        assert!(validate_text_fields("", "d", "c", "l").is_err());
        assert!(validate_text_fields("n", "d", " ", "l").is_err());
        assert!(validate_text_fields("n", "d", "c", "l").is_ok());
    }
}
