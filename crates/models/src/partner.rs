use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, organizer};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partner")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub company_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub company_description: Option<String>,
    pub website_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organizer,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organizer => Entity::belongs_to(organizer::Entity).from(Column::OrganizerId).to(organizer::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Clone, Debug, Default)]
pub struct NewPartner {
    pub company_name: String,
    pub company_description: Option<String>,
    pub website_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
}

pub fn validate(input: &NewPartner) -> Result<(), errors::ModelError> {
    if input.company_name.trim().is_empty() {
        return Err(errors::ModelError::Validation("Company name is required".into()));
    }
    if let Some(url) = &input.website_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(errors::ModelError::Validation("website_url must start with http(s)".into()));
        }
    }
    if let Some(email) = &input.contact_email {
        crate::user::validate_email(email)?;
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    organizer_id: Uuid,
    input: NewPartner,
) -> Result<Model, errors::ModelError> {
    validate(&input)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        organizer_id: Set(organizer_id),
        company_name: Set(input.company_name.trim().to_string()),
        company_description: Set(input.company_description),
        website_url: Set(input.website_url),
        contact_email: Set(input.contact_email),
        contact_person: Set(input.contact_person),
        is_active: Set(true),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_name_required() {
        let err = validate(&NewPartner::default()).unwrap_err();
        assert!(err.to_string().contains("Company name"));
    }

    #[test]
    fn website_must_be_http() {
        let p = NewPartner { company_name: "Acme".into(), website_url: Some("ftp://acme".into()), ..Default::default() };
        assert!(validate(&p).is_err());
        let p = NewPartner { company_name: "Acme".into(), website_url: Some("https://acme.io".into()), ..Default::default() };
        assert!(validate(&p).is_ok());
    }
}
