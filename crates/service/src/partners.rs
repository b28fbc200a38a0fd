//! Organizer-managed partners and their event collaborations.
//!
//! Partners belong to one organizer profile and are never hard-deleted:
//! deactivating a partner also deactivates every collaboration it has, and
//! removing a collaboration only flips its `is_active` flag.

use chrono::Utc;
use models::enums::{CollaborationType, ParseLoose, UserRole};
use models::partner::NewPartner;
use models::{event_collaboration, organizer, partner, user};
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::events::owned_event;
use crate::pagination::{Page, Pagination};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerInput {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub website_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollaborationInput {
    pub partner_id: Option<Uuid>,
    pub collaboration_type: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Deactivated {
    pub message: String,
    pub deactivated_collaborations: u64,
}

fn collaboration_type(raw: Option<&str>) -> Result<Option<CollaborationType>, ServiceError> {
    raw.map(|r| {
        CollaborationType::parse_loose(r).ok_or_else(|| ServiceError::Validation(format!("Invalid collaboration type: {r}")))
    })
    .transpose()
}

async fn caller_organizer(
    db: &DatabaseConnection,
    caller: &user::Model,
) -> Result<organizer::Model, ServiceError> {
    if caller.role != UserRole::Organizer {
        return Err(ServiceError::Forbidden("Only organizers can manage partners".into()));
    }
    organizer::find_by_user(db, caller.id)
        .await?
        .ok_or_else(|| ServiceError::not_found("Organizer profile"))
}

async fn ensure_name_free(
    db: &DatabaseConnection,
    organizer_id: Uuid,
    company_name: &str,
    except: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut q = partner::Entity::find()
        .filter(partner::Column::OrganizerId.eq(organizer_id))
        .filter(partner::Column::IsActive.eq(true))
        .filter(Expr::expr(Func::lower(Expr::col(partner::Column::CompanyName))).eq(company_name.trim().to_lowercase()));
    if let Some(id) = except {
        q = q.filter(partner::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::Conflict("Partner with this company name already exists".into()));
    }
    Ok(())
}

#[instrument(skip(db, caller, input), fields(user_id = %caller.id))]
pub async fn create_partner(
    db: &DatabaseConnection,
    caller: &user::Model,
    input: PartnerInput,
) -> Result<partner::Model, ServiceError> {
    let org = caller_organizer(db, caller).await?;
    let new = NewPartner {
        company_name: input.company_name.unwrap_or_default(),
        company_description: input.company_description,
        website_url: input.website_url,
        contact_email: input.contact_email,
        contact_person: input.contact_person,
    };
    partner::validate(&new)?;
    ensure_name_free(db, org.id, &new.company_name, None).await?;
    let created = partner::create(db, org.id, new).await?;
    info!(event = "partner_created", partner_id = %created.id, organizer_id = %org.id);
    Ok(created)
}

/// Organizers see their own partners; admins see every organizer's.
pub async fn list_partners(
    db: &DatabaseConnection,
    caller: &user::Model,
    include_inactive: bool,
    opts: Pagination,
) -> Result<Page<partner::Model>, ServiceError> {
    let mut q = partner::Entity::find();
    if caller.role != UserRole::Admin {
        let org = caller_organizer(db, caller).await?;
        q = q.filter(partner::Column::OrganizerId.eq(org.id));
    }
    if !include_inactive {
        q = q.filter(partner::Column::IsActive.eq(true));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = q.order_by_asc(partner::Column::CompanyName).paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page_idx).await?;
    Ok(Page::new(items, page_idx, per_page, total))
}

pub async fn get_partner(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<partner::Model, ServiceError> {
    let found = partner::Entity::find_by_id(id).one(db).await?;
    if caller.role == UserRole::Admin {
        return found.ok_or_else(|| ServiceError::not_found("Partner"));
    }
    let org = caller_organizer(db, caller).await?;
    found.filter(|p| p.organizer_id == org.id).ok_or_else(|| ServiceError::not_found("Partner"))
}

#[instrument(skip(db, caller, input), fields(user_id = %caller.id, partner_id = %id))]
pub async fn update_partner(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
    input: PartnerInput,
) -> Result<partner::Model, ServiceError> {
    let org = caller_organizer(db, caller).await?;
    let current = get_partner(db, caller, id).await?;
    let merged = NewPartner {
        company_name: input.company_name.clone().unwrap_or_else(|| current.company_name.clone()),
        company_description: input.company_description.or_else(|| current.company_description.clone()),
        website_url: input.website_url.or_else(|| current.website_url.clone()),
        contact_email: input.contact_email.or_else(|| current.contact_email.clone()),
        contact_person: input.contact_person.or_else(|| current.contact_person.clone()),
    };
    partner::validate(&merged)?;
    if input.company_name.is_some() {
        ensure_name_free(db, org.id, &merged.company_name, Some(id)).await?;
    }

    let mut am: partner::ActiveModel = current.into();
    am.company_name = Set(merged.company_name.trim().to_string());
    am.company_description = Set(merged.company_description);
    am.website_url = Set(merged.website_url);
    am.contact_email = Set(merged.contact_email);
    am.contact_person = Set(merged.contact_person);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Deactivate a partner together with all of its active collaborations.
#[instrument(skip(db, caller), fields(user_id = %caller.id, partner_id = %id))]
pub async fn deactivate_partner(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<Deactivated, ServiceError> {
    caller_organizer(db, caller).await?;
    let current = get_partner(db, caller, id).await?;

    let txn = db.begin().await?;
    let mut am: partner::ActiveModel = current.into();
    am.is_active = Set(false);
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;
    let res = event_collaboration::Entity::update_many()
        .col_expr(event_collaboration::Column::IsActive, Expr::value(false))
        .filter(event_collaboration::Column::PartnerId.eq(id))
        .filter(event_collaboration::Column::IsActive.eq(true))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    info!(event = "partner_deactivated", partner_id = %id, collaborations = res.rows_affected);
    Ok(Deactivated {
        message: "Partner deactivated successfully".into(),
        deactivated_collaborations: res.rows_affected,
    })
}

/// Active collaborations of an event the caller organizes, in display order.
pub async fn list_collaborations(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
) -> Result<Vec<event_collaboration::Model>, ServiceError> {
    let ev = owned_event(db, caller, event_id).await?;
    Ok(event_collaboration::Entity::find()
        .filter(event_collaboration::Column::EventId.eq(ev.id))
        .filter(event_collaboration::Column::IsActive.eq(true))
        .order_by_asc(event_collaboration::Column::DisplayOrder)
        .order_by_asc(event_collaboration::Column::CreatedAt)
        .all(db)
        .await?)
}

#[instrument(skip(db, caller, input), fields(user_id = %caller.id, event_id = %event_id))]
pub async fn add_collaboration(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
    input: CollaborationInput,
) -> Result<event_collaboration::Model, ServiceError> {
    let org = caller_organizer(db, caller).await?;
    let ev = owned_event(db, caller, event_id).await?;
    let partner_id = input.partner_id.ok_or_else(|| ServiceError::Validation("Partner ID is required".into()))?;
    partner::Entity::find_by_id(partner_id)
        .filter(partner::Column::OrganizerId.eq(org.id))
        .filter(partner::Column::IsActive.eq(true))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Partner not found or inactive".into()))?;
    let kind = collaboration_type(input.collaboration_type.as_deref())?.unwrap_or(CollaborationType::Partner);

    let existing = event_collaboration::Entity::find()
        .filter(event_collaboration::Column::EventId.eq(ev.id))
        .filter(event_collaboration::Column::PartnerId.eq(partner_id))
        .filter(event_collaboration::Column::IsActive.eq(true))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Conflict("Collaboration already exists".into()));
    }

    let created = event_collaboration::create(db, ev.id, partner_id, kind, input.description).await?;
    let created = match input.display_order {
        Some(order) if order != created.display_order => {
            let mut am: event_collaboration::ActiveModel = created.into();
            am.display_order = Set(order);
            am.update(db).await?
        }
        _ => created,
    };
    info!(event = "collaboration_added", collaboration_id = %created.id, partner_id = %partner_id);
    Ok(created)
}

async fn owned_collaboration(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
    collaboration_id: Uuid,
) -> Result<event_collaboration::Model, ServiceError> {
    caller_organizer(db, caller).await?;
    let ev = owned_event(db, caller, event_id).await?;
    event_collaboration::Entity::find_by_id(collaboration_id)
        .filter(event_collaboration::Column::EventId.eq(ev.id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Collaboration"))
}

pub async fn update_collaboration(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
    collaboration_id: Uuid,
    input: CollaborationInput,
) -> Result<event_collaboration::Model, ServiceError> {
    let current = owned_collaboration(db, caller, event_id, collaboration_id).await?;
    let kind = collaboration_type(input.collaboration_type.as_deref())?;
    let mut am: event_collaboration::ActiveModel = current.into();
    if let Some(k) = kind {
        am.collaboration_type = Set(k);
    }
    if let Some(d) = input.description {
        am.description = Set(Some(d));
    }
    if let Some(order) = input.display_order {
        am.display_order = Set(order);
    }
    Ok(am.update(db).await?)
}

pub async fn remove_collaboration(
    db: &DatabaseConnection,
    caller: &user::Model,
    event_id: Uuid,
    collaboration_id: Uuid,
) -> Result<(), ServiceError> {
    let current = owned_collaboration(db, caller, event_id, collaboration_id).await?;
    let mut am: event_collaboration::ActiveModel = current.into();
    am.is_active = Set(false);
    am.update(db).await?;
    info!(event = "collaboration_removed", collaboration_id = %collaboration_id, user_id = %caller.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::event;

    #[test]
    fn collaboration_types_parse_loosely() {
        assert_eq!(collaboration_type(None).unwrap(), None);
        assert_eq!(collaboration_type(Some("media partner")).unwrap(), Some(CollaborationType::MediaPartner));
        let err = collaboration_type(Some("sponsor-ish")).unwrap_err();
        assert!(err.to_string().contains("Invalid collaboration type"));
    }

    async fn organizer_with_event(
        db: &DatabaseConnection,
    ) -> anyhow::Result<(user::Model, event::Model)> {
        let owner = user::create(db, &format!("pt_{}@example.com", Uuid::new_v4()), "Pat Organizer", None, UserRole::Organizer).await?;
        let org = organizer::get_or_create(db, &owner).await?;
        let ev = event::create(db, event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Partnered".into(),
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
        Ok((owner, ev))
    }

    fn named(name: &str) -> PartnerInput {
        PartnerInput { company_name: Some(name.into()), ..Default::default() }
    }

    #[tokio::test]
    async fn partner_lifecycle() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (owner, _) = organizer_with_event(&db).await?;
        let (other, _) = organizer_with_event(&db).await?;
        let attendee = user::create(&db, &format!("pa_{}@example.com", Uuid::new_v4()), "Attendee", None, UserRole::Attendee).await?;

        assert!(matches!(create_partner(&db, &attendee, named("Acme")).await, Err(ServiceError::Forbidden(_))));
        let p = create_partner(&db, &owner, named("Acme")).await?;
        assert!(matches!(create_partner(&db, &owner, named("acme")).await, Err(ServiceError::Conflict(_))));
        let q = create_partner(&db, &owner, named("Beta Media")).await?;
        assert!(matches!(
            update_partner(&db, &owner, q.id, named("Acme")).await,
            Err(ServiceError::Conflict(_))
        ));

        let updated = update_partner(&db, &owner, p.id, PartnerInput {
            contact_person: Some("Jo".into()),
            ..Default::default()
        })
        .await?;
        assert_eq!(updated.company_name, "Acme");
        assert_eq!(updated.contact_person.as_deref(), Some("Jo"));

        assert!(matches!(get_partner(&db, &other, p.id).await, Err(ServiceError::NotFound(_))));
        let page = list_partners(&db, &owner, false, Pagination::default()).await?;
        assert_eq!(page.total, 2);
        Ok(())
    }

    #[tokio::test]
    async fn collaborations_follow_partner_state() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let (owner, ev) = organizer_with_event(&db).await?;
        let (other, _) = organizer_with_event(&db).await?;
        let p = create_partner(&db, &owner, named("Gamma Sounds")).await?;

        let input = CollaborationInput {
            partner_id: Some(p.id),
            collaboration_type: Some("media partner".into()),
            ..Default::default()
        };
        assert!(matches!(add_collaboration(&db, &other, ev.id, input.clone()).await, Err(ServiceError::Forbidden(_))));
        let c = add_collaboration(&db, &owner, ev.id, input.clone()).await?;
        assert_eq!(c.collaboration_type, CollaborationType::MediaPartner);
        assert!(matches!(add_collaboration(&db, &owner, ev.id, input.clone()).await, Err(ServiceError::Conflict(_))));

        let c = update_collaboration(&db, &owner, ev.id, c.id, CollaborationInput {
            display_order: Some(3),
            ..Default::default()
        })
        .await?;
        assert_eq!(c.display_order, 3);
        assert_eq!(list_collaborations(&db, &owner, ev.id).await?.len(), 1);

        remove_collaboration(&db, &owner, ev.id, c.id).await?;
        assert!(list_collaborations(&db, &owner, ev.id).await?.is_empty());

        add_collaboration(&db, &owner, ev.id, input.clone()).await?;
        let out = deactivate_partner(&db, &owner, p.id).await?;
        assert_eq!(out.deactivated_collaborations, 1);
        assert!(list_collaborations(&db, &owner, ev.id).await?.is_empty());
        match add_collaboration(&db, &owner, ev.id, input).await {
            Err(ServiceError::NotFound(m)) => assert_eq!(m, "Partner not found or inactive"),
            other => panic!("unexpected: {other:?}"),
        }
        Ok(())
    }
}
