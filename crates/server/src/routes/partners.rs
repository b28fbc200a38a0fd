use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use models::{event_collaboration, partner};
use serde::Deserialize;
use service::auth::Claims;
use service::pagination::{Page, Pagination};
use service::partners::{self as svc, CollaborationInput, Deactivated, PartnerInput};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PartnerListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Include deactivated partners.
    #[serde(default)]
    pub include_inactive: bool,
}

#[utoipa::path(get, path = "/partners", tag = "partners", params(PartnerListQuery), responses((status = 200, description = "Caller's partners; every partner for admins"), (status = 403, description = "Not an organizer")), security(("bearer" = [])))]
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<PartnerListQuery>,
) -> Result<Json<Page<partner::Model>>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let page = svc::list_partners(&state.db, &caller, q.include_inactive, Pagination::from_query(q.page, q.per_page)).await?;
    Ok(Json(page))
}

#[utoipa::path(post, path = "/partners", tag = "partners", request_body = crate::openapi::PartnerRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Company name already used")), security(("bearer" = [])))]
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<PartnerInput>,
) -> Result<(StatusCode, Json<partner::Model>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok((StatusCode::CREATED, Json(svc::create_partner(&state.db, &caller, input).await?)))
}

#[utoipa::path(get, path = "/partners/{id}", tag = "partners", params(("id" = Uuid, Path, description = "Partner id")), responses((status = 200, description = "Partner"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<partner::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::get_partner(&state.db, &caller, id).await?))
}

#[utoipa::path(put, path = "/partners/{id}", tag = "partners", params(("id" = Uuid, Path, description = "Partner id")), request_body = crate::openapi::PartnerRequest, responses((status = 200, description = "Updated"), (status = 404, description = "Not Found"), (status = 409, description = "Company name already used")), security(("bearer" = [])))]
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<PartnerInput>,
) -> Result<Json<partner::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::update_partner(&state.db, &caller, id, input).await?))
}

#[utoipa::path(delete, path = "/partners/{id}", tag = "partners", params(("id" = Uuid, Path, description = "Partner id")), responses((status = 200, description = "Partner and its collaborations deactivated"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn deactivate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Deactivated>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::deactivate_partner(&state.db, &caller, id).await?))
}

#[utoipa::path(get, path = "/events/{id}/collaborations", tag = "partners", params(("id" = Uuid, Path, description = "Event id")), responses((status = 200, description = "Active collaborations"), (status = 403, description = "Not the event organizer")), security(("bearer" = [])))]
pub async fn list_collaborations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<event_collaboration::Model>>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::list_collaborations(&state.db, &caller, event_id).await?))
}

#[utoipa::path(post, path = "/events/{id}/collaborations", tag = "partners", params(("id" = Uuid, Path, description = "Event id")), request_body = crate::openapi::CollaborationRequest, responses((status = 201, description = "Created"), (status = 404, description = "Partner not found or inactive"), (status = 409, description = "Collaboration already exists")), security(("bearer" = [])))]
pub async fn add_collaboration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(event_id): Path<Uuid>,
    Json(input): Json<CollaborationInput>,
) -> Result<(StatusCode, Json<event_collaboration::Model>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let created = svc::add_collaboration(&state.db, &caller, event_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_collaboration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((event_id, collaboration_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<CollaborationInput>,
) -> Result<Json<event_collaboration::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::update_collaboration(&state.db, &caller, event_id, collaboration_id, input).await?))
}

#[utoipa::path(delete, path = "/events/{id}/collaborations/{collaboration_id}", tag = "partners", params(("id" = Uuid, Path, description = "Event id"), ("collaboration_id" = Uuid, Path, description = "Collaboration id")), responses((status = 200, description = "Removed"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn remove_collaboration(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((event_id, collaboration_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Message>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    svc::remove_collaboration(&state.db, &caller, event_id, collaboration_id).await?;
    Ok(Json(Message::new("Collaboration removed successfully")))
}
