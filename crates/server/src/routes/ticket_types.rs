use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use models::ticket_type;
use serde::Deserialize;
use service::auth::Claims;
use service::ticket_types::{self as svc, TicketTypeInput, TicketTypeUpdate};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub event_id: Option<Uuid>,
}

#[utoipa::path(get, path = "/ticket-types", tag = "tickets", params(ListQuery), responses((status = 200, description = "Ticket types, cheapest first")))]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ticket_type::Model>>, JsonApiError> {
    Ok(Json(svc::list_ticket_types(&state.db, q.event_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ticket_type::Model>, JsonApiError> {
    Ok(Json(svc::get_ticket_type(&state.db, id).await?))
}

#[utoipa::path(post, path = "/ticket-types", tag = "tickets", request_body = crate::openapi::TicketTypeRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Not the event organizer"), (status = 409, description = "Type already exists for event")), security(("bearer" = [])))]
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<TicketTypeInput>,
) -> Result<(StatusCode, Json<ticket_type::Model>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let created = svc::create_ticket_type(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<TicketTypeUpdate>,
) -> Result<Json<ticket_type::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::update_ticket_type(&state.db, &caller, id, input).await?))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    svc::delete_ticket_type(&state.db, &caller, id).await?;
    Ok(Json(Message::new("Ticket type deleted successfully")))
}
