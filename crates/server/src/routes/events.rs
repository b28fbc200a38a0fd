use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use models::event;
use serde::{Deserialize, Serialize};
use service::auth::Claims;
use service::events::{self as svc, EventFilter, EventInput};
use service::pagination::{Page, Pagination};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub city: Option<String>,
    /// Matched against name, description, location and city.
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LikeOutput {
    pub message: String,
    pub likes: u64,
}

#[utoipa::path(get, path = "/events", tag = "events", params(ListQuery), responses((status = 200, description = "Page of events")))]
pub async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<event::Model>>, JsonApiError> {
    let filter = EventFilter { city: q.city, q: q.q };
    let page = svc::list_events(&state.db, &filter, Pagination::from_query(q.page, q.per_page)).await?;
    Ok(Json(page))
}

#[utoipa::path(get, path = "/events/{id}", tag = "events", params(("id" = Uuid, Path, description = "Event id")), responses((status = 200, description = "Event"), (status = 404, description = "Not Found")))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<event::Model>, JsonApiError> {
    Ok(Json(svc::get_event(&state.db, id).await?))
}

#[utoipa::path(post, path = "/events", tag = "events", request_body = crate::openapi::EventRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")), security(("bearer" = [])))]
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<EventInput>,
) -> Result<(StatusCode, Json<event::Model>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let created = svc::create_event(&state.db, &caller, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/events/{id}", tag = "events", params(("id" = Uuid, Path, description = "Event id")), request_body = crate::openapi::EventRequest, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<EventInput>,
) -> Result<Json<event::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::update_event(&state.db, &caller, id, input).await?))
}

#[utoipa::path(delete, path = "/events/{id}", tag = "events", params(("id" = Uuid, Path, description = "Event id")), responses((status = 200, description = "Deleted"), (status = 403, description = "Forbidden")), security(("bearer" = [])))]
pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    svc::delete_event(&state.db, &caller, id).await?;
    Ok(Json(Message::new("Event deleted successfully")))
}

#[utoipa::path(post, path = "/events/{id}/like", tag = "events", params(("id" = Uuid, Path, description = "Event id")), responses((status = 200, description = "Liked"), (status = 400, description = "Already liked")), security(("bearer" = [])))]
pub async fn like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeOutput>, JsonApiError> {
    let likes = svc::like_event(&state.db, claims.user_id()?, id).await?;
    Ok(Json(LikeOutput { message: "Event liked".into(), likes }))
}

pub async fn unlike(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<LikeOutput>, JsonApiError> {
    let likes = svc::unlike_event(&state.db, claims.user_id()?, id).await?;
    Ok(Json(LikeOutput { message: "Event unliked".into(), likes }))
}
