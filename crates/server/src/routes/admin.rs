use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use common::types::Message;
use models::enums::UserRole;
use models::event;
use serde::Deserialize;
use service::auth::Claims;
use service::events;
use service::pagination::{Page, Pagination};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::require_role;
use crate::state::AppState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[utoipa::path(get, path = "/admin/events", tag = "admin", params(PageQuery), responses((status = 200, description = "OK"), (status = 403, description = "Admin only")), security(("bearer" = [])))]
pub async fn list_events(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Page<event::Model>>, JsonApiError> {
    require_role(&claims, UserRole::Admin)?;
    Ok(Json(events::admin_list_events(&state.db, Pagination::from_query(q.page, q.per_page)).await?))
}

#[utoipa::path(delete, path = "/admin/events/{id}", tag = "admin", params(("id" = Uuid, Path, description = "Event id")), responses((status = 200, description = "Deleted"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn delete_event(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    require_role(&claims, UserRole::Admin)?;
    events::admin_delete_event(&state.db, id).await?;
    Ok(Json(Message::new("Event deleted successfully")))
}
