use axum::{extract::State, http::StatusCode, Extension, Json};
use models::category;
use models::enums::UserRole;
use serde::Deserialize;
use service::auth::Claims;
use service::categories;

use crate::errors::JsonApiError;
use crate::middleware::require_role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub description: Option<String>,
}

#[utoipa::path(get, path = "/categories", tag = "events", responses((status = 200, description = "All categories")))]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<category::Model>>, JsonApiError> {
    Ok(Json(categories::list_categories(&state.db).await?))
}

#[utoipa::path(post, path = "/categories", tag = "events", request_body = crate::openapi::CategoryRequest, responses((status = 201, description = "Created"), (status = 403, description = "Admin only"), (status = 409, description = "Conflict")), security(("bearer" = [])))]
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<category::Model>), JsonApiError> {
    require_role(&claims, UserRole::Admin)?;
    let created = categories::create_category(&state.db, &input.name, input.description).await?;
    Ok((StatusCode::CREATED, Json(created)))
}
