use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use models::report;
use service::auth::Claims;
use service::reports::{self as svc, ReportRequest};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::AppState;

#[utoipa::path(get, path = "/reports", tag = "reports", responses((status = 200, description = "Reports visible to the caller")), security(("bearer" = [])))]
pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<report::Model>>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::list_reports(&state.db, &caller).await?))
}

#[utoipa::path(get, path = "/reports/{id}", tag = "reports", params(("id" = Uuid, Path, description = "Report id")), responses((status = 200, description = "Report"), (status = 403, description = "Forbidden"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<report::Model>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::get_report(&state.db, &caller, id).await?))
}

#[utoipa::path(post, path = "/reports/generate", tag = "reports", request_body = crate::openapi::ReportGenerateRequest, responses((status = 201, description = "Generated"), (status = 400, description = "Bad period or currency"), (status = 403, description = "Not the event organizer")), security(("bearer" = [])))]
pub async fn generate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReportRequest>,
) -> Result<(StatusCode, Json<report::Model>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let saved = svc::generate_report(&state.db, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(get, path = "/reports/{id}/export", tag = "reports", params(("id" = Uuid, Path, description = "Report id")), responses((status = 200, description = "CSV", content_type = "text/csv")), security(("bearer" = [])))]
pub async fn export(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    let r = svc::get_report(&state.db, &caller, id).await?;
    let body = svc::export_csv(&r)?;
    let disposition = format!("attachment; filename=\"report_{}.csv\"", r.id);
    Ok((
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()), (header::CONTENT_DISPOSITION, disposition)],
        body,
    ))
}
