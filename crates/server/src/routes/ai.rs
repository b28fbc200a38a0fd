use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use models::ai_action_log::Model as ActionLog;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::ai::{ActionRefs, Confirmation};
use service::auth::Claims;
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::{AppState, Drafts};

#[derive(Debug, Deserialize)]
pub struct ProposeInput {
    /// Wire name such as `create_event`.
    pub action_type: String,
    pub request_data: Value,
    #[serde(flatten)]
    pub refs: ActionRefs,
}

#[derive(Debug, Serialize)]
pub struct PendingOutput {
    pub pending_actions: Vec<ActionLog>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmInput {
    pub confirmed: bool,
}

#[utoipa::path(post, path = "/ai/actions", tag = "ai", request_body = crate::openapi::ProposeActionRequest, responses((status = 201, description = "Pending action stored"), (status = 400, description = "Unknown action type"), (status = 403, description = "Assistant disabled")), security(("bearer" = [])))]
pub async fn propose(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<ProposeInput>,
) -> Result<(StatusCode, Json<ActionLog>), JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    if !caller.ai_enabled {
        return Err(JsonApiError::forbidden("AI assistant is disabled for this account"));
    }
    let kind = Drafts::parse_type(&input.action_type)?;
    let saved = state.drafts.propose(caller.id, kind, input.request_data, input.refs).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

#[utoipa::path(get, path = "/ai/actions/pending", tag = "ai", responses((status = 200, description = "Newest pending actions")), security(("bearer" = [])))]
pub async fn pending(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<PendingOutput>, JsonApiError> {
    let pending_actions = state.drafts.pending(claims.user_id()?).await?;
    Ok(Json(PendingOutput { pending_actions }))
}

/// 200 when the action ran or was declined, 400 when it ran and failed.
#[utoipa::path(post, path = "/ai/actions/{id}/confirm", tag = "ai", params(("id" = Uuid, Path, description = "Action id")), request_body = crate::openapi::ConfirmActionRequest, responses((status = 200, description = "Executed or cancelled"), (status = 400, description = "Already processed or execution failed"), (status = 404, description = "Not Found")), security(("bearer" = [])))]
pub async fn confirm(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(input): Json<ConfirmInput>,
) -> Result<(StatusCode, Json<Confirmation>), JsonApiError> {
    let out = state.drafts.confirm(claims.user_id()?, id, input.confirmed).await?;
    let status = if out.result.success {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    Ok((status, Json(out)))
}
