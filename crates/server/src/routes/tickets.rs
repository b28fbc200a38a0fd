use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use models::ticket;
use service::auth::Claims;
use service::tickets::{self as svc, ScanReceipt, TicketPurchase};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::middleware::current_user;
use crate::state::AppState;

#[utoipa::path(get, path = "/tickets", tag = "tickets", responses((status = 200, description = "Caller's tickets, newest first")), security(("bearer" = [])))]
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<ticket::Model>>, JsonApiError> {
    Ok(Json(svc::list_my_tickets(&state.db, claims.user_id()?).await?))
}

#[utoipa::path(post, path = "/tickets", tag = "tickets", request_body = crate::openapi::TicketPurchaseRequest, responses((status = 201, description = "Issued"), (status = 400, description = "No completed payment or not enough tickets"), (status = 409, description = "Payment reference already used")), security(("bearer" = [])))]
pub async fn purchase(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<TicketPurchase>,
) -> Result<(StatusCode, Json<ticket::Model>), JsonApiError> {
    let issued = svc::purchase_tickets(&state.db, claims.user_id()?, input).await?;
    Ok((StatusCode::CREATED, Json(issued)))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Message>, JsonApiError> {
    svc::delete_ticket(&state.db, claims.user_id()?, id).await?;
    Ok(Json(Message::new("Ticket deleted successfully")))
}

#[utoipa::path(post, path = "/tickets/{id}/scan", tag = "tickets", params(("id" = Uuid, Path, description = "Ticket id")), responses((status = 200, description = "Admitted"), (status = 403, description = "Not security staff or the event organizer"), (status = 404, description = "Invalid ticket"), (status = 409, description = "Already scanned")), security(("bearer" = [])))]
pub async fn scan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScanReceipt>, JsonApiError> {
    let caller = current_user(&state.db, &claims).await?;
    Ok(Json(svc::scan_ticket(&state.db, &caller, id).await?))
}
