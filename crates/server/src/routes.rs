pub mod admin;
pub mod ai;
pub mod auth;
pub mod categories;
pub mod currency;
pub mod events;
pub mod partners;
pub mod reports;
pub mod ticket_types;
pub mod tickets;

use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post, put},
    Json, Router,
};
use common::types::Health;
use prometheus::{Encoder, TextEncoder};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::require_bearer;
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok", service: "eventhub" })
}

/// Prometheus text exposition of the default registry.
pub async fn metrics() -> (StatusCode, String) {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

/// Build the full application router; every route goes through the bearer middleware.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/events", get(events::list).post(events::create))
        .route("/events/:id", get(events::get).put(events::update).delete(events::remove))
        .route("/events/:id/like", post(events::like).delete(events::unlike))
        .route(
            "/events/:id/collaborations",
            get(partners::list_collaborations).post(partners::add_collaboration),
        )
        .route(
            "/events/:id/collaborations/:collaboration_id",
            put(partners::update_collaboration).delete(partners::remove_collaboration),
        )
        .route("/partners", get(partners::list).post(partners::create))
        .route("/partners/:id", get(partners::get).put(partners::update).delete(partners::deactivate))
        .route("/categories", get(categories::list).post(categories::create))
        .route("/ticket-types", get(ticket_types::list).post(ticket_types::create))
        .route(
            "/ticket-types/:id",
            get(ticket_types::get).put(ticket_types::update).delete(ticket_types::remove),
        )
        .route("/tickets", get(tickets::list_mine).post(tickets::purchase))
        .route("/tickets/:id", delete(tickets::remove))
        .route("/tickets/:id/scan", post(tickets::scan))
        .route("/currency/list", get(currency::list))
        .route("/currency/status", get(currency::status))
        .route("/currency/latest", get(currency::latest))
        .route("/currency/historical/:date", get(currency::historical))
        .route("/currency/range/:start/:end", get(currency::range))
        .route("/currency/convert/:amount", get(currency::convert))
        .route("/currency/revenue/convert", get(currency::convert_revenue))
        .route("/currency/revenue/convert/batch", post(currency::convert_revenue_batch))
        .route("/currency/reports/converted", get(currency::list_converted))
        .route("/currency/reports/converted/clear", delete(currency::clear_converted))
        .route("/reports", get(reports::list))
        .route("/reports/generate", post(reports::generate))
        .route("/reports/:id", get(reports::get))
        .route("/reports/:id/export", get(reports::export))
        .route("/ai/actions", post(ai::propose))
        .route("/ai/actions/pending", get(ai::pending))
        .route("/ai/actions/:id/confirm", post(ai::confirm))
        .route("/admin/events", get(admin::list_events))
        .route("/admin/events/:id", delete(admin::delete_event))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .with_state(state);

    api.merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
