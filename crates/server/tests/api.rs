//! Router tests that need no database: auth gate, currency conversion and
//! rate history through a fixed-rate provider, and the OpenAPI document.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use models::enums::UserRole;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use service::auth::domain::AuthUser;
use service::auth::token;
use service::currency::provider::mock::StaticRateProvider;
use service::currency::ExchangeRateCache;
use tower::ServiceExt;
use uuid::Uuid;

use server::routes;
use server::state::AppState;

const SECRET: &str = "test-secret";

fn app_with(provider: Arc<StaticRateProvider>) -> Router {
    let mut cfg = configs::AppConfig::default();
    cfg.auth.jwt_secret = SECRET.into();
    let cache = Arc::new(ExchangeRateCache::new(Duration::from_secs(3600), Duration::from_secs(10)));
    let state = AppState::with_provider(DatabaseConnection::Disconnected, &cfg, cache, provider, true);
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

fn app() -> Router {
    app_with(Arc::new(StaticRateProvider::default().with_rate("USD", "EUR", Decimal::new(92, 2))))
}

fn bearer(role: UserRole) -> String {
    let user = AuthUser { id: Uuid::new_v4(), email: "t@example.com".into(), full_name: "T".into(), role };
    format!("Bearer {}", token::issue(SECRET, &user, 1).unwrap())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn protected_route_requires_token() {
    let (status, body) = send(&app(), get("/tickets")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "Authentication required");

    let req = Request::builder()
        .uri("/tickets")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app(), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revenue_conversion_needs_reporting_role() {
    let req = Request::builder()
        .uri("/currency/revenue/convert?to_currency=EUR")
        .header(header::AUTHORIZATION, bearer(UserRole::Attendee))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Organizer or admin role required");
}

#[tokio::test]
async fn categories_create_is_admin_only() {
    let req = Request::builder()
        .method("POST")
        .uri("/categories")
        .header(header::AUTHORIZATION, bearer(UserRole::Organizer))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Music"}"#))
        .unwrap();
    let (status, _) = send(&app(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn converts_with_live_rate_then_cache() {
    let provider = Arc::new(StaticRateProvider::default().with_rate("USD", "EUR", Decimal::new(92, 2)));
    let app = app_with(provider.clone());

    let (status, body) = send(&app, get("/currency/convert/100?from=usd&to=eur")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "live");
    let converted: Decimal = body["converted"].as_str().unwrap().parse().unwrap();
    assert_eq!(converted, Decimal::from(92));

    let (_, body) = send(&app, get("/currency/convert/10?from=USD&to=EUR")).await;
    assert_eq!(body["source"], "cache");
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn rejects_bad_amount_and_unknown_currency() {
    let (status, body) = send(&app(), get("/currency/convert/abc?from=USD&to=EUR")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid amount: abc");

    let (status, _) = send(&app(), get("/currency/convert/5?from=USD&to=XYZ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_amount_is_rejected() {
    let app = app_with(Arc::new(StaticRateProvider::default().with_rate("USD", "KES", Decimal::new(1295, 1))));
    let (status, body) = send(&app, get("/currency/convert/79228162514264337593543950335?from=USD&to=KES")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "amount too large");
}

#[tokio::test]
async fn failed_upstream_call_still_closes_window() {
    let provider = Arc::new(StaticRateProvider::default().with_rate("USD", "GBP", Decimal::new(79, 2)));
    provider.fail(true);
    let app = app_with(provider.clone());

    let (status, _) = send(&app, get("/currency/convert/1?from=USD&to=GBP")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    provider.fail(false);
    let (status, body) = send(&app, get("/currency/convert/1?from=USD&to=GBP")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Too Many Requests");
    assert_eq!(provider.call_count(), 1);
}

fn authed(uri: &str, role: UserRole) -> Request<Body> {
    Request::builder().uri(uri).header(header::AUTHORIZATION, bearer(role)).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn historical_and_range_rates() {
    let app = app();
    let (status, _) = send(&app, get("/currency/historical/2024-05-01")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, authed("/currency/historical/2024-05-01", UserRole::Attendee)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["base_currency"], "USD");
    assert_eq!(body["rates"]["EUR"], "0.92");

    let (status, body) = send(&app, authed("/currency/historical/May-1", UserRole::Attendee)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid date format. Please use YYYY-MM-DD.");

    let (status, body) = send(&app, authed("/currency/range/2024-05-01/2024-05-03", UserRole::Attendee)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["dates"].as_object().map(|d| d.len()), Some(3));

    let (status, _) = send(&app, authed("/currency/range/2024-05-03/2024-05-01", UserRole::Attendee)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn serves_openapi_document() {
    let (status, body) = send(&app(), get("/api-docs/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/events"].is_object());
}

#[tokio::test]
async fn metrics_exposes_counters() {
    let app = app();
    send(&app, get("/currency/convert/1?from=USD&to=EUR")).await;
    let resp = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = String::from_utf8(resp.into_body().collect().await.unwrap().to_bytes().to_vec()).unwrap();
    assert!(text.contains("eventhub_rate_upstream_calls_total"));
}
