use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use models::currency;
use models::enums::UserRole;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service::auth::Claims;
use service::currency::revenue::{self, BatchItem, BatchSummary, RevenueConversion, RevenueFilter};
use service::currency::cache::CacheStats;
use service::currency::converter::past_date;
use service::currency::{Conversion, HistoricalRates, RangeRates, RateProvider as _, RateQuote};
use uuid::Uuid;

use crate::errors::JsonApiError;
use crate::state::AppState;

fn require_reporting_role(claims: &Claims) -> Result<(), JsonApiError> {
    if claims.is(UserRole::Admin) || claims.is(UserRole::Organizer) {
        Ok(())
    } else {
        Err(JsonApiError::forbidden("Organizer or admin role required"))
    }
}

#[utoipa::path(get, path = "/currency/list", tag = "currency", responses((status = 200, description = "Active currencies")))]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<currency::Model>>, JsonApiError> {
    let rows = currency::Entity::find()
        .filter(currency::Column::IsActive.eq(true))
        .order_by_asc(currency::Column::Code)
        .all(&state.db)
        .await
        .map_err(|e| JsonApiError::internal(e.to_string()))?;
    Ok(Json(rows))
}

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub api_configured: bool,
    pub api_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_error: Option<String>,
    pub cache: CacheStats,
}

#[utoipa::path(get, path = "/currency/status", tag = "currency", responses((status = 200, description = "Rate API and cache status")), security(("bearer" = [])))]
pub async fn status(State(state): State<AppState>) -> Json<StatusOutput> {
    let ping = if state.rates_configured {
        state.converter.provider().ping().await.err().map(|e| e.to_string())
    } else {
        Some("exchange rate API key is not configured".to_string())
    };
    Json(StatusOutput {
        api_configured: state.rates_configured,
        api_reachable: ping.is_none(),
        api_error: ping,
        cache: state.converter.cache().stats(),
    })
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct LatestQuery {
    pub base: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LatestOutput {
    pub base: String,
    pub rates: BTreeMap<String, RateQuote>,
}

#[utoipa::path(get, path = "/currency/latest", tag = "currency", params(LatestQuery), responses((status = 200, description = "Rates from base"), (status = 429, description = "Rate limited"), (status = 502, description = "Upstream error")))]
pub async fn latest(
    State(state): State<AppState>,
    Query(q): Query<LatestQuery>,
) -> Result<Json<LatestOutput>, JsonApiError> {
    let base = q.base.unwrap_or_else(|| "USD".into()).trim().to_uppercase();
    let rates = state.converter.latest(&base).await?;
    Ok(Json(LatestOutput { base, rates }))
}

#[utoipa::path(get, path = "/currency/historical/{date}", tag = "currency", params(("date" = String, Path, description = "YYYY-MM-DD"), LatestQuery), responses((status = 200, description = "Rates on that day"), (status = 400, description = "Bad date"), (status = 404, description = "No rates for that day"), (status = 429, description = "Rate limited")), security(("bearer" = [])))]
pub async fn historical(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Query(q): Query<LatestQuery>,
) -> Result<Json<HistoricalRates>, JsonApiError> {
    let date = past_date(&date)?;
    let base = q.base.unwrap_or_else(|| "USD".into());
    Ok(Json(state.converter.historical(&base, date).await?))
}

#[utoipa::path(get, path = "/currency/range/{start}/{end}", tag = "currency", params(("start" = String, Path, description = "YYYY-MM-DD"), ("end" = String, Path, description = "YYYY-MM-DD"), LatestQuery), responses((status = 200, description = "Rates per day"), (status = 400, description = "Bad dates"), (status = 404, description = "No rates in range"), (status = 429, description = "Rate limited")), security(("bearer" = [])))]
pub async fn range(
    State(state): State<AppState>,
    Path((start, end)): Path<(String, String)>,
    Query(q): Query<LatestQuery>,
) -> Result<Json<RangeRates>, JsonApiError> {
    let (start, end) = (past_date(&start)?, past_date(&end)?);
    let base = q.base.unwrap_or_else(|| "USD".into());
    Ok(Json(state.converter.range(&base, start, end).await?))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ConvertQuery {
    /// Defaults to KES.
    pub from: Option<String>,
    pub to: String,
}

#[utoipa::path(get, path = "/currency/convert/{amount}", tag = "currency", params(("amount" = String, Path, description = "Decimal amount"), ConvertQuery), responses((status = 200, description = "Converted"), (status = 400, description = "Bad Request"), (status = 429, description = "Rate limited")))]
pub async fn convert(
    State(state): State<AppState>,
    Path(amount): Path<String>,
    Query(q): Query<ConvertQuery>,
) -> Result<Json<Conversion>, JsonApiError> {
    let amount: Decimal = amount
        .trim()
        .parse()
        .map_err(|_| JsonApiError::bad_request(format!("Invalid amount: {amount}")))?;
    let conversion = match q.from.as_deref() {
        Some(from) => state.converter.convert(amount, from, &q.to).await?,
        None => state.converter.convert_ksh_to_target_currency(amount, &q.to).await?,
    };
    Ok(Json(conversion))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct RevenueQuery {
    pub to_currency: String,
    pub report_id: Option<Uuid>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Use live rates (default) instead of the stored exchange-rate table.
    #[serde(default = "default_true")]
    pub use_latest_rates: bool,
    /// Store the converted amount on each report.
    #[serde(default, alias = "persist")]
    pub persist_conversion: bool,
}

fn default_true() -> bool {
    true
}

#[utoipa::path(get, path = "/currency/revenue/convert", tag = "currency", params(RevenueQuery), responses((status = 200, description = "Converted revenue"), (status = 400, description = "Unknown currency or bad date"), (status = 404, description = "No reports matched")), security(("bearer" = [])))]
pub async fn convert_revenue(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<RevenueQuery>,
) -> Result<Json<RevenueConversion>, JsonApiError> {
    require_reporting_role(&claims)?;
    let filter = RevenueFilter::parse(q.report_id, q.date_from.as_deref(), q.date_to.as_deref())?;
    let out = revenue::convert_revenue(&state.db, &state.converter, filter, &q.to_currency, q.use_latest_rates, q.persist_conversion).await?;
    Ok(Json(out))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub conversions: Vec<BatchItem>,
    #[serde(default, alias = "persist")]
    pub persist_conversion: bool,
}

#[utoipa::path(post, path = "/currency/revenue/convert/batch", tag = "currency", request_body = crate::openapi::BatchConvertRequest, responses((status = 200, description = "Per-report results"), (status = 400, description = "Empty batch")), security(("bearer" = [])))]
pub async fn convert_revenue_batch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchSummary>, JsonApiError> {
    require_reporting_role(&claims)?;
    if req.conversions.is_empty() {
        return Err(JsonApiError::bad_request("conversions must be a non-empty list"));
    }
    let out = revenue::convert_revenue_batch(&state.db, &state.converter, req.conversions, req.persist_conversion).await?;
    Ok(Json(out))
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ConvertedQuery {
    pub currency: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

impl ConvertedQuery {
    fn filter(&self) -> Result<RevenueFilter, JsonApiError> {
        Ok(RevenueFilter::parse(None, self.date_from.as_deref(), self.date_to.as_deref())?)
    }

    fn echo(&self) -> Value {
        revenue::filters_json(self.currency.as_deref(), self.date_from.as_deref(), self.date_to.as_deref())
    }
}

#[utoipa::path(get, path = "/currency/reports/converted", tag = "currency", params(ConvertedQuery), responses((status = 200, description = "Reports with a stored conversion")), security(("bearer" = [])))]
pub async fn list_converted(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ConvertedQuery>,
) -> Result<Json<Value>, JsonApiError> {
    require_reporting_role(&claims)?;
    let reports = revenue::list_converted(&state.db, &q.filter()?, q.currency.as_deref()).await?;
    Ok(Json(json!({
        "total_reports": reports.len(),
        "reports": reports,
        "filters_applied": q.echo(),
    })))
}

#[utoipa::path(delete, path = "/currency/reports/converted/clear", tag = "currency", params(ConvertedQuery), responses((status = 200, description = "Cleared"), (status = 400, description = "confirm=true missing")), security(("bearer" = [])))]
pub async fn clear_converted(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(q): Query<ConvertedQuery>,
) -> Result<Json<Value>, JsonApiError> {
    require_reporting_role(&claims)?;
    let cleared = revenue::clear_converted(&state.db, &q.filter()?, q.currency.as_deref(), q.confirm).await?;
    Ok(Json(json!({
        "message": format!("Cleared converted data from {cleared} reports"),
        "reports_cleared": cleared,
        "filters_applied": q.echo(),
    })))
}
