//! Conversion of report revenue into a target currency, with optional
//! persistence on the report rows.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use models::{currency, report};
use models::enums::ParseLoose;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::converter::{local_rate, normalize_code, CurrencyConverter};
use super::errors::CurrencyError;
use super::{add_money, apply_rate, round_money};

/// Reports without a base currency are treated as USD.
pub const DEFAULT_BASE_CURRENCY: &str = "USD";

#[derive(Debug, Clone, Default, Serialize)]
pub struct RevenueFilter {
    pub report_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl RevenueFilter {
    /// Parse the optional `YYYY-MM-DD` query parameters.
    pub fn parse(
        report_id: Option<Uuid>,
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<Self, CurrencyError> {
        Ok(Self {
            report_id,
            date_from: parse_date("date_from", date_from)?,
            date_to: parse_date("date_to", date_to)?,
        })
    }

    fn apply(&self, mut q: Select<report::Entity>) -> Select<report::Entity> {
        if let Some(id) = self.report_id {
            q = q.filter(report::Column::Id.eq(id));
        }
        if let Some(from) = self.date_from {
            q = q.filter(report::Column::Timestamp.gte(Utc.from_utc_datetime(&from.and_time(NaiveTime::MIN))));
        }
        if let Some(to) = self.date_to {
            // inclusive of the whole end day
            let end = to.and_hms_micro_opt(23, 59, 59, 999_999).unwrap_or_else(|| to.and_time(NaiveTime::MIN));
            q = q.filter(report::Column::Timestamp.lte(Utc.from_utc_datetime(&end)));
        }
        q
    }
}

pub fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, CurrencyError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| CurrencyError::Validation(format!("Invalid {field} format. Use YYYY-MM-DD"))),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrencyBreakdown {
    pub original_currency: String,
    pub original_amount: Decimal,
    pub converted_currency: String,
    pub converted_amount: Decimal,
    pub conversion_rate: Decimal,
    pub reports_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Persistence {
    pub requested: bool,
    pub reports_updated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueConversion {
    pub total_reports: usize,
    pub target_currency: String,
    pub symbol: String,
    pub total_converted_revenue: Decimal,
    pub breakdown: Vec<CurrencyBreakdown>,
    pub conversion_source: &'static str,
    pub filters_applied: RevenueFilter,
    pub persistence: Persistence,
}

/// Revenue and report ids per base currency code.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CurrencyGroup {
    pub total: Decimal,
    pub report_ids: Vec<Uuid>,
}

pub fn group_by_currency<'a>(
    rows: impl IntoIterator<Item = (Uuid, Option<&'a str>, Decimal)>,
) -> BTreeMap<String, CurrencyGroup> {
    let mut groups: BTreeMap<String, CurrencyGroup> = BTreeMap::new();
    for (id, code, revenue) in rows {
        let code = code.unwrap_or(DEFAULT_BASE_CURRENCY).to_string();
        let g = groups.entry(code).or_default();
        g.total += revenue;
        g.report_ids.push(id);
    }
    groups
}

async fn currency_codes(db: &DatabaseConnection) -> Result<HashMap<Uuid, String>, CurrencyError> {
    let all = currency::Entity::find().all(db).await?;
    Ok(all.into_iter().map(|c| (c.id, c.code.as_db_str())).collect())
}

fn currency_id_for(codes: &HashMap<Uuid, String>, code: &str) -> Option<Uuid> {
    codes.iter().find(|(_, c)| c.as_str() == code).map(|(id, _)| *id)
}

/// Convert the revenue of every report matching `filter` into `to_currency`.
#[instrument(skip(db, converter, filter))]
pub async fn convert_revenue(
    db: &DatabaseConnection,
    converter: &CurrencyConverter,
    filter: RevenueFilter,
    to_currency: &str,
    use_latest_rates: bool,
    persist_conversion: bool,
) -> Result<RevenueConversion, CurrencyError> {
    let target_code = normalize_code(to_currency)?.as_db_str();
    let target = currency::find_by_code(db, &target_code)
        .await?
        .filter(|c| c.is_active)
        .ok_or_else(|| CurrencyError::UnknownCurrency(target_code.clone()))?;

    let reports = filter.apply(report::Entity::find()).order_by_asc(report::Column::Timestamp).all(db).await?;
    if reports.is_empty() {
        return Err(CurrencyError::NotFound("No reports found matching the criteria".into()));
    }
    let codes = currency_codes(db).await?;
    let by_id: HashMap<Uuid, &report::Model> = reports.iter().map(|r| (r.id, r)).collect();
    let groups = group_by_currency(reports.iter().map(|r| {
        let code = r.base_currency_id.and_then(|id| codes.get(&id)).map(String::as_str);
        (r.id, code, r.total_revenue)
    }));

    let mut breakdown = Vec::with_capacity(groups.len());
    let mut total = Decimal::ZERO;
    let mut updates: Vec<(Uuid, Decimal)> = Vec::new();
    for (code, group) in &groups {
        let rate = if *code == target_code {
            Decimal::ONE
        } else if use_latest_rates {
            converter.rate(code, &target_code).await?.rate
        } else {
            local_rate(db, code, &target_code).await?
        };
        let converted = apply_rate(group.total, rate)?;
        total = add_money(total, converted)?;
        if persist_conversion {
            for id in &group.report_ids {
                if let Some(r) = by_id.get(id) {
                    updates.push((*id, apply_rate(r.total_revenue, rate)?));
                }
            }
        }
        breakdown.push(CurrencyBreakdown {
            original_currency: code.clone(),
            original_amount: group.total,
            converted_currency: target_code.clone(),
            converted_amount: converted,
            conversion_rate: rate,
            reports_count: group.report_ids.len(),
        });
    }

    let reports_updated = if persist_conversion {
        persist_conversions(db, target.id, &updates).await?
    } else {
        0
    };
    info!(reports = reports.len(), target = %target_code, persisted = reports_updated, "revenue converted");

    Ok(RevenueConversion {
        total_reports: reports.len(),
        target_currency: target_code,
        symbol: target.symbol,
        total_converted_revenue: round_money(total),
        breakdown,
        conversion_source: if use_latest_rates {
            "latest_rates"
        } else {
            "local_database"
        },
        filters_applied: filter,
        persistence: Persistence { requested: persist_conversion, reports_updated },
    })
}

async fn persist_conversions(
    db: &DatabaseConnection,
    currency_id: Uuid,
    updates: &[(Uuid, Decimal)],
) -> Result<usize, CurrencyError> {
    let txn = db.begin().await?;
    let mut n = 0;
    for (id, amount) in updates {
        let am = report::ActiveModel {
            id: Set(*id),
            converted_currency_id: Set(Some(currency_id)),
            converted_revenue: Set(Some(*amount)),
            ..Default::default()
        };
        am.update(&txn).await?;
        n += 1;
    }
    txn.commit().await?;
    Ok(n)
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchItem {
    pub report_id: Option<Uuid>,
    pub to_currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum BatchResult {
    Converted {
        report_id: Uuid,
        original_currency: String,
        original_amount: Decimal,
        converted_currency: String,
        converted_amount: Decimal,
        conversion_rate: Decimal,
        success: bool,
        persisted: bool,
    },
    Failed {
        report_id: Option<Uuid>,
        error: String,
        success: bool,
    },
}

impl BatchResult {
    fn failed(report_id: Option<Uuid>, error: impl Into<String>) -> Self {
        BatchResult::Failed { report_id, error: error.into(), success: false }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchResult::Converted { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total_requests: usize,
    pub successful_conversions: usize,
    pub failed_conversions: usize,
    pub reports_persisted: usize,
    pub results: Vec<BatchResult>,
}

/// Convert individual reports; a failing item is reported and the rest proceed.
#[instrument(skip(db, converter, items), fields(items = items.len()))]
pub async fn convert_revenue_batch(
    db: &DatabaseConnection,
    converter: &CurrencyConverter,
    items: Vec<BatchItem>,
    persist_conversion: bool,
) -> Result<BatchSummary, CurrencyError> {
    let codes = currency_codes(db).await?;
    let mut results = Vec::with_capacity(items.len());
    let mut updates: Vec<(Uuid, Uuid, Decimal)> = Vec::new();

    for item in &items {
        let (Some(report_id), Some(to)) = (item.report_id, item.to_currency.as_deref()) else {
            results.push(BatchResult::failed(item.report_id, "Both report_id and to_currency are required"));
            continue;
        };
        let Some(r) = report::Entity::find_by_id(report_id).one(db).await? else {
            results.push(BatchResult::failed(Some(report_id), "Report not found"));
            continue;
        };
        let from = r
            .base_currency_id
            .and_then(|id| codes.get(&id).cloned())
            .unwrap_or_else(|| DEFAULT_BASE_CURRENCY.to_string());
        match converter.convert(r.total_revenue, &from, to).await {
            Ok(conv) => {
                let mut persisted = false;
                if persist_conversion {
                    match currency_id_for(&codes, &conv.to) {
                        Some(currency_id) => {
                            updates.push((report_id, currency_id, conv.converted));
                            persisted = true;
                        }
                        None => warn!(%report_id, to = %conv.to, "target currency not stored; skipping persistence"),
                    }
                }
                results.push(BatchResult::Converted {
                    report_id,
                    original_currency: from,
                    original_amount: conv.amount,
                    converted_currency: conv.to,
                    converted_amount: conv.converted,
                    conversion_rate: conv.rate,
                    success: true,
                    persisted,
                });
            }
            Err(e) => results.push(BatchResult::failed(Some(report_id), format!("Conversion failed: {e}"))),
        }
    }

    let mut reports_persisted = 0;
    if persist_conversion && !updates.is_empty() {
        let txn = db.begin().await?;
        for (id, currency_id, amount) in &updates {
            let am = report::ActiveModel {
                id: Set(*id),
                converted_currency_id: Set(Some(*currency_id)),
                converted_revenue: Set(Some(*amount)),
                ..Default::default()
            };
            am.update(&txn).await?;
            reports_persisted += 1;
        }
        txn.commit().await?;
    }

    let successful = results.iter().filter(|r| r.is_success()).count();
    Ok(BatchSummary {
        total_requests: items.len(),
        successful_conversions: successful,
        failed_conversions: results.len() - successful,
        reports_persisted,
        results,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertedReport {
    pub id: Uuid,
    pub event_id: Uuid,
    pub original_revenue: Decimal,
    pub original_currency: Option<String>,
    pub converted_revenue: Decimal,
    pub converted_currency: Option<String>,
    pub conversion_date: String,
    pub report_scope: models::enums::ReportScope,
}

async fn converted_query(
    db: &DatabaseConnection,
    filter: &RevenueFilter,
    currency_code: Option<&str>,
) -> Result<Select<report::Entity>, CurrencyError> {
    let mut q = filter.apply(report::Entity::find()).filter(report::Column::ConvertedCurrencyId.is_not_null());
    if let Some(code) = currency_code.filter(|c| !c.trim().is_empty()) {
        if let Some(c) = currency::find_by_code(db, code).await? {
            q = q.filter(report::Column::ConvertedCurrencyId.eq(c.id));
        }
    }
    Ok(q)
}

/// Reports carrying a persisted conversion, optionally narrowed to one target currency.
pub async fn list_converted(
    db: &DatabaseConnection,
    filter: &RevenueFilter,
    currency_code: Option<&str>,
) -> Result<Vec<ConvertedReport>, CurrencyError> {
    let codes = currency_codes(db).await?;
    let rows = converted_query(db, filter, currency_code)
        .await?
        .order_by_desc(report::Column::Timestamp)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|r| ConvertedReport {
            id: r.id,
            event_id: r.event_id,
            original_revenue: r.total_revenue,
            original_currency: r.base_currency_id.and_then(|id| codes.get(&id).cloned()),
            converted_revenue: r.converted_revenue.unwrap_or(Decimal::ZERO),
            converted_currency: r.converted_currency_id.and_then(|id| codes.get(&id).cloned()),
            conversion_date: r.timestamp.to_rfc3339(),
            report_scope: r.report_scope,
        })
        .collect())
}

/// Drop persisted conversions; refuses unless `confirm` is set.
pub async fn clear_converted(
    db: &DatabaseConnection,
    filter: &RevenueFilter,
    currency_code: Option<&str>,
    confirm: bool,
) -> Result<usize, CurrencyError> {
    if !confirm {
        return Err(CurrencyError::Validation(
            "Please add confirm=true to proceed with clearing converted data".into(),
        ));
    }
    let rows = converted_query(db, filter, currency_code).await?.all(db).await?;
    let txn = db.begin().await?;
    let mut cleared = 0;
    for r in rows {
        let mut am: report::ActiveModel = r.into();
        am.converted_currency_id = Set(None);
        am.converted_revenue = Set(None);
        am.update(&txn).await?;
        cleared += 1;
    }
    txn.commit().await?;
    info!(cleared, "converted report data cleared");
    Ok(cleared)
}

/// `filters_applied` echo used by the converted-report endpoints.
pub fn filters_json(
    currency_code: Option<&str>,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> serde_json::Value {
    json!({ "currency": currency_code, "date_from": date_from, "date_to": date_to })
}
