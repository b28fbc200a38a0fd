use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use models::enums::{ParseLoose, PaymentStatus, ReportScope, UserRole};
use models::{currency, event, organizer, report, ticket, ticket_type, transaction, user};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, instrument};
use uuid::Uuid;

use super::summary::{summarize, ReportSummary, SaleRow};
use crate::currency::{converter::local_rate, round_money};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct ReportRequest {
    pub event_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub ticket_type_id: Option<Uuid>,
    /// Currency code the revenue is displayed in; defaults to the event's base currency.
    pub target_currency: Option<String>,
}

/// Contents of `report.report_data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportData {
    pub event_id: Uuid,
    pub event_name: String,
    pub event_date: NaiveDate,
    pub event_location: String,
    pub filter_start_date: NaiveDate,
    pub filter_end_date: NaiveDate,
    #[serde(flatten)]
    pub summary: ReportSummary,
    pub currency: String,
    pub currency_symbol: String,
    pub base_currency: String,
    pub base_currency_symbol: String,
    pub exchange_rate: Decimal,
    pub converted_total_revenue: Decimal,
    pub report_scope: ReportScope,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ticket_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ticket_type_name: Option<String>,
}

/// `[start 00:00:00, end 23:59:59.999999]` in UTC.
pub fn period_bounds(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(chrono::DateTime<Utc>, chrono::DateTime<Utc>), ServiceError> {
    if start > end {
        return Err(ServiceError::Validation("start_date must not be after end_date".into()));
    }
    let from = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
    let to = end
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .map(|dt| Utc.from_utc_datetime(&dt))
        .ok_or_else(|| ServiceError::Validation("invalid end_date".into()))?;
    Ok((from, to))
}

async fn caller_organizer(
    db: &DatabaseConnection,
    caller: &user::Model,
) -> Result<organizer::Model, ServiceError> {
    organizer::find_by_user(db, caller.id)
        .await?
        .ok_or_else(|| ServiceError::Forbidden("Organizer profile required".into()))
}

async fn usd(db: &DatabaseConnection) -> Result<currency::Model, ServiceError> {
    currency::find_by_code(db, "USD").await?.ok_or_else(|| ServiceError::not_found("Currency USD"))
}

/// Aggregate completed sales of an event over a period and store the report.
#[instrument(skip(db, caller, req), fields(user_id = %caller.id, event_id = %req.event_id))]
pub async fn generate_report(
    db: &DatabaseConnection,
    caller: &user::Model,
    req: ReportRequest,
) -> Result<report::Model, ServiceError> {
    let org = caller_organizer(db, caller).await?;
    let ev = event::Entity::find_by_id(req.event_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Event"))?;
    if ev.organizer_id != org.id {
        return Err(ServiceError::Forbidden("You are not the organizer of this event".into()));
    }
    let (from, to) = period_bounds(req.start_date, req.end_date)?;

    let types: HashMap<Uuid, ticket_type::Model> = ticket_type::Entity::find()
        .filter(ticket_type::Column::EventId.eq(ev.id))
        .all(db)
        .await?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();
    let scoped_type = match req.ticket_type_id {
        Some(id) => Some(types.get(&id).cloned().ok_or_else(|| ServiceError::not_found("Ticket type"))?),
        None => None,
    };

    let mut q = ticket::Entity::find()
        .find_also_related(transaction::Entity)
        .filter(ticket::Column::EventId.eq(ev.id))
        .filter(transaction::Column::PaymentStatus.eq(PaymentStatus::Completed))
        .filter(transaction::Column::Timestamp.between(from, to));
    if let Some(t) = &scoped_type {
        q = q.filter(ticket::Column::TicketTypeId.eq(t.id));
    }
    let rows: Vec<SaleRow> = q
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(t, tx)| {
            let tx = tx?;
            let kind = types.get(&t.ticket_type_id)?.type_name;
            Some(SaleRow {
                ticket_type: kind,
                quantity: t.quantity,
                scanned: t.scanned,
                transaction_id: tx.id,
                amount_paid: tx.amount_paid,
                payment_method: tx.payment_method,
            })
        })
        .collect();
    let summary = summarize(&rows);

    let base = match ev.base_currency_id {
        Some(id) => currency::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("Currency"))?,
        None => usd(db).await?,
    };
    let display = match req.target_currency.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(code) => currency::find_by_code(db, code)
            .await?
            .ok_or_else(|| ServiceError::Validation(format!("Currency '{}' not found in system", code.trim().to_uppercase())))?,
        None => base.clone(),
    };
    let base_code = base.code.as_db_str();
    let display_code = display.code.as_db_str();
    let rate = local_rate(db, &base_code, &display_code).await?;
    let converted_total = round_money(summary.total_revenue * rate);

    let scope = if scoped_type.is_some() {
        ReportScope::TicketTypeSummary
    } else {
        ReportScope::EventSummary
    };
    let data = ReportData {
        event_id: ev.id,
        event_name: ev.name.clone(),
        event_date: ev.date,
        event_location: ev.location.clone(),
        filter_start_date: req.start_date,
        filter_end_date: req.end_date,
        summary: summary.clone(),
        currency: display_code.clone(),
        currency_symbol: display.symbol.clone(),
        base_currency: base_code,
        base_currency_symbol: base.symbol.clone(),
        exchange_rate: rate,
        converted_total_revenue: converted_total,
        report_scope: scope,
        ticket_type_id: scoped_type.as_ref().map(|t| t.id),
        ticket_type_name: scoped_type.as_ref().map(|t| t.type_name.as_db_str()),
    };
    let converted = display.id != base.id;

    let saved = report::ActiveModel {
        id: Set(Uuid::new_v4()),
        organizer_id: Set(org.id),
        event_id: Set(ev.id),
        ticket_type_id: Set(data.ticket_type_id),
        base_currency_id: Set(Some(base.id)),
        converted_currency_id: Set(converted.then_some(display.id)),
        converted_revenue: Set(converted.then_some(converted_total)),
        report_scope: Set(scope),
        total_tickets_sold: Set(i32::try_from(summary.total_tickets_sold).unwrap_or(i32::MAX)),
        total_revenue: Set(round_money(summary.total_revenue)),
        number_of_attendees: Set(i32::try_from(summary.number_of_attendees).unwrap_or(i32::MAX)),
        report_data: Set(serde_json::to_value(&data).map_err(|e| ServiceError::Validation(e.to_string()))?),
        timestamp: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(event = "report_generated", report_id = %saved.id, tickets = summary.total_tickets_sold, currency = %display_code);
    Ok(saved)
}

/// Admins see every report, organizers their own.
pub async fn list_reports(
    db: &DatabaseConnection,
    caller: &user::Model,
) -> Result<Vec<report::Model>, ServiceError> {
    let mut q = report::Entity::find();
    if caller.role != UserRole::Admin {
        let org = caller_organizer(db, caller).await?;
        q = q.filter(report::Column::OrganizerId.eq(org.id));
    }
    Ok(q.order_by_desc(report::Column::Timestamp).all(db).await?)
}

pub async fn get_report(
    db: &DatabaseConnection,
    caller: &user::Model,
    id: Uuid,
) -> Result<report::Model, ServiceError> {
    let r = report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Report"))?;
    if caller.role == UserRole::Admin {
        return Ok(r);
    }
    let org = caller_organizer(db, caller).await?;
    if r.organizer_id != org.id {
        return Err(ServiceError::Forbidden("You do not have access to this report".into()));
    }
    Ok(r)
}

/// CSV rendering of a stored report.
pub fn export_csv(r: &report::Model) -> Result<String, ServiceError> {
    let data: ReportData = serde_json::from_value(r.report_data.clone())
        .map_err(|e| ServiceError::Validation(format!("report data is malformed: {e}")))?;
    Ok(super::csv::render(&data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn period_covers_whole_end_day() {
        let (from, to) = period_bounds(d("2024-03-01"), d("2024-03-31")).unwrap();
        assert_eq!(from.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(to.format("%H:%M:%S%.6f").to_string(), "23:59:59.999999");
        assert!(period_bounds(d("2024-04-01"), d("2024-03-31")).is_err());
    }

    #[tokio::test]
    async fn report_for_event_without_sales() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let owner = user::create(&db, &format!("rep_{}@example.com", Uuid::new_v4()), "Rep", None, UserRole::Organizer).await?;
        let org = organizer::get_or_create(&db, &owner).await?;
        let ev = event::create(&db, event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Quiet".into(),
            description: "No sales yet".into(),
            date: Utc::now().date_naive(),
            start_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: None,
            city: "Nakuru".into(),
            location: "Hall".into(),
            amenities: vec![],
            image: None,
        })
        .await?;
        let today = Utc::now().date_naive();
        let req = ReportRequest { event_id: ev.id, start_date: today, end_date: today, ticket_type_id: None, target_currency: None };
        let r = generate_report(&db, &owner, req).await?;
        assert_eq!(r.total_tickets_sold, 0);
        assert_eq!(r.report_scope, ReportScope::EventSummary);
        assert!(r.converted_currency_id.is_none());
        let csv = export_csv(&r)?;
        assert!(csv.starts_with("Report Summary"));
        assert_eq!(list_reports(&db, &owner).await?.len(), 1);
        Ok(())
    }
}
