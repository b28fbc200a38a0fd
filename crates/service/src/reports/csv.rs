use std::fmt::Write as _;

use super::service::ReportData;

fn field(v: &str) -> String {
    if v.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", v.replace('"', "\"\""))
    } else {
        v.to_string()
    }
}

fn row(out: &mut String, cells: &[&str]) {
    let line: Vec<String> = cells.iter().map(|c| field(c)).collect();
    let _ = writeln!(out, "{}", line.join(","));
}

fn pct(part: i64, total: i64) -> String {
    if total == 0 {
        "0.0%".into()
    } else {
        format!("{:.1}%", part as f64 * 100.0 / total as f64)
    }
}

/// Summary block followed by per-type sales and payment-method sections.
pub fn render(data: &ReportData) -> String {
    let s = &data.summary;
    let sym = &data.currency_symbol;
    let mut out = String::new();

    row(&mut out, &["Report Summary"]);
    row(&mut out, &["Metric", "Value"]);
    row(&mut out, &["Event Name", &data.event_name]);
    row(&mut out, &["Report Period Start", &data.filter_start_date.to_string()]);
    row(&mut out, &["Report Period End", &data.filter_end_date.to_string()]);
    row(&mut out, &["Total Tickets Sold", &s.total_tickets_sold.to_string()]);
    row(&mut out, &["Total Revenue", &format!("{sym}{:.2}", data.converted_total_revenue)]);
    row(&mut out, &["Total Attendees", &s.number_of_attendees.to_string()]);
    row(&mut out, &["Attendance Rate", &format!("{:.1}%", s.attendance_rate())]);
    row(&mut out, &["Currency", &format!("{} ({sym})", data.currency)]);
    if data.currency != data.base_currency {
        row(&mut out, &["Original Revenue", &format!("{}{:.2}", data.base_currency_symbol, s.total_revenue)]);
        row(&mut out, &["Exchange Rate", &data.exchange_rate.to_string()]);
    }
    out.push('\n');

    if !s.tickets_sold_by_type.is_empty() {
        row(&mut out, &["Ticket Sales Breakdown"]);
        row(&mut out, &["Ticket Type", "Tickets Sold", "Percentage", "Revenue", "Attendees"]);
        for (kind, sold) in &s.tickets_sold_by_type {
            let revenue = s.revenue_by_ticket_type.get(kind).copied().unwrap_or_default();
            let attendees = s.attendees_by_ticket_type.get(kind).copied().unwrap_or(0);
            row(&mut out, &[
                kind.as_str(),
                &sold.to_string(),
                &pct(*sold, s.total_tickets_sold),
                &format!("{sym}{:.2}", crate::currency::round_money(revenue * data.exchange_rate)),
                &attendees.to_string(),
            ]);
        }
        out.push('\n');
    }

    if !s.payment_method_usage.is_empty() {
        let total: i64 = s.payment_method_usage.values().sum();
        row(&mut out, &["Payment Methods"]);
        row(&mut out, &["Method", "Payments", "Percentage"]);
        for (method, count) in &s.payment_method_usage {
            row(&mut out, &[method.as_str(), &count.to_string(), &pct(*count, total)]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::summary::ReportSummary;
    use chrono::NaiveDate;
    use models::enums::ReportScope;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn data() -> ReportData {
        let date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        ReportData {
            event_id: Uuid::new_v4(),
            event_name: "Jazz, Live".into(),
            event_date: date,
            event_location: "Hall".into(),
            filter_start_date: date,
            filter_end_date: date,
            summary: ReportSummary {
                total_tickets_sold: 4,
                total_revenue: Decimal::from(8000),
                number_of_attendees: 1,
                tickets_sold_by_type: BTreeMap::from([("REGULAR".into(), 3), ("VIP".into(), 1)]),
                revenue_by_ticket_type: BTreeMap::from([("REGULAR".into(), Decimal::from(3000)), ("VIP".into(), Decimal::from(5000))]),
                attendees_by_ticket_type: BTreeMap::from([("REGULAR".into(), 1)]),
                payment_method_usage: BTreeMap::from([("MPESA".into(), 3)]),
            },
            currency: "KES".into(),
            currency_symbol: "KSh".into(),
            base_currency: "KES".into(),
            base_currency_symbol: "KSh".into(),
            exchange_rate: Decimal::ONE,
            converted_total_revenue: Decimal::from(8000),
            report_scope: ReportScope::EventSummary,
            ticket_type_id: None,
            ticket_type_name: None,
        }
    }

    #[test]
    fn quotes_fields_with_commas() {
        assert_eq!(field("a,b"), "\"a,b\"");
        assert_eq!(field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(field("plain"), "plain");
    }

    #[test]
    fn renders_sections() {
        let csv = render(&data());
        assert!(csv.contains("Event Name,\"Jazz, Live\""));
        assert!(csv.contains("Total Revenue,KSh8000.00"));
        assert!(csv.contains("Attendance Rate,25.0%"));
        assert!(csv.contains("REGULAR,3,75.0%,KSh3000.00,1"));
        assert!(csv.contains("MPESA,3,100.0%"));
        assert!(!csv.contains("Original Revenue"));
    }
}
