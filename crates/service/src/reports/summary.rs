use std::collections::{BTreeMap, BTreeSet};

use models::enums::{ParseLoose, PaymentMethod, TicketTypeName};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One issued ticket joined with its completed payment.
#[derive(Debug, Clone)]
pub struct SaleRow {
    pub ticket_type: TicketTypeName,
    pub quantity: i32,
    pub scanned: bool,
    pub transaction_id: Uuid,
    pub amount_paid: Decimal,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_tickets_sold: i64,
    pub total_revenue: Decimal,
    pub number_of_attendees: i64,
    pub tickets_sold_by_type: BTreeMap<String, i64>,
    pub revenue_by_ticket_type: BTreeMap<String, Decimal>,
    pub attendees_by_ticket_type: BTreeMap<String, i64>,
    /// Completed payments per method; a payment is counted once.
    pub payment_method_usage: BTreeMap<String, i64>,
}

impl ReportSummary {
    /// Scanned share of sold tickets, in percent.
    pub fn attendance_rate(&self) -> f64 {
        if self.total_tickets_sold == 0 {
            0.0
        } else {
            self.number_of_attendees as f64 * 100.0 / self.total_tickets_sold as f64
        }
    }
}

pub fn summarize(rows: &[SaleRow]) -> ReportSummary {
    let mut s = ReportSummary::default();
    let mut seen_payments: BTreeSet<Uuid> = BTreeSet::new();
    for r in rows {
        let kind = r.ticket_type.as_db_str();
        let qty = i64::from(r.quantity);
        s.total_tickets_sold += qty;
        *s.tickets_sold_by_type.entry(kind.clone()).or_default() += qty;
        if r.scanned {
            s.number_of_attendees += qty;
            *s.attendees_by_ticket_type.entry(kind.clone()).or_default() += qty;
        }
        if seen_payments.insert(r.transaction_id) {
            s.total_revenue += r.amount_paid;
            *s.revenue_by_ticket_type.entry(kind).or_default() += r.amount_paid;
            *s.payment_method_usage.entry(r.payment_method.as_db_str()).or_default() += 1;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        kind: TicketTypeName,
        qty: i32,
        scanned: bool,
        tx: Uuid,
        paid: i64,
        method: PaymentMethod,
    ) -> SaleRow {
        SaleRow { ticket_type: kind, quantity: qty, scanned, transaction_id: tx, amount_paid: Decimal::from(paid), payment_method: method }
    }

    #[test]
    fn aggregates_by_type_and_method() {
        let (t1, t2, t3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let s = summarize(&[
            row(TicketTypeName::Regular, 2, true, t1, 2000, PaymentMethod::Mpesa),
            row(TicketTypeName::Vip, 1, false, t2, 5000, PaymentMethod::Paystack),
            row(TicketTypeName::Regular, 1, false, t3, 1000, PaymentMethod::Mpesa),
        ]);
        assert_eq!(s.total_tickets_sold, 4);
        assert_eq!(s.total_revenue, Decimal::from(8000));
        assert_eq!(s.number_of_attendees, 2);
        assert_eq!(s.tickets_sold_by_type["REGULAR"], 3);
        assert_eq!(s.revenue_by_ticket_type["VIP"], Decimal::from(5000));
        assert_eq!(s.payment_method_usage["MPESA"], 2);
        assert_eq!(s.attendance_rate(), 50.0);
    }

    #[test]
    fn shared_payment_counted_once() {
        let tx = Uuid::new_v4();
        let s = summarize(&[
            row(TicketTypeName::Regular, 1, false, tx, 3000, PaymentMethod::Mpesa),
            row(TicketTypeName::Regular, 2, false, tx, 3000, PaymentMethod::Mpesa),
        ]);
        assert_eq!(s.total_revenue, Decimal::from(3000));
        assert_eq!(s.payment_method_usage["MPESA"], 1);
    }

    #[test]
    fn empty_report_has_zero_rate() {
        assert_eq!(summarize(&[]).attendance_rate(), 0.0);
    }
}
