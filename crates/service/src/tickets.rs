//! Ticket issuance against completed payments.
//!
//! `ticket_type.quantity` holds the remaining availability; issuing tickets
//! decrements it and deleting a ticket gives the seats back, both inside a
//! database transaction. The payment and ticket-type rows are read with
//! `FOR UPDATE` so concurrent purchases serialize on them. Scanning at the
//! gate locks the ticket row the same way, so a ticket is admitted once.

use chrono::Utc;
use models::enums::{PaymentStatus, UserRole};
use models::{event, organizer, ticket, ticket_type, transaction, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct TicketPurchase {
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    pub payment_reference: String,
}

/// Outcome of a successful gate scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReceipt {
    pub message: String,
    pub ticket_id: Uuid,
    pub event_id: Uuid,
    pub scanned_at: chrono::DateTime<Utc>,
    pub scanned_by: Uuid,
}

/// Remaining seats after taking `requested`, or the reason it is refused.
pub fn check_availability(available: i32, requested: i32) -> Result<i32, ServiceError> {
    if requested <= 0 {
        return Err(ServiceError::Validation("Quantity must be greater than zero".into()));
    }
    if requested > available {
        return Err(ServiceError::Validation(format!("Only {available} tickets remaining for this ticket type")));
    }
    Ok(available - requested)
}

#[instrument(skip(db, input), fields(user_id = %user_id, ticket_type_id = %input.ticket_type_id))]
pub async fn purchase_tickets(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: TicketPurchase,
) -> Result<ticket::Model, ServiceError> {
    let txn = db.begin().await?;

    let payment = transaction::Entity::find()
        .filter(transaction::Column::PaymentReference.eq(input.payment_reference.trim()))
        .filter(transaction::Column::UserId.eq(user_id))
        .filter(transaction::Column::PaymentStatus.eq(PaymentStatus::Completed))
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::Validation("No completed payment found for this reference".into()))?;
    let used = ticket::Entity::find()
        .filter(ticket::Column::TransactionId.eq(payment.id))
        .one(&txn)
        .await?;
    if used.is_some() {
        return Err(ServiceError::Conflict("Payment reference has already been used".into()));
    }

    let tt = ticket_type::Entity::find_by_id(input.ticket_type_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Ticket type"))?;
    let remaining = check_availability(tt.quantity, input.quantity)?;
    let event_id = tt.event_id;
    let mut am: ticket_type::ActiveModel = tt.into();
    am.quantity = Set(remaining);
    am.update(&txn).await?;

    let issued = ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        event_id: Set(event_id),
        ticket_type_id: Set(input.ticket_type_id),
        transaction_id: Set(payment.id),
        quantity: Set(input.quantity),
        scanned: Set(false),
        scanned_at: Set(None),
        scanned_by: Set(None),
        purchase_date: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;
    info!(event = "tickets_issued", ticket_id = %issued.id, quantity = issued.quantity, remaining);
    Ok(issued)
}

pub async fn list_my_tickets(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<ticket::Model>, ServiceError> {
    Ok(ticket::Entity::find()
        .filter(ticket::Column::UserId.eq(user_id))
        .order_by_desc(ticket::Column::PurchaseDate)
        .all(db)
        .await?)
}

/// Delete one of the caller's tickets and return its seats to the ticket type.
pub async fn delete_ticket(
    db: &DatabaseConnection,
    user_id: Uuid,
    id: Uuid,
) -> Result<(), ServiceError> {
    let txn = db.begin().await?;
    let t = ticket::Entity::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Ticket"))?;
    if t.user_id != user_id {
        return Err(ServiceError::Forbidden("You can only delete your own tickets".into()));
    }
    if let Some(tt) = ticket_type::Entity::find_by_id(t.ticket_type_id).lock_exclusive().one(&txn).await? {
        let restored = tt.quantity + t.quantity;
        let mut am: ticket_type::ActiveModel = tt.into();
        am.quantity = Set(restored);
        am.update(&txn).await?;
    }
    ticket::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    info!(event = "ticket_deleted", ticket_id = %id, user_id = %user_id);
    Ok(())
}

/// Mark a ticket as admitted. Security staff and admins may scan any ticket,
/// organizers only tickets for their own events.
#[instrument(skip(db, caller), fields(user_id = %caller.id, ticket_id = %ticket_id))]
pub async fn scan_ticket(
    db: &DatabaseConnection,
    caller: &user::Model,
    ticket_id: Uuid,
) -> Result<ScanReceipt, ServiceError> {
    if !matches!(caller.role, UserRole::Security | UserRole::Organizer | UserRole::Admin) {
        return Err(ServiceError::Forbidden("Only security personnel or the event organizer can scan tickets".into()));
    }
    let txn = db.begin().await?;
    let t = ticket::Entity::find_by_id(ticket_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Invalid ticket".into()))?;
    if caller.role == UserRole::Organizer {
        let ev = event::Entity::find_by_id(t.event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event"))?;
        let owns = organizer::find_by_user(&txn, caller.id).await?.is_some_and(|o| o.id == ev.organizer_id);
        if !owns {
            return Err(ServiceError::Forbidden("You are not the organizer of this event".into()));
        }
    }
    if t.scanned {
        return Err(ServiceError::Conflict("Ticket has already been scanned".into()));
    }

    let now = Utc::now();
    let event_id = t.event_id;
    let mut am: ticket::ActiveModel = t.into();
    am.scanned = Set(true);
    am.scanned_at = Set(Some(now.into()));
    am.scanned_by = Set(Some(caller.id));
    am.update(&txn).await?;
    txn.commit().await?;
    info!(event = "ticket_scanned", ticket_id = %ticket_id, event_id = %event_id);
    Ok(ScanReceipt {
        message: "Ticket validated successfully".into(),
        ticket_id,
        event_id,
        scanned_at: now,
        scanned_by: caller.id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::enums::{PaymentMethod, TicketTypeName, UserRole};
    use rust_decimal::Decimal;

    #[test]
    fn availability_rules() {
        assert_eq!(check_availability(10, 3).unwrap(), 7);
        assert_eq!(check_availability(3, 3).unwrap(), 0);
        assert!(check_availability(10, 0).is_err());
        let err = check_availability(2, 5).unwrap_err();
        assert!(err.to_string().contains("Only 2 tickets remaining"));
    }

    #[tokio::test]
    async fn purchase_and_refund_seats() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let buyer = models::user::create(&db, &format!("buyer_{}@example.com", Uuid::new_v4()), "Buyer", None, UserRole::Attendee).await?;
        let owner = models::user::create(&db, &format!("own_{}@example.com", Uuid::new_v4()), "Owner", None, UserRole::Organizer).await?;
        let org = models::organizer::get_or_create(&db, &owner).await?;
        let ev = models::event::create(&db, models::event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Ticketed".into(),
            description: "d".into(),
            date: Utc::now().date_naive(),
            start_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: None,
            city: "Nairobi".into(),
            location: "Hall".into(),
            amenities: vec![],
            image: None,
        })
        .await?;
        let tt = ticket_type::create(&db, ev.id, TicketTypeName::Regular, Decimal::new(1500, 0), 5).await?;
        let reference = format!("REF-{}", Uuid::new_v4());
        transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(buyer.id),
            amount_paid: Set(Decimal::new(4500, 0)),
            payment_status: Set(PaymentStatus::Completed),
            payment_method: Set(PaymentMethod::Mpesa),
            payment_reference: Set(reference.clone()),
            timestamp: Set(Utc::now().into()),
        }
        .insert(&db)
        .await?;

        let input = TicketPurchase { ticket_type_id: tt.id, quantity: 3, payment_reference: reference.clone() };
        let t = purchase_tickets(&db, buyer.id, input.clone()).await?;
        assert_eq!(ticket_type::Entity::find_by_id(tt.id).one(&db).await?.unwrap().quantity, 2);
        assert!(matches!(purchase_tickets(&db, buyer.id, input).await, Err(ServiceError::Conflict(_))));

        assert!(matches!(delete_ticket(&db, owner.id, t.id).await, Err(ServiceError::Forbidden(_))));
        delete_ticket(&db, buyer.id, t.id).await?;
        assert_eq!(ticket_type::Entity::find_by_id(tt.id).one(&db).await?.unwrap().quantity, 5);
        Ok(())
    }

    async fn completed_payment(
        db: &DatabaseConnection,
        user_id: Uuid,
    ) -> Result<String, anyhow::Error> {
        let reference = format!("REF-{}", Uuid::new_v4());
        transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            amount_paid: Set(Decimal::new(1500, 0)),
            payment_status: Set(PaymentStatus::Completed),
            payment_method: Set(PaymentMethod::Mpesa),
            payment_reference: Set(reference.clone()),
            timestamp: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
        Ok(reference)
    }

    #[tokio::test]
    async fn concurrent_purchases_do_not_oversell() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let a = models::user::create(&db, &format!("a_{}@example.com", Uuid::new_v4()), "A", None, UserRole::Attendee).await?;
        let b = models::user::create(&db, &format!("b_{}@example.com", Uuid::new_v4()), "B", None, UserRole::Attendee).await?;
        let owner = models::user::create(&db, &format!("o_{}@example.com", Uuid::new_v4()), "O", None, UserRole::Organizer).await?;
        let org = models::organizer::get_or_create(&db, &owner).await?;
        let ev = models::event::create(&db, models::event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Last seat".into(),
            description: "d".into(),
            date: Utc::now().date_naive(),
            start_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: None,
            city: "Nairobi".into(),
            location: "Hall".into(),
            amenities: vec![],
            image: None,
        })
        .await?;
        let tt = ticket_type::create(&db, ev.id, TicketTypeName::Vip, Decimal::new(1500, 0), 1).await?;
        let ref_a = completed_payment(&db, a.id).await?;
        let ref_b = completed_payment(&db, b.id).await?;

        let buy = |user_id: Uuid, payment_reference: String| {
            purchase_tickets(&db, user_id, TicketPurchase { ticket_type_id: tt.id, quantity: 1, payment_reference })
        };
        let (ra, rb) = tokio::join!(buy(a.id, ref_a), buy(b.id, ref_b));
        assert_eq!([ra.is_ok(), rb.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert_eq!(ticket_type::Entity::find_by_id(tt.id).one(&db).await?.unwrap().quantity, 0);

        // one payment reference submitted twice at once
        let tt2 = ticket_type::create(&db, ev.id, TicketTypeName::Regular, Decimal::new(500, 0), 10).await?;
        let reference = completed_payment(&db, a.id).await?;
        let again = |payment_reference: String| {
            purchase_tickets(&db, a.id, TicketPurchase { ticket_type_id: tt2.id, quantity: 2, payment_reference })
        };
        let (r1, r2) = tokio::join!(again(reference.clone()), again(reference));
        assert_eq!([r1.is_ok(), r2.is_ok()].iter().filter(|ok| **ok).count(), 1);
        assert!(matches!(r1.err().or(r2.err()), Some(ServiceError::Conflict(_))));
        assert_eq!(ticket_type::Entity::find_by_id(tt2.id).one(&db).await?.unwrap().quantity, 8);
        Ok(())
    }

    #[tokio::test]
    async fn scanning_admits_once() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let buyer = models::user::create(&db, &format!("s_{}@example.com", Uuid::new_v4()), "Guest", None, UserRole::Attendee).await?;
        let guard = models::user::create(&db, &format!("g_{}@example.com", Uuid::new_v4()), "Guard", None, UserRole::Security).await?;
        let owner = models::user::create(&db, &format!("so_{}@example.com", Uuid::new_v4()), "Owner", None, UserRole::Organizer).await?;
        let rival = models::user::create(&db, &format!("sr_{}@example.com", Uuid::new_v4()), "Rival", None, UserRole::Organizer).await?;
        let org = models::organizer::get_or_create(&db, &owner).await?;
        models::organizer::get_or_create(&db, &rival).await?;
        let ev = models::event::create(&db, models::event::NewEvent {
            organizer_id: org.id,
            category_id: None,
            name: "Gate night".into(),
            description: "d".into(),
            date: Utc::now().date_naive(),
            start_time: chrono::NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            end_time: None,
            city: "Nairobi".into(),
            location: "Hall".into(),
            amenities: vec![],
            image: None,
        })
        .await?;
        let tt = ticket_type::create(&db, ev.id, TicketTypeName::Regular, Decimal::new(500, 0), 4).await?;
        let first = completed_payment(&db, buyer.id).await?;
        let second = completed_payment(&db, buyer.id).await?;
        let t1 = purchase_tickets(&db, buyer.id, TicketPurchase { ticket_type_id: tt.id, quantity: 1, payment_reference: first }).await?;
        let t2 = purchase_tickets(&db, buyer.id, TicketPurchase { ticket_type_id: tt.id, quantity: 1, payment_reference: second }).await?;

        assert!(matches!(scan_ticket(&db, &buyer, t1.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(scan_ticket(&db, &rival, t1.id).await, Err(ServiceError::Forbidden(_))));
        match scan_ticket(&db, &guard, Uuid::new_v4()).await {
            Err(ServiceError::NotFound(m)) => assert_eq!(m, "Invalid ticket"),
            other => panic!("unexpected: {other:?}"),
        }

        let receipt = scan_ticket(&db, &guard, t1.id).await?;
        assert_eq!(receipt.scanned_by, guard.id);
        assert_eq!(receipt.event_id, ev.id);
        let stored = ticket::Entity::find_by_id(t1.id).one(&db).await?.unwrap();
        assert!(stored.scanned);
        assert_eq!(stored.scanned_by, Some(guard.id));
        match scan_ticket(&db, &owner, t1.id).await {
            Err(ServiceError::Conflict(m)) => assert_eq!(m, "Ticket has already been scanned"),
            other => panic!("unexpected: {other:?}"),
        }

        let receipt = scan_ticket(&db, &owner, t2.id).await?;
        assert_eq!(receipt.scanned_by, owner.id);
        Ok(())
    }
}
