use crate::db::connect;
use crate::enums::{CurrencyCode, TicketTypeName, UserRole};
use crate::{category, currency, event, exchange_rate, organizer, partner, ticket_type, user};
use chrono::{Duration, NaiveTime, Utc};
use migration::MigratorTrait;
use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait};
use anyhow::Result;
use uuid::Uuid;

async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = connect().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn organizer_fixture(db: &DatabaseConnection) -> Result<(user::Model, organizer::Model)> {
    let email = format!("org_{}@example.com", Uuid::new_v4());
    let u = user::create(db, &email, "Ada Organizer", None, UserRole::Organizer).await?;
    let o = organizer::get_or_create(db, &u).await?;
    Ok((u, o))
}

#[tokio::test]
async fn test_user_and_organizer_profile() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let (u, o) = organizer_fixture(&db).await?;
    assert_eq!(o.user_id, u.id);

    // second call returns the same profile
    let again = organizer::get_or_create(&db, &u).await?;
    assert_eq!(again.id, o.id);

    let found = user::find_by_email(&db, &u.email.to_uppercase()).await?;
    assert_eq!(found.map(|f| f.id), Some(u.id));

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(organizer::Entity::find_by_id(o.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_event_with_ticket_types() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let (u, o) = organizer_fixture(&db).await?;

    let ev = event::create(&db, event::NewEvent {
        organizer_id: o.id,
        category_id: None,
        name: "Jazz Night".into(),
        description: "Live jazz".into(),
        date: (Utc::now() + Duration::days(7)).date_naive(),
        start_time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
        end_time: Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
        city: "Nairobi".into(),
        location: "Alliance Française".into(),
        amenities: vec!["parking".into()],
        image: None,
    }).await?;

    let tt = ticket_type::create(&db, ev.id, TicketTypeName::Vip, Decimal::new(250000, 2), 50).await?;
    assert_eq!(tt.price, Decimal::new(2500, 0));

    let bad = ticket_type::create(&db, ev.id, TicketTypeName::Regular, Decimal::ZERO, 10).await;
    assert!(bad.is_err());

    user::Entity::delete_by_id(u.id).exec(&db).await?;
    assert!(ticket_type::Entity::find_by_id(tt.id).one(&db).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_currency_seed_and_latest_rate() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    currency::seed_defaults(&db).await?;
    // idempotent
    assert_eq!(currency::seed_defaults(&db).await?, 0);

    let kes = currency::find_by_code(&db, "kes").await?.expect("KES seeded");
    let usd = currency::find_by_code(&db, "USD").await?.expect("USD seeded");
    assert_eq!(kes.code, CurrencyCode::Kes);

    let older = exchange_rate::create(&db, kes.id, usd.id, Decimal::new(77, 4)).await?;
    let newer = exchange_rate::create(&db, kes.id, usd.id, Decimal::new(78, 4)).await?;
    let latest = exchange_rate::latest_active(&db, kes.id, usd.id).await?.expect("rate");
    assert_eq!(latest.id, newer.id);

    exchange_rate::Entity::delete_by_id(older.id).exec(&db).await?;
    exchange_rate::Entity::delete_by_id(newer.id).exec(&db).await?;
    Ok(())
}

#[tokio::test]
async fn test_category_and_partner() -> Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let db = setup_test_db().await?;
    let name = format!("Music {}", Uuid::new_v4());
    let c = category::create(&db, &name, None).await?;
    let found = category::find_by_name(&db, &name.to_lowercase()).await?;
    assert_eq!(found.map(|f| f.id), Some(c.id));

    let (u, o) = organizer_fixture(&db).await?;
    let p = partner::create(&db, o.id, partner::NewPartner { company_name: "Safaricom".into(), ..Default::default() }).await?;
    assert!(p.is_active);

    category::Entity::delete_by_id(c.id).exec(&db).await?;
    user::Entity::delete_by_id(u.id).exec(&db).await?;
    Ok(())
}
