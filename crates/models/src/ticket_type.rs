use sea_orm::{entity::prelude::*, Set, ConnectionTrait};
use rust_decimal::Decimal;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::enums::TicketTypeName;
use crate::{errors, event};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub event_id: Uuid,
    pub type_name: TicketTypeName,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Decimal,
    pub quantity: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Event,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Event => Entity::belongs_to(event::Entity).from(Column::EventId).to(event::Column::Id).into(),
        }
    }
}

impl Related<event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_price_quantity(price: Decimal, quantity: i32) -> Result<(), errors::ModelError> {
    if price <= Decimal::ZERO || quantity <= 0 {
        return Err(errors::ModelError::Validation("Price and quantity must be greater than zero".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    event_id: Uuid,
    type_name: TicketTypeName,
    price: Decimal,
    quantity: i32,
) -> Result<Model, errors::ModelError> {
    validate_price_quantity(price, quantity)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        event_id: Set(event_id),
        type_name: Set(type_name),
        price: Set(price.round_dp(2)),
        quantity: Set(quantity),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_and_quantity_must_be_positive() {
        assert!(validate_price_quantity(Decimal::ZERO, 10).is_err());
        assert!(validate_price_quantity(Decimal::new(1000, 0), 0).is_err());
        let err = validate_price_quantity(Decimal::new(-5, 0), -1).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
        assert!(validate_price_quantity(Decimal::new(150050, 2), 100).is_ok());
    }
}
