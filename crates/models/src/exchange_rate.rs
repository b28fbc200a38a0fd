use sea_orm::{entity::prelude::*, Set, ConnectionTrait, QueryOrder};
use rust_decimal::Decimal;
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{currency, errors};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "exchange_rate")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub from_currency_id: Uuid,
    pub to_currency_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((18, 6)))")]
    pub rate: Decimal,
    pub effective_date: DateTimeWithTimeZone,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    FromCurrency,
    ToCurrency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::FromCurrency => Entity::belongs_to(currency::Entity).from(Column::FromCurrencyId).to(currency::Column::Id).into(),
            Relation::ToCurrency => Entity::belongs_to(currency::Entity).from(Column::ToCurrencyId).to(currency::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_rate(rate: Decimal) -> Result<(), errors::ModelError> {
    if rate <= Decimal::ZERO {
        return Err(errors::ModelError::Validation("rate must be greater than zero".into()));
    }
    Ok(())
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
    rate: Decimal,
) -> Result<Model, errors::ModelError> {
    validate_rate(rate)?;
    if from == to {
        return Err(errors::ModelError::Validation("from and to currency must differ".into()));
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        from_currency_id: Set(from),
        to_currency_id: Set(to),
        rate: Set(rate),
        effective_date: Set(Utc::now().into()),
        is_active: Set(true),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest active rate for the pair.
pub async fn latest_active<C: ConnectionTrait>(
    db: &C,
    from: Uuid,
    to: Uuid,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::FromCurrencyId.eq(from))
        .filter(Column::ToCurrencyId.eq(to))
        .filter(Column::IsActive.eq(true))
        .order_by_desc(Column::EffectiveDate)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_rates() {
        assert!(validate_rate(Decimal::ZERO).is_err());
        assert!(validate_rate(Decimal::new(-1, 0)).is_err());
        assert!(validate_rate(Decimal::new(77, 4)).is_ok());
    }
}
