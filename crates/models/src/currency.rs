use sea_orm::{entity::prelude::*, Set, ConnectionTrait, Iterable};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::enums::{CurrencyCode, ParseLoose};
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: CurrencyCode,
    pub name: String,
    pub symbol: String,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub async fn find_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<Model>, errors::ModelError> {
    let Some(code) = CurrencyCode::parse_loose(code) else {
        return Ok(None);
    };
    Entity::find()
        .filter(Column::Code.eq(code))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Insert every known currency code that is not yet present.
pub async fn seed_defaults<C: ConnectionTrait>(db: &C) -> Result<usize, errors::ModelError> {
    let mut inserted = 0;
    for code in CurrencyCode::iter() {
        let exists = Entity::find()
            .filter(Column::Code.eq(code))
            .one(db)
            .await
            .map_err(|e| errors::ModelError::Db(e.to_string()))?
            .is_some();
        if exists {
            continue;
        }
        let am = ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            name: Set(code.display_name().to_string()),
            symbol: Set(code.symbol().to_string()),
            is_active: Set(true),
        };
        am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
        inserted += 1;
    }
    Ok(inserted)
}
