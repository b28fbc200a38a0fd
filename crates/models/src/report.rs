use sea_orm::entity::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::enums::ReportScope;
use crate::{currency, event, organizer};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Option<Uuid>,
    pub base_currency_id: Option<Uuid>,
    pub converted_currency_id: Option<Uuid>,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))", nullable)]
    pub converted_revenue: Option<Decimal>,
    pub report_scope: ReportScope,
    pub total_tickets_sold: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_revenue: Decimal,
    pub number_of_attendees: i32,
    pub report_data: Json,
    pub timestamp: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Organizer,
    Event,
    BaseCurrency,
    ConvertedCurrency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Organizer => Entity::belongs_to(organizer::Entity).from(Column::OrganizerId).to(organizer::Column::Id).into(),
            Relation::Event => Entity::belongs_to(event::Entity).from(Column::EventId).to(event::Column::Id).into(),
            Relation::BaseCurrency => Entity::belongs_to(currency::Entity).from(Column::BaseCurrencyId).to(currency::Column::Id).into(),
            Relation::ConvertedCurrency => Entity::belongs_to(currency::Entity).from(Column::ConvertedCurrencyId).to(currency::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
