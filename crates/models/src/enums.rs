//! String-backed enums shared by the entities.

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Case-insensitive lookup over the stored string values.
pub trait ParseLoose: ActiveEnum<Value = String> + Iterable {
    fn parse_loose(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::iter().find(|v| v.to_value().eq_ignore_ascii_case(s))
    }

    fn as_db_str(&self) -> String {
        self.to_value()
    }
}

impl<T: ActiveEnum<Value = String> + Iterable> ParseLoose for T {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "ORGANIZER")]
    Organizer,
    #[sea_orm(string_value = "ATTENDEE")]
    Attendee,
    #[sea_orm(string_value = "SECURITY")]
    Security,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum TicketTypeName {
    #[sea_orm(string_value = "REGULAR")]
    #[serde(rename = "REGULAR")]
    Regular,
    #[sea_orm(string_value = "VIP")]
    #[serde(rename = "VIP")]
    Vip,
    #[sea_orm(string_value = "STUDENT")]
    #[serde(rename = "STUDENT")]
    Student,
    #[sea_orm(string_value = "GROUP_OF_5")]
    #[serde(rename = "GROUP_OF_5")]
    GroupOf5,
    #[sea_orm(string_value = "COUPLES")]
    #[serde(rename = "COUPLES")]
    Couples,
    #[sea_orm(string_value = "EARLY_BIRD")]
    #[serde(rename = "EARLY_BIRD")]
    EarlyBird,
    #[sea_orm(string_value = "VVIP")]
    #[serde(rename = "VVIP")]
    Vvip,
    #[sea_orm(string_value = "GIVEAWAY")]
    #[serde(rename = "GIVEAWAY")]
    Giveaway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "MPESA")]
    Mpesa,
    #[sea_orm(string_value = "PAYSTACK")]
    Paystack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(3))")]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[sea_orm(string_value = "USD")]
    Usd,
    #[sea_orm(string_value = "EUR")]
    Eur,
    #[sea_orm(string_value = "GBP")]
    Gbp,
    #[sea_orm(string_value = "KES")]
    Kes,
    #[sea_orm(string_value = "UGX")]
    Ugx,
    #[sea_orm(string_value = "TZS")]
    Tzs,
    #[sea_orm(string_value = "NGN")]
    Ngn,
    #[sea_orm(string_value = "GHS")]
    Ghs,
    #[sea_orm(string_value = "ZAR")]
    Zar,
    #[sea_orm(string_value = "JPY")]
    Jpy,
    #[sea_orm(string_value = "CAD")]
    Cad,
    #[sea_orm(string_value = "AUD")]
    Aud,
}

impl CurrencyCode {
    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Usd | CurrencyCode::Cad | CurrencyCode::Aud => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Gbp => "£",
            CurrencyCode::Kes => "KSh",
            CurrencyCode::Ugx => "USh",
            CurrencyCode::Tzs => "TSh",
            CurrencyCode::Ngn => "₦",
            CurrencyCode::Ghs => "₵",
            CurrencyCode::Zar => "R",
            CurrencyCode::Jpy => "¥",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Gbp => "British Pound",
            CurrencyCode::Kes => "Kenyan Shilling",
            CurrencyCode::Ugx => "Ugandan Shilling",
            CurrencyCode::Tzs => "Tanzanian Shilling",
            CurrencyCode::Ngn => "Nigerian Naira",
            CurrencyCode::Ghs => "Ghanaian Cedi",
            CurrencyCode::Zar => "South African Rand",
            CurrencyCode::Jpy => "Japanese Yen",
            CurrencyCode::Cad => "Canadian Dollar",
            CurrencyCode::Aud => "Australian Dollar",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum CollaborationType {
    #[sea_orm(string_value = "Partner")]
    Partner,
    #[sea_orm(string_value = "Official Partner")]
    #[serde(rename = "Official Partner")]
    OfficialPartner,
    #[sea_orm(string_value = "Collaborator")]
    Collaborator,
    #[sea_orm(string_value = "Supporter")]
    Supporter,
    #[sea_orm(string_value = "Media Partner")]
    #[serde(rename = "Media Partner")]
    MediaPartner,
}

/// Kinds of mutation an assistant can propose. Only a subset has an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[sea_orm(string_value = "create_event")]
    CreateEvent,
    #[sea_orm(string_value = "update_event")]
    UpdateEvent,
    #[sea_orm(string_value = "delete_event")]
    DeleteEvent,
    #[sea_orm(string_value = "search_events")]
    SearchEvents,
    #[sea_orm(string_value = "create_tickets")]
    CreateTickets,
    #[sea_orm(string_value = "update_tickets")]
    UpdateTickets,
    #[sea_orm(string_value = "analyze_sales")]
    AnalyzeSales,
    #[sea_orm(string_value = "generate_report")]
    GenerateReport,
    #[sea_orm(string_value = "manage_partners")]
    ManagePartners,
    #[sea_orm(string_value = "pricing_recommendation")]
    PricingRecommendation,
    #[sea_orm(string_value = "inventory_check")]
    InventoryCheck,
    #[sea_orm(string_value = "revenue_analysis")]
    RevenueAnalysis,
    #[sea_orm(string_value = "bulk_operation")]
    BulkOperation,
    #[sea_orm(string_value = "general_query")]
    GeneralQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "failed")]
    Failed,
    #[sea_orm(string_value = "requires_confirmation")]
    RequiresConfirmation,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReportScope {
    #[sea_orm(string_value = "event_summary")]
    EventSummary,
    #[sea_orm(string_value = "ticket_type_summary")]
    TicketTypeSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_type_parses_case_insensitively() {
        assert_eq!(TicketTypeName::parse_loose("vip"), Some(TicketTypeName::Vip));
        assert_eq!(TicketTypeName::parse_loose(" group_of_5 "), Some(TicketTypeName::GroupOf5));
        assert_eq!(TicketTypeName::parse_loose("BALCONY"), None);
    }

    #[test]
    fn serde_matches_db_strings() {
        let v = serde_json::to_value(TicketTypeName::GroupOf5).unwrap();
        assert_eq!(v, serde_json::json!("GROUP_OF_5"));
        let v = serde_json::to_value(CollaborationType::MediaPartner).unwrap();
        assert_eq!(v, serde_json::json!("Media Partner"));
        let v = serde_json::to_value(ActionStatus::InProgress).unwrap();
        assert_eq!(v, serde_json::json!("in_progress"));
        assert_eq!(ActionType::ManagePartners.as_db_str(), "manage_partners");
    }

    #[test]
    fn currency_codes_have_symbols() {
        for code in CurrencyCode::iter() {
            assert!(!code.symbol().is_empty());
            assert_eq!(code.as_db_str().len(), 3);
        }
        assert_eq!(CurrencyCode::parse_loose("kes"), Some(CurrencyCode::Kes));
    }
}
