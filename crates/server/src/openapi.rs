use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub password: String,
    /// ATTENDEE (default) or ORGANIZER
    pub role: Option<String>,
}

#[derive(ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(ToSchema)]
pub struct EventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    /// YYYY-MM-DD
    pub date: Option<String>,
    /// HH:MM
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub city: Option<String>,
    pub location: Option<String>,
    pub amenities: Option<Vec<String>>,
    pub image: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
}

#[derive(ToSchema)]
pub struct CategoryRequest {
    pub name: String,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct TicketTypeRequest {
    pub event_id: Uuid,
    /// REGULAR, VIP, STUDENT, GROUP_OF_5, COUPLES, EARLY_BIRD, ...
    pub type_name: String,
    pub price: String,
    pub quantity: i32,
}

#[derive(ToSchema)]
pub struct TicketPurchaseRequest {
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    pub payment_reference: String,
}

#[derive(ToSchema)]
pub struct PartnerRequest {
    pub company_name: Option<String>,
    pub company_description: Option<String>,
    pub website_url: Option<String>,
    pub contact_email: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(ToSchema)]
pub struct CollaborationRequest {
    pub partner_id: Option<Uuid>,
    /// Partner (default), Official Partner, Collaborator, Supporter, Media Partner
    pub collaboration_type: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

#[derive(ToSchema)]
pub struct BatchItemDoc {
    pub report_id: Uuid,
    pub to_currency: String,
}

#[derive(ToSchema)]
pub struct BatchConvertRequest {
    pub conversions: Vec<BatchItemDoc>,
    pub persist_conversion: Option<bool>,
}

#[derive(ToSchema)]
pub struct ReportGenerateRequest {
    pub event_id: Uuid,
    pub start_date: String,
    pub end_date: String,
    pub ticket_type_id: Option<Uuid>,
    pub target_currency: Option<String>,
}

#[derive(ToSchema)]
pub struct ProposeActionRequest {
    /// create_event, update_event, delete_event, create_tickets, update_tickets, manage_partners
    pub action_type: String,
    #[schema(value_type = Object)]
    pub request_data: serde_json::Value,
    pub event_id: Option<Uuid>,
    pub ticket_type_id: Option<Uuid>,
    pub partner_id: Option<Uuid>,
}

#[derive(ToSchema)]
pub struct ConfirmActionRequest {
    pub confirmed: bool,
}

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::events::list,
        crate::routes::events::get,
        crate::routes::events::create,
        crate::routes::events::update,
        crate::routes::events::remove,
        crate::routes::events::like,
        crate::routes::categories::list,
        crate::routes::categories::create,
        crate::routes::ticket_types::list,
        crate::routes::ticket_types::create,
        crate::routes::tickets::list_mine,
        crate::routes::tickets::purchase,
        crate::routes::tickets::scan,
        crate::routes::partners::list,
        crate::routes::partners::create,
        crate::routes::partners::get,
        crate::routes::partners::update,
        crate::routes::partners::deactivate,
        crate::routes::partners::list_collaborations,
        crate::routes::partners::add_collaboration,
        crate::routes::partners::remove_collaboration,
        crate::routes::currency::list,
        crate::routes::currency::status,
        crate::routes::currency::latest,
        crate::routes::currency::historical,
        crate::routes::currency::range,
        crate::routes::currency::convert,
        crate::routes::currency::convert_revenue,
        crate::routes::currency::convert_revenue_batch,
        crate::routes::currency::list_converted,
        crate::routes::currency::clear_converted,
        crate::routes::reports::list,
        crate::routes::reports::get,
        crate::routes::reports::generate,
        crate::routes::reports::export,
        crate::routes::ai::propose,
        crate::routes::ai::pending,
        crate::routes::ai::confirm,
        crate::routes::admin::list_events,
        crate::routes::admin::delete_event,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            EventRequest,
            CategoryRequest,
            TicketTypeRequest,
            TicketPurchaseRequest,
            PartnerRequest,
            CollaborationRequest,
            BatchItemDoc,
            BatchConvertRequest,
            ReportGenerateRequest,
            ProposeActionRequest,
            ConfirmActionRequest,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "events"),
        (name = "tickets"),
        (name = "partners"),
        (name = "currency"),
        (name = "reports"),
        (name = "ai"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
