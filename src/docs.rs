// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Quotes ---
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::transition_quote,
        handlers::quotes::convert_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::add_item,
        handlers::quotes::update_item,
        handlers::quotes::remove_item,

        // --- Invoices ---
        handlers::invoices::list_invoices,
        handlers::invoices::get_invoice,
        handlers::invoices::sweep_overdue,

        // --- Payments ---
        handlers::payments::record_payment,
        handlers::payments::list_payments,
        handlers::payments::delete_payment,

        // --- Settings ---
        handlers::settings::list_settings,
        handlers::settings::get_setting,
        handlers::settings::update_setting,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_monthly_revenue,
        handlers::dashboard::get_top_clients,

        // --- Documents ---
        handlers::documents::quote_pdf,
        handlers::documents::invoice_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Clients ---
            models::client::Client,
            models::client::NewClient,
            models::client::ClientPatch,

            // --- Quotes ---
            models::quote::QuoteStatus,
            models::quote::Quote,
            models::quote::QuoteItem,
            models::quote::QuoteDetail,
            models::quote::QuoteListEntry,
            models::quote::NewQuote,
            models::quote::NewQuoteItem,
            models::quote::QuoteCharges,
            models::quote::QuotePatch,
            models::quote::QuoteItemPatch,
            handlers::quotes::TransitionQuotePayload,

            // --- Invoices ---
            models::invoice::PaymentStatus,
            models::invoice::Invoice,
            models::invoice::InvoiceListEntry,
            models::invoice::InvoiceDetail,
            models::invoice::OverdueSweepResult,

            // --- Payments ---
            models::payment::PaymentMethod,
            models::payment::PaymentHistoryEntry,
            models::payment::NewPayment,
            models::payment::RecordedPayment,

            // --- Settings ---
            models::settings::Setting,
            models::settings::UpdateSettingRequest,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::MonthlyRevenueEntry,
            models::dashboard::TopClientEntry,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Authenticated user"),
        (name = "Clients", description = "Client directory"),
        (name = "Quotes", description = "Quote lifecycle, items and conversion to invoice"),
        (name = "Invoices", description = "Invoices and overdue tracking"),
        (name = "Payments", description = "Payment entries and reconciliation"),
        (name = "Settings", description = "Numbering prefixes and company profile"),
        (name = "Dashboard", description = "Revenue analytics"),
        (name = "Documents", description = "PDF rendering")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
