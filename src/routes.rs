// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Public
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new().route("/me", get(handlers::auth::get_me));

    let client_routes = Router::new()
        .route(
            "/",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/{id}",
            get(handlers::clients::get_client)
                .patch(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        );

    let quote_routes = Router::new()
        .route(
            "/",
            post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes),
        )
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .patch(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/status", post(handlers::quotes::transition_quote))
        .route("/{id}/convert", post(handlers::quotes::convert_quote))
        .route("/{id}/items", post(handlers::quotes::add_item))
        .route(
            "/{id}/items/{item_id}",
            patch(handlers::quotes::update_item).delete(handlers::quotes::remove_item),
        )
        .route("/{id}/pdf", get(handlers::documents::quote_pdf));

    let invoice_routes = Router::new()
        .route("/", get(handlers::invoices::list_invoices))
        .route("/sweep-overdue", post(handlers::invoices::sweep_overdue))
        .route("/{id}", get(handlers::invoices::get_invoice))
        .route(
            "/{id}/payments",
            post(handlers::payments::record_payment).get(handlers::payments::list_payments),
        )
        .route("/{id}/pdf", get(handlers::documents::invoice_pdf));

    let payment_routes = Router::new().route("/{id}", delete(handlers::payments::delete_payment));

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::list_settings))
        .route(
            "/{key}",
            get(handlers::settings::get_setting).put(handlers::settings::update_setting),
        );

    let dashboard_routes = Router::new()
        .route("/summary", get(handlers::dashboard::get_summary))
        .route("/revenue", get(handlers::dashboard::get_monthly_revenue))
        .route("/top-clients", get(handlers::dashboard::get_top_clients));

    // Everything below requires a Bearer token
    let protected = Router::new()
        .nest("/users", user_routes)
        .nest("/clients", client_routes)
        .nest("/quotes", quote_routes)
        .nest("/invoices", invoice_routes)
        .nest("/payments", payment_routes)
        .nest("/settings", settings_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected)
        .with_state(app_state)
}
