// src/handlers/quotes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        invoice::Invoice,
        quote::{NewQuote, NewQuoteItem, Quote, QuoteDetail, QuoteItemPatch, QuoteListEntry, QuotePatch, QuoteStatus},
    },
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct QuoteListQuery {
    pub status: Option<QuoteStatus>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionQuotePayload {
    #[schema(example = "sent")]
    pub status: QuoteStatus,
}

// ---
// Quotes
// ---

#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Quotes",
    request_body = NewQuote,
    responses(
        (status = 201, description = "Quote created with its number", body = QuoteDetail),
        (status = 400, description = "Invalid items or charges"),
        (status = 404, description = "Client not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<NewQuote>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .create_quote(&app_state.db_pool, payload, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(quote)))
}

#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Quotes",
    params(QuoteListQuery),
    responses((status = 200, description = "Quotes, newest first", body = Vec<QuoteListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let quotes = app_state
        .quote_service
        .list_quotes(&app_state.db_pool, query.status, query.client_id)
        .await?;

    Ok((StatusCode::OK, Json(quotes)))
}

#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 200, description = "Quote with its ordered items", body = QuoteDetail),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state.quote_service.get_quote(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(quote)))
}

#[utoipa::path(
    patch,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    request_body = QuotePatch,
    responses(
        (status = 200, description = "Updated quote", body = QuoteDetail),
        (status = 404, description = "Quote not found"),
        (status = 409, description = "Quote can no longer be edited or the transition is not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotePatch>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .update_quote(&app_state.db_pool, id, payload)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/status",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    request_body = TransitionQuotePayload,
    responses(
        (status = 200, description = "Quote moved to the new status", body = Quote),
        (status = 404, description = "Quote not found"),
        (status = 409, description = "Transition not allowed")
    ),
    security(("api_jwt" = []))
)]
pub async fn transition_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionQuotePayload>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .transition_quote(&app_state.db_pool, id, payload.status)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/convert",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 201, description = "Invoice created from the quote", body = Invoice),
        (status = 404, description = "Quote not found"),
        (status = 409, description = "Quote already converted or not approved")
    ),
    security(("api_jwt" = []))
)]
pub async fn convert_quote(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .conversion_service
        .convert_to_invoice(&app_state.db_pool, id, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 204, description = "Quote and its items deleted"),
        (status = 404, description = "Quote not found"),
        (status = 409, description = "Invoiced quotes cannot be deleted")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.quote_service.delete_quote(&app_state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Items
// ---

#[utoipa::path(
    post,
    path = "/api/quotes/{id}/items",
    tag = "Quotes",
    params(("id" = Uuid, Path, description = "Quote id")),
    request_body = NewQuoteItem,
    responses(
        (status = 201, description = "Item added, totals recomputed", body = QuoteDetail),
        (status = 409, description = "Quote can no longer be edited")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_item(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewQuoteItem>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .add_item(&app_state.db_pool, id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(quote)))
}

#[utoipa::path(
    patch,
    path = "/api/quotes/{id}/items/{item_id}",
    tag = "Quotes",
    params(
        ("id" = Uuid, Path, description = "Quote id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    request_body = QuoteItemPatch,
    responses(
        (status = 200, description = "Item updated, totals recomputed", body = QuoteDetail),
        (status = 404, description = "Quote or item not found"),
        (status = 409, description = "Quote can no longer be edited")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<QuoteItemPatch>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .update_item(&app_state.db_pool, id, item_id, payload)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}

#[utoipa::path(
    delete,
    path = "/api/quotes/{id}/items/{item_id}",
    tag = "Quotes",
    params(
        ("id" = Uuid, Path, description = "Quote id"),
        ("item_id" = Uuid, Path, description = "Item id")
    ),
    responses(
        (status = 200, description = "Item removed, totals recomputed", body = QuoteDetail),
        (status = 404, description = "Quote or item not found"),
        (status = 409, description = "Quote can no longer be edited or it is the last item")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_item(
    State(app_state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let quote = app_state
        .quote_service
        .remove_item(&app_state.db_pool, id, item_id)
        .await?;

    Ok((StatusCode::OK, Json(quote)))
}
