// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        invoice::Invoice,
        payment::{NewPayment, PaymentHistoryEntry, RecordedPayment},
    },
};

#[utoipa::path(
    post,
    path = "/api/invoices/{id}/payments",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Invoice id")),
    request_body = NewPayment,
    responses(
        (status = 201, description = "Payment recorded, invoice reconciled", body = RecordedPayment),
        (status = 400, description = "Non-positive amount or unknown method"),
        (status = 404, description = "Invoice not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_payment(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<NewPayment>,
) -> Result<impl IntoResponse, AppError> {
    let recorded = app_state
        .payment_service
        .record_payment(&app_state.db_pool, invoice_id, payload, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(recorded)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/payments",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Payments, newest first", body = Vec<PaymentHistoryEntry>),
        (status = 404, description = "Invoice not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state
        .payment_service
        .list_payments(&app_state.db_pool, invoice_id)
        .await?;

    Ok((StatusCode::OK, Json(payments)))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "Payment id")),
    responses(
        (status = 200, description = "Payment removed, invoice reconciled", body = Invoice),
        (status = 404, description = "Payment not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_payment(
    State(app_state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state
        .payment_service
        .delete_payment(&app_state.db_pool, payment_id)
        .await?;

    Ok((StatusCode::OK, Json(invoice)))
}
