// src/handlers/invoices.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::invoice::{InvoiceDetail, InvoiceListEntry, OverdueSweepResult, PaymentStatus},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceListQuery {
    pub status: Option<PaymentStatus>,
}

#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Invoices",
    params(InvoiceListQuery),
    responses((status = 200, description = "Invoices, newest first", body = Vec<InvoiceListEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    Query(query): Query<InvoiceListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let invoices = app_state
        .invoice_service
        .list_invoices(&app_state.db_pool, query.status)
        .await?;

    Ok((StatusCode::OK, Json(invoices)))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}",
    tag = "Invoices",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice with balance and payments", body = InvoiceDetail),
        (status = 404, description = "Invoice not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_invoice(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = app_state.invoice_service.get_invoice(&app_state.db_pool, id).await?;
    Ok((StatusCode::OK, Json(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/invoices/sweep-overdue",
    tag = "Invoices",
    responses((status = 200, description = "Unpaid invoices past due marked overdue", body = OverdueSweepResult)),
    security(("api_jwt" = []))
)]
pub async fn sweep_overdue(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .invoice_service
        .sweep_overdue(&app_state.db_pool, Utc::now())
        .await?;

    Ok((StatusCode::OK, Json(OverdueSweepResult { updated })))
}
