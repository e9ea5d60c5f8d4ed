// src/handlers/documents.rs

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

fn pdf_response(filename: &str, bytes: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}.pdf\"")),
    ];

    (headers, bytes).into_response()
}

#[utoipa::path(
    get,
    path = "/api/quotes/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Quote id")),
    responses(
        (status = 200, description = "Quote PDF", content_type = "application/pdf"),
        (status = 404, description = "Quote not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn quote_pdf(
    State(app_state): State<AppState>,
    Path(quote_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_quote_pdf(&app_state.db_pool, quote_id)
        .await?;

    Ok(pdf_response(&format!("quote_{quote_id}"), pdf_bytes))
}

#[utoipa::path(
    get,
    path = "/api/invoices/{id}/pdf",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice PDF, with a UPI QR code while a balance is due", content_type = "application/pdf"),
        (status = 404, description = "Invoice not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn invoice_pdf(
    State(app_state): State<AppState>,
    Path(invoice_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .document_service
        .generate_invoice_pdf(&app_state.db_pool, invoice_id)
        .await?;

    Ok(pdf_response(&format!("invoice_{invoice_id}"), pdf_bytes))
}
