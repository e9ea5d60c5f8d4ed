// src/models/invoice.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::payment::PaymentHistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: Uuid,
    #[schema(example = "INV-0007")]
    pub invoice_number: String,
    pub quote_id: Uuid,
    pub client_id: Uuid,
    pub invoice_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    // Copied from the quote on conversion; invoiced quotes no longer change
    #[schema(example = "250.00")]
    pub total: Decimal,
    #[schema(example = "100.00")]
    pub paid_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Never negative: over-payments leave a zero balance.
    pub fn balance_due(&self) -> Decimal {
        (self.total - self.paid_amount).max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceListEntry {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub invoice: Invoice,
    pub quote_number: String,
    pub client_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub quote_number: String,
    pub client_name: String,
    #[schema(example = "150.00")]
    pub balance_due: Decimal,
    pub payments: Vec<PaymentHistoryEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverdueSweepResult {
    pub updated: u64,
}
