// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// 1. Top cards
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub draft_quotes: i64,
    pub sent_quotes: i64,
    pub approved_quotes: i64,
    pub rejected_quotes: i64,
    pub invoiced_quotes: i64,
    pub total_invoiced: Decimal,  // sum of invoice totals
    pub total_collected: Decimal, // sum of recorded payments
    pub outstanding: Decimal,     // still to be collected
    pub overdue_invoices: i64,
}

// 2. Collected revenue per month (last 12 months)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenueEntry {
    #[schema(example = "2025-03")]
    pub month: Option<String>,
    pub total: Option<Decimal>,
}

// 3. Best clients by collected revenue
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopClientEntry {
    pub client_id: Uuid,
    pub client_name: String,
    pub invoice_count: i64,
    pub total_revenue: Option<Decimal>,
}
