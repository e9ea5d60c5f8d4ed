// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};

use crate::{
    common::error::AppError,
    models::{
        dashboard::{DashboardSummary, MonthlyRevenueEntry, TopClientEntry},
        quote::QuoteStatus,
    },
};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    // 1. Summary cards
    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // One transaction so every card reads the same snapshot
        let mut tx = executor.begin().await?;

        // A. Quotes per status
        let counts = sqlx::query_as::<_, (QuoteStatus, i64)>(
            "SELECT status, COUNT(*) FROM quotes GROUP BY status",
        )
        .fetch_all(&mut *tx)
        .await?;

        let count_of = |status: QuoteStatus| {
            counts
                .iter()
                .find(|(s, _)| *s == status)
                .map(|(_, n)| *n)
                .unwrap_or(0)
        };

        // B. Invoiced vs collected
        let (total_invoiced, total_collected) = sqlx::query_as::<_, (Decimal, Decimal)>(
            "SELECT COALESCE(SUM(total), 0), COALESCE(SUM(paid_amount), 0) FROM invoices",
        )
        .fetch_one(&mut *tx)
        .await?;

        // C. Still to collect, over-payments do not offset other invoices
        let outstanding = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(GREATEST(total - paid_amount, 0)), 0) FROM invoices",
        )
        .fetch_one(&mut *tx)
        .await?;

        // D. Overdue invoices
        let overdue_invoices = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM invoices WHERE payment_status = 'overdue'",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary {
            draft_quotes: count_of(QuoteStatus::Draft),
            sent_quotes: count_of(QuoteStatus::Sent),
            approved_quotes: count_of(QuoteStatus::Approved),
            rejected_quotes: count_of(QuoteStatus::Rejected),
            invoiced_quotes: count_of(QuoteStatus::Invoiced),
            total_invoiced,
            total_collected,
            outstanding,
            overdue_invoices,
        })
    }

    // 2. Collected revenue per month, last 12 months
    pub async fn get_monthly_revenue<'e, E>(&self, executor: E) -> Result<Vec<MonthlyRevenueEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, MonthlyRevenueEntry>(
            r#"
            SELECT
                to_char(p.payment_date, 'YYYY-MM') AS month,
                SUM(p.amount) AS total
            FROM payment_history p
            WHERE p.payment_date >= (date_trunc('month', CURRENT_DATE) - INTERVAL '11 months')
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(data)
    }

    // 3. Top 5 clients by collected revenue
    pub async fn get_top_clients<'e, E>(&self, executor: E) -> Result<Vec<TopClientEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let data = sqlx::query_as::<_, TopClientEntry>(
            r#"
            SELECT
                c.id AS client_id,
                c.name AS client_name,
                COUNT(i.id) AS invoice_count,
                SUM(i.paid_amount) AS total_revenue
            FROM invoices i
            JOIN clients c ON c.id = i.client_id
            GROUP BY c.id, c.name
            ORDER BY total_revenue DESC NULLS LAST
            LIMIT 5
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(data)
    }
}
