// src/db/payment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{PaymentHistoryEntry, PaymentMethod},
};

const PAYMENT_COLUMNS: &str = "p.id, p.invoice_id, p.amount, p.payment_method, p.transaction_id, p.notes, \
                               p.payment_date, p.recorded_by, p.created_at";

#[derive(Clone, Default)]
pub struct PaymentRepository;

impl PaymentRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        transaction_id: Option<&str>,
        notes: Option<&str>,
        payment_date: NaiveDate,
        recorded_by: Uuid,
    ) -> Result<PaymentHistoryEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO payment_history AS p (
                invoice_id, amount, payment_method, transaction_id, notes, payment_date, recorded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PAYMENT_COLUMNS}
            "#
        );
        let payment = sqlx::query_as::<_, PaymentHistoryEntry>(&sql)
            .bind(invoice_id)
            .bind(amount)
            .bind(method)
            .bind(transaction_id)
            .bind(notes)
            .bind(payment_date)
            .bind(recorded_by)
            .fetch_one(executor)
            .await?;

        Ok(payment)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PaymentHistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment_history p WHERE p.id = $1");
        let payment = sqlx::query_as::<_, PaymentHistoryEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(payment)
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payment_history WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Sum of every payment entry currently recorded for the invoice.
    pub async fn sum_for_invoice<'e, E>(&self, executor: E, invoice_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(amount), 0) FROM payment_history WHERE invoice_id = $1",
        )
        .bind(invoice_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn list_for_invoice<'e, E>(
        &self,
        executor: E,
        invoice_id: Uuid,
    ) -> Result<Vec<PaymentHistoryEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {PAYMENT_COLUMNS}
            FROM payment_history p
            WHERE p.invoice_id = $1
            ORDER BY p.payment_date DESC, p.created_at DESC
            "#
        );
        let payments = sqlx::query_as::<_, PaymentHistoryEntry>(&sql)
            .bind(invoice_id)
            .fetch_all(executor)
            .await?;

        Ok(payments)
    }
}
