// src/db/invoice_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_constraint_violation, AppError},
    models::invoice::{Invoice, InvoiceListEntry, PaymentStatus},
};

const INVOICE_COLUMNS: &str = "i.id, i.invoice_number, i.quote_id, i.client_id, i.invoice_date, i.due_date, \
                               i.total, i.paid_amount, i.payment_status, i.created_by, i.created_at, i.updated_at";

#[derive(Clone, Default)]
pub struct InvoiceRepository;

impl InvoiceRepository {
    pub fn new() -> Self {
        Self
    }

    /// New invoices start unpaid. The UNIQUE constraint on `quote_id` turns a
    /// second conversion of the same quote into a conflict.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_invoice<'e, E>(
        &self,
        executor: E,
        invoice_number: &str,
        quote_id: Uuid,
        client_id: Uuid,
        invoice_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
        total: Decimal,
        created_by: Uuid,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO invoices AS i (
                invoice_number, quote_id, client_id, invoice_date, due_date,
                total, paid_amount, payment_status, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, 0, 'pending', $7)
            RETURNING {INVOICE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_number)
            .bind(quote_id)
            .bind(client_id)
            .bind(invoice_date)
            .bind(due_date)
            .bind(total)
            .bind(created_by)
            .fetch_one(executor)
            .await
            .map_err(|e| map_constraint_violation(e, "Quote has already been converted to an invoice"))
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.id = $1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    /// Locks the invoice row so payments on the same invoice are applied one at a time.
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.id = $1 FOR UPDATE");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn find_by_quote<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
    ) -> Result<Option<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices i WHERE i.quote_id = $1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(quote_id)
            .fetch_optional(executor)
            .await?;

        Ok(invoice)
    }

    pub async fn find_list_entry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<InvoiceListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}, q.quote_number, c.name AS client_name
            FROM invoices i
            JOIN quotes q ON q.id = i.quote_id
            JOIN clients c ON c.id = i.client_id
            WHERE i.id = $1
            "#
        );
        let entry = sqlx::query_as::<_, InvoiceListEntry>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(entry)
    }

    pub async fn list_invoices<'e, E>(
        &self,
        executor: E,
        status: Option<PaymentStatus>,
    ) -> Result<Vec<InvoiceListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}, q.quote_number, c.name AS client_name
            FROM invoices i
            JOIN quotes q ON q.id = i.quote_id
            JOIN clients c ON c.id = i.client_id
            WHERE ($1::payment_status IS NULL OR i.payment_status = $1)
            ORDER BY i.invoice_date DESC, i.invoice_number DESC
            "#
        );
        let invoices = sqlx::query_as::<_, InvoiceListEntry>(&sql)
            .bind(status)
            .fetch_all(executor)
            .await?;

        Ok(invoices)
    }

    pub async fn update_payment_state<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        paid_amount: Decimal,
        status: PaymentStatus,
    ) -> Result<Invoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE invoices i SET paid_amount = $2, payment_status = $3, updated_at = NOW()
            WHERE i.id = $1
            RETURNING {INVOICE_COLUMNS}
            "#
        );
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .bind(paid_amount)
            .bind(status)
            .fetch_one(executor)
            .await?;

        Ok(invoice)
    }

    /// Unpaid invoices past their due date, locked for the overdue sweep.
    /// Rows held by an in-flight payment are skipped; that payment re-derives
    /// the status itself.
    pub async fn lock_past_due<'e, E>(
        &self,
        executor: E,
        now: DateTime<Utc>,
    ) -> Result<Vec<Invoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS}
            FROM invoices i
            WHERE i.payment_status IN ('pending', 'partial')
              AND i.due_date < $1
            FOR UPDATE SKIP LOCKED
            "#
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(now)
            .fetch_all(executor)
            .await?;

        Ok(invoices)
    }
}
